//! Product service enforcing SKU uniqueness.

use common::StreamId;
use event_store::{EventContext, EventStore};
use publisher::PublisherBridge;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;
use crate::value_objects::ProductId;

use super::{Product, ProductError, RegisterProduct, Sku, SkuIndex};

impl From<ProductError> for DomainError {
    fn from(e: ProductError) -> Self {
        DomainError::Product(e)
    }
}

/// Service for the product catalogue.
pub struct ProductService<S, I>
where
    S: EventStore,
    I: SkuIndex,
{
    handler: CommandHandler<S, Product>,
    sku_index: I,
}

impl<S, I> ProductService<S, I>
where
    S: EventStore,
    I: SkuIndex,
{
    /// Creates a new product service.
    pub fn new(store: S, sku_index: I) -> Self {
        Self {
            handler: CommandHandler::new(store),
            sku_index,
        }
    }

    /// Publishes committed product events through `publisher`.
    pub fn with_publisher(self, publisher: PublisherBridge) -> Self {
        Self {
            handler: self.handler.with_publisher(publisher),
            ..self
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Product> {
        &self.handler
    }

    /// Registers a product, rejecting a SKU already used by another product.
    ///
    /// The SKU is claimed before the append and released again if the
    /// append does not go through.
    #[tracing::instrument(skip(self, context), fields(product_id = %cmd.product_id, sku = %cmd.sku))]
    pub async fn register_product(
        &self,
        cmd: RegisterProduct,
        context: EventContext,
    ) -> Result<CommandResult<Product>, DomainError> {
        let claimed = self.sku_index.reserve(&cmd.sku, cmd.product_id).await;

        if !claimed
            && let Some(existing) = self.sku_index.find(&cmd.sku).await
            && existing != cmd.product_id
        {
            tracing::warn!(%existing, "duplicate SKU");
            return Err(ProductError::DuplicateSku {
                sku: cmd.sku,
                existing,
            }
            .into());
        }

        let result = self
            .handler
            .execute(cmd.stream_id(), context, |product| product.register(&cmd))
            .await;

        if result.is_err() && claimed {
            self.sku_index.release(&cmd.sku, cmd.product_id).await;
        }

        result
    }

    /// Loads a product by ID, failing with `NotFound` if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_product(&self, product_id: ProductId) -> Result<Product, DomainError> {
        self.handler
            .get(StreamId::from_uuid(product_id.as_uuid()))
            .await
    }

    /// Looks a product up by SKU.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_sku(&self, sku: &Sku) -> Result<Option<Product>, DomainError> {
        match self.sku_index.find(sku).await {
            Some(product_id) => {
                self.handler
                    .load_existing(StreamId::from_uuid(product_id.as_uuid()))
                    .await
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::InMemorySkuIndex;
    use event_store::{InMemoryEventStore, Version};
    use uuid::Uuid;

    fn register(sku: &str) -> RegisterProduct {
        RegisterProduct::with(Some(Uuid::new_v4()), Some(sku), Some("Coffee"), None).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_get() {
        let service = ProductService::new(InMemoryEventStore::new(), InMemorySkuIndex::new());
        let cmd = register("CC0001");
        let product_id = cmd.product_id;

        let result = service
            .register_product(cmd, EventContext::new())
            .await
            .unwrap();
        assert_eq!(result.new_version, Version::first());

        let product = service.get_product(product_id).await.unwrap();
        assert_eq!(product.name(), "Coffee");

        let by_sku = service
            .find_by_sku(&Sku::parse("CC0001").unwrap())
            .await
            .unwrap();
        assert_eq!(by_sku, Some(product));
    }

    #[tokio::test]
    async fn test_duplicate_sku_rejected() {
        let store = InMemoryEventStore::new();
        let service = ProductService::new(store.clone(), InMemorySkuIndex::new());
        service
            .register_product(register("CC0001"), EventContext::new())
            .await
            .unwrap();

        let result = service
            .register_product(register("CC0001"), EventContext::new())
            .await;

        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::DuplicateSku { .. }))
        ));
        assert_eq!(store.event_count().await, 1);
    }

    #[tokio::test]
    async fn test_reregistering_keeps_sku_claim() {
        let index = InMemorySkuIndex::new();
        let service = ProductService::new(InMemoryEventStore::new(), index.clone());
        let cmd = register("CC0001");
        let product_id = cmd.product_id;
        service
            .register_product(cmd.clone(), EventContext::new())
            .await
            .unwrap();

        let result = service.register_product(cmd, EventContext::new()).await;

        assert!(matches!(
            result,
            Err(DomainError::Product(ProductError::AlreadyRegistered))
        ));
        assert_eq!(
            index.find(&Sku::parse("CC0001").unwrap()).await,
            Some(product_id)
        );
    }

    #[tokio::test]
    async fn test_failed_append_releases_sku() {
        let store = InMemoryEventStore::new();
        let index = InMemorySkuIndex::new();
        let service = ProductService::new(store.clone(), index.clone());
        store.fail_after(0).await;

        let result = service
            .register_product(register("CC0001"), EventContext::new())
            .await;

        assert!(matches!(result, Err(DomainError::EventStore(_))));
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_missing_product_is_not_found() {
        let service = ProductService::new(InMemoryEventStore::new(), InMemorySkuIndex::new());

        assert!(matches!(
            service.get_product(ProductId::new()).await,
            Err(DomainError::NotFound {
                aggregate_type: "Product",
                ..
            })
        ));
    }
}
