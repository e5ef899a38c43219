//! SKU uniqueness collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::value_objects::ProductId;

use super::Sku;

/// Tracks which product owns each SKU.
#[async_trait]
pub trait SkuIndex: Send + Sync {
    /// Returns the product holding `sku`, if any.
    async fn find(&self, sku: &Sku) -> Option<ProductId>;

    /// Claims `sku` for `product_id`.
    ///
    /// Returns false, leaving the index unchanged, if the SKU is already held.
    async fn reserve(&self, sku: &Sku, product_id: ProductId) -> bool;

    /// Drops a claim made by `product_id`. Claims by other products are kept.
    async fn release(&self, sku: &Sku, product_id: ProductId);
}

/// In-memory SKU index for testing and the sample binary.
#[derive(Debug, Clone, Default)]
pub struct InMemorySkuIndex {
    owners: Arc<RwLock<HashMap<Sku, ProductId>>>,
}

impl InMemorySkuIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of claimed SKUs.
    pub async fn len(&self) -> usize {
        self.owners.read().await.len()
    }

    /// Returns true if no SKU is claimed.
    pub async fn is_empty(&self) -> bool {
        self.owners.read().await.is_empty()
    }
}

#[async_trait]
impl SkuIndex for InMemorySkuIndex {
    async fn find(&self, sku: &Sku) -> Option<ProductId> {
        self.owners.read().await.get(sku).copied()
    }

    async fn reserve(&self, sku: &Sku, product_id: ProductId) -> bool {
        let mut owners = self.owners.write().await;
        if owners.contains_key(sku) {
            return false;
        }
        owners.insert(sku.clone(), product_id);
        true
    }

    async fn release(&self, sku: &Sku, product_id: ProductId) {
        let mut owners = self.owners.write().await;
        if owners.get(sku) == Some(&product_id) {
            owners.remove(sku);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_reservation_wins() {
        let index = InMemorySkuIndex::new();
        let sku = Sku::parse("CC0001").unwrap();
        let first = ProductId::new();

        assert!(index.reserve(&sku, first).await);
        assert!(!index.reserve(&sku, ProductId::new()).await);
        assert_eq!(index.find(&sku).await, Some(first));
    }

    #[tokio::test]
    async fn release_only_drops_own_claim() {
        let index = InMemorySkuIndex::new();
        let sku = Sku::parse("CC0001").unwrap();
        let owner = ProductId::new();
        index.reserve(&sku, owner).await;

        index.release(&sku, ProductId::new()).await;
        assert_eq!(index.len().await, 1);

        index.release(&sku, owner).await;
        assert!(index.is_empty().await);
    }
}
