//! Package service coordinating stock checks and package streams.

use common::StreamId;
use event_store::{EventContext, EventStore};
use publisher::PublisherBridge;

use crate::command::{Command, CommandHandler, CommandResult};
use crate::error::DomainError;

use super::{DeliverPackage, Package, PackageError, ProductAvailability, SendPackage};

impl From<PackageError> for DomainError {
    fn from(e: PackageError) -> Self {
        DomainError::Package(e)
    }
}

/// Service for sending and delivering packages.
///
/// Generic over the availability collaborator so tests can script stock levels.
pub struct PackageService<S, P>
where
    S: EventStore,
    P: ProductAvailability,
{
    handler: CommandHandler<S, Package>,
    availability: P,
}

impl<S, P> PackageService<S, P>
where
    S: EventStore,
    P: ProductAvailability,
{
    /// Creates a new package service.
    pub fn new(store: S, availability: P) -> Self {
        Self {
            handler: CommandHandler::new(store),
            availability,
        }
    }

    /// Publishes committed package events through `publisher`.
    pub fn with_publisher(self, publisher: PublisherBridge) -> Self {
        Self {
            handler: self.handler.with_publisher(publisher),
            ..self
        }
    }

    /// Returns a reference to the underlying command handler.
    pub fn handler(&self) -> &CommandHandler<S, Package> {
        &self.handler
    }

    /// Sends a package if every item is in stock.
    ///
    /// An out-of-stock request is rejected and nothing is written.
    #[tracing::instrument(skip(self, context), fields(package_id = %cmd.package_id))]
    pub async fn send_package(
        &self,
        cmd: SendPackage,
        context: EventContext,
    ) -> Result<CommandResult<Package>, DomainError> {
        Package::validate_items(&cmd.product_items)?;

        if !self.availability.is_enough_of(&cmd.product_items).await {
            metrics::counter!("domain_packages_out_of_stock").increment(1);
            tracing::warn!(order_id = %cmd.order_id, "product was out of stock");
            return Err(PackageError::OutOfStock {
                order_id: cmd.order_id,
            }
            .into());
        }

        let package_id = cmd.stream_id();
        let SendPackage {
            order_id,
            product_items,
            ..
        } = cmd;

        self.handler
            .execute(package_id, context, |package| {
                package.send(package_id, order_id, product_items)
            })
            .await
    }

    /// Marks a package as delivered.
    #[tracing::instrument(skip(self, context))]
    pub async fn deliver_package(
        &self,
        cmd: DeliverPackage,
        context: EventContext,
    ) -> Result<CommandResult<Package>, DomainError> {
        self.handler
            .execute(cmd.stream_id(), context, |package| package.deliver())
            .await
    }

    /// Loads a package by ID, failing with `NotFound` if it doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_package(&self, package_id: StreamId) -> Result<Package, DomainError> {
        self.handler.get(package_id).await
    }
}
