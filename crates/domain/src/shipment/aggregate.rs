//! Package aggregate implementation.

use chrono::{DateTime, Utc};
use common::StreamId;
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::value_objects::{OrderId, ProductItem};

use super::{PackageError, PackageEvent};

/// Package aggregate root.
///
/// A package is created by being sent and closed by being delivered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Package {
    id: Option<StreamId>,
    order_id: Option<OrderId>,
    product_items: Vec<ProductItem>,
    sent_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    version: Version,
}

impl Aggregate for Package {
    type Event = PackageEvent;
    type Error = PackageError;

    fn aggregate_type() -> &'static str {
        "Package"
    }

    fn id(&self) -> Option<StreamId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            PackageEvent::PackageWasSent(data) => {
                self.id = Some(data.package_id);
                self.order_id = Some(data.order_id);
                self.product_items = data.product_items;
                self.sent_at = Some(data.sent_at);
            }
            PackageEvent::PackageWasDelivered(data) => {
                self.delivered_at = Some(data.delivered_at);
            }
        }
    }
}

// Query methods
impl Package {
    /// Returns the order this package ships.
    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    /// Returns the shipped product items.
    pub fn product_items(&self) -> &[ProductItem] {
        &self.product_items
    }

    /// Returns when the package was sent.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.sent_at
    }

    /// Returns when the package was delivered.
    pub fn delivered_at(&self) -> Option<DateTime<Utc>> {
        self.delivered_at
    }

    /// Returns true once the package reached the client.
    pub fn is_delivered(&self) -> bool {
        self.delivered_at.is_some()
    }

    /// Checks that a shipment request has at least one item and only
    /// positive quantities.
    pub fn validate_items(product_items: &[ProductItem]) -> Result<(), PackageError> {
        if product_items.is_empty() {
            return Err(PackageError::NoProductItems);
        }

        if let Some(item) = product_items.iter().find(|item| item.quantity == 0) {
            return Err(PackageError::InvalidQuantity {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        Ok(())
    }
}

// Command methods (return events)
impl Package {
    /// Sends a package with the given items.
    ///
    /// Stock availability is checked by the caller before this runs.
    pub fn send(
        &self,
        package_id: StreamId,
        order_id: OrderId,
        product_items: Vec<ProductItem>,
    ) -> Result<Vec<PackageEvent>, PackageError> {
        if self.sent_at.is_some() {
            return Err(PackageError::AlreadySent);
        }

        Self::validate_items(&product_items)?;

        Ok(vec![PackageEvent::sent(package_id, order_id, product_items)])
    }

    /// Marks the package as delivered.
    pub fn deliver(&self) -> Result<Vec<PackageEvent>, PackageError> {
        let package_id = self.id.ok_or(PackageError::NotSent)?;

        if self.is_delivered() {
            return Err(PackageError::AlreadyDelivered);
        }

        Ok(vec![PackageEvent::delivered(package_id)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::ProductId;

    fn sent_package() -> Package {
        let package = Package::default();
        let events = package
            .send(
                StreamId::new(),
                OrderId::new(),
                vec![ProductItem::new(ProductId::new(), 2)],
            )
            .unwrap();
        Package::replay(events)
    }

    #[test]
    fn send_records_items() {
        let package = sent_package();

        assert!(package.id().is_some());
        assert!(package.sent_at().is_some());
        assert_eq!(package.product_items().len(), 1);
        assert!(!package.is_delivered());
        assert_eq!(package.version(), Version::first());
    }

    #[test]
    fn send_requires_items() {
        let result = Package::default().send(StreamId::new(), OrderId::new(), vec![]);
        assert!(matches!(result, Err(PackageError::NoProductItems)));
    }

    #[test]
    fn send_rejects_zero_quantity() {
        let result = Package::default().send(
            StreamId::new(),
            OrderId::new(),
            vec![ProductItem::new(ProductId::new(), 0)],
        );
        assert!(matches!(result, Err(PackageError::InvalidQuantity { .. })));
    }

    #[test]
    fn cannot_send_twice() {
        let package = sent_package();
        let result = package.send(
            StreamId::new(),
            OrderId::new(),
            vec![ProductItem::new(ProductId::new(), 1)],
        );
        assert!(matches!(result, Err(PackageError::AlreadySent)));
    }

    #[test]
    fn deliver_once() {
        let mut package = sent_package();
        package.apply_events(package.deliver().unwrap());

        assert!(package.is_delivered());
        assert_eq!(package.version(), Version::new(2));
        assert!(matches!(
            package.deliver(),
            Err(PackageError::AlreadyDelivered)
        ));
    }

    #[test]
    fn cannot_deliver_unsent_package() {
        assert!(matches!(
            Package::default().deliver(),
            Err(PackageError::NotSent)
        ));
    }
}
