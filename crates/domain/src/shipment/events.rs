//! Package domain events.

use chrono::{DateTime, Utc};
use common::StreamId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{OrderId, ProductItem};

/// Events that can occur on a package aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PackageEvent {
    /// Package left the warehouse.
    PackageWasSent(PackageWasSentData),

    /// Package reached the client.
    PackageWasDelivered(PackageWasDeliveredData),
}

impl DomainEvent for PackageEvent {
    const EVENT_TYPES: &'static [&'static str] = &["PackageWasSent", "PackageWasDelivered"];

    fn event_type(&self) -> &'static str {
        match self {
            PackageEvent::PackageWasSent(_) => "PackageWasSent",
            PackageEvent::PackageWasDelivered(_) => "PackageWasDelivered",
        }
    }
}

/// Data for PackageWasSent event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageWasSentData {
    pub package_id: StreamId,
    pub order_id: OrderId,
    pub product_items: Vec<ProductItem>,
    pub sent_at: DateTime<Utc>,
}

/// Data for PackageWasDelivered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageWasDeliveredData {
    pub package_id: StreamId,
    pub delivered_at: DateTime<Utc>,
}

impl PackageEvent {
    /// Creates a PackageWasSent event stamped with the current time.
    pub fn sent(package_id: StreamId, order_id: OrderId, product_items: Vec<ProductItem>) -> Self {
        PackageEvent::PackageWasSent(PackageWasSentData {
            package_id,
            order_id,
            product_items,
            sent_at: Utc::now(),
        })
    }

    /// Creates a PackageWasDelivered event stamped with the current time.
    pub fn delivered(package_id: StreamId) -> Self {
        PackageEvent::PackageWasDelivered(PackageWasDeliveredData {
            package_id,
            delivered_at: Utc::now(),
        })
    }
}
