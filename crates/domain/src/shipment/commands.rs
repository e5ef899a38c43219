//! Package commands.

use common::StreamId;

use crate::command::Command;
use crate::value_objects::{OrderId, ProductItem};

use super::Package;

/// Command to send a package for an order.
#[derive(Debug, Clone)]
pub struct SendPackage {
    pub package_id: StreamId,
    pub order_id: OrderId,
    pub product_items: Vec<ProductItem>,
}

impl SendPackage {
    /// Creates a new SendPackage command.
    pub fn new(package_id: StreamId, order_id: OrderId, product_items: Vec<ProductItem>) -> Self {
        Self {
            package_id,
            order_id,
            product_items,
        }
    }

    /// Creates a SendPackage command with a generated package ID.
    pub fn for_order(order_id: OrderId, product_items: Vec<ProductItem>) -> Self {
        Self::new(StreamId::new(), order_id, product_items)
    }
}

impl Command for SendPackage {
    type Aggregate = Package;

    fn stream_id(&self) -> StreamId {
        self.package_id
    }
}

/// Command to mark a package as delivered.
#[derive(Debug, Clone)]
pub struct DeliverPackage {
    pub package_id: StreamId,
}

impl DeliverPackage {
    /// Creates a new DeliverPackage command.
    pub fn new(package_id: StreamId) -> Self {
        Self { package_id }
    }
}

impl Command for DeliverPackage {
    type Aggregate = Package;

    fn stream_id(&self) -> StreamId {
        self.package_id
    }
}
