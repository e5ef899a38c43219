//! Product aggregate implementation.

use common::StreamId;
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::value_objects::ProductId;

use super::{ProductError, ProductEvent, RegisterProduct, Sku};

/// Product aggregate root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    id: Option<ProductId>,
    sku: Option<Sku>,
    name: String,
    description: Option<String>,
    version: Version,
}

impl Aggregate for Product {
    type Event = ProductEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> Option<StreamId> {
        self.id.map(|id| StreamId::from_uuid(id.as_uuid()))
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            ProductEvent::ProductRegistered(data) => {
                self.id = Some(data.product_id);
                self.sku = Some(data.sku);
                self.name = data.name;
                self.description = data.description;
            }
        }
    }
}

impl Product {
    /// Returns the product identifier.
    pub fn product_id(&self) -> Option<ProductId> {
        self.id
    }

    /// Returns the SKU.
    pub fn sku(&self) -> Option<&Sku> {
        self.sku.as_ref()
    }

    /// Returns the product name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Registers the product described by `cmd`.
    pub fn register(&self, cmd: &RegisterProduct) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_some() {
            return Err(ProductError::AlreadyRegistered);
        }

        Ok(vec![ProductEvent::registered(
            cmd.product_id,
            cmd.sku.clone(),
            cmd.name.clone(),
            cmd.description.clone(),
        )])
    }
}
