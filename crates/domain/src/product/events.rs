//! Product domain events.

use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::ProductId;

use super::Sku;

/// Events that can occur on a product aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ProductEvent {
    /// Product was added to the catalogue.
    ProductRegistered(ProductRegisteredData),
}

impl DomainEvent for ProductEvent {
    const EVENT_TYPES: &'static [&'static str] = &["ProductRegistered"];

    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductRegistered(_) => "ProductRegistered",
        }
    }
}

/// Data for ProductRegistered event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRegisteredData {
    pub product_id: ProductId,
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
}

impl ProductEvent {
    /// Creates a ProductRegistered event.
    pub fn registered(
        product_id: ProductId,
        sku: Sku,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        ProductEvent::ProductRegistered(ProductRegisteredData {
            product_id,
            sku,
            name: name.into(),
            description,
        })
    }
}
