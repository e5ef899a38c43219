//! Product commands.

use common::StreamId;
use uuid::Uuid;

use crate::command::Command;
use crate::value_objects::ProductId;

use super::{Product, ProductError, Sku};

/// Command to register a product in the catalogue.
///
/// Build it with [`RegisterProduct::with`] from unchecked input.
#[derive(Debug, Clone)]
pub struct RegisterProduct {
    pub product_id: ProductId,
    pub sku: Sku,
    pub name: String,
    pub description: Option<String>,
}

impl RegisterProduct {
    /// Validates raw request fields into a command.
    pub fn with(
        id: Option<Uuid>,
        sku: Option<&str>,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, ProductError> {
        let product_id = match id {
            Some(id) if !id.is_nil() => ProductId::from_uuid(id),
            _ => return Err(ProductError::InvalidId),
        };

        let sku = Sku::parse(sku.unwrap_or_default())?;

        let name = match name {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(ProductError::NameRequired),
        };

        if description == Some("") {
            return Err(ProductError::EmptyDescription);
        }

        Ok(Self {
            product_id,
            sku,
            name,
            description: description.map(str::to_string),
        })
    }
}

impl Command for RegisterProduct {
    type Aggregate = Product;

    /// Product streams are keyed by the product id.
    fn stream_id(&self) -> StreamId {
        StreamId::from_uuid(self.product_id.as_uuid())
    }
}
