//! Product availability collaborator.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::value_objects::{ProductId, ProductItem};

/// Answers whether the warehouse holds enough stock for a shipment.
#[async_trait]
pub trait ProductAvailability: Send + Sync {
    /// Returns true if every item can be fulfilled from current stock.
    async fn is_enough_of(&self, items: &[ProductItem]) -> bool;
}

/// In-memory stock levels for testing and the sample binary.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductAvailability {
    stock: Arc<RwLock<HashMap<ProductId, u32>>>,
}

impl InMemoryProductAvailability {
    /// Creates an empty stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the stock level of a product.
    pub async fn set_stock(&self, product_id: ProductId, quantity: u32) {
        self.stock.write().await.insert(product_id, quantity);
    }

    /// Returns the stock level of a product.
    pub async fn stock_of(&self, product_id: ProductId) -> u32 {
        self.stock.read().await.get(&product_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ProductAvailability for InMemoryProductAvailability {
    async fn is_enough_of(&self, items: &[ProductItem]) -> bool {
        let stock = self.stock.read().await;

        // The same product may appear on several lines.
        let mut requested: HashMap<ProductId, u32> = HashMap::new();
        for item in items {
            *requested.entry(item.product_id).or_default() += item.quantity;
        }

        requested
            .iter()
            .all(|(product_id, quantity)| stock.get(product_id).copied().unwrap_or(0) >= *quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn checks_stock_per_product() {
        let availability = InMemoryProductAvailability::new();
        let product = ProductId::new();
        availability.set_stock(product, 5).await;

        assert!(availability.is_enough_of(&[ProductItem::new(product, 5)]).await);
        assert!(!availability.is_enough_of(&[ProductItem::new(product, 6)]).await);
        assert!(
            !availability
                .is_enough_of(&[ProductItem::new(ProductId::new(), 1)])
                .await
        );
    }

    #[tokio::test]
    async fn sums_repeated_lines() {
        let availability = InMemoryProductAvailability::new();
        let product = ProductId::new();
        availability.set_stock(product, 4).await;

        let items = [ProductItem::new(product, 3), ProductItem::new(product, 2)];
        assert!(!availability.is_enough_of(&items).await);
        assert_eq!(availability.stock_of(product).await, 4);
    }
}
