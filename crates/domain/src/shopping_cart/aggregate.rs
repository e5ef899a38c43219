//! Shopping cart aggregate implementation.

use common::StreamId;
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::value_objects::{ClientId, Money, PricedProductItem, ProductId};

use super::{CartError, ShoppingCartEvent, ShoppingCartStatus};

/// Shopping cart aggregate root.
///
/// Product lines are kept in the order they were first added; adding the
/// same product at the same price again increases that line's quantity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingCart {
    id: Option<StreamId>,
    client_id: Option<ClientId>,
    status: ShoppingCartStatus,
    product_items: Vec<PricedProductItem>,
    version: Version,
}

impl Aggregate for ShoppingCart {
    type Event = ShoppingCartEvent;
    type Error = CartError;

    fn aggregate_type() -> &'static str {
        "ShoppingCart"
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
            ShoppingCartEvent::ShoppingCartOpened(data) => {
                self.id = Some(data.cart_id);
                self.client_id = Some(data.client_id);
                self.status = ShoppingCartStatus::Pending;
            }
            ShoppingCartEvent::ProductAdded(data) => self.apply_product_added(data.product_item),
            ShoppingCartEvent::ProductRemoved(data) => {
                self.apply_product_removed(data.product_item)
            }
            ShoppingCartEvent::ShoppingCartConfirmed(_) => {
                self.status = ShoppingCartStatus::Confirmed;
            }
            ShoppingCartEvent::ShoppingCartCanceled(_) => {
                self.status = ShoppingCartStatus::Canceled;
            }
        }
    }
}

// Query methods
impl ShoppingCart {
    /// Returns the client who owns the cart.
    pub fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Returns the current status.
    pub fn status(&self) -> ShoppingCartStatus {
        self.status
    }

    /// Returns the product lines in the cart.
    pub fn product_items(&self) -> &[PricedProductItem] {
        &self.product_items
    }

    /// Returns the total quantity of a product across all its price lines.
    pub fn quantity_of(&self, product_id: ProductId) -> u32 {
        self.product_items
            .iter()
            .filter(|item| item.product_id == product_id)
            .fold(0u32, |total, item| total.saturating_add(item.quantity))
    }

    /// Returns the total amount.
    pub fn total_amount(&self) -> Money {
        self.product_items
            .iter()
            .map(PricedProductItem::total_price)
            .sum()
    }
}

// Command methods (return events)
impl ShoppingCart {
    /// Opens a new cart for a client.
    pub fn open(
        &self,
        cart_id: StreamId,
        client_id: ClientId,
    ) -> Result<Vec<ShoppingCartEvent>, CartError> {
        if self.id.is_some() {
            return Err(CartError::AlreadyOpened);
        }

        Ok(vec![ShoppingCartEvent::opened(cart_id, client_id)])
    }

    /// Adds a product to the cart.
    pub fn add_product(
        &self,
        product_item: PricedProductItem,
    ) -> Result<Vec<ShoppingCartEvent>, CartError> {
        let cart_id = self.ensure_pending("add product to")?;

        if product_item.quantity == 0 {
            return Err(CartError::InvalidQuantity {
                quantity: product_item.quantity,
            });
        }

        if !product_item.unit_price.is_positive() {
            return Err(CartError::InvalidPrice {
                price: product_item.unit_price,
            });
        }

        self.ensure_within_limits(product_item)?;

        Ok(vec![ShoppingCartEvent::product_added(cart_id, product_item)])
    }

    /// Removes some units of a product line from the cart.
    pub fn remove_product(
        &self,
        product_item: PricedProductItem,
    ) -> Result<Vec<ShoppingCartEvent>, CartError> {
        let cart_id = self.ensure_pending("remove product from")?;

        if product_item.quantity == 0 {
            return Err(CartError::InvalidQuantity {
                quantity: product_item.quantity,
            });
        }

        let available = self
            .product_items
            .iter()
            .find(|item| item.matches(&product_item))
            .map(|item| item.quantity)
            .unwrap_or(0);

        if available < product_item.quantity {
            return Err(CartError::NotEnoughProduct {
                product_id: product_item.product_id,
                requested: product_item.quantity,
                available,
            });
        }

        Ok(vec![ShoppingCartEvent::product_removed(cart_id, product_item)])
    }

    /// Confirms the cart.
    pub fn confirm(&self) -> Result<Vec<ShoppingCartEvent>, CartError> {
        let cart_id = self.ensure_pending("confirm")?;
        Ok(vec![ShoppingCartEvent::confirmed(cart_id)])
    }

    /// Cancels the cart.
    pub fn cancel(&self) -> Result<Vec<ShoppingCartEvent>, CartError> {
        let cart_id = self.ensure_pending("cancel")?;
        Ok(vec![ShoppingCartEvent::canceled(cart_id)])
    }

    /// Checks that the cart still fits its numeric types once `added` is in.
    ///
    /// Every stored `ProductAdded` has passed this check, so applying it
    /// cannot overflow.
    fn ensure_within_limits(&self, added: PricedProductItem) -> Result<(), CartError> {
        let line_quantity = match self.product_items.iter().find(|item| item.matches(&added)) {
            Some(existing) => existing.quantity.checked_add(added.quantity),
            None => Some(added.quantity),
        };

        let cart_total = line_quantity
            .and_then(|quantity| added.unit_price.checked_multiply(quantity))
            .and_then(|line_total| {
                self.product_items
                    .iter()
                    .filter(|item| !item.matches(&added))
                    .try_fold(line_total, |total, item| {
                        item.unit_price
                            .checked_multiply(item.quantity)
                            .and_then(|price| total.checked_add(price))
                    })
            });

        match cart_total {
            Some(_) => Ok(()),
            None => Err(CartError::LimitExceeded {
                product_id: added.product_id,
                quantity: added.quantity,
            }),
        }
    }

    fn ensure_pending(&self, action: &'static str) -> Result<StreamId, CartError> {
        let Some(cart_id) = self.id else {
            return Err(CartError::NotOpened);
        };

        if !self.status.is_pending() {
            return Err(CartError::NotPending {
                status: self.status,
                action,
            });
        }

        Ok(cart_id)
    }
}

// Event application helpers
impl ShoppingCart {
    fn apply_product_added(&mut self, added: PricedProductItem) {
        match self
            .product_items
            .iter_mut()
            .find(|item| item.matches(&added))
        {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(added.quantity);
            }
            None => self.product_items.push(added),
        }
    }

    fn apply_product_removed(&mut self, removed: PricedProductItem) {
        if let Some(index) = self
            .product_items
            .iter()
            .position(|item| item.matches(&removed))
        {
            let line = &mut self.product_items[index];
            line.quantity = line.quantity.saturating_sub(removed.quantity);
            if line.quantity == 0 {
                self.product_items.remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened() -> ShoppingCart {
        let mut cart = ShoppingCart::default();
        let events = cart.open(StreamId::new(), ClientId::new()).unwrap();
        cart.apply_events(events);
        cart
    }

    fn item(product_id: ProductId, quantity: u32) -> PricedProductItem {
        PricedProductItem::new(product_id, quantity, Money::from_cents(1000))
    }

    fn with(mut cart: ShoppingCart, events: Vec<ShoppingCartEvent>) -> ShoppingCart {
        cart.apply_events(events);
        cart
    }

    #[test]
    fn test_open_cart() {
        let cart = opened();
        assert!(cart.id().is_some());
        assert!(cart.client_id().is_some());
        assert_eq!(cart.status(), ShoppingCartStatus::Pending);
        assert_eq!(cart.version(), Version::first());
    }

    #[test]
    fn test_open_twice_fails() {
        let cart = opened();
        assert!(matches!(
            cart.open(StreamId::new(), ClientId::new()),
            Err(CartError::AlreadyOpened)
        ));
    }

    #[test]
    fn test_add_same_product_merges_lines() {
        let product = ProductId::new();
        let cart = opened();
        let cart = with(cart.clone(), cart.add_product(item(product, 2)).unwrap());
        let cart = with(cart.clone(), cart.add_product(item(product, 3)).unwrap());

        assert_eq!(cart.product_items().len(), 1);
        assert_eq!(cart.quantity_of(product), 5);
        assert_eq!(cart.total_amount(), Money::from_cents(5000));
    }

    #[test]
    fn test_add_invalid_items_fails() {
        let cart = opened();
        assert!(matches!(
            cart.add_product(item(ProductId::new(), 0)),
            Err(CartError::InvalidQuantity { quantity: 0 })
        ));
        assert!(matches!(
            cart.add_product(PricedProductItem::new(ProductId::new(), 1, Money::zero())),
            Err(CartError::InvalidPrice { .. })
        ));
    }

    #[test]
    fn test_add_beyond_line_quantity_limit_fails() {
        let product = ProductId::new();
        let unit = PricedProductItem::new(product, u32::MAX, Money::from_cents(1));
        let cart = opened();
        let cart = with(cart.clone(), cart.add_product(unit).unwrap());

        assert!(matches!(
            cart.add_product(PricedProductItem::new(product, 1, Money::from_cents(1))),
            Err(CartError::LimitExceeded { quantity: 1, .. })
        ));
        assert_eq!(cart.quantity_of(product), u32::MAX);

        // A different price starts a new line, so it is still accepted.
        assert!(
            cart.add_product(PricedProductItem::new(product, 1, Money::from_cents(2)))
                .is_ok()
        );
    }

    #[test]
    fn test_add_beyond_amount_limit_fails() {
        let cart = opened();
        let expensive = PricedProductItem::new(ProductId::new(), 2, Money::from_cents(i64::MAX / 2));
        let cart = with(cart.clone(), cart.add_product(expensive).unwrap());

        assert!(matches!(
            cart.add_product(PricedProductItem::new(ProductId::new(), 1, Money::from_cents(10))),
            Err(CartError::LimitExceeded { .. })
        ));
        assert!(matches!(
            opened().add_product(PricedProductItem::new(
                ProductId::new(),
                3,
                Money::from_cents(i64::MAX / 2)
            )),
            Err(CartError::LimitExceeded { quantity: 3, .. })
        ));
    }

    #[test]
    fn test_remove_product() {
        let product = ProductId::new();
        let cart = opened();
        let cart = with(cart.clone(), cart.add_product(item(product, 3)).unwrap());

        let partly = with(cart.clone(), cart.remove_product(item(product, 1)).unwrap());
        assert_eq!(partly.quantity_of(product), 2);

        let emptied = with(cart.clone(), cart.remove_product(item(product, 3)).unwrap());
        assert!(emptied.product_items().is_empty());
    }

    #[test]
    fn test_remove_more_than_present_fails() {
        let product = ProductId::new();
        let cart = opened();
        let cart = with(cart.clone(), cart.add_product(item(product, 2)).unwrap());

        assert!(matches!(
            cart.remove_product(item(product, 3)),
            Err(CartError::NotEnoughProduct {
                requested: 3,
                available: 2,
                ..
            })
        ));
        assert!(matches!(
            cart.remove_product(item(ProductId::new(), 1)),
            Err(CartError::NotEnoughProduct { available: 0, .. })
        ));
    }

    #[test]
    fn test_confirmed_cart_is_closed() {
        let cart = opened();
        let cart = with(cart.clone(), cart.confirm().unwrap());

        assert_eq!(cart.status(), ShoppingCartStatus::Confirmed);
        assert!(matches!(
            cart.add_product(item(ProductId::new(), 1)),
            Err(CartError::NotPending {
                status: ShoppingCartStatus::Confirmed,
                ..
            })
        ));
        assert!(cart.cancel().is_err());
        assert!(cart.confirm().is_err());
    }

    #[test]
    fn test_canceled_cart_is_closed() {
        let cart = opened();
        let cart = with(cart.clone(), cart.cancel().unwrap());

        assert_eq!(cart.status(), ShoppingCartStatus::Canceled);
        assert!(cart.confirm().is_err());
    }

    #[test]
    fn test_unopened_cart_rejects_commands() {
        let cart = ShoppingCart::default();
        assert!(matches!(cart.confirm(), Err(CartError::NotOpened)));
        assert!(matches!(
            cart.add_product(item(ProductId::new(), 1)),
            Err(CartError::NotOpened)
        ));
    }
}
