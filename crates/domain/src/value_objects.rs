//! Value objects shared by the sample modules.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a shopping client.
    ClientId
);

id_type!(
    /// Unique identifier for an order a package is shipped for.
    OrderId
);

id_type!(
    /// Unique identifier for a product.
    ProductId
);

/// Money amount represented in cents to avoid floating point issues.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        self.cents > 0
    }

    /// Multiplies by a quantity, saturating at the `i64` bounds.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents.saturating_mul(i64::from(quantity)),
        }
    }

    /// Multiplies by a quantity, returning None on overflow.
    pub fn checked_multiply(&self, quantity: u32) -> Option<Money> {
        self.cents
            .checked_mul(i64::from(quantity))
            .map(Money::from_cents)
    }

    /// Adds two amounts, returning None on overflow.
    pub fn checked_add(&self, other: Money) -> Option<Money> {
        self.cents.checked_add(other.cents).map(Money::from_cents)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.cents < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}${}.{:02}",
            (self.cents / 100).abs(),
            self.cents.abs() % 100
        )
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A quantity of one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductItem {
    /// The product.
    pub product_id: ProductId,

    /// How many units.
    pub quantity: u32,
}

impl ProductItem {
    /// Creates a new product item.
    pub fn new(product_id: ProductId, quantity: u32) -> Self {
        Self {
            product_id,
            quantity,
        }
    }
}

/// A product item with the unit price it was added at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedProductItem {
    /// The product.
    pub product_id: ProductId,

    /// How many units.
    pub quantity: u32,

    /// Price per unit.
    pub unit_price: Money,
}

impl PricedProductItem {
    /// Creates a new priced product item.
    pub fn new(product_id: ProductId, quantity: u32, unit_price: Money) -> Self {
        Self {
            product_id,
            quantity,
            unit_price,
        }
    }

    /// Returns the total price for this item (quantity * unit_price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }

    /// Returns true if both items are for the same product at the same price.
    pub fn matches(&self, other: &PricedProductItem) -> bool {
        self.product_id == other.product_id && self.unit_price == other.unit_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_keep_their_uuid() {
        assert_ne!(ClientId::new(), ClientId::new());

        let uuid = Uuid::new_v4();
        assert_eq!(ProductId::from_uuid(uuid).as_uuid(), uuid);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(1234).to_string(), "$12.34");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(-1234).to_string(), "-$12.34");
    }

    #[test]
    fn money_sums_item_totals() {
        let items = [
            PricedProductItem::new(ProductId::new(), 3, Money::from_cents(1000)),
            PricedProductItem::new(ProductId::new(), 1, Money::from_cents(250)),
        ];

        let total: Money = items.iter().map(PricedProductItem::total_price).sum();
        assert_eq!(total, Money::from_cents(3250));
    }

    #[test]
    fn money_arithmetic_does_not_overflow() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max.checked_multiply(2), None);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(max.multiply(u32::MAX), max);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(
            Money::from_cents(3).checked_multiply(4),
            Some(Money::from_cents(12))
        );
    }

    #[test]
    fn priced_items_match_on_product_and_price() {
        let product = ProductId::new();
        let a = PricedProductItem::new(product, 1, Money::from_cents(100));
        let b = PricedProductItem::new(product, 5, Money::from_cents(100));
        let c = PricedProductItem::new(product, 1, Money::from_cents(120));

        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }
}
