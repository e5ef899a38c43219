//! Shopping cart domain events.

use chrono::{DateTime, Utc};
use common::StreamId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::{ClientId, PricedProductItem};

/// Events that can occur on a shopping cart aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ShoppingCartEvent {
    /// Cart was opened for a client.
    ShoppingCartOpened(ShoppingCartOpenedData),

    /// Product was added to the cart.
    ProductAdded(ProductAddedData),

    /// Product was removed from the cart.
    ProductRemoved(ProductRemovedData),

    /// Cart was confirmed.
    ShoppingCartConfirmed(ShoppingCartConfirmedData),

    /// Cart was canceled.
    ShoppingCartCanceled(ShoppingCartCanceledData),
}

impl DomainEvent for ShoppingCartEvent {
    const EVENT_TYPES: &'static [&'static str] = &[
        "ShoppingCartOpened",
        "ProductAdded",
        "ProductRemoved",
        "ShoppingCartConfirmed",
        "ShoppingCartCanceled",
    ];

    fn event_type(&self) -> &'static str {
        match self {
            ShoppingCartEvent::ShoppingCartOpened(_) => "ShoppingCartOpened",
            ShoppingCartEvent::ProductAdded(_) => "ProductAdded",
            ShoppingCartEvent::ProductRemoved(_) => "ProductRemoved",
            ShoppingCartEvent::ShoppingCartConfirmed(_) => "ShoppingCartConfirmed",
            ShoppingCartEvent::ShoppingCartCanceled(_) => "ShoppingCartCanceled",
        }
    }
}

/// Data for ShoppingCartOpened event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCartOpenedData {
    pub cart_id: StreamId,
    pub client_id: ClientId,
}

/// Data for ProductAdded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAddedData {
    pub cart_id: StreamId,
    pub product_item: PricedProductItem,
}

/// Data for ProductRemoved event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRemovedData {
    pub cart_id: StreamId,
    pub product_item: PricedProductItem,
}

/// Data for ShoppingCartConfirmed event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCartConfirmedData {
    pub cart_id: StreamId,

    /// When the client confirmed the cart.
    pub confirmed_at: DateTime<Utc>,
}

/// Data for ShoppingCartCanceled event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingCartCanceledData {
    pub cart_id: StreamId,

    /// When the cart was canceled.
    pub canceled_at: DateTime<Utc>,
}

// Convenience constructors for events
impl ShoppingCartEvent {
    /// Creates a ShoppingCartOpened event.
    pub fn opened(cart_id: StreamId, client_id: ClientId) -> Self {
        ShoppingCartEvent::ShoppingCartOpened(ShoppingCartOpenedData { cart_id, client_id })
    }

    /// Creates a ProductAdded event.
    pub fn product_added(cart_id: StreamId, product_item: PricedProductItem) -> Self {
        ShoppingCartEvent::ProductAdded(ProductAddedData {
            cart_id,
            product_item,
        })
    }

    /// Creates a ProductRemoved event.
    pub fn product_removed(cart_id: StreamId, product_item: PricedProductItem) -> Self {
        ShoppingCartEvent::ProductRemoved(ProductRemovedData {
            cart_id,
            product_item,
        })
    }

    /// Creates a ShoppingCartConfirmed event stamped with the current time.
    pub fn confirmed(cart_id: StreamId) -> Self {
        ShoppingCartEvent::ShoppingCartConfirmed(ShoppingCartConfirmedData {
            cart_id,
            confirmed_at: Utc::now(),
        })
    }

    /// Creates a ShoppingCartCanceled event stamped with the current time.
    pub fn canceled(cart_id: StreamId) -> Self {
        ShoppingCartEvent::ShoppingCartCanceled(ShoppingCartCanceledData {
            cart_id,
            canceled_at: Utc::now(),
        })
    }
}
