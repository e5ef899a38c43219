//! Shopping cart status.

use serde::{Deserialize, Serialize};

/// The state of a shopping cart in its lifecycle.
///
/// ```text
/// Pending ──┬──► Confirmed
///           └──► Canceled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ShoppingCartStatus {
    /// Products can be added and removed.
    #[default]
    Pending,

    /// The client confirmed the cart (terminal state).
    Confirmed,

    /// The cart was abandoned (terminal state).
    Canceled,
}

impl ShoppingCartStatus {
    /// Returns true if the cart can still change.
    pub fn is_pending(&self) -> bool {
        matches!(self, ShoppingCartStatus::Pending)
    }

    /// Returns true if this is a terminal state.
    pub fn is_closed(&self) -> bool {
        !self.is_pending()
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShoppingCartStatus::Pending => "Pending",
            ShoppingCartStatus::Confirmed => "Confirmed",
            ShoppingCartStatus::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for ShoppingCartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_is_open() {
        assert!(ShoppingCartStatus::default().is_pending());
        assert!(ShoppingCartStatus::Confirmed.is_closed());
        assert!(ShoppingCartStatus::Canceled.is_closed());
        assert_eq!(ShoppingCartStatus::Canceled.to_string(), "Canceled");
    }
}
