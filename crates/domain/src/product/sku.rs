//! Stock keeping unit.

use serde::{Deserialize, Serialize};

use super::ProductError;

const MIN_LETTERS: usize = 2;
const MAX_LETTERS: usize = 4;
const MIN_DIGITS: usize = 4;
const MAX_DIGITS: usize = 18;

/// A validated SKU: 2 to 4 uppercase ASCII letters then 4 to 18 digits,
/// for example `CC0001`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sku(String);

impl Sku {
    /// Parses and validates a SKU.
    pub fn parse(value: &str) -> Result<Self, ProductError> {
        let letters = value
            .bytes()
            .take_while(|b| b.is_ascii_uppercase())
            .count();
        let digits = &value[letters..];

        let valid = (MIN_LETTERS..=MAX_LETTERS).contains(&letters)
            && (MIN_DIGITS..=MAX_DIGITS).contains(&digits.len())
            && digits.bytes().all(|b| b.is_ascii_digit());

        if valid {
            Ok(Self(value.to_string()))
        } else {
            Err(ProductError::InvalidSku {
                sku: value.to_string(),
            })
        }
    }

    /// Returns the SKU text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sku {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Sku {
    type Err = ProductError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_skus() {
        for sku in ["CC0001", "ABCD123456789012345678", "AB1234"] {
            assert_eq!(Sku::parse(sku).unwrap().as_str(), sku);
        }
    }

    #[test]
    fn rejects_malformed_skus() {
        for sku in [
            "",
            "C0001",
            "ABCDE0001",
            "cc0001",
            "CC001",
            "CC0000000000000000001",
            "CC00A1",
            "0001CC",
            "CÇ0001",
        ] {
            assert!(
                matches!(Sku::parse(sku), Err(ProductError::InvalidSku { .. })),
                "{sku} should be rejected"
            );
        }
    }
}
