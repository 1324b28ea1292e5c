//! Product price using decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below [`Price::MIN`].
    #[error("price must be at least {min}")]
    BelowMinimum {
        /// Smallest accepted amount.
        min: Decimal,
    },
    /// The amount is above [`Price::MAX`].
    #[error("price must be at most {max}")]
    AboveMaximum {
        /// Largest accepted amount.
        max: Decimal,
    },
    /// The input is not a decimal number.
    #[error("price must be a number")]
    NotANumber,
}

/// A product price in the store's currency.
///
/// ## Constraints
///
/// - `0 <= amount <= 10000`
///
/// On the wire the price is a plain JSON number. Values received from the
/// server are trusted and not range-checked.
///
/// ```
/// use rust_decimal::Decimal;
/// use stockroom_core::Price;
///
/// assert!(Price::new(Decimal::new(1999, 2)).is_ok());
/// assert!(Price::new(Decimal::from(-1)).is_err());
/// assert!(Price::new(Decimal::from(10_001)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Smallest accepted price.
    pub const MIN: Decimal = Decimal::ZERO;
    /// Largest accepted price.
    pub const MAX: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

    /// Create a price, checking the accepted range.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::BelowMinimum` or `PriceError::AboveMaximum` when
    /// the amount is outside `[0, 10000]`.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Self::MIN {
            return Err(PriceError::BelowMinimum { min: Self::MIN });
        }
        if amount > Self::MAX {
            return Err(PriceError::AboveMaximum { max: Self::MAX });
        }
        Ok(Self(amount))
    }

    /// Parse a price from user input.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::NotANumber` when the text is not a decimal, or a
    /// range error from [`Price::new`].
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl std::str::FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds_are_inclusive() {
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(Decimal::from(10_000)).is_ok());
    }

    #[test]
    fn test_out_of_range() {
        assert!(matches!(
            Price::new(Decimal::from(-1)),
            Err(PriceError::BelowMinimum { .. })
        ));
        assert!(matches!(
            Price::new(Decimal::from(10_001)),
            Err(PriceError::AboveMaximum { .. })
        ));
    }

    #[test]
    fn test_parse_not_a_number() {
        assert_eq!(Price::parse("cheap"), Err(PriceError::NotANumber));
    }

    #[test]
    fn test_display_two_decimals() {
        let price = Price::parse("12.5").unwrap();
        assert_eq!(price.to_string(), "12.50");
    }

    #[test]
    fn test_json_number() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));

        let whole: Price = serde_json::from_str("20").unwrap();
        assert_eq!(whole.amount(), Decimal::from(20));

        let json = serde_json::to_string(&Price::parse("5").unwrap()).unwrap();
        assert_eq!(json, "5.0");
    }
}
