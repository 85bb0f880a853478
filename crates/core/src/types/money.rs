//! Decimal money helpers.
//!
//! The backend sends prices as JSON numbers; they are held as
//! [`rust_decimal::Decimal`] so totals never pick up binary floating point
//! error. Payment intents are denominated in minor units (cents).

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors converting a decimal amount to minor units.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    /// Amount does not fit in an `i64` number of minor units.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),
    /// Amount is negative.
    #[error("amount {0} is negative")]
    Negative(Decimal),
}

/// ISO 4217 currency codes accepted by the payment endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    EUR,
    USD,
    GBP,
}

impl CurrencyCode {
    /// Display symbol for the currency.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::EUR => "€",
            Self::USD => "$",
            Self::GBP => "£",
        }
    }

    /// Three-letter code as sent on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EUR => "EUR",
            Self::USD => "USD",
            Self::GBP => "GBP",
        }
    }

    /// Format an amount with two decimals and the currency symbol.
    #[must_use]
    pub fn format(self, amount: Decimal) -> String {
        format!("{}{:.2}", self.symbol(), amount)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Self::EUR),
            "USD" => Ok(Self::USD),
            "GBP" => Ok(Self::GBP),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// Convert a decimal amount into minor units, rounding half away from zero.
///
/// ```
/// use bookbarn_core::to_minor_units;
/// use rust_decimal::Decimal;
///
/// assert_eq!(to_minor_units(Decimal::new(1998, 2)).unwrap(), 1998);
/// assert_eq!(to_minor_units(Decimal::new(10005, 3)).unwrap(), 1001);
/// ```
///
/// # Errors
///
/// Returns [`MoneyError::Negative`] for negative amounts and
/// [`MoneyError::OutOfRange`] if the result overflows `i64`.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(MoneyError::Negative(amount));
    }
    let cents = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or(MoneyError::OutOfRange(amount))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    i64::try_from(cents).map_err(|_| MoneyError::OutOfRange(amount))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_minor_units_rounding() {
        assert_eq!(to_minor_units(Decimal::ZERO).unwrap(), 0);
        assert_eq!(to_minor_units(Decimal::new(999, 2)).unwrap(), 999);
        assert_eq!(to_minor_units(Decimal::new(12_345, 3)).unwrap(), 1235);
    }

    #[test]
    fn test_minor_units_negative() {
        assert!(matches!(
            to_minor_units(Decimal::new(-1, 0)),
            Err(MoneyError::Negative(_))
        ));
    }

    #[test]
    fn test_currency_format_and_parse() {
        assert_eq!(CurrencyCode::EUR.format(Decimal::new(1998, 2)), "€19.98");
        assert_eq!("usd".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert!("JPY".parse::<CurrencyCode>().is_err());
    }
}
