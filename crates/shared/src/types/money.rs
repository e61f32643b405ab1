//! Money type with integer minor-unit arithmetic and currency tagging.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are stored as `i64` minor units (cents/centimes); derived
//! amounts (fees) are computed in `rust_decimal::Decimal` and rounded
//! half-up to the minor unit exactly once.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents a monetary amount with currency.
///
/// The amount is an integer count of the currency's minor unit.
/// Cross-currency arithmetic always fails; conversion is never implicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// The amount in the smallest currency unit (e.g., cents).
    pub minor: i64,
    /// ISO 4217 currency code.
    pub currency: Currency,
}

/// ISO 4217 currency codes supported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Canadian Dollar
    Cad,
    /// Haitian Gourde
    Htg,
}

/// Errors from money arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Arithmetic attempted across two different currencies.
    #[error("Currency mismatch: {left} vs {right}")]
    CurrencyMismatch {
        /// Currency of the left operand.
        left: Currency,
        /// Currency of the right operand.
        right: Currency,
    },

    /// The result does not fit in an `i64` minor-unit amount.
    #[error("Amount overflow")]
    Overflow,
}

impl Currency {
    /// Canonical number of decimal places for display.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::Usd | Self::Cad | Self::Htg => 2,
        }
    }

    /// Returns the ISO code as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Cad => "CAD",
            Self::Htg => "HTG",
        }
    }
}

impl Money {
    /// Creates a new Money instance from minor units.
    #[must_use]
    pub const fn new(minor: i64, currency: Currency) -> Self {
        Self { minor, currency }
    }

    /// Creates a zero amount in the specified currency.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self { minor: 0, currency }
    }

    /// Returns true if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.minor == 0
    }

    /// Returns true if the amount is negative.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.minor < 0
    }

    /// Adds two amounts of the same currency.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.require_same_currency(other)?;
        let minor = self
            .minor
            .checked_add(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(minor, self.currency))
    }

    /// Subtracts an amount of the same currency.
    pub fn checked_sub(self, other: Self) -> Result<Self, MoneyError> {
        self.require_same_currency(other)?;
        let minor = self
            .minor
            .checked_sub(other.minor)
            .ok_or(MoneyError::Overflow)?;
        Ok(Self::new(minor, self.currency))
    }

    /// Compares two amounts of the same currency.
    pub fn cmp_amount(&self, other: &Self) -> Result<std::cmp::Ordering, MoneyError> {
        self.require_same_currency(*other)?;
        Ok(self.minor.cmp(&other.minor))
    }

    /// Returns the amount as a `Decimal` in major units (e.g., dollars).
    #[must_use]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.minor, self.currency.decimal_places())
    }

    /// Renders the amount with its canonical decimal precision and
    /// currency code, e.g. `"1000.00 HTG"`.
    #[must_use]
    pub fn format_display(&self) -> String {
        format!("{} {}", self.to_decimal(), self.currency)
    }

    fn require_same_currency(self, other: Self) -> Result<(), MoneyError> {
        if self.currency == other.currency {
            Ok(())
        } else {
            Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            })
        }
    }
}

/// Rounds a minor-unit `Decimal` to an integer amount, half away from zero.
///
/// This is the single rounding point for derived amounts (fees); results
/// must never be re-rounded downstream.
pub fn round_minor(value: Decimal) -> Result<i64, MoneyError> {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(MoneyError::Overflow)
}

/// Projects a set of per-currency buckets onto a single display figure.
///
/// Returns the preferred bucket if it is non-zero, otherwise the non-zero
/// bucket with the largest absolute magnitude, otherwise `None`
/// ("no earnings").
#[must_use]
pub fn project_preferred(buckets: &[Money], preferred: Currency) -> Option<Money> {
    if let Some(hit) = buckets
        .iter()
        .find(|m| m.currency == preferred && !m.is_zero())
    {
        return Some(*hit);
    }
    buckets
        .iter()
        .filter(|m| !m.is_zero())
        .max_by_key(|m| m.minor.unsigned_abs())
        .copied()
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "CAD" => Ok(Self::Cad),
            "HTG" => Ok(Self::Htg),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_money_zero() {
        let money = Money::zero(Currency::Htg);
        assert!(money.is_zero());
        assert!(!money.is_negative());
        assert_eq!(money.currency, Currency::Htg);
    }

    #[test]
    fn test_checked_add_same_currency() {
        let a = Money::new(1500, Currency::Usd);
        let b = Money::new(2500, Currency::Usd);
        let sum = a.checked_add(b).unwrap();
        assert_eq!(sum, Money::new(4000, Currency::Usd));
    }

    #[test]
    fn test_checked_add_mixed_currency_fails() {
        let a = Money::new(100, Currency::Usd);
        let b = Money::new(100, Currency::Htg);
        assert_eq!(
            a.checked_add(b),
            Err(MoneyError::CurrencyMismatch {
                left: Currency::Usd,
                right: Currency::Htg,
            })
        );
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(100, Currency::Cad);
        let b = Money::new(250, Currency::Cad);
        let diff = a.checked_sub(b).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.minor, -150);
    }

    #[test]
    fn test_add_overflow() {
        let a = Money::new(i64::MAX, Currency::Usd);
        let b = Money::new(1, Currency::Usd);
        assert_eq!(a.checked_add(b), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_cmp_amount() {
        let a = Money::new(100, Currency::Usd);
        let b = Money::new(200, Currency::Usd);
        assert_eq!(a.cmp_amount(&b).unwrap(), std::cmp::Ordering::Less);

        let c = Money::new(200, Currency::Htg);
        assert!(a.cmp_amount(&c).is_err());
    }

    #[rstest]
    #[case(dec!(3229.5), 3230)]
    #[case(dec!(3229.4), 3229)]
    #[case(dec!(0.5), 1)]
    #[case(dec!(-0.5), -1)]
    #[case(dec!(10000), 10000)]
    fn test_round_minor_half_up(#[case] input: Decimal, #[case] expected: i64) {
        assert_eq!(round_minor(input).unwrap(), expected);
    }

    #[test]
    fn test_format_display() {
        assert_eq!(
            Money::new(100_000, Currency::Usd).format_display(),
            "1000.00 USD"
        );
        assert_eq!(Money::new(5, Currency::Htg).format_display(), "0.05 HTG");
    }

    #[test]
    fn test_project_preferred_picks_preferred() {
        let buckets = [
            Money::new(5000, Currency::Usd),
            Money::new(90_000, Currency::Htg),
        ];
        let projected = project_preferred(&buckets, Currency::Usd).unwrap();
        assert_eq!(projected.currency, Currency::Usd);
    }

    #[test]
    fn test_project_preferred_falls_back_to_largest_nonzero() {
        // Preferred bucket is zero: fall back to the non-zero bucket.
        let buckets = [
            Money::zero(Currency::Usd),
            Money::new(5000, Currency::Htg),
        ];
        let projected = project_preferred(&buckets, Currency::Usd).unwrap();
        assert_eq!(projected, Money::new(5000, Currency::Htg));
    }

    #[test]
    fn test_project_preferred_all_zero() {
        let buckets = [Money::zero(Currency::Usd), Money::zero(Currency::Htg)];
        assert_eq!(project_preferred(&buckets, Currency::Usd), None);
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str("CAD").unwrap(), Currency::Cad);
        assert_eq!(Currency::from_str("HTG").unwrap(), Currency::Htg);
        assert!(Currency::from_str("EUR").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Cad.to_string(), "CAD");
        assert_eq!(Currency::Htg.to_string(), "HTG");
    }
}
