//! Fee-policy error types.

use rust_decimal::Decimal;
use thiserror::Error;
use tikera_shared::types::MoneyError;

/// Errors that can occur while computing fees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeeError {
    /// A configured fee rate falls outside the valid `[0, 1]` range.
    #[error("Fee rate {rate} is outside [0, 1]")]
    InvalidRate {
        /// The offending rate.
        rate: Decimal,
    },

    /// Money arithmetic failed (currency mismatch or overflow).
    #[error(transparent)]
    Money(#[from] MoneyError),
}

impl FeeError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            // Both are configuration/programmer errors, never user input.
            Self::InvalidRate { .. } | Self::Money(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRate { .. } => "INVALID_FEE_RATE",
            Self::Money(MoneyError::CurrencyMismatch { .. }) => "CURRENCY_MISMATCH",
            Self::Money(MoneyError::Overflow) => "AMOUNT_OVERFLOW",
        }
    }
}
