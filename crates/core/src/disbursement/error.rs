//! Provider failure taxonomy.

use thiserror::Error;
use tikera_shared::types::Money;

use crate::disbursement::types::ProviderKind;

/// Errors reported by money-movement providers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not be reached or returned a server error.
    /// Retryable with the same reference.
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The prefunded balance does not cover the transfer. Falls back to
    /// the standard rail, else surfaces to the admin queue.
    #[error("Insufficient prefunded balance: {} available, {} requested", available.format_display(), requested.format_display())]
    InsufficientPrefundedBalance {
        /// Liquidity currently held.
        available: Money,
        /// Amount the transfer needed.
        requested: Money,
    },

    /// The destination was rejected. Non-retryable; the organizer must
    /// fix their payout profile.
    #[error("Destination invalid: {0}")]
    DestinationInvalid(String),

    /// The request timed out. The transfer may or may not have happened:
    /// the status endpoint must be polled, never assumed failed.
    #[error("Provider call timed out (reference {reference})")]
    Timeout {
        /// Idempotency key of the in-flight transfer.
        reference: String,
    },

    /// The operation is not offered on this rail (e.g., balance on a
    /// card-network rail).
    #[error("Operation not supported by {0} provider")]
    Unsupported(ProviderKind),

    /// The provider answered with a body we could not interpret.
    #[error("Malformed provider response: {0}")]
    Protocol(String),
}

impl ProviderError {
    /// Returns true if retrying the same reference may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Timeout { .. })
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unavailable(_) => 503,
            Self::Timeout { .. } => 504,
            Self::DestinationInvalid(_) => 422,
            Self::InsufficientPrefundedBalance { .. } => 409,
            Self::Unsupported(_) | Self::Protocol(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable(_) => "PROVIDER_UNAVAILABLE",
            Self::InsufficientPrefundedBalance { .. } => "INSUFFICIENT_PREFUNDED_BALANCE",
            Self::DestinationInvalid(_) => "DESTINATION_INVALID",
            Self::Timeout { .. } => "PROVIDER_TIMEOUT",
            Self::Unsupported(_) => "OPERATION_UNSUPPORTED",
            Self::Protocol(_) => "PROVIDER_PROTOCOL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tikera_shared::types::Currency;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Unavailable("down".into()).is_retryable());
        assert!(
            ProviderError::Timeout {
                reference: "r".into()
            }
            .is_retryable()
        );
        assert!(!ProviderError::DestinationInvalid("bad wallet".into()).is_retryable());
        assert!(
            !ProviderError::InsufficientPrefundedBalance {
                available: Money::zero(Currency::Htg),
                requested: Money::new(5000, Currency::Htg),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ProviderError::Unavailable(String::new()).status_code(), 503);
        assert_eq!(
            ProviderError::Timeout {
                reference: String::new()
            }
            .status_code(),
            504
        );
        assert_eq!(
            ProviderError::DestinationInvalid(String::new()).status_code(),
            422
        );
    }
}
