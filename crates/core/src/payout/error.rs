//! Payout error types for lifecycle management.

use thiserror::Error;
use tikera_shared::types::{Money, PayoutId};

use crate::payout::types::PayoutStatus;

/// Errors that can occur during payout operations.
#[derive(Debug, Error)]
pub enum PayoutError {
    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: PayoutStatus,
        /// The attempted target status.
        to: PayoutStatus,
    },

    /// A guarded transition observed a status other than the one it
    /// asserted (e.g., two concurrent approvals: the loser lands here).
    #[error("Payout {payout_id} already {actual}")]
    IdempotencyViolation {
        /// The payout that was mutated concurrently.
        payout_id: PayoutId,
        /// The status actually observed.
        actual: PayoutStatus,
    },

    /// Payout not found.
    #[error("Payout {0} not found")]
    NotFound(PayoutId),

    /// The requested amount is below the platform minimum.
    #[error("Amount {} is below the minimum payout {}", amount.format_display(), minimum.format_display())]
    BelowMinimum {
        /// The requested amount.
        amount: Money,
        /// The configured minimum.
        minimum: Money,
    },

    /// The requested amount exceeds the withdrawable balance.
    #[error("Amount {} exceeds available balance {}", amount.format_display(), available.format_display())]
    ExceedsAvailable {
        /// The requested amount.
        amount: Money,
        /// The withdrawable balance.
        available: Money,
    },

    /// The event's settlement hold has not elapsed.
    #[error("Earnings are not yet withdrawable (ready at {ready_at})")]
    NotYetSettled {
        /// When the hold elapses.
        ready_at: chrono::DateTime<chrono::Utc>,
    },

    /// A failure reason is required but was not provided.
    #[error("Failure reason is required")]
    FailureReasonRequired,

    /// The request is malformed or inconsistent with the ledger.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl PayoutError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidTransition { .. } | Self::FailureReasonRequired | Self::Validation(_) => {
                400
            }
            Self::IdempotencyViolation { .. } => 409,
            Self::NotFound(_) => 404,
            Self::BelowMinimum { .. }
            | Self::ExceedsAvailable { .. }
            | Self::NotYetSettled { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::IdempotencyViolation { .. } => "IDEMPOTENCY_VIOLATION",
            Self::NotFound(_) => "PAYOUT_NOT_FOUND",
            Self::BelowMinimum { .. } => "BELOW_MINIMUM_PAYOUT",
            Self::ExceedsAvailable { .. } => "EXCEEDS_AVAILABLE_BALANCE",
            Self::NotYetSettled { .. } => "SETTLEMENT_HOLD_ACTIVE",
            Self::FailureReasonRequired => "FAILURE_REASON_REQUIRED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idempotency_violation_is_conflict() {
        let err = PayoutError::IdempotencyViolation {
            payout_id: PayoutId::new(),
            actual: PayoutStatus::Approved,
        };
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "IDEMPOTENCY_VIOLATION");
        assert!(err.to_string().contains("already approved"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = PayoutError::InvalidTransition {
            from: PayoutStatus::Paid,
            to: PayoutStatus::Pending,
        };
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("paid"));
        assert!(err.to_string().contains("pending"));
    }

    #[test]
    fn test_below_minimum_message() {
        use tikera_shared::types::Currency;
        let err = PayoutError::BelowMinimum {
            amount: Money::new(500, Currency::Usd),
            minimum: Money::new(2000, Currency::Usd),
        };
        assert_eq!(err.status_code(), 422);
        assert!(err.to_string().contains("5.00 USD"));
        assert!(err.to_string().contains("20.00 USD"));
    }
}
