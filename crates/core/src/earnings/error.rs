//! Earnings error types.

use thiserror::Error;
use tikera_shared::types::{EventId, MoneyError};

use crate::fees::FeeError;

/// Errors that can occur during earnings aggregation.
#[derive(Debug, Error)]
pub enum EarningsError {
    /// Event not found in the sales ledger.
    #[error("Event {0} not found")]
    EventNotFound(EventId),

    /// Money arithmetic failed (currency mismatch or overflow).
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Fee computation failed.
    #[error(transparent)]
    Fee(#[from] FeeError),

    /// The sales ledger could not be read.
    #[error("Sales ledger error: {0}")]
    Ledger(String),
}

impl EarningsError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::EventNotFound(_) => 404,
            Self::Money(_) => 500,
            Self::Fee(e) => e.status_code(),
            Self::Ledger(_) => 502,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EventNotFound(_) => "EVENT_NOT_FOUND",
            Self::Money(_) => "MONEY_ERROR",
            Self::Fee(e) => e.error_code(),
            Self::Ledger(_) => "SALES_LEDGER_ERROR",
        }
    }
}
