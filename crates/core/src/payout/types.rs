//! Payout domain types for lifecycle management.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tikera_shared::types::AdminId;

/// Payout status in the disbursement lifecycle.
///
/// Valid transitions:
/// - Pending → Approved (admin approve)
/// - Approved → Paid (provider transfer succeeded)
/// - Approved → Failed (provider reported failure)
/// - Failed → Pending (organizer retry, new scheduled date)
/// - Pending | Approved | Failed → Cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Created and waiting for admin approval.
    Pending,
    /// Approved; transfer not yet confirmed. A timed-out transfer stays
    /// here until a status poll resolves it.
    Approved,
    /// Funds left the platform (terminal).
    Paid,
    /// Provider reported a failure; recoverable via retry.
    Failed,
    /// Withdrawn from the lifecycle (terminal).
    Cancelled,
}

impl PayoutStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "paid" => Some(Self::Paid),
            "failed" => Some(Self::Failed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns true if no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payout state transition with audit data.
///
/// Each variant captures the resulting status and the audit trail
/// (who, when, why) to be stamped onto the payout record.
#[derive(Debug, Clone)]
pub enum PayoutAction {
    /// Admin approved a pending payout.
    Approve {
        /// The new status after approval.
        new_status: PayoutStatus,
        /// The administrator who approved the payout.
        approved_by: AdminId,
        /// When the payout was approved.
        approved_at: DateTime<Utc>,
    },
    /// Provider confirmed the transfer.
    MarkPaid {
        /// The new status after completion.
        new_status: PayoutStatus,
        /// When the transfer completed.
        completed_at: DateTime<Utc>,
    },
    /// Provider reported a failure.
    MarkFailed {
        /// The new status after the failure.
        new_status: PayoutStatus,
        /// Human-readable failure reason.
        failure_reason: String,
    },
    /// Organizer retried a failed payout.
    Retry {
        /// The new status after the retry (Pending).
        new_status: PayoutStatus,
        /// The recomputed payout window.
        scheduled_date: NaiveDate,
    },
    /// Payout was cancelled.
    Cancel {
        /// The new status after cancellation.
        new_status: PayoutStatus,
    },
}

impl PayoutAction {
    /// Returns the new status resulting from this action.
    #[must_use]
    pub const fn new_status(&self) -> PayoutStatus {
        match self {
            Self::Approve { new_status, .. }
            | Self::MarkPaid { new_status, .. }
            | Self::MarkFailed { new_status, .. }
            | Self::Retry { new_status, .. }
            | Self::Cancel { new_status } => *new_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            PayoutStatus::Pending,
            PayoutStatus::Approved,
            PayoutStatus::Paid,
            PayoutStatus::Failed,
            PayoutStatus::Cancelled,
        ] {
            assert_eq!(PayoutStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PayoutStatus::parse("APPROVED"), Some(PayoutStatus::Approved));
        assert_eq!(PayoutStatus::parse("unknown"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(PayoutStatus::Paid.is_terminal());
        assert!(PayoutStatus::Cancelled.is_terminal());
        assert!(!PayoutStatus::Pending.is_terminal());
        assert!(!PayoutStatus::Approved.is_terminal());
        assert!(!PayoutStatus::Failed.is_terminal());
    }

    #[test]
    fn test_status_display() {
        assert_eq!(format!("{}", PayoutStatus::Pending), "pending");
        assert_eq!(format!("{}", PayoutStatus::Cancelled), "cancelled");
    }
}
