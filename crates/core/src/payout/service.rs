//! Payout lifecycle service for state transitions.
//!
//! This module implements the core state machine logic for moving a
//! payout through its disbursement lifecycle. The service validates
//! transitions against an observed status; the database layer re-asserts
//! the same status inside the atomic write (see the payout repository),
//! which is what makes concurrent transitions safe.

use chrono::{DateTime, Utc};
use tikera_shared::types::{AdminId, PayoutId};

use crate::payout::error::PayoutError;
use crate::payout::schedule::next_payout_window;
use crate::payout::types::{PayoutAction, PayoutStatus};

/// Stateless service for validating payout state transitions.
pub struct PayoutLifecycle;

impl PayoutLifecycle {
    /// Approve a pending payout (admin-only).
    ///
    /// Any observed status other than `Pending` is reported as an
    /// idempotency violation ("already <status>") so a concurrent
    /// second approval surfaces as a 409, not a silent double-approve.
    pub fn approve(
        payout_id: PayoutId,
        current_status: PayoutStatus,
        approved_by: AdminId,
    ) -> Result<PayoutAction, PayoutError> {
        match current_status {
            PayoutStatus::Pending => Ok(PayoutAction::Approve {
                new_status: PayoutStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            actual => Err(PayoutError::IdempotencyViolation { payout_id, actual }),
        }
    }

    /// Record a provider-confirmed transfer.
    pub fn mark_paid(
        current_status: PayoutStatus,
        completed_at: DateTime<Utc>,
    ) -> Result<PayoutAction, PayoutError> {
        match current_status {
            PayoutStatus::Approved => Ok(PayoutAction::MarkPaid {
                new_status: PayoutStatus::Paid,
                completed_at,
            }),
            _ => Err(PayoutError::InvalidTransition {
                from: current_status,
                to: PayoutStatus::Paid,
            }),
        }
    }

    /// Record a provider-reported failure.
    ///
    /// Only an approved payout can fail; a transfer timeout is NOT a
    /// failure (the payout stays approved until a status poll resolves it).
    pub fn mark_failed(
        current_status: PayoutStatus,
        failure_reason: String,
    ) -> Result<PayoutAction, PayoutError> {
        if failure_reason.trim().is_empty() {
            return Err(PayoutError::FailureReasonRequired);
        }
        match current_status {
            PayoutStatus::Approved => Ok(PayoutAction::MarkFailed {
                new_status: PayoutStatus::Failed,
                failure_reason,
            }),
            _ => Err(PayoutError::InvalidTransition {
                from: current_status,
                to: PayoutStatus::Failed,
            }),
        }
    }

    /// Retry a failed payout (organizer-initiated).
    ///
    /// Valid only from `Failed`: reschedules to the next weekly window
    /// and clears the failure reason by returning to `Pending`.
    pub fn retry(
        current_status: PayoutStatus,
        now: DateTime<Utc>,
    ) -> Result<PayoutAction, PayoutError> {
        match current_status {
            PayoutStatus::Failed => Ok(PayoutAction::Retry {
                new_status: PayoutStatus::Pending,
                scheduled_date: next_payout_window(now),
            }),
            _ => Err(PayoutError::InvalidTransition {
                from: current_status,
                to: PayoutStatus::Pending,
            }),
        }
    }

    /// Cancel a payout.
    ///
    /// Allowed from any non-terminal state; a paid payout can never be
    /// cancelled.
    pub fn cancel(current_status: PayoutStatus) -> Result<PayoutAction, PayoutError> {
        match current_status {
            PayoutStatus::Pending | PayoutStatus::Approved | PayoutStatus::Failed => {
                Ok(PayoutAction::Cancel {
                    new_status: PayoutStatus::Cancelled,
                })
            }
            _ => Err(PayoutError::InvalidTransition {
                from: current_status,
                to: PayoutStatus::Cancelled,
            }),
        }
    }

    /// Check if a status transition is valid.
    ///
    /// Valid transitions:
    /// - Pending → Approved (approve)
    /// - Approved → Paid (execute succeeded)
    /// - Approved → Failed (execute failed)
    /// - Failed → Pending (retry)
    /// - Pending | Approved | Failed → Cancelled
    #[must_use]
    pub fn is_valid_transition(from: PayoutStatus, to: PayoutStatus) -> bool {
        matches!(
            (from, to),
            (PayoutStatus::Pending, PayoutStatus::Approved)
                | (PayoutStatus::Approved, PayoutStatus::Paid | PayoutStatus::Failed)
                | (PayoutStatus::Failed, PayoutStatus::Pending)
                | (
                    PayoutStatus::Pending | PayoutStatus::Approved | PayoutStatus::Failed,
                    PayoutStatus::Cancelled
                )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_from_pending() {
        let result =
            PayoutLifecycle::approve(PayoutId::new(), PayoutStatus::Pending, AdminId::new());
        let action = result.unwrap();
        assert_eq!(action.new_status(), PayoutStatus::Approved);
    }

    #[test]
    fn test_approve_already_approved_is_idempotency_violation() {
        let id = PayoutId::new();
        let result = PayoutLifecycle::approve(id, PayoutStatus::Approved, AdminId::new());
        match result {
            Err(PayoutError::IdempotencyViolation { payout_id, actual }) => {
                assert_eq!(payout_id, id);
                assert_eq!(actual, PayoutStatus::Approved);
            }
            other => panic!("expected IdempotencyViolation, got {other:?}"),
        }
    }

    #[test]
    fn test_approve_from_paid_is_idempotency_violation() {
        let result =
            PayoutLifecycle::approve(PayoutId::new(), PayoutStatus::Paid, AdminId::new());
        assert!(matches!(
            result,
            Err(PayoutError::IdempotencyViolation { .. })
        ));
    }

    #[test]
    fn test_mark_paid_from_approved() {
        let result = PayoutLifecycle::mark_paid(PayoutStatus::Approved, Utc::now());
        assert_eq!(result.unwrap().new_status(), PayoutStatus::Paid);
    }

    #[test]
    fn test_mark_paid_from_pending_fails() {
        let result = PayoutLifecycle::mark_paid(PayoutStatus::Pending, Utc::now());
        assert!(matches!(
            result,
            Err(PayoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_mark_failed_from_approved() {
        let result =
            PayoutLifecycle::mark_failed(PayoutStatus::Approved, "destination closed".into());
        assert_eq!(result.unwrap().new_status(), PayoutStatus::Failed);
    }

    #[test]
    fn test_mark_failed_requires_reason() {
        let result = PayoutLifecycle::mark_failed(PayoutStatus::Approved, "   ".into());
        assert!(matches!(result, Err(PayoutError::FailureReasonRequired)));
    }

    #[test]
    fn test_retry_from_failed() {
        let now = Utc::now();
        let action = PayoutLifecycle::retry(PayoutStatus::Failed, now).unwrap();
        assert_eq!(action.new_status(), PayoutStatus::Pending);
        match action {
            PayoutAction::Retry { scheduled_date, .. } => {
                assert!(scheduled_date > now.date_naive());
            }
            other => panic!("expected Retry, got {other:?}"),
        }
    }

    #[test]
    fn test_retry_from_pending_fails() {
        let result = PayoutLifecycle::retry(PayoutStatus::Pending, Utc::now());
        assert!(matches!(
            result,
            Err(PayoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_retry_from_paid_fails() {
        let result = PayoutLifecycle::retry(PayoutStatus::Paid, Utc::now());
        assert!(matches!(
            result,
            Err(PayoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_from_non_terminal() {
        for status in [
            PayoutStatus::Pending,
            PayoutStatus::Approved,
            PayoutStatus::Failed,
        ] {
            let action = PayoutLifecycle::cancel(status).unwrap();
            assert_eq!(action.new_status(), PayoutStatus::Cancelled);
        }
    }

    #[test]
    fn test_cancel_from_paid_fails() {
        let result = PayoutLifecycle::cancel(PayoutStatus::Paid);
        assert!(matches!(
            result,
            Err(PayoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_cancel_from_cancelled_fails() {
        let result = PayoutLifecycle::cancel(PayoutStatus::Cancelled);
        assert!(matches!(
            result,
            Err(PayoutError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_is_valid_transition() {
        // Valid transitions
        assert!(PayoutLifecycle::is_valid_transition(
            PayoutStatus::Pending,
            PayoutStatus::Approved
        ));
        assert!(PayoutLifecycle::is_valid_transition(
            PayoutStatus::Approved,
            PayoutStatus::Paid
        ));
        assert!(PayoutLifecycle::is_valid_transition(
            PayoutStatus::Approved,
            PayoutStatus::Failed
        ));
        assert!(PayoutLifecycle::is_valid_transition(
            PayoutStatus::Failed,
            PayoutStatus::Pending
        ));
        assert!(PayoutLifecycle::is_valid_transition(
            PayoutStatus::Failed,
            PayoutStatus::Cancelled
        ));

        // Invalid transitions
        assert!(!PayoutLifecycle::is_valid_transition(
            PayoutStatus::Pending,
            PayoutStatus::Paid
        ));
        assert!(!PayoutLifecycle::is_valid_transition(
            PayoutStatus::Paid,
            PayoutStatus::Cancelled
        ));
        assert!(!PayoutLifecycle::is_valid_transition(
            PayoutStatus::Cancelled,
            PayoutStatus::Pending
        ));
    }
}
