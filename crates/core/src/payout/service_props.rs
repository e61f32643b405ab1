//! Property-based tests for the payout lifecycle.
//!
//! - Transitions out of terminal states are always rejected
//! - `retry` succeeds exactly from `Failed` and leaves other states alone
//! - Every action the service yields agrees with `is_valid_transition`

use chrono::Utc;
use proptest::prelude::*;
use tikera_shared::types::{AdminId, PayoutId};

use super::error::PayoutError;
use super::service::PayoutLifecycle;
use super::types::PayoutStatus;

fn any_status() -> impl Strategy<Value = PayoutStatus> {
    prop_oneof![
        Just(PayoutStatus::Pending),
        Just(PayoutStatus::Approved),
        Just(PayoutStatus::Paid),
        Just(PayoutStatus::Failed),
        Just(PayoutStatus::Cancelled),
    ]
}

proptest! {
    #[test]
    fn prop_terminal_states_admit_no_transitions(status in any_status()) {
        prop_assume!(status.is_terminal());

        prop_assert!(
            PayoutLifecycle::approve(PayoutId::new(), status, AdminId::new()).is_err()
        );
        prop_assert!(PayoutLifecycle::mark_paid(status, Utc::now()).is_err());
        prop_assert!(PayoutLifecycle::mark_failed(status, "x".into()).is_err());
        prop_assert!(PayoutLifecycle::retry(status, Utc::now()).is_err());
        prop_assert!(PayoutLifecycle::cancel(status).is_err());
    }

    #[test]
    fn prop_retry_only_from_failed(status in any_status()) {
        let result = PayoutLifecycle::retry(status, Utc::now());
        if status == PayoutStatus::Failed {
            prop_assert!(result.is_ok());
        } else {
            let is_invalid = matches!(
                result,
                Err(PayoutError::InvalidTransition { .. })
            );
            prop_assert!(is_invalid);
        }
    }

    #[test]
    fn prop_actions_agree_with_transition_table(status in any_status()) {
        if let Ok(action) =
            PayoutLifecycle::approve(PayoutId::new(), status, AdminId::new())
        {
            prop_assert!(PayoutLifecycle::is_valid_transition(status, action.new_status()));
        }
        if let Ok(action) = PayoutLifecycle::mark_paid(status, Utc::now()) {
            prop_assert!(PayoutLifecycle::is_valid_transition(status, action.new_status()));
        }
        if let Ok(action) = PayoutLifecycle::mark_failed(status, "reason".into()) {
            prop_assert!(PayoutLifecycle::is_valid_transition(status, action.new_status()));
        }
        if let Ok(action) = PayoutLifecycle::retry(status, Utc::now()) {
            prop_assert!(PayoutLifecycle::is_valid_transition(status, action.new_status()));
        }
        if let Ok(action) = PayoutLifecycle::cancel(status) {
            prop_assert!(PayoutLifecycle::is_valid_transition(status, action.new_status()));
        }
    }
}
