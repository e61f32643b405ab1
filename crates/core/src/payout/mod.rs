//! Payout lifecycle management.
//!
//! This module implements the payout state machine, the weekly payout
//! scheduling policy, and the notification seam for state changes.
//!
//! # Modules
//!
//! - `types` - Payout domain types (PayoutStatus, PayoutAction)
//! - `error` - Payout-specific error types
//! - `service` - State transition logic
//! - `schedule` - Payout window policy
//! - `notify` - Fire-and-forget notification trait

pub mod error;
pub mod notify;
pub mod schedule;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PayoutError;
pub use notify::{PayoutEvent, PayoutNotifier};
pub use schedule::next_payout_window;
pub use service::PayoutLifecycle;
pub use types::{PayoutAction, PayoutStatus};
