//! Fire-and-forget notification seam for payout state changes.
//!
//! Notification delivery (email/push/WhatsApp) is an external
//! collaborator: the engine calls it but never depends on its success.
//! Implementations must swallow and log their own errors.

use async_trait::async_trait;
use tikera_shared::types::{OrganizerId, PayoutId};

/// A payout state change worth telling the organizer about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayoutEvent {
    /// The payout was approved by an administrator.
    Approved {
        /// The approved payout.
        payout_id: PayoutId,
    },
    /// The transfer completed.
    Paid {
        /// The completed payout.
        payout_id: PayoutId,
    },
    /// The transfer failed; retry is available.
    Failed {
        /// The failed payout.
        payout_id: PayoutId,
        /// Human-readable reason shown to the organizer.
        reason: String,
    },
}

/// Notification sink for payout state changes.
#[async_trait]
pub trait PayoutNotifier: Send + Sync {
    /// Delivers a notification; infallible from the caller's point of view.
    async fn notify(&self, organizer_id: OrganizerId, event: PayoutEvent);
}
