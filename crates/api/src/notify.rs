//! Logging notification sink.
//!
//! Real delivery (email/push/WhatsApp) happens in the external
//! notification system; this implementation records the intent in the
//! logs and never fails the caller.

use async_trait::async_trait;
use tracing::info;

use tikera_core::payout::{PayoutEvent, PayoutNotifier};
use tikera_shared::types::OrganizerId;

/// Notifier that writes structured log lines instead of delivering.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl PayoutNotifier for LogNotifier {
    async fn notify(&self, organizer_id: OrganizerId, event: PayoutEvent) {
        match event {
            PayoutEvent::Approved { payout_id } => {
                info!(%organizer_id, %payout_id, "notify: payout approved");
            }
            PayoutEvent::Paid { payout_id } => {
                info!(%organizer_id, %payout_id, "notify: payout paid");
            }
            PayoutEvent::Failed { payout_id, reason } => {
                info!(%organizer_id, %payout_id, %reason, "notify: payout failed");
            }
        }
    }
}
