//! Sales-ledger collaborator trait.
//!
//! The upstream ledger of confirmed ticket sales is an external
//! collaborator; the engine only ever reads from it.

use async_trait::async_trait;
use tikera_shared::types::{EventId, OrganizerId};

use crate::earnings::error::EarningsError;
use crate::earnings::types::{ConfirmedSale, EventMeta};

/// Read-only view over the upstream ledger of confirmed ticket sales.
#[async_trait]
pub trait SalesLedger: Send + Sync {
    /// Returns metadata for an event, if it exists.
    async fn event_meta(&self, event_id: EventId) -> Result<Option<EventMeta>, EarningsError>;

    /// Lists the confirmed sales for an event.
    async fn list_confirmed_sales(
        &self,
        event_id: EventId,
    ) -> Result<Vec<ConfirmedSale>, EarningsError>;

    /// Lists every event owned by an organizer.
    async fn organizer_events(
        &self,
        organizer_id: OrganizerId,
    ) -> Result<Vec<EventMeta>, EarningsError>;
}
