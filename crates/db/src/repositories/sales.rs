//! Database-backed view over the confirmed-sales ledger.
//!
//! The catalog/checkout flow owns these tables; this repository only
//! ever reads them, implementing the core `SalesLedger` collaborator
//! trait.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

use tikera_core::earnings::{ConfirmedSale, EarningsError, EventMeta, SalesLedger};
use tikera_shared::types::{EventId, OrganizerId};

use super::convert::{event_meta_from_model, sale_from_model};
use crate::entities::{events, ticket_sales};

/// Read-only sales-ledger repository.
#[derive(Debug, Clone)]
pub struct SalesLedgerRepository {
    db: DatabaseConnection,
}

impl SalesLedgerRepository {
    /// Creates a new sales-ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SalesLedger for SalesLedgerRepository {
    async fn event_meta(&self, event_id: EventId) -> Result<Option<EventMeta>, EarningsError> {
        let model = events::Entity::find_by_id(event_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))?;

        model
            .as_ref()
            .map(event_meta_from_model)
            .transpose()
            .map_err(EarningsError::Ledger)
    }

    async fn list_confirmed_sales(
        &self,
        event_id: EventId,
    ) -> Result<Vec<ConfirmedSale>, EarningsError> {
        let models = ticket_sales::Entity::find()
            .filter(ticket_sales::Column::EventId.eq(event_id.into_inner()))
            .order_by_asc(ticket_sales::Column::SoldAt)
            .all(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))?;

        models
            .iter()
            .map(sale_from_model)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EarningsError::Ledger)
    }

    async fn organizer_events(
        &self,
        organizer_id: OrganizerId,
    ) -> Result<Vec<EventMeta>, EarningsError> {
        let models = events::Entity::find()
            .filter(events::Column::OrganizerId.eq(organizer_id.into_inner()))
            .order_by_desc(events::Column::EndAt)
            .all(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))?;

        models
            .iter()
            .map(event_meta_from_model)
            .collect::<Result<Vec<_>, _>>()
            .map_err(EarningsError::Ledger)
    }
}
