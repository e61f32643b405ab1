//! Earnings projection repository.
//!
//! The stored `event_earnings` row is a cache of the pure recompute over
//! the sales ledger and paid payouts. Reads refresh on demand, so the
//! store is never treated as more authoritative than a fresh recompute.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use tikera_core::earnings::{
    EarningsCalculator, EarningsError, EventEarnings, OrganizerEarnings, SalesLedger,
};
use tikera_core::fees::{Jurisdiction, PlatformSettings, ProcessingFeeSchedule};
use tikera_shared::types::{Currency, EventId, Money, OrganizerId};

use super::convert::settlement_status_to_db;
use super::sales::SalesLedgerRepository;
use crate::entities::{event_earnings, payouts, sea_orm_active_enums};

/// Repository over the event_earnings projection.
#[derive(Debug, Clone)]
pub struct EarningsRepository {
    db: DatabaseConnection,
    sales: SalesLedgerRepository,
}

impl EarningsRepository {
    /// Creates a new earnings repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        let sales = SalesLedgerRepository::new(db.clone());
        Self { db, sales }
    }

    /// Recomputes and stores the earnings projection for an event.
    ///
    /// The withdrawn amount is derived from paid payouts, so the whole
    /// row is reproducible from the ledger for reconciliation.
    ///
    /// # Errors
    ///
    /// Returns an error if the event does not exist, the ledger cannot
    /// be read, or the recompute itself fails.
    pub async fn refresh_event(
        &self,
        event_id: EventId,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) -> Result<EventEarnings, EarningsError> {
        let meta = self
            .sales
            .event_meta(event_id)
            .await?
            .ok_or(EarningsError::EventNotFound(event_id))?;

        let sales = self.sales.list_confirmed_sales(event_id).await?;
        let withdrawn = self.paid_total(event_id, meta.currency).await?;

        let jurisdiction = Jurisdiction::resolve(&meta.country_code);
        let fee_config = settings.fee_config(jurisdiction);
        let schedule = ProcessingFeeSchedule::for_currency(meta.currency);

        let earnings =
            EarningsCalculator::recompute(&meta, &sales, fee_config, &schedule, withdrawn, now)?;

        self.store(&earnings, now).await?;
        Ok(earnings)
    }

    /// Recomputes every event of an organizer and rolls the results up
    /// into per-currency totals plus the preferred-currency display
    /// figure.
    pub async fn organizer_rollup(
        &self,
        organizer_id: OrganizerId,
        preferred: Currency,
        settings: &PlatformSettings,
        now: DateTime<Utc>,
    ) -> Result<(OrganizerEarnings, Vec<EventEarnings>), EarningsError> {
        let events = self.sales.organizer_events(organizer_id).await?;

        let mut per_event = Vec::with_capacity(events.len());
        for event in &events {
            per_event.push(self.refresh_event(event.event_id, settings, now).await?);
        }

        let rollup = EarningsCalculator::rollup(organizer_id, &per_event, preferred)?;
        Ok((rollup, per_event))
    }

    /// Returns the stored projection row without recomputing.
    ///
    /// Reporting paths use this; anything that moves money refreshes
    /// first.
    pub async fn get_stored(
        &self,
        event_id: EventId,
    ) -> Result<Option<event_earnings::Model>, EarningsError> {
        event_earnings::Entity::find_by_id(event_id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))
    }

    /// Sums the paid payouts for an event (the withdrawn amount).
    async fn paid_total(
        &self,
        event_id: EventId,
        currency: Currency,
    ) -> Result<Money, EarningsError> {
        let paid = payouts::Entity::find()
            .filter(payouts::Column::EventId.eq(event_id.into_inner()))
            .filter(payouts::Column::Status.eq(sea_orm_active_enums::PayoutStatus::Paid))
            .all(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))?;

        let mut total = Money::zero(currency);
        for payout in paid {
            let amount = Money::new(
                payout.amount_minor,
                super::convert::parse_currency(&payout.currency)
                    .map_err(EarningsError::Ledger)?,
            );
            total = total.checked_add(amount)?;
        }
        Ok(total)
    }

    async fn store(
        &self,
        earnings: &EventEarnings,
        now: DateTime<Utc>,
    ) -> Result<(), EarningsError> {
        let active = event_earnings::ActiveModel {
            event_id: Set(earnings.event_id.into_inner()),
            organizer_id: Set(earnings.organizer_id.into_inner()),
            currency: Set(earnings.currency.as_str().to_string()),
            gross_sales_minor: Set(earnings.gross_sales.minor),
            platform_fee_minor: Set(earnings.platform_fee.minor),
            processing_fee_minor: Set(earnings.processing_fee.minor),
            net_amount_minor: Set(earnings.net_amount.minor),
            withdrawn_minor: Set(earnings.withdrawn_amount.minor),
            available_minor: Set(earnings.available_to_withdraw.minor),
            settlement_status: Set(settlement_status_to_db(earnings.settlement_status)),
            settlement_ready_at: Set(earnings.settlement_ready_at.into()),
            computed_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        event_earnings::Entity::insert(active)
            .on_conflict(
                OnConflict::column(event_earnings::Column::EventId)
                    .update_columns([
                        event_earnings::Column::OrganizerId,
                        event_earnings::Column::Currency,
                        event_earnings::Column::GrossSalesMinor,
                        event_earnings::Column::PlatformFeeMinor,
                        event_earnings::Column::ProcessingFeeMinor,
                        event_earnings::Column::NetAmountMinor,
                        event_earnings::Column::WithdrawnMinor,
                        event_earnings::Column::AvailableMinor,
                        event_earnings::Column::SettlementStatus,
                        event_earnings::Column::SettlementReadyAt,
                        event_earnings::Column::ComputedAt,
                        event_earnings::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(|e| EarningsError::Ledger(e.to_string()))?;

        Ok(())
    }
}
