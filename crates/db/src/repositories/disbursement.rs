//! Disbursement tracker: read-only reporting over ended events awaiting
//! payout.
//!
//! The default window is intentionally wide (a year) so stale unpaid
//! events are never silently dropped from operational view. This
//! repository performs no writes.

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};
use thiserror::Error;
use uuid::Uuid;

use tikera_core::earnings::SettlementStatus;
use tikera_shared::types::{Currency, Money};

use super::convert::{parse_currency, settlement_status_to_core};
use crate::entities::{event_earnings, events};

/// Errors for disbursement reporting.
#[derive(Debug, Error)]
pub enum DisbursementError {
    /// A stored value cannot be interpreted.
    #[error("Invalid stored data: {0}")]
    Corrupt(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// An ended event whose earnings have not been fully paid out.
#[derive(Debug, Clone)]
pub struct EndedEventAwaiting {
    /// Event identifier.
    pub event_id: Uuid,
    /// Event name for the dashboard.
    pub name: String,
    /// Organizer who owns the event.
    pub organizer_id: Uuid,
    /// When the event ended.
    pub end_at: DateTime<Utc>,
    /// Event currency.
    pub currency: Currency,
    /// Withdrawable balance per the stored projection.
    pub available: Money,
    /// Amount already paid out.
    pub withdrawn: Money,
    /// Settlement status, when a projection row exists.
    pub settlement_status: Option<SettlementStatus>,
    /// False when no projection has ever been computed for the event.
    pub earnings_computed: bool,
}

/// Aggregate counts/totals for the dashboard summary.
#[derive(Debug, Clone)]
pub struct DisbursementStats {
    /// Ended events still awaiting disbursement.
    pub events_awaiting: u64,
    /// Distinct organizers among them.
    pub organizers_awaiting: u64,
    /// Withdrawable totals, one bucket per currency.
    pub totals_by_currency: Vec<Money>,
    /// Events with no earnings projection computed yet.
    pub uncomputed_events: u64,
    /// End time of the oldest event still waiting.
    pub oldest_end_at: Option<DateTime<Utc>>,
}

/// Read-only disbursement reporting repository.
#[derive(Debug, Clone)]
pub struct DisbursementRepository {
    db: DatabaseConnection,
}

impl DisbursementRepository {
    /// Creates a new disbursement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists events that ended within `window_days` and are not fully
    /// withdrawn, newest-ended first, capped at `limit`.
    pub async fn ended_events_awaiting(
        &self,
        window_days: u32,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<EndedEventAwaiting>, DisbursementError> {
        let rows = self.awaiting_rows(window_days, now).await?;
        Ok(rows.into_iter().take(limit).collect())
    }

    /// Aggregates the awaiting set into dashboard counts and totals.
    pub async fn stats(
        &self,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<DisbursementStats, DisbursementError> {
        let rows = self.awaiting_rows(window_days, now).await?;

        let mut organizers: Vec<Uuid> = rows.iter().map(|r| r.organizer_id).collect();
        organizers.sort_unstable();
        organizers.dedup();

        let mut totals: Vec<Money> = Vec::new();
        for row in &rows {
            match totals.iter_mut().find(|t| t.currency == row.currency) {
                Some(total) => {
                    total.minor = total.minor.saturating_add(row.available.minor);
                }
                None => totals.push(row.available),
            }
        }

        Ok(DisbursementStats {
            events_awaiting: rows.len() as u64,
            organizers_awaiting: organizers.len() as u64,
            totals_by_currency: totals,
            uncomputed_events: rows.iter().filter(|r| !r.earnings_computed).count() as u64,
            oldest_end_at: rows.last().map(|r| r.end_at),
        })
    }

    /// The awaiting set: ended in the window, earnings missing or not
    /// fully withdrawn, newest-ended first.
    async fn awaiting_rows(
        &self,
        window_days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<EndedEventAwaiting>, DisbursementError> {
        let cutoff = now - Duration::days(i64::from(window_days));

        let ended = events::Entity::find()
            .filter(events::Column::EndAt.lte(now))
            .filter(events::Column::EndAt.gte(cutoff))
            .order_by_desc(events::Column::EndAt)
            .all(&self.db)
            .await?;

        if ended.is_empty() {
            return Ok(vec![]);
        }

        let event_ids: Vec<Uuid> = ended.iter().map(|e| e.id).collect();
        let earnings_rows = event_earnings::Entity::find()
            .filter(event_earnings::Column::EventId.is_in(event_ids))
            .all(&self.db)
            .await?;

        let mut result = Vec::with_capacity(ended.len());
        for event in ended {
            let currency =
                parse_currency(&event.currency).map_err(DisbursementError::Corrupt)?;
            let earnings = earnings_rows.iter().find(|r| r.event_id == event.id);

            let awaiting = match earnings {
                // Fully withdrawn events leave the triage view.
                Some(row) => row.available_minor > 0,
                // Never computed: still needs an operator's eyes.
                None => true,
            };
            if !awaiting {
                continue;
            }

            result.push(EndedEventAwaiting {
                event_id: event.id,
                name: event.name,
                organizer_id: event.organizer_id,
                end_at: event.end_at.into(),
                currency,
                available: Money::new(
                    earnings.map_or(0, |r| r.available_minor),
                    currency,
                ),
                withdrawn: Money::new(earnings.map_or(0, |r| r.withdrawn_minor), currency),
                settlement_status: earnings.map(|r| settlement_status_to_core(&r.settlement_status)),
                earnings_computed: earnings.is_some(),
            });
        }

        Ok(result)
    }
}
