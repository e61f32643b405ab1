//! Disbursement tracker routes (admin reporting, read-only).

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AdminUser};
use tikera_db::repositories::disbursement::{
    DisbursementRepository, DisbursementStats, EndedEventAwaiting,
};

use super::earnings::MoneyResponse;

/// Default lookback window. A year wide on purpose: stale unpaid events
/// must never silently drop out of the triage view.
const DEFAULT_WINDOW_DAYS: u32 = 365;

/// Default row cap for the pending listing.
const DEFAULT_LIMIT: usize = 100;

/// Creates the disbursement routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/disbursements/pending", get(get_pending))
        .route("/disbursements/stats", get(get_stats))
}

// ============================================================================
// Query Parameters / Response Types
// ============================================================================

/// Query parameters for the pending listing.
#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Lookback window in days.
    pub window_days: Option<u32>,
    /// Maximum rows returned.
    pub limit: Option<usize>,
}

/// Query parameters for the stats summary.
#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    /// Lookback window in days.
    pub window_days: Option<u32>,
}

/// An ended event awaiting disbursement.
#[derive(Debug, Serialize)]
pub struct PendingEventResponse {
    /// Event ID.
    pub event_id: Uuid,
    /// Event name.
    pub name: String,
    /// Organizer ID.
    pub organizer_id: Uuid,
    /// When the event ended.
    pub end_at: String,
    /// Withdrawable balance.
    pub available: MoneyResponse,
    /// Already paid out.
    pub withdrawn: MoneyResponse,
    /// Settlement status, if a projection exists.
    pub settlement_status: Option<String>,
    /// False when no projection has been computed yet.
    pub earnings_computed: bool,
}

impl From<EndedEventAwaiting> for PendingEventResponse {
    fn from(row: EndedEventAwaiting) -> Self {
        Self {
            event_id: row.event_id,
            name: row.name,
            organizer_id: row.organizer_id,
            end_at: row.end_at.to_rfc3339(),
            available: row.available.into(),
            withdrawn: row.withdrawn.into(),
            settlement_status: row.settlement_status.map(|s| s.to_string()),
            earnings_computed: row.earnings_computed,
        }
    }
}

/// Dashboard summary of the awaiting set.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Ended events still awaiting disbursement.
    pub events_awaiting: u64,
    /// Distinct organizers among them.
    pub organizers_awaiting: u64,
    /// Withdrawable totals, one bucket per currency.
    pub totals_by_currency: Vec<MoneyResponse>,
    /// Events with no projection computed yet.
    pub uncomputed_events: u64,
    /// End time of the oldest event still waiting.
    pub oldest_end_at: Option<String>,
}

impl From<DisbursementStats> for StatsResponse {
    fn from(stats: DisbursementStats) -> Self {
        Self {
            events_awaiting: stats.events_awaiting,
            organizers_awaiting: stats.organizers_awaiting,
            totals_by_currency: stats
                .totals_by_currency
                .into_iter()
                .map(Into::into)
                .collect(),
            uncomputed_events: stats.uncomputed_events,
            oldest_end_at: stats.oldest_end_at.map(|t| t.to_rfc3339()),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/disbursements/pending` - Ended events not yet fully withdrawn,
/// newest-ended first.
async fn get_pending(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PendingQuery>,
) -> impl IntoResponse {
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);

    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.ended_events_awaiting(window_days, limit, Utc::now()).await {
        Ok(rows) => {
            let events: Vec<PendingEventResponse> = rows.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(json!({ "events": events }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to list pending disbursements");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to list pending disbursements"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/disbursements/stats` - Aggregate counts and totals for the
/// dashboard summary.
async fn get_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<StatsQuery>,
) -> impl IntoResponse {
    let window_days = query.window_days.unwrap_or(DEFAULT_WINDOW_DAYS);

    let repo = DisbursementRepository::new((*state.db).clone());
    match repo.stats(window_days, Utc::now()).await {
        Ok(stats) => (StatusCode::OK, Json(StatsResponse::from(stats))).into_response(),
        Err(e) => {
            error!(error = %e, "failed to compute disbursement stats");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "Failed to compute disbursement stats"
                })),
            )
                .into_response()
        }
    }
}
