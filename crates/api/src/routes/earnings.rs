//! Earnings routes.
//!
//! Every read recomputes from the sales ledger; the stored projection is
//! never served in place of a fresh recompute.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{AppState, middleware::AuthUser};
use tikera_core::earnings::{EarningsError, EventEarnings, OrganizerBucket};
use tikera_db::EarningsRepository;
use tikera_shared::types::{Currency, EventId, Money, OrganizerId};

/// Creates the earnings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/events/{event_id}/earnings", get(get_event_earnings))
        .route(
            "/organizers/{organizer_id}/earnings",
            get(get_organizer_earnings),
        )
}

// ============================================================================
// Query Parameters / Response Types
// ============================================================================

/// Query parameters for the organizer roll-up.
#[derive(Debug, Deserialize)]
pub struct OrganizerEarningsQuery {
    /// Currency for the single display figure (defaults to USD).
    pub preferred: Option<String>,
}

/// A money amount rendered for the API.
#[derive(Debug, Serialize)]
pub struct MoneyResponse {
    /// Amount in minor units.
    pub minor: i64,
    /// Amount formatted with canonical precision, e.g. "870.70".
    pub formatted: String,
    /// ISO currency code.
    pub currency: String,
}

impl From<Money> for MoneyResponse {
    fn from(money: Money) -> Self {
        Self {
            minor: money.minor,
            formatted: money.to_decimal().to_string(),
            currency: money.currency.to_string(),
        }
    }
}

/// Response for a single event's earnings.
#[derive(Debug, Serialize)]
pub struct EventEarningsResponse {
    /// Event ID.
    pub event_id: Uuid,
    /// Organizer ID.
    pub organizer_id: Uuid,
    /// Currency of every amount below.
    pub currency: String,
    /// Total confirmed sales.
    pub gross_sales: MoneyResponse,
    /// Platform fee withheld.
    pub platform_fee: MoneyResponse,
    /// Processor fee withheld.
    pub processing_fee: MoneyResponse,
    /// Gross minus fees.
    pub net_amount: MoneyResponse,
    /// Already paid out.
    pub withdrawn_amount: MoneyResponse,
    /// Still claimable.
    pub available_to_withdraw: MoneyResponse,
    /// Settlement state.
    pub settlement_status: String,
    /// When the hold elapses.
    pub settlement_ready_at: String,
}

impl From<EventEarnings> for EventEarningsResponse {
    fn from(e: EventEarnings) -> Self {
        Self {
            event_id: e.event_id.into_inner(),
            organizer_id: e.organizer_id.into_inner(),
            currency: e.currency.to_string(),
            gross_sales: e.gross_sales.into(),
            platform_fee: e.platform_fee.into(),
            processing_fee: e.processing_fee.into(),
            net_amount: e.net_amount.into(),
            withdrawn_amount: e.withdrawn_amount.into(),
            available_to_withdraw: e.available_to_withdraw.into(),
            settlement_status: e.settlement_status.to_string(),
            settlement_ready_at: e.settlement_ready_at.to_rfc3339(),
        }
    }
}

/// Per-currency bucket in the organizer roll-up.
#[derive(Debug, Serialize)]
pub struct BucketResponse {
    /// Bucket currency.
    pub currency: String,
    /// Gross sales in this currency.
    pub gross_sales: MoneyResponse,
    /// Net earnings in this currency.
    pub net_amount: MoneyResponse,
    /// Withdrawable balance in this currency.
    pub available_to_withdraw: MoneyResponse,
    /// Events contributing to the bucket.
    pub event_count: u32,
}

impl From<OrganizerBucket> for BucketResponse {
    fn from(b: OrganizerBucket) -> Self {
        Self {
            currency: b.currency.to_string(),
            gross_sales: b.gross_sales.into(),
            net_amount: b.net_amount.into(),
            available_to_withdraw: b.available_to_withdraw.into(),
            event_count: b.event_count,
        }
    }
}

/// Response for the organizer roll-up.
#[derive(Debug, Serialize)]
pub struct OrganizerEarningsResponse {
    /// Organizer ID.
    pub organizer_id: Uuid,
    /// Per-currency totals, never implicitly converted.
    pub buckets: Vec<BucketResponse>,
    /// Single display figure; absent when there are no earnings.
    pub preferred_display: Option<MoneyResponse>,
    /// Per-event breakdown.
    pub events: Vec<EventEarningsResponse>,
}

// ============================================================================
// Helper Functions
// ============================================================================

fn earnings_error_response(e: &EarningsError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "earnings request failed");
    }
    (
        status,
        Json(json!({
            "error": e.error_code(),
            "message": e.to_string()
        })),
    )
        .into_response()
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/events/{event_id}/earnings` - Recompute-backed earnings for one
/// event.
async fn get_event_earnings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(event_id): Path<Uuid>,
) -> impl IntoResponse {
    let settings = match state.settings.get().await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": e.error_code(),
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let repo = EarningsRepository::new((*state.db).clone());
    match repo
        .refresh_event(EventId::from_uuid(event_id), &settings, Utc::now())
        .await
    {
        Ok(earnings) => {
            (StatusCode::OK, Json(EventEarningsResponse::from(earnings))).into_response()
        }
        Err(e) => earnings_error_response(&e),
    }
}

/// GET `/organizers/{organizer_id}/earnings` - Per-currency roll-up plus
/// the preferred-currency display projection.
async fn get_organizer_earnings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(organizer_id): Path<Uuid>,
    Query(query): Query<OrganizerEarningsQuery>,
) -> impl IntoResponse {
    let preferred = match query.preferred.as_deref() {
        None => Currency::Usd,
        Some(raw) => match raw.parse::<Currency>() {
            Ok(c) => c,
            Err(msg) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "VALIDATION_ERROR",
                        "message": msg
                    })),
                )
                    .into_response();
            }
        },
    };

    let settings = match state.settings.get().await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": e.error_code(),
                    "message": e.to_string()
                })),
            )
                .into_response();
        }
    };

    let repo = EarningsRepository::new((*state.db).clone());
    match repo
        .organizer_rollup(
            OrganizerId::from_uuid(organizer_id),
            preferred,
            &settings,
            Utc::now(),
        )
        .await
    {
        Ok((rollup, per_event)) => {
            let response = OrganizerEarningsResponse {
                organizer_id,
                buckets: rollup.buckets.into_iter().map(Into::into).collect(),
                preferred_display: rollup.preferred_display.map(Into::into),
                events: per_event.into_iter().map(Into::into).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => earnings_error_response(&e),
    }
}
