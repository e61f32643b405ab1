//! Payout lifecycle routes.
//!
//! Creation and the organizer actions (retry, cancel) are available to
//! the payout's owner; approve/execute/resolve are admin-only. All state
//! changes go through the guarded repository transitions.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AdminUser, AuthUser},
};
use tikera_core::disbursement::ProviderError;
use tikera_core::payout::{PayoutError, PayoutEvent};
use tikera_db::entities::{payouts, sea_orm_active_enums};
use tikera_db::repositories::payout::{CreatePayoutInput, ExecuteError, PayoutRepository};
use tikera_shared::types::{AdminId, EventId, OrganizerId, PageRequest, PayoutId};

/// Creates the payout routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payouts", post(create_payout))
        .route("/organizers/{organizer_id}/payouts", get(list_payouts))
        .route("/payouts/{payout_id}/approve", post(approve_payout))
        .route("/payouts/{payout_id}/execute", post(execute_payout))
        .route("/payouts/{payout_id}/resolve", post(resolve_payout))
        .route("/payouts/{payout_id}/retry", post(retry_payout))
        .route("/payouts/{payout_id}/cancel", post(cancel_payout))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a payout.
#[derive(Debug, Deserialize)]
pub struct CreatePayoutRequest {
    /// Organizer requesting the payout.
    pub organizer_id: Uuid,
    /// Event whose earnings fund the payout.
    pub event_id: Uuid,
    /// Requested amount in minor units; omit to withdraw everything
    /// available.
    pub amount_minor: Option<i64>,
}

/// Query parameters for listing payouts.
#[derive(Debug, Deserialize)]
pub struct ListPayoutsQuery {
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Page size.
    pub per_page: Option<u32>,
}

/// Response for a payout record.
#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    /// Payout ID.
    pub id: Uuid,
    /// Organizer who owns the payout.
    pub organizer_id: Uuid,
    /// Event whose earnings fund it.
    pub event_id: Uuid,
    /// Amount in minor units.
    pub amount_minor: i64,
    /// Currency code.
    pub currency: String,
    /// Money-movement method.
    pub method: String,
    /// Lifecycle status.
    pub status: String,
    /// Scheduled payout window.
    pub scheduled_date: String,
    /// Provider idempotency key.
    pub reference: String,
    /// Provider-side transaction id, once known.
    pub provider_transaction_id: Option<String>,
    /// Approving administrator.
    pub approved_by: Option<Uuid>,
    /// Approval time.
    pub approved_at: Option<String>,
    /// Completion time.
    pub completed_at: Option<String>,
    /// Failure reason shown to the organizer.
    pub failure_reason: Option<String>,
    /// Creation time.
    pub created_at: String,
}

impl From<payouts::Model> for PayoutResponse {
    fn from(m: payouts::Model) -> Self {
        Self {
            id: m.id,
            organizer_id: m.organizer_id,
            event_id: m.event_id,
            amount_minor: m.amount_minor,
            currency: m.currency,
            method: method_to_string(&m.method),
            status: status_to_string(&m.status),
            scheduled_date: m.scheduled_date.to_string(),
            reference: m.reference,
            provider_transaction_id: m.provider_transaction_id,
            approved_by: m.approved_by,
            approved_at: m.approved_at.map(|t| t.to_rfc3339()),
            completed_at: m.completed_at.map(|t| t.to_rfc3339()),
            failure_reason: m.failure_reason,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn status_to_string(status: &sea_orm_active_enums::PayoutStatus) -> String {
    match status {
        sea_orm_active_enums::PayoutStatus::Pending => "pending",
        sea_orm_active_enums::PayoutStatus::Approved => "approved",
        sea_orm_active_enums::PayoutStatus::Paid => "paid",
        sea_orm_active_enums::PayoutStatus::Failed => "failed",
        sea_orm_active_enums::PayoutStatus::Cancelled => "cancelled",
    }
    .to_string()
}

fn method_to_string(method: &sea_orm_active_enums::ProviderKind) -> String {
    match method {
        sea_orm_active_enums::ProviderKind::MobileMoney => "mobile_money",
        sea_orm_active_enums::ProviderKind::ConnectedAccount => "connected_account",
        sea_orm_active_enums::ProviderKind::Prefunded => "prefunded",
    }
    .to_string()
}

fn payout_error_response(e: &PayoutError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "payout request failed");
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

fn execute_error_response(e: &ExecuteError) -> axum::response::Response {
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        error!(error = %e, "payout execution failed");
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

/// Loads a payout and checks that the caller owns it (admins bypass).
async fn load_owned_payout(
    repo: &PayoutRepository,
    payout_id: PayoutId,
    auth: &AuthUser,
) -> Result<payouts::Model, axum::response::Response> {
    let payout = repo.get(payout_id).await.map_err(|e| payout_error_response(&e))?;

    if !auth.is_admin() && payout.organizer_id != auth.user_id() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "This payout belongs to another organizer"
            })),
        )
            .into_response());
    }
    Ok(payout)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/payouts` - Create a payout for withdrawable earnings.
async fn create_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreatePayoutRequest>,
) -> impl IntoResponse {
    // Boundary validation before the lifecycle sees anything.
    if let Some(amount) = body.amount_minor
        && amount <= 0
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "VALIDATION_ERROR",
                "message": "amount_minor must be positive"
            })),
        )
            .into_response();
    }
    if !auth.is_admin() && body.organizer_id != auth.user_id() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Organizers may only request their own payouts"
            })),
        )
            .into_response();
    }

    let settings = match state.settings.get().await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response();
        }
    };

    let repo = PayoutRepository::new((*state.db).clone());
    let input = CreatePayoutInput {
        organizer_id: OrganizerId::from_uuid(body.organizer_id),
        event_id: EventId::from_uuid(body.event_id),
        amount_minor: body.amount_minor,
    };

    match repo.create(input, &settings, Utc::now()).await {
        Ok(payout) => {
            (StatusCode::CREATED, Json(PayoutResponse::from(payout))).into_response()
        }
        Err(e) => payout_error_response(&e),
    }
}

/// GET `/organizers/{organizer_id}/payouts` - Paginated payout history.
async fn list_payouts(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(organizer_id): Path<Uuid>,
    Query(query): Query<ListPayoutsQuery>,
) -> impl IntoResponse {
    if !auth.is_admin() && organizer_id != auth.user_id() {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "forbidden",
                "message": "Organizers may only list their own payouts"
            })),
        )
            .into_response();
    }

    let page = PageRequest {
        page: query.page.unwrap_or(1).max(1),
        per_page: query.per_page.unwrap_or(25).clamp(1, 100),
    };

    let repo = PayoutRepository::new((*state.db).clone());
    match repo
        .list_for_organizer(OrganizerId::from_uuid(organizer_id), &page)
        .await
    {
        Ok(response) => {
            let data: Vec<PayoutResponse> =
                response.data.into_iter().map(Into::into).collect();
            (
                StatusCode::OK,
                Json(json!({ "payouts": data, "meta": response.meta })),
            )
                .into_response()
        }
        Err(e) => payout_error_response(&e),
    }
}

/// POST `/payouts/{payout_id}/approve` - Admin approval, at-most-once.
async fn approve_payout(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(payout_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PayoutRepository::new((*state.db).clone());
    let payout_id = PayoutId::from_uuid(payout_id);

    match repo
        .approve(payout_id, AdminId::from_uuid(admin.admin_id()))
        .await
    {
        Ok(payout) => {
            state
                .notifier
                .notify(
                    OrganizerId::from_uuid(payout.organizer_id),
                    PayoutEvent::Approved { payout_id },
                )
                .await;
            (StatusCode::OK, Json(PayoutResponse::from(payout))).into_response()
        }
        Err(e) => payout_error_response(&e),
    }
}

/// POST `/payouts/{payout_id}/execute` - Drive the transfer through the
/// routed provider.
async fn execute_payout(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(payout_id): Path<Uuid>,
) -> impl IntoResponse {
    let settings = match state.settings.get().await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response();
        }
    };

    let repo = PayoutRepository::new((*state.db).clone());
    let payout_id = PayoutId::from_uuid(payout_id);

    match repo
        .execute(payout_id, &state.disbursement, &settings, Utc::now())
        .await
    {
        Ok(payout) => {
            let organizer = OrganizerId::from_uuid(payout.organizer_id);
            match payout.status {
                sea_orm_active_enums::PayoutStatus::Paid => {
                    state
                        .notifier
                        .notify(organizer, PayoutEvent::Paid { payout_id })
                        .await;
                }
                sea_orm_active_enums::PayoutStatus::Failed => {
                    let reason = payout
                        .failure_reason
                        .clone()
                        .unwrap_or_else(|| "transfer failed".to_string());
                    state
                        .notifier
                        .notify(organizer, PayoutEvent::Failed { payout_id, reason })
                        .await;
                }
                _ => {}
            }
            (StatusCode::OK, Json(PayoutResponse::from(payout))).into_response()
        }
        Err(e) => {
            // A rejected destination has already moved the payout to
            // failed; tell the organizer why.
            if let ExecuteError::Provider(ProviderError::DestinationInvalid(reason)) = &e {
                if let Ok(payout) = repo.get(payout_id).await {
                    state
                        .notifier
                        .notify(
                            OrganizerId::from_uuid(payout.organizer_id),
                            PayoutEvent::Failed {
                                payout_id,
                                reason: reason.clone(),
                            },
                        )
                        .await;
                }
            }
            execute_error_response(&e)
        }
    }
}

/// POST `/payouts/{payout_id}/resolve` - Poll the provider to settle an
/// approved payout whose transfer outcome is unknown (e.g., after a
/// timeout).
async fn resolve_payout(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(payout_id): Path<Uuid>,
) -> impl IntoResponse {
    let settings = match state.settings.get().await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response();
        }
    };

    let repo = PayoutRepository::new((*state.db).clone());
    let payout_id = PayoutId::from_uuid(payout_id);

    match repo
        .resolve(payout_id, &state.disbursement, &settings, Utc::now())
        .await
    {
        Ok(payout) => {
            let organizer = OrganizerId::from_uuid(payout.organizer_id);
            match payout.status {
                sea_orm_active_enums::PayoutStatus::Paid => {
                    state
                        .notifier
                        .notify(organizer, PayoutEvent::Paid { payout_id })
                        .await;
                }
                sea_orm_active_enums::PayoutStatus::Failed => {
                    let reason = payout
                        .failure_reason
                        .clone()
                        .unwrap_or_else(|| "transfer failed".to_string());
                    state
                        .notifier
                        .notify(organizer, PayoutEvent::Failed { payout_id, reason })
                        .await;
                }
                _ => {}
            }
            (StatusCode::OK, Json(PayoutResponse::from(payout))).into_response()
        }
        Err(e) => execute_error_response(&e),
    }
}

/// POST `/payouts/{payout_id}/retry` - Organizer retry of a failed
/// payout.
async fn retry_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payout_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PayoutRepository::new((*state.db).clone());
    let payout_id = PayoutId::from_uuid(payout_id);

    if let Err(response) = load_owned_payout(&repo, payout_id, &auth).await {
        return response;
    }

    match repo.retry(payout_id, Utc::now()).await {
        Ok(payout) => (StatusCode::OK, Json(PayoutResponse::from(payout))).into_response(),
        Err(e) => payout_error_response(&e),
    }
}

/// POST `/payouts/{payout_id}/cancel` - Cancel a non-terminal payout.
async fn cancel_payout(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(payout_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = PayoutRepository::new((*state.db).clone());
    let payout_id = PayoutId::from_uuid(payout_id);

    if let Err(response) = load_owned_payout(&repo, payout_id, &auth).await {
        return response;
    }

    match repo.cancel(payout_id).await {
        Ok(payout) => (StatusCode::OK, Json(PayoutResponse::from(payout))).into_response(),
        Err(e) => payout_error_response(&e),
    }
}
