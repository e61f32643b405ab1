//! Platform settings routes (admin-only).
//!
//! The write path invalidates the settings cache synchronously, so the
//! next fee computation in this process sees the new policy.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::{AppState, middleware::AdminUser};
use tikera_core::fees::{LocationFeeConfig, PlatformSettings};
use tikera_db::repositories::settings::SettingsUpdate;
use tikera_shared::types::{AdminId, Money};

use super::earnings::MoneyResponse;

/// Creates the settings routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings", put(update_settings))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Per-jurisdiction fee configuration on the wire.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeeConfigBody {
    /// Platform fee as a fraction of gross, in [0, 1].
    pub platform_fee_rate: Decimal,
    /// Settlement hold in days.
    pub settlement_hold_days: u32,
}

/// Request body for updating platform settings.
#[derive(Debug, Deserialize)]
pub struct UpdateSettingsRequest {
    /// Haiti fee configuration.
    pub haiti: FeeConfigBody,
    /// US/Canada fee configuration.
    pub us_canada: FeeConfigBody,
    /// Minimum payout in minor units.
    pub minimum_payout_minor: i64,
    /// Minimum payout currency.
    pub minimum_payout_currency: String,
}

/// Response for the current settings.
#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    /// Haiti fee configuration.
    pub haiti: FeeConfigBody,
    /// US/Canada fee configuration.
    pub us_canada: FeeConfigBody,
    /// Minimum payout.
    pub minimum_payout: MoneyResponse,
    /// Last change time.
    pub updated_at: String,
    /// Administrator who made the last change.
    pub updated_by: Option<String>,
}

impl From<&PlatformSettings> for SettingsResponse {
    fn from(s: &PlatformSettings) -> Self {
        Self {
            haiti: FeeConfigBody {
                platform_fee_rate: s.haiti.platform_fee_rate,
                settlement_hold_days: s.haiti.settlement_hold_days,
            },
            us_canada: FeeConfigBody {
                platform_fee_rate: s.us_canada.platform_fee_rate,
                settlement_hold_days: s.us_canada.settlement_hold_days,
            },
            minimum_payout: s.minimum_payout.into(),
            updated_at: s.updated_at.to_rfc3339(),
            updated_by: s.updated_by.map(|id| id.to_string()),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/settings` - Current platform settings.
async fn get_settings(State(state): State<AppState>, _admin: AdminUser) -> impl IntoResponse {
    match state.settings.get().await {
        Ok(settings) => {
            (StatusCode::OK, Json(SettingsResponse::from(settings.as_ref()))).into_response()
        }
        Err(e) => {
            error!(error = %e, "failed to load platform settings");
            (
                StatusCode::from_u16(e.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response()
        }
    }
}

/// PUT `/settings` - Apply an admin settings change and invalidate the
/// cache.
async fn update_settings(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let currency = match body.minimum_payout_currency.parse() {
        Ok(c) => c,
        Err(msg) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "VALIDATION_ERROR", "message": msg })),
            )
                .into_response();
        }
    };

    let update = SettingsUpdate {
        haiti: LocationFeeConfig {
            platform_fee_rate: body.haiti.platform_fee_rate,
            settlement_hold_days: body.haiti.settlement_hold_days,
        },
        us_canada: LocationFeeConfig {
            platform_fee_rate: body.us_canada.platform_fee_rate,
            settlement_hold_days: body.us_canada.settlement_hold_days,
        },
        minimum_payout: Money::new(body.minimum_payout_minor, currency),
    };

    let admin_id = AdminId::from_uuid(admin.admin_id());
    match state.settings.update(update, Some(admin_id)).await {
        Ok(settings) => {
            info!(admin = %admin_id, "platform settings updated");
            (StatusCode::OK, Json(SettingsResponse::from(settings.as_ref()))).into_response()
        }
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            if status.is_server_error() {
                error!(error = %e, "settings update failed");
            }
            (
                status,
                Json(json!({ "error": e.error_code(), "message": e.to_string() })),
            )
                .into_response()
        }
    }
}
