//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the settlement and payout engine
//! - Gateway-identity middleware (authentication itself is upstream)
//! - Response types and error mapping

pub mod middleware;
pub mod notify;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tikera_core::disbursement::DisbursementRouter;
use tikera_core::payout::PayoutNotifier;
use tikera_db::SettingsRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Cached platform-settings repository.
    pub settings: SettingsRepository,
    /// Disbursement provider router.
    pub disbursement: Arc<DisbursementRouter>,
    /// Fire-and-forget payout notification sink.
    pub notifier: Arc<dyn PayoutNotifier>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
