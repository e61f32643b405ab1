//! Tikera Settlement & Payout API Server
//!
//! Main entry point for the settlement and payout engine.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tikera_api::{AppState, create_router, notify::LogNotifier};
use tikera_core::disbursement::DisbursementRouter;
use tikera_db::{SettingsRepository, connect};
use tikera_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tikera=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Settings cache (warmed on first read, invalidated on admin write)
    let settings = SettingsRepository::new(db.clone());

    // Disbursement providers
    let disbursement = DisbursementRouter::from_config(&config.providers);
    info!(
        prefunded = config.providers.prefunded_enabled,
        "Disbursement router configured"
    );

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        settings,
        disbursement: Arc::new(disbursement),
        notifier: Arc::new(LogNotifier),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
