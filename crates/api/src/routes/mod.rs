//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::identity_middleware};

pub mod disbursements;
pub mod earnings;
pub mod health;
pub mod payouts;
pub mod settings;

/// Creates the API router with protected routes behind the identity
/// middleware.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(_state: AppState) -> Router<AppState> {
    // Everything except health requires a gateway identity.
    let protected_routes = Router::new()
        .merge(earnings::routes())
        .merge(payouts::routes())
        .merge(disbursements::routes())
        .merge(settings::routes())
        .layer(middleware::from_fn(identity_middleware));

    Router::new().merge(health::routes()).merge(protected_routes)
}
