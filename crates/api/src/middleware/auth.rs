//! Gateway-identity middleware for protected routes.
//!
//! Authentication and session management live in the upstream gateway,
//! which injects the caller's identity as trusted headers. This
//! middleware parses them into request extensions; handlers use the
//! `AuthUser` / `AdminUser` extractors.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use uuid::Uuid;

/// Header carrying the authenticated caller's id.
pub const USER_ID_HEADER: &str = "x-tikera-user-id";

/// Header carrying the caller's role.
pub const ROLE_HEADER: &str = "x-tikera-role";

/// Caller role as asserted by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Platform administrator (admin console).
    Admin,
    /// Event organizer (organizer dashboard).
    Organizer,
}

/// Identity injected by the upstream gateway.
#[derive(Debug, Clone, Copy)]
pub struct GatewayIdentity {
    /// Authenticated user id.
    pub user_id: Uuid,
    /// Asserted role.
    pub role: Role,
}

/// Middleware that parses the gateway identity headers.
///
/// Requests without a well-formed identity are rejected before reaching
/// any handler.
pub async fn identity_middleware(mut request: Request, next: Next) -> Response {
    let headers = request.headers();

    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok());

    let role = headers
        .get(ROLE_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| match s {
            "admin" => Some(Role::Admin),
            "organizer" => Some(Role::Organizer),
            _ => None,
        });

    match (user_id, role) {
        (Some(user_id), Some(role)) => {
            request
                .extensions_mut()
                .insert(GatewayIdentity { user_id, role });
            next.run(request).await
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_identity",
                "message": "Gateway identity headers are required"
            })),
        )
            .into_response(),
    }
}

/// Extractor for the authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let user_id = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub GatewayIdentity);

impl AuthUser {
    /// Returns the authenticated user id.
    #[must_use]
    pub const fn user_id(&self) -> Uuid {
        self.0.user_id
    }

    /// Returns true if the caller is a platform administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.0.role == Role::Admin
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<GatewayIdentity>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "missing_identity",
                        "message": "Request did not pass the identity middleware"
                    })),
                )
                    .into_response()
            })
    }
}

/// Extractor that additionally requires the admin role.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub GatewayIdentity);

impl AdminUser {
    /// Returns the administrator's user id.
    #[must_use]
    pub const fn admin_id(&self) -> Uuid {
        self.0.user_id
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        if auth.is_admin() {
            Ok(Self(auth.0))
        } else {
            Err((
                StatusCode::FORBIDDEN,
                Json(json!({
                    "error": "forbidden",
                    "message": "This operation requires the admin role"
                })),
            )
                .into_response())
        }
    }
}
