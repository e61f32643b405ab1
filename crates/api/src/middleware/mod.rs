//! Request middleware.

pub mod auth;

pub use auth::{AdminUser, AuthUser, identity_middleware};
