//! Account API routes
//!
//! Authentication, self-service profile routes and admin account
//! management.

pub mod admin;
pub mod auth;
pub mod types;
pub mod user;

use axum::Router;

use crate::state::AppState;

pub use auth::{RequireAdmin, RequireAuth};

/// Create account API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(user::routes())
        .merge(admin::routes())
}
