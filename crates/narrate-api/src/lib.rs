//! Narrate REST API
//!
//! This crate provides the Axum-based HTTP surface for Narrate accounts:
//! signup and login, OTP flows, self-service profile routes and the admin
//! account management routes.

pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use extract::{JsonBody, PathParam};
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
