//! Narrate Account Store
//!
//! This crate provides the account persistence layer for Narrate,
//! using SQLite via sqlx.

pub mod error;
pub mod models;
pub mod repository;
pub mod utils;

pub use error::DbError;
pub use models::*;
pub use repository::Database;
pub use utils::normalize_phone;

/// Re-export sqlx types for convenience
pub use sqlx::SqlitePool;
