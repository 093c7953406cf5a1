//! Key-value store error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Key-value backend unavailable: {0}")]
    Unavailable(String),

    #[error("Key-value backend error: {0}")]
    Backend(String),

    #[error("Invalid value for key {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
