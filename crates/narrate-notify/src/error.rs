//! Notification error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway unauthorized")]
    Unauthorized,

    #[error("Gateway returned error: {status} - {message}")]
    GatewayError { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}
