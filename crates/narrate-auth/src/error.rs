//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use narrate_db::DbError;
use narrate_kv::KvError;
use narrate_notify::NotifyError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Account already exists")]
    DuplicateAccount,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing or malformed authorization header")]
    MissingCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Unauthenticated")]
    Unauthenticated,

    #[error("Account is blocked")]
    BlockedAccount,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid OTP")]
    Mismatch,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token creation error: {0}")]
    TokenCreation(String),
}

impl AuthError {
    /// HTTP status for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::DuplicateAccount => StatusCode::CONFLICT,
            AuthError::InvalidCredentials
            | AuthError::MissingCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Unauthenticated
            | AuthError::Mismatch => StatusCode::UNAUTHORIZED,
            AuthError::BlockedAccount | AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::NotFound(_) => StatusCode::NOT_FOUND,
            AuthError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::PasswordHash(_) | AuthError::TokenCreation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::DuplicateAccount => "DUPLICATE_ACCOUNT",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::MissingCredentials
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::BlockedAccount => "ACCOUNT_BLOCKED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::NotFound(_) => "NOT_FOUND",
            AuthError::Mismatch => "OTP_MISMATCH",
            AuthError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            AuthError::PasswordHash(_) | AuthError::TokenCreation(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show to clients
    ///
    /// Token and session failures collapse into one message so callers
    /// cannot tell which part of the check failed.
    pub fn public_message(&self) -> String {
        match self {
            AuthError::Validation(msg) => msg.clone(),
            AuthError::NotFound(msg) => msg.clone(),
            AuthError::MissingCredentials => "Missing or malformed authorization header".to_string(),
            AuthError::InvalidToken | AuthError::TokenExpired | AuthError::Unauthenticated => {
                "Invalid or expired session".to_string()
            }
            AuthError::ServiceUnavailable(_) => "Service temporarily unavailable".to_string(),
            AuthError::PasswordHash(_) | AuthError::TokenCreation(_) => "Internal error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DbError> for AuthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Duplicate(_) => AuthError::DuplicateAccount,
            other => AuthError::ServiceUnavailable(other.to_string()),
        }
    }
}

impl From<KvError> for AuthError {
    fn from(err: KvError) -> Self {
        AuthError::ServiceUnavailable(err.to_string())
    }
}

impl From<NotifyError> for AuthError {
    fn from(err: NotifyError) -> Self {
        AuthError::ServiceUnavailable(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = axum::Json(json!({
            "error": {
                "code": self.code(),
                "message": self.public_message(),
            }
        }));

        (self.status_code(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::DuplicateAccount.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::Mismatch.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::BlockedAccount.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::NotFound("otp".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::ServiceUnavailable("redis".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_token_failures_are_indistinguishable() {
        let expired = AuthError::TokenExpired;
        let invalid = AuthError::InvalidToken;
        let no_session = AuthError::Unauthenticated;

        assert_eq!(expired.public_message(), invalid.public_message());
        assert_eq!(invalid.public_message(), no_session.public_message());
        assert_eq!(expired.code(), no_session.code());
    }

    #[test]
    fn test_store_errors_map_to_unavailable() {
        let err: AuthError = KvError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, AuthError::ServiceUnavailable(_)));
        assert_eq!(err.public_message(), "Service temporarily unavailable");

        let err: AuthError = DbError::Duplicate("+1555".into()).into();
        assert!(matches!(err, AuthError::DuplicateAccount));
    }
}
