//! JWT token management

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthError;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
}

impl Claims {
    /// Account ID carried in the subject
    pub fn account_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// JWT manager for token generation and validation
///
/// Tokens are HS256-signed and carry only the account ID. They say nothing
/// about whether the account is still logged in; that is the session
/// store's job.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry_hours,
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in_secs(&self) -> i64 {
        self.token_expiry_hours.saturating_mul(3600)
    }

    /// Generate a JWT token for an account
    pub fn generate_token(&self, account_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = Duration::try_hours(self.token_expiry_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                AuthError::TokenCreation(format!(
                    "token lifetime of {} hours is out of range",
                    self.token_expiry_hours
                ))
            })?;

        let claims = Claims {
            sub: account_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        debug!("Generating token for account: {}", account_id);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))
    }

    /// Validate a JWT token and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        // Check expiration
        let now = Utc::now().timestamp();
        if token_data.claims.exp <= now {
            return Err(AuthError::TokenExpired);
        }

        Ok(token_data.claims)
    }

    /// Validate a token and return the account ID it was issued for
    pub fn validate(&self, token: &str) -> Result<i64, AuthError> {
        self.validate_token(token)?.account_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_generation_and_validation() {
        let manager = JwtManager::new("test-secret-key", 24);

        let token = manager.generate_token(42).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(manager.validate(&token).unwrap(), 42);
        assert_eq!(manager.expires_in_secs(), 86400);
    }

    #[test]
    fn test_tokens_are_unique() {
        let manager = JwtManager::new("test-secret-key", 24);
        let first = manager.generate_token(1).unwrap();
        let second = manager.generate_token(1).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_token() {
        let manager = JwtManager::new("test-secret-key", 24);

        let result = manager.validate_token("invalid-token");
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtManager::new("secret-one", 24);
        let verifier = JwtManager::new("secret-two", 24);

        let token = issuer.generate_token(1).unwrap();
        assert!(matches!(verifier.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let manager = JwtManager::new("test-secret-key", -1);

        let token = manager.generate_token(1).unwrap();
        assert!(matches!(manager.validate(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_out_of_range_lifetime_fails_cleanly() {
        let manager = JwtManager::new("test-secret-key", i64::MAX);

        assert!(matches!(
            manager.generate_token(1),
            Err(AuthError::TokenCreation(_))
        ));
        assert_eq!(manager.expires_in_secs(), i64::MAX);
    }

    #[test]
    fn test_unsupported_algorithm_rejected() {
        let manager = JwtManager::new("test-secret-key", 24);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "1".to_string(),
            exp: now + 3600,
            iat: now,
            jti: "jti".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(manager.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_non_numeric_subject_rejected() {
        let manager = JwtManager::new("test-secret-key", 24);
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            exp: now + 3600,
            iat: now,
            jti: "jti".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key"),
        )
        .unwrap();

        assert!(matches!(manager.validate(&token), Err(AuthError::InvalidToken)));
    }
}
