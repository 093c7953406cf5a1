//! Request-time access checks
//!
//! A request is authenticated only when its bearer token verifies *and* the
//! account still holds a session. The admin check additionally re-reads the
//! account so role changes apply on the next request.

use narrate_db::Database;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::AuthError;
use crate::jwt::JwtManager;
use crate::session::SessionStore;

/// Identity resolved by [`AccessGuard`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
}

/// Extract bearer token from authorization header
///
/// The header must be exactly `Bearer <token>`.
pub fn extract_bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MissingCredentials),
    }
}

/// Composes token validation, session lookup and the admin flag
#[derive(Clone)]
pub struct AccessGuard {
    jwt: Arc<JwtManager>,
    sessions: SessionStore,
    db: Database,
}

impl AccessGuard {
    pub fn new(jwt: Arc<JwtManager>, sessions: SessionStore, db: Database) -> Self {
        Self { jwt, sessions, db }
    }

    /// Resolve the caller from an `Authorization` header value
    pub async fn authenticate(&self, header: Option<&str>) -> Result<AuthUser, AuthError> {
        let header = header.ok_or(AuthError::MissingCredentials)?;
        let token = extract_bearer_token(header)?;

        let account_id = self.jwt.validate(token).map_err(|e| {
            debug!("Token rejected: {}", e);
            AuthError::Unauthenticated
        })?;

        if !self.sessions.exists(account_id).await? {
            debug!("No active session for account {}", account_id);
            return Err(AuthError::Unauthenticated);
        }

        Ok(AuthUser { id: account_id })
    }

    /// Like [`authenticate`](Self::authenticate), but also require the admin flag
    pub async fn authorize_admin(&self, header: Option<&str>) -> Result<AuthUser, AuthError> {
        let user = self.authenticate(header).await?;

        let account = self
            .db
            .get_account_by_id(user.id)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        if !account.is_admin {
            debug!("Account {} is not an admin", user.id);
            return Err(AuthError::Forbidden);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{AccessUpdate, AuthService, AuthSettings};
    use narrate_kv::{KeyValueStore, MemoryStore};
    use narrate_notify::RecordingNotifier;

    async fn setup() -> (AuthService, AccessGuard) {
        let db = Database::in_memory().await.unwrap();
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let jwt = Arc::new(JwtManager::new("test-secret", 24));
        let auth = AuthService::new(
            db.clone(),
            kv,
            jwt.clone(),
            Arc::new(RecordingNotifier::new()),
            AuthSettings::default(),
        );
        let guard = AccessGuard::new(jwt, auth.sessions().clone(), db);
        (auth, guard)
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def").unwrap(), "abc.def");

        for header in ["", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b", "Bearer  abc"] {
            assert!(
                matches!(extract_bearer_token(header), Err(AuthError::MissingCredentials)),
                "accepted {:?}",
                header
            );
        }
    }

    #[tokio::test]
    async fn test_missing_header() {
        let (_, guard) = setup().await;
        let result = guard.authenticate(None).await;
        assert!(matches!(result, Err(AuthError::MissingCredentials)));
    }

    #[tokio::test]
    async fn test_garbage_token_is_unauthenticated() {
        let (_, guard) = setup().await;
        let result = guard.authenticate(Some("Bearer not-a-jwt")).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_valid_token_without_session() {
        let (auth, guard) = setup().await;
        let id = auth.signup("Alice", "+15550001", "pw123").await.unwrap();
        let token = auth.jwt().generate_token(id).unwrap();

        let result = guard.authenticate(Some(&bearer(&token))).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_alice_scenario() {
        let (auth, guard) = setup().await;

        let id = auth.signup("Alice", "+15550001", "pw123").await.unwrap();
        let token = auth.login("+15550001", "pw123").await.unwrap().token;

        let user = guard.authenticate(Some(&bearer(&token))).await.unwrap();
        assert_eq!(user.id, id);

        auth.logout(id).await.unwrap();

        let result = guard.authenticate(Some(&bearer(&token))).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_admin_gate() {
        let (auth, guard) = setup().await;
        let id = auth.signup("Alice", "+15550001", "pw123").await.unwrap();
        let header = bearer(&auth.login("+15550001", "pw123").await.unwrap().token);

        guard.authenticate(Some(&header)).await.unwrap();
        let result = guard.authorize_admin(Some(&header)).await;
        assert!(matches!(result, Err(AuthError::Forbidden)));

        // Promotion applies to the very next request
        auth.update_access(
            id,
            AccessUpdate {
                is_admin: Some(true),
                ..AccessUpdate::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(guard.authorize_admin(Some(&header)).await.unwrap().id, id);
    }

    #[tokio::test]
    async fn test_admin_gate_deleted_account() {
        let (auth, guard) = setup().await;
        let admin = auth
            .create_account("Root", "+15550009", "rootpw", true)
            .await
            .unwrap();
        let header = bearer(&auth.login("+15550009", "rootpw").await.unwrap().token);
        guard.authorize_admin(Some(&header)).await.unwrap();

        auth.remove_account(admin.id).await.unwrap();

        let result = guard.authorize_admin(Some(&header)).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_blocked_account_keeps_session() {
        let (auth, guard) = setup().await;
        let id = auth.signup("Alice", "+15550001", "pw123").await.unwrap();
        let header = bearer(&auth.login("+15550001", "pw123").await.unwrap().token);

        auth.set_blocked(id, true).await.unwrap();

        assert_eq!(guard.authenticate(Some(&header)).await.unwrap().id, id);
    }
}
