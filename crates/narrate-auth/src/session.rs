//! Server-side session registry
//!
//! A session is a `session:<account id>` key in the key-value store. Its
//! presence is what makes an otherwise valid token usable.

use narrate_kv::KeyValueStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::AuthError;

const SESSION_PREFIX: &str = "session:";
const SESSION_MARKER: &str = "active";

/// Default session lifetime
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(24 * 3600);

fn session_key(account_id: i64) -> String {
    format!("{}{}", SESSION_PREFIX, account_id)
}

/// Key-value backed registry of logged-in accounts
#[derive(Clone)]
pub struct SessionStore {
    kv: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Open (or refresh) the session for an account
    pub async fn open(&self, account_id: i64, ttl: Duration) -> Result<(), AuthError> {
        debug!("Opening session for account {} ({:?})", account_id, ttl);
        self.kv.set(&session_key(account_id), SESSION_MARKER, ttl).await?;
        Ok(())
    }

    pub async fn exists(&self, account_id: i64) -> Result<bool, AuthError> {
        Ok(self.kv.exists(&session_key(account_id)).await?)
    }

    /// Close the session; closing an absent session is not an error
    pub async fn close(&self, account_id: i64) -> Result<(), AuthError> {
        let removed = self.kv.delete(&session_key(account_id)).await?;
        debug!("Closed session for account {} (was open: {})", account_id, removed);
        Ok(())
    }

    /// IDs of every account with a live session
    pub async fn list_active_account_ids(&self) -> Result<BTreeSet<i64>, AuthError> {
        let keys = self.kv.scan_prefix(SESSION_PREFIX).await?;

        Ok(keys
            .iter()
            .filter_map(|key| key.strip_prefix(SESSION_PREFIX))
            .filter_map(|id| id.parse().ok())
            .collect())
    }
}
