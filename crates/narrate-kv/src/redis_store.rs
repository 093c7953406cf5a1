//! Redis key-value backend
//!
//! Uses a multiplexed `ConnectionManager`, which reconnects on its own
//! after transient failures. Errors are surfaced to the caller without
//! retrying.

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client, ErrorKind, RedisError};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::backend::{KeyValueStore, ttl_seconds};
use crate::error::KvError;

/// Number of keys requested per SCAN round trip
const SCAN_BATCH_SIZE: usize = 100;

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Connection URL, e.g. `redis://:password@localhost:6379/0`
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
        }
    }
}

impl From<RedisError> for KvError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_dropped()
            || err.is_connection_refusal()
            || err.is_timeout()
        {
            KvError::Unavailable(err.to_string())
        } else if err.kind() == ErrorKind::TypeError {
            KvError::InvalidValue {
                key: String::new(),
                message: err.to_string(),
            }
        } else {
            KvError::Backend(err.to_string())
        }
    }
}

/// Redis key-value store
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis and verify the connection with a PING
    pub async fn new(config: RedisConfig) -> Result<Self, KvError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| KvError::Configuration(e.to_string()))?;
        let mut conn = ConnectionManager::new(client).await?;

        let _: String = ::redis::cmd("PING").query_async(&mut conn).await?;
        info!("Connected to Redis");

        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds(ttl)).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        let found: bool = conn.exists(key).await?;
        Ok(found)
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.conn.clone();
        let pattern = scan_pattern(prefix);

        // SCAN may return a key more than once across pages
        let mut keys = BTreeSet::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = ::redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH_SIZE)
                .query_async(&mut conn)
                .await?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!("Scanned {} keys with prefix {}", keys.len(), prefix);
        Ok(keys.into_iter().collect())
    }
}

/// Build a SCAN MATCH pattern for a literal prefix
fn scan_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_pattern() {
        assert_eq!(scan_pattern("session:"), "session:*");
        assert_eq!(scan_pattern("odd*key?"), "odd\\*key\\?*");
    }

    #[test]
    fn test_default_config() {
        assert_eq!(RedisConfig::default().url, "redis://localhost:6379");
    }
}
