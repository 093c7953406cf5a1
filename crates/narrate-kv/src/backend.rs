//! Key-value store trait

use async_trait::async_trait;
use std::time::Duration;

use crate::error::KvError;

/// Key-value store trait
///
/// Implementations hold short-lived string values with a per-key expiry.
/// Single-key operations are atomic; there are no multi-key transactions.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Set a value, replacing any previous value and resetting its expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError>;

    /// Get a value if present and not expired
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;

    /// Check if a key is present and not expired
    async fn exists(&self, key: &str) -> Result<bool, KvError>;

    /// Delete a key, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, KvError>;

    /// List every live key starting with `prefix`
    ///
    /// Keys expiring while the scan runs may or may not be included.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError>;
}

/// Convert a TTL to whole seconds, never below one
pub fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_seconds() {
        assert_eq!(ttl_seconds(Duration::from_secs(300)), 300);
        assert_eq!(ttl_seconds(Duration::from_millis(1500)), 1);
        assert_eq!(ttl_seconds(Duration::ZERO), 1);
    }
}
