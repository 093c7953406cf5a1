//! In-process key-value backend
//!
//! Used for development setups without Redis and as the store behind unit
//! tests. Expiry is measured with `tokio::time::Instant`, so tests running
//! with a paused clock can advance past a TTL deterministically.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::backend::KeyValueStore;
use crate::error::KvError;

struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory key-value store
///
/// Expired entries are dropped lazily on access and during prefix scans.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        info!("Initialized in-memory key-value store");
        Self::default()
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|e| e.is_live(now)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove the entry if it has expired; returns the live value otherwise
    fn live_value(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), KvError> {
        debug!("Setting key {} with ttl {:?}", key, ttl);
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.entries.lock().insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.live_value(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        Ok(self.live_value(key).is_some())
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let now = Instant::now();
        Ok(self
            .entries
            .lock()
            .remove(key)
            .is_some_and(|entry| entry.is_live(now)))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| entry.is_live(now));

        let mut keys: Vec<String> = entries
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryStore::new();

        store.set("session:1", "active", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("session:1").await.unwrap().as_deref(), Some("active"));
        assert!(store.exists("session:1").await.unwrap());

        assert!(store.delete("session:1").await.unwrap());
        assert!(!store.delete("session:1").await.unwrap());
        assert!(store.get("session:1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryStore::new();

        store.set("verification:+1555", "111111", Duration::from_secs(60)).await.unwrap();
        store.set("verification:+1555", "222222", Duration::from_secs(60)).await.unwrap();

        assert_eq!(
            store.get("verification:+1555").await.unwrap().as_deref(),
            Some("222222")
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expiry() {
        let store = MemoryStore::new();
        store.set("otp", "123456", Duration::from_secs(300)).await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(store.exists("otp").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!store.exists("otp").await.unwrap());
        assert!(store.get("otp").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_scan_prefix_skips_expired() {
        let store = MemoryStore::new();
        store.set("session:2", "active", Duration::from_secs(10)).await.unwrap();
        store.set("session:1", "active", Duration::from_secs(100)).await.unwrap();
        store.set("password-reset:+1555", "000001", Duration::from_secs(100)).await.unwrap();

        let keys = store.scan_prefix("session:").await.unwrap();
        assert_eq!(keys, vec!["session:1", "session:2"]);

        tokio::time::advance(Duration::from_secs(11)).await;
        let keys = store.scan_prefix("session:").await.unwrap();
        assert_eq!(keys, vec!["session:1"]);
    }
}
