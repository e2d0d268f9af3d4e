//! Durable key-value backends and the key layout shared by presets and projects.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::anyhow;

use crate::error::{Result, StoreError};

/// Generic durable key-value store the presets and projects are kept in.
///
/// Values are opaque serialized blobs. Implementations must report a full
/// store as `StoreError::QuotaExceeded` rather than dropping the write.
pub trait KeyValueStore: Send + Sync {
    /// Reads the blob stored under `key`, or `None` if there is none.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or would exceed the store's capacity.
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend write fails.
    fn remove(&self, key: &str) -> Result<bool>;

    /// Lists all keys starting with `prefix`, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}

/// Key of a tool's user preset collection.
pub fn presets_key(tool_name: &str) -> String {
    format!("{tool_name}:presets")
}

/// Key of a tool's recent-projects index.
pub fn recent_key(tool_name: &str) -> String {
    format!("{tool_name}:recent-projects")
}

/// Key of a saved project. Project ids are unique across tools.
pub fn project_key(project_id: &str) -> String {
    format!("project:{project_id}")
}

/// Prefix shared by every project key.
pub const PROJECT_KEY_PREFIX: &str = "project:";

/// In-process store, optionally capped at a byte quota.
///
/// The quota counts key and value bytes, the way browser local storage does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Creates an unbounded in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory store that rejects writes past `limit` bytes.
    pub fn with_quota(limit: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(limit),
        }
    }

    /// Total bytes currently used by keys and values.
    pub fn used_bytes(&self) -> Result<usize> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.iter().map(|(k, v)| k.len() + v.len()).sum())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;

        if let Some(limit) = self.quota {
            let used: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = used + key.len() + value.len();
            if needed > limit {
                return Err(StoreError::QuotaExceeded { needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries.remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| anyhow!("memory store lock poisoned"))?;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_set_and_get() {
        let store = MemoryStore::new();
        store.set("a", b"hello").unwrap();
        assert_eq!(store.get("a").unwrap().unwrap(), b"hello");
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("a", b"one").unwrap();
        store.set("a", b"two").unwrap();
        assert_eq!(store.get("a").unwrap().unwrap(), b"two");
    }

    #[test]
    fn test_remove() {
        let store = MemoryStore::new();
        store.set("a", b"x").unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_keys_by_prefix() {
        let store = MemoryStore::new();
        store.set("project:2", b"x").unwrap();
        store.set("project:1", b"x").unwrap();
        store.set("mosaic:presets", b"x").unwrap();
        store.set("projects-other", b"x").unwrap();

        let keys = store.keys(PROJECT_KEY_PREFIX).unwrap();
        assert_eq!(keys, vec!["project:1", "project:2"]);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let store = MemoryStore::with_quota(10);
        store.set("k", b"12345").unwrap();

        let err = store.set("j", b"123456789").unwrap_err();
        match err {
            StoreError::QuotaExceeded { needed, limit } => {
                assert_eq!(needed, 16);
                assert_eq!(limit, 10);
            }
            other => panic!("expected QuotaExceeded, got {other:?}"),
        }
        // Failed write left the store unchanged.
        assert!(store.get("j").unwrap().is_none());
        assert_eq!(store.used_bytes().unwrap(), 6);
    }

    #[test]
    fn test_quota_counts_replacement_not_addition() {
        let store = MemoryStore::with_quota(10);
        store.set("k", b"123456789").unwrap();
        // Replacing the same key only needs the new size.
        store.set("k", b"987654321").unwrap();
        assert_eq!(store.used_bytes().unwrap(), 10);
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(presets_key("cell-mosaic"), "cell-mosaic:presets");
        assert_eq!(recent_key("cell-mosaic"), "cell-mosaic:recent-projects");
        assert_eq!(project_key("abc"), "project:abc");
    }
}
