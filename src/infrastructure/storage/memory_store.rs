//! In-process snapshot store with a byte quota.

use super::service::{SnapshotStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Default quota, matching the usual per-origin session storage limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Session-scoped key/value store bounded by a byte quota.
///
/// Contents live as long as the process. Clones share the same backing map,
/// so several caches built from clones of one store read and overwrite each
/// other's snapshots (last writer wins).
///
/// Usage is the sum of key and value lengths in bytes.
#[derive(Clone)]
pub struct MemorySnapshotStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: usize,
}

impl MemorySnapshotStore {
    pub fn new(quota_bytes: usize) -> Self {
        debug!("Using MemorySnapshotStore (quota: {} bytes)", quota_bytes);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            quota_bytes,
        }
    }

    /// Bytes currently held.
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| usage(&entries))
            .unwrap_or(0)
    }
}

impl Default for MemorySnapshotStore {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA_BYTES)
    }
}

fn usage(entries: &HashMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

fn poisoned() -> StorageError {
    StorageError::Unavailable("memory store lock poisoned".to_string())
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str, _ttl_seconds: Option<u64>) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;

        let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
        let required = usage(&entries) - replaced + key.len() + value.len();
        if required > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                required,
                quota: self.quota_bytes,
            });
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.entries.read().is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
