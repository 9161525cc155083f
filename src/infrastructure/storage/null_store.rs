//! No-op snapshot store for disabled persistence.

use super::service::{SnapshotStore, StorageResult};
use async_trait::async_trait;
use tracing::debug;

/// A snapshot store that never holds anything.
///
/// Every read is a miss and every write is discarded, so the directory is
/// fetched from the source once per process.
///
/// # Use Cases
///
/// - Deployments where snapshots must not outlive the process
/// - Tests that should always hit the source
pub struct NullSnapshotStore;

impl NullSnapshotStore {
    /// Creates a new NullSnapshotStore instance.
    pub fn new() -> Self {
        debug!("Using NullSnapshotStore (persistence disabled)");
        Self
    }
}

impl Default for NullSnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotStore for NullSnapshotStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl_seconds: Option<u64>) -> StorageResult<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> StorageResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "disabled"
    }
}
