//! Snapshot store trait and error types.

use async_trait::async_trait;

/// Errors that can occur during snapshot store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend could not be reached or rejected the operation.
    #[error("Snapshot store unavailable: {0}")]
    Unavailable(String),

    /// Writing the value would exceed the store's capacity.
    #[error("Snapshot store quota exceeded: {required} bytes needed, {quota} allowed")]
    QuotaExceeded { required: usize, quota: usize },
}

/// Result type for snapshot store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// String key/value store holding serialized directory snapshots.
///
/// Implementations report failures honestly; the caller
/// ([`crate::application::services::RegionDirectoryCache`]) treats every
/// failure as a cache miss or a skipped write, so a broken store only makes
/// loads slower.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::MemorySnapshotStore`] - Session-scoped, quota-bounded
/// - [`crate::infrastructure::storage::RedisSnapshotStore`] - Shared across processes
/// - [`crate::infrastructure::storage::NullSnapshotStore`] - Storage disabled
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Reads a value.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))` if the key is present
    /// - `Ok(None)` if it is not
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    ///
    /// `ttl_seconds` is a hint for backends with native expiry; the cache
    /// checks snapshot age itself regardless.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::QuotaExceeded`] when the value does not fit.
    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StorageResult<()>;

    /// Removes a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;

    /// Checks if the backend is reachable.
    ///
    /// Used by the health endpoint to report store status.
    async fn health_check(&self) -> bool;

    /// Short backend label for logs and health output.
    fn backend_name(&self) -> &'static str;
}
