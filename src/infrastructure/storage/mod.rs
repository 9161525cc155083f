//! Persistence of directory snapshots between loads.
//!
//! Provides a [`SnapshotStore`] trait with three implementations:
//! - [`MemorySnapshotStore`] - Session-scoped store with a byte quota
//! - [`RedisSnapshotStore`] - Redis-backed store shared across processes
//! - [`NullSnapshotStore`] - No-op implementation for disabled persistence
//!
//! The [`snapshot`] module defines the versioned payload written to them.

mod memory_store;
mod null_store;
mod redis_store;
mod service;
pub mod snapshot;

pub use memory_store::{DEFAULT_QUOTA_BYTES, MemorySnapshotStore};
pub use null_store::NullSnapshotStore;
pub use redis_store::RedisSnapshotStore;
pub use service::{SnapshotStore, StorageError, StorageResult};

#[cfg(test)]
pub use service::MockSnapshotStore;
