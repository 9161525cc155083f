//! Redis-backed snapshot store.

use super::service::{SnapshotStore, StorageError, StorageResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info};

/// Redis snapshot store shared by every process pointing at the same database.
///
/// Uses `ConnectionManager` for connection reuse and reconnects. Values are
/// written with `SET EX`, so Redis drops stale snapshots on its own; the
/// cache still checks snapshot age on read.
pub struct RedisSnapshotStore {
    client: ConnectionManager,
    default_ttl: u64,
    key_prefix: String,
}

impl RedisSnapshotStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Arguments
    ///
    /// - `redis_url` - Redis connection string (e.g., `"redis://localhost:6379"`)
    /// - `default_ttl_seconds` - Expiry applied when [`SnapshotStore::set`] is
    ///   called without a TTL
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> StorageResult<Self> {
        info!("Connecting to Redis snapshot store");

        let client = Client::open(redis_url).map_err(|e| {
            StorageError::Unavailable(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            StorageError::Unavailable(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Redis PING failed: {}", e)))?;

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds.max(1),
            key_prefix: "region-directory:".to_string(),
        })
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let value = conn
            .get::<_, Option<String>>(&full_key)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Redis GET {}: {}", full_key, e)))?;

        debug!(
            "Snapshot store {}: {}",
            if value.is_some() { "HIT" } else { "MISS" },
            full_key
        );
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StorageResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();
        let ttl_seconds = ttl_seconds.unwrap_or(self.default_ttl).max(1);

        conn.set_ex::<_, _, ()>(&full_key, value, ttl_seconds)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Redis SET {}: {}", full_key, e)))?;

        debug!(
            "Snapshot store SET: {} ({} bytes, TTL: {}s)",
            full_key,
            value.len(),
            ttl_seconds
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let deleted = conn
            .del::<_, i32>(&full_key)
            .await
            .map_err(|e| StorageError::Unavailable(format!("Redis DEL {}: {}", full_key, e)))?;

        if deleted > 0 {
            debug!("Snapshot store DEL: {}", full_key);
        }
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
