//! HTTP server initialization and runtime setup.
//!
//! Builds the region source and snapshot store, wires the directory cache and
//! runs the Axum server until shutdown.

use crate::application::services::RegionDirectoryCache;
use crate::config::Config;
use crate::infrastructure::source::HttpRegionSource;
use crate::infrastructure::storage::{
    MemorySnapshotStore, NullSnapshotStore, RedisSnapshotStore, SnapshotStore,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;

/// Builds the directory cache described by `config`.
///
/// Uses Redis for snapshots when configured and reachable, otherwise a
/// process-local store bounded by `snapshot_quota_bytes` (none at all when
/// the quota is 0).
///
/// # Errors
///
/// Returns an error if the region API client cannot be built.
pub async fn build_cache(config: &Config) -> Result<RegionDirectoryCache> {
    let source = HttpRegionSource::new(&config.region_api_url, config.region_api_timeout())?;

    let store: Arc<dyn SnapshotStore> = if let Some(redis_url) = &config.redis_url {
        match RedisSnapshotStore::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Snapshot store enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to connect to Redis: {}. Using in-memory snapshots.",
                    e
                );
                local_store(config.snapshot_quota_bytes)
            }
        }
    } else {
        local_store(config.snapshot_quota_bytes)
    };

    Ok(RegionDirectoryCache::new(
        Arc::new(source),
        store,
        config.cache_ttl(),
    ))
}

fn local_store(quota_bytes: usize) -> Arc<dyn SnapshotStore> {
    if quota_bytes == 0 {
        tracing::info!("Snapshot store disabled");
        Arc::new(NullSnapshotStore::new())
    } else {
        tracing::info!("Snapshot store: in-memory ({} bytes)", quota_bytes);
        Arc::new(MemorySnapshotStore::new(quota_bytes))
    }
}

/// Runs the HTTP server with the given configuration.
///
/// The directory is not loaded at startup; the first request (or health
/// check) triggers the load.
///
/// # Errors
///
/// Returns an error if:
/// - The region API client cannot be built
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let cache = build_cache(&config).await?;
    let state = AppState::new(cache);

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
