//! Process-wide region directory with single-flight loading.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use metrics::counter;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::dedup::deduplicate;
use crate::domain::entities::{CacheStats, RegionDirectory, RegionLevel, RegionRecord};
use crate::domain::repositories::RegionSource;
use crate::error::RegionError;
use crate::infrastructure::storage::SnapshotStore;
use crate::infrastructure::storage::snapshot::{self, SNAPSHOT_KEY};
use crate::utils::clock::{Clock, SystemClock};

/// Default time-to-live of a loaded directory.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

type LoadResult = Result<Arc<RegionDirectory>, RegionError>;
type SharedLoad = Shared<BoxFuture<'static, LoadResult>>;

/// Externally observable lifecycle of the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Nothing loaded and no load in flight.
    Empty,
    /// One load is in flight; callers join it.
    Loading,
    /// A directory within its TTL is held.
    Ready,
    /// A directory is held but its TTL has elapsed; the next call reloads.
    Expired,
}

enum CacheState {
    Empty,
    Loading {
        epoch: u64,
        flight: SharedLoad,
        /// Expired directory being replaced; restored if the load fails.
        previous: Option<Arc<RegionDirectory>>,
    },
    Ready(Arc<RegionDirectory>),
}

struct Inner {
    state: CacheState,
    next_epoch: u64,
    /// Highest `loaded_at` installed so far; new stamps never go below it.
    last_loaded_at: Option<DateTime<Utc>>,
}

struct CacheCore {
    source: Arc<dyn RegionSource>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    inner: Mutex<Inner>,
}

/// Deduplicating, persisted loader for the city → county → township hierarchy.
///
/// All three levels are fetched together, deduplicated, and kept in memory
/// for the TTL. Concurrent callers that arrive while a load is running wait
/// on that same load and receive the same `Arc` (or the same error); a load
/// never starts twice at once.
///
/// A snapshot of every successful load is written to the [`SnapshotStore`]
/// so a fresh instance can start from it. Store failures are logged and
/// otherwise ignored: the cache works, only slower, with storage disabled.
///
/// Handles are cheap to clone and share one state.
///
/// # Example
///
/// ```rust,ignore
/// let cache = RegionDirectoryCache::new(source, store, DEFAULT_TTL);
/// let counties = cache.counties(Some("Guangzhou")).await?;
/// ```
#[derive(Clone)]
pub struct RegionDirectoryCache {
    core: Arc<CacheCore>,
}

impl RegionDirectoryCache {
    /// Creates an empty cache using the system clock.
    pub fn new(
        source: Arc<dyn RegionSource>,
        store: Arc<dyn SnapshotStore>,
        ttl: Duration,
    ) -> Self {
        Self::with_clock(source, store, ttl, Arc::new(SystemClock))
    }

    /// Creates an empty cache reading time from `clock`.
    pub fn with_clock(
        source: Arc<dyn RegionSource>,
        store: Arc<dyn SnapshotStore>,
        ttl: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            core: Arc::new(CacheCore {
                source,
                store,
                clock,
                ttl,
                inner: Mutex::new(Inner {
                    state: CacheState::Empty,
                    next_epoch: 0,
                    last_loaded_at: None,
                }),
            }),
        }
    }

    /// Returns a fresh directory, loading it if needed.
    ///
    /// A held directory within its TTL is returned immediately. Otherwise the
    /// caller joins the load in flight, or starts one: restore a fresh
    /// snapshot if the store has one, else fetch all three levels
    /// concurrently, deduplicate, and persist a new snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::SourceUnavailable`] if any level fetch fails or
    /// returns a record without a name. Nothing from the failed attempt is
    /// kept and no retry is made; the next call starts a new load.
    pub async fn ensure_loaded(&self) -> Result<Arc<RegionDirectory>, RegionError> {
        let flight = {
            let mut guard = self.core.inner.lock().await;
            let inner = &mut *guard;
            let now = self.core.clock.now();

            match &inner.state {
                CacheState::Ready(directory) if !self.core.is_expired(directory, now) => {
                    return Ok(Arc::clone(directory));
                }
                CacheState::Loading { flight, .. } => {
                    counter!("region_directory_coalesced_waiters_total").increment(1);
                    flight.clone()
                }
                CacheState::Ready(_) | CacheState::Empty => {
                    let previous = match &inner.state {
                        CacheState::Ready(expired) => Some(Arc::clone(expired)),
                        _ => None,
                    };
                    let epoch = inner.next_epoch;
                    inner.next_epoch += 1;

                    debug!(epoch, expired = previous.is_some(), "Starting region directory load");
                    let flight = Arc::clone(&self.core).load(epoch).boxed().shared();
                    inner.state = CacheState::Loading {
                        epoch,
                        flight: flight.clone(),
                        previous,
                    };
                    flight
                }
            }
        };

        flight.await
    }

    /// All deduplicated cities.
    pub async fn cities(&self) -> Result<Vec<RegionRecord>, RegionError> {
        Ok(self.ensure_loaded().await?.cities.clone())
    }

    /// Counties of `city`, or all counties when `city` is `None` or empty.
    pub async fn counties(&self, city: Option<&str>) -> Result<Vec<RegionRecord>, RegionError> {
        Ok(self.ensure_loaded().await?.counties_in(city))
    }

    /// Townships of `county`; else townships directly under `city` that have
    /// no county; else all townships.
    pub async fn townships(
        &self,
        county: Option<&str>,
        city: Option<&str>,
    ) -> Result<Vec<RegionRecord>, RegionError> {
        Ok(self.ensure_loaded().await?.townships_in(county, city))
    }

    /// Returns true if `city` has at least one county.
    pub async fn city_has_counties(&self, city: &str) -> Result<bool, RegionError> {
        Ok(!self.counties(Some(city)).await?.is_empty())
    }

    /// Drops the held directory and the persisted snapshot.
    ///
    /// The next [`Self::ensure_loaded`] starts a new load. A load already in
    /// flight still completes for its waiters but is not installed.
    pub async fn invalidate(&self) {
        {
            let mut inner = self.core.inner.lock().await;
            inner.state = CacheState::Empty;
        }

        if let Err(e) = self.core.store.remove(SNAPSHOT_KEY).await {
            warn!("Failed to remove region snapshot: {}", e);
        }

        counter!("region_directory_invalidations_total").increment(1);
        info!("Region directory invalidated");
    }

    /// Counts and age of the held directory, or `None` when nothing is held.
    ///
    /// Never triggers a load.
    pub async fn cache_stats(&self) -> Option<CacheStats> {
        let now = self.core.clock.now();
        self.peek().await.map(|directory| directory.stats(now))
    }

    /// The held directory without waiting or loading, even if expired.
    pub async fn peek(&self) -> Option<Arc<RegionDirectory>> {
        let inner = self.core.inner.lock().await;
        match &inner.state {
            CacheState::Empty => None,
            CacheState::Loading { previous, .. } => previous.clone(),
            CacheState::Ready(directory) => Some(Arc::clone(directory)),
        }
    }

    pub async fn status(&self) -> CacheStatus {
        let inner = self.core.inner.lock().await;
        match &inner.state {
            CacheState::Empty => CacheStatus::Empty,
            CacheState::Loading { .. } => CacheStatus::Loading,
            CacheState::Ready(directory) => {
                if self.core.is_expired(directory, self.core.clock.now()) {
                    CacheStatus::Expired
                } else {
                    CacheStatus::Ready
                }
            }
        }
    }

    /// Checks if the snapshot store is reachable.
    pub async fn store_healthy(&self) -> bool {
        self.core.store.health_check().await
    }

    pub fn store_backend(&self) -> &'static str {
        self.core.store.backend_name()
    }
}

impl CacheCore {
    fn ttl_millis(&self) -> i64 {
        i64::try_from(self.ttl.as_millis()).unwrap_or(i64::MAX)
    }

    fn is_expired(&self, directory: &RegionDirectory, now: DateTime<Utc>) -> bool {
        directory.is_expired(now, self.ttl_millis())
    }

    /// One load cycle. Runs at most once per epoch, shared by all waiters.
    async fn load(self: Arc<Self>, epoch: u64) -> LoadResult {
        counter!("region_directory_loads_total").increment(1);

        let outcome = match self.restore_snapshot().await {
            Some(directory) => Ok(Arc::new(directory)),
            None => self.fetch_and_store().await.map(Arc::new),
        };

        if let Err(e) = &outcome {
            counter!("region_directory_load_failures_total").increment(1);
            warn!(epoch, "Region directory load failed: {}", e);
        }

        self.install(epoch, &outcome).await;
        outcome
    }

    /// Moves the state out of `Loading` if this epoch still owns it.
    async fn install(&self, epoch: u64, outcome: &LoadResult) {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;

        let owned = matches!(&inner.state, CacheState::Loading { epoch: current, .. } if *current == epoch);
        if !owned {
            debug!(epoch, "Region directory load superseded by invalidate; not installed");
            return;
        }

        let state = std::mem::replace(&mut inner.state, CacheState::Empty);
        inner.state = match outcome {
            Ok(directory) => {
                inner.last_loaded_at = Some(
                    inner
                        .last_loaded_at
                        .map_or(directory.loaded_at, |last| last.max(directory.loaded_at)),
                );
                info!(
                    cities = directory.cities.len(),
                    counties = directory.counties.len(),
                    townships = directory.townships.len(),
                    "Region directory ready"
                );
                CacheState::Ready(Arc::clone(directory))
            }
            Err(_) => match state {
                CacheState::Loading {
                    previous: Some(previous),
                    ..
                } => CacheState::Ready(previous),
                _ => CacheState::Empty,
            },
        };
    }

    /// Reads the persisted snapshot if it is usable.
    ///
    /// Unreadable, wrong-version and expired snapshots are removed and
    /// reported as a miss.
    async fn restore_snapshot(&self) -> Option<RegionDirectory> {
        let payload = match self.store.get(SNAPSHOT_KEY).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                counter!("region_directory_snapshot_misses_total").increment(1);
                return None;
            }
            Err(e) => {
                counter!("region_directory_snapshot_misses_total").increment(1);
                warn!("Failed to read region snapshot, treating as miss: {}", e);
                return None;
            }
        };

        let directory = match snapshot::decode(&payload) {
            Ok(directory) => directory,
            Err(e) => {
                warn!("Discarding unusable region snapshot: {}", e);
                self.discard_snapshot().await;
                return None;
            }
        };

        if self.is_expired(&directory, self.clock.now()) {
            debug!("Region snapshot from {} has expired", directory.loaded_at);
            self.discard_snapshot().await;
            return None;
        }

        let last_loaded_at = self.inner.lock().await.last_loaded_at;
        if last_loaded_at.is_some_and(|last| directory.loaded_at < last) {
            debug!("Region snapshot is older than the last installed directory; ignoring");
            return None;
        }

        counter!("region_directory_snapshot_hits_total").increment(1);
        debug!("Restored region directory from snapshot ({})", directory.loaded_at);
        Some(directory)
    }

    async fn discard_snapshot(&self) {
        if let Err(e) = self.store.remove(SNAPSHOT_KEY).await {
            warn!("Failed to remove region snapshot: {}", e);
        }
    }

    /// Fetches, validates and deduplicates all three levels, then persists them.
    async fn fetch_and_store(&self) -> Result<RegionDirectory, RegionError> {
        let (cities, counties, townships) = tokio::try_join!(
            self.fetch_level(RegionLevel::City),
            self.fetch_level(RegionLevel::County),
            self.fetch_level(RegionLevel::Township),
        )?;

        let now = self.clock.now();
        let loaded_at = match self.inner.lock().await.last_loaded_at {
            Some(last) if last > now => last,
            _ => now,
        };

        let directory = RegionDirectory::new(cities, counties, townships, loaded_at);
        self.persist(&directory).await;
        Ok(directory)
    }

    async fn fetch_level(&self, level: RegionLevel) -> Result<Vec<RegionRecord>, RegionError> {
        let records = self
            .source
            .fetch_region_list(level, None)
            .await
            .map_err(|e| RegionError::SourceUnavailable(format!("{} list: {}", level, e)))?;

        if let Some(position) = records.iter().position(|r| !r.has_name()) {
            return Err(RegionError::SourceUnavailable(format!(
                "{} list: record {} has no name",
                level, position
            )));
        }

        let deduplicated = deduplicate(&records, level);
        if deduplicated.collisions > 0 {
            debug!(
                "Removed {} duplicate {} records ({} kept)",
                deduplicated.collisions,
                level,
                deduplicated.records.len()
            );
        }

        Ok(deduplicated.records)
    }

    async fn persist(&self, directory: &RegionDirectory) {
        let payload = match snapshot::encode(directory) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode region snapshot: {}", e);
                return;
            }
        };

        let ttl_seconds = self.ttl.as_secs().max(1);
        if let Err(e) = self.store.set(SNAPSHOT_KEY, &payload, Some(ttl_seconds)).await {
            warn!("Failed to persist region snapshot: {}", e);
        }
    }
}
