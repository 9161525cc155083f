#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::watch;

use region_directory::application::services::RegionDirectoryCache;
use region_directory::domain::entities::{RegionLevel, RegionRecord};
use region_directory::domain::repositories::{RegionSource, SourceError};
use region_directory::infrastructure::storage::{NullSnapshotStore, SnapshotStore};
use region_directory::state::AppState;
use region_directory::utils::clock::Clock;

pub const TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Region source serving fixed lists, with call counting, injectable
/// failures and an optional gate that holds every fetch until opened.
pub struct StubSource {
    cities: Vec<RegionRecord>,
    counties: Vec<RegionRecord>,
    townships: Vec<RegionRecord>,
    calls: AtomicUsize,
    failing: Mutex<Option<RegionLevel>>,
    gate: Option<watch::Receiver<bool>>,
}

impl StubSource {
    pub fn new(
        cities: Vec<RegionRecord>,
        counties: Vec<RegionRecord>,
        townships: Vec<RegionRecord>,
    ) -> Self {
        Self {
            cities,
            counties,
            townships,
            calls: AtomicUsize::new(0),
            failing: Mutex::new(None),
            gate: None,
        }
    }

    /// Holds fetches until the returned sender publishes `true`.
    pub fn gated(mut self) -> (Self, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        self.gate = Some(rx);
        (self, tx)
    }

    /// Number of `fetch_region_list` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes fetches of `level` fail; `None` restores normal behaviour.
    pub fn fail_level(&self, level: Option<RegionLevel>) {
        *self.failing.lock().unwrap() = level;
    }
}

#[async_trait]
impl RegionSource for StubSource {
    async fn fetch_region_list(
        &self,
        level: RegionLevel,
        _parent: Option<String>,
    ) -> Result<Vec<RegionRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            let mut gate = gate.clone();
            gate.wait_for(|open| *open)
                .await
                .map_err(|_| SourceError::Transport("gate dropped".to_string()))?;
        }

        if *self.failing.lock().unwrap() == Some(level) {
            return Err(SourceError::Transport(format!("{} endpoint down", level)));
        }

        Ok(match level {
            RegionLevel::City => self.cities.clone(),
            RegionLevel::County => self.counties.clone(),
            RegionLevel::Township => self.townships.clone(),
        })
    }
}

/// Clock advanced by hand, in milliseconds.
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        })
    }

    pub fn advance(&self, by: ChronoDuration) {
        self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.millis.load(Ordering::SeqCst))
            .single()
            .unwrap_or_default()
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

/// Guangdong-flavoured sample hierarchy.
pub fn sample_source() -> StubSource {
    StubSource::new(
        vec![
            RegionRecord::new("Guangzhou").with_village_count(1_100),
            RegionRecord::new("Dongguan").with_village_count(350),
        ],
        vec![
            RegionRecord::new("Panyu")
                .with_city("Guangzhou")
                .with_village_count(177),
            RegionRecord::new("Huadu")
                .with_city("Guangzhou")
                .with_village_count(188),
        ],
        vec![
            RegionRecord::new("Shiqiao")
                .with_city("Guangzhou")
                .with_county("Panyu")
                .with_village_count(20),
            RegionRecord::new("Humen")
                .with_city("Dongguan")
                .with_village_count(30),
        ],
    )
}

pub fn cache_with(
    source: Arc<StubSource>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<ManualClock>,
) -> RegionDirectoryCache {
    RegionDirectoryCache::with_clock(source, store, TTL, clock)
}

/// App state over the sample source with persistence disabled.
pub fn create_test_state() -> (AppState, Arc<StubSource>) {
    let source = Arc::new(sample_source());
    let cache = RegionDirectoryCache::new(source.clone(), Arc::new(NullSnapshotStore::new()), TTL);
    (AppState::new(cache), source)
}
