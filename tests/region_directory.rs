mod common;

use chrono::Duration;
use std::sync::Arc;

use common::{StubSource, cache_with, sample_source, start_time, ManualClock};
use region_directory::application::services::CacheStatus;
use region_directory::domain::entities::{RegionDirectory, RegionLevel, RegionRecord};
use region_directory::error::RegionError;
use region_directory::infrastructure::storage::snapshot::{self, SNAPSHOT_KEY};
use region_directory::infrastructure::storage::{
    MemorySnapshotStore, NullSnapshotStore, SnapshotStore,
};

fn ttl() -> Duration {
    Duration::hours(24)
}

#[tokio::test]
async fn test_concurrent_callers_share_one_load() {
    let (source, gate) = sample_source().gated();
    let source = Arc::new(source);
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.ensure_loaded().await })
        })
        .collect();

    // Let every caller reach the in-flight load before releasing it.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(cache.status().await, CacheStatus::Loading);
    gate.send(true).unwrap();

    let mut directories = Vec::new();
    for handle in handles {
        directories.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(source.calls(), 3);
    for directory in &directories[1..] {
        assert!(Arc::ptr_eq(&directories[0], directory));
    }
    assert_eq!(cache.status().await, CacheStatus::Ready);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_failure() {
    let (source, gate) = sample_source().gated();
    source.fail_level(Some(RegionLevel::Township));
    let source = Arc::new(source);
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    let first = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_loaded().await }
    });
    let second = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_loaded().await }
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    gate.send(true).unwrap();

    let first = first.await.unwrap().unwrap_err();
    let second = second.await.unwrap().unwrap_err();

    assert_eq!(first, second);
    assert!(matches!(first, RegionError::SourceUnavailable(_)));
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_directory_expires_strictly_after_ttl() {
    let source = Arc::new(sample_source());
    let clock = ManualClock::at(start_time());
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        clock.clone(),
    );

    cache.ensure_loaded().await.unwrap();
    assert_eq!(source.calls(), 3);

    clock.advance(ttl());
    cache.cities().await.unwrap();
    assert_eq!(source.calls(), 3);
    assert_eq!(cache.status().await, CacheStatus::Ready);

    clock.advance(Duration::milliseconds(1));
    assert_eq!(cache.status().await, CacheStatus::Expired);

    let reloaded = cache.ensure_loaded().await.unwrap();
    assert_eq!(source.calls(), 6);
    assert_eq!(reloaded.loaded_at, start_time() + ttl() + Duration::milliseconds(1));
}

#[tokio::test]
async fn test_failed_level_leaves_no_partial_state() {
    let source = Arc::new(sample_source());
    source.fail_level(Some(RegionLevel::County));
    let store = MemorySnapshotStore::default();
    let cache = cache_with(
        source.clone(),
        Arc::new(store.clone()),
        ManualClock::at(start_time()),
    );

    let error = cache.ensure_loaded().await.unwrap_err();

    assert!(matches!(error, RegionError::SourceUnavailable(ref m) if m.contains("county")));
    assert_eq!(cache.status().await, CacheStatus::Empty);
    assert!(cache.cache_stats().await.is_none());
    assert!(store.get(SNAPSHOT_KEY).await.unwrap().is_none());

    // No retry on its own; the next call starts a new load.
    source.fail_level(None);
    let directory = cache.ensure_loaded().await.unwrap();
    assert_eq!(directory.counties.len(), 2);
}

#[tokio::test]
async fn test_failed_reload_keeps_expired_directory() {
    let source = Arc::new(sample_source());
    let clock = ManualClock::at(start_time());
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        clock.clone(),
    );

    cache.ensure_loaded().await.unwrap();
    clock.advance(ttl() + Duration::seconds(1));
    source.fail_level(Some(RegionLevel::City));

    assert!(cache.ensure_loaded().await.is_err());

    assert_eq!(cache.status().await, CacheStatus::Expired);
    let stats = cache.cache_stats().await.unwrap();
    assert_eq!(stats.loaded_at, start_time());
}

#[tokio::test]
async fn test_duplicate_cities_collapse_to_larger_count() {
    let source = Arc::new(StubSource::new(
        vec![
            RegionRecord::new("Guangzhou").with_village_count(10),
            RegionRecord::new("Foshan").with_village_count(7),
            RegionRecord::new("Guangzhou").with_village_count(25),
        ],
        vec![],
        vec![],
    ));
    let cache = cache_with(
        source,
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    let cities = cache.cities().await.unwrap();

    assert_eq!(
        cities,
        vec![
            RegionRecord::new("Guangzhou").with_village_count(25),
            RegionRecord::new("Foshan").with_village_count(7),
        ]
    );

    let stats = cache.cache_stats().await.unwrap();
    assert_eq!(stats.city_count, 2);
    assert_eq!(stats.total, 2);
}

#[tokio::test]
async fn test_same_county_name_in_two_cities_is_kept() {
    let source = Arc::new(StubSource::new(
        vec![],
        vec![
            RegionRecord::new("Xinhui").with_city("Jiangmen"),
            RegionRecord::new("Xinhui").with_city("Zhaoqing"),
            RegionRecord::new("Xinhui").with_city("Jiangmen"),
        ],
        vec![],
    ));
    let cache = cache_with(
        source,
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    assert_eq!(cache.counties(None).await.unwrap().len(), 2);
    assert_eq!(cache.counties(Some("Zhaoqing")).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_queries_filter_the_hierarchy() {
    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    let counties = cache.counties(Some("Guangzhou")).await.unwrap();
    assert_eq!(counties.len(), 2);

    let by_county = cache.townships(Some("Panyu"), None).await.unwrap();
    assert_eq!(by_county[0].name, "Shiqiao");

    let by_city = cache.townships(None, Some("Dongguan")).await.unwrap();
    assert_eq!(by_city[0].name, "Humen");

    assert!(cache.city_has_counties("Guangzhou").await.unwrap());
    assert!(!cache.city_has_counties("Dongguan").await.unwrap());

    // All of the above were served from one load.
    assert_eq!(source.calls(), 3);
}

#[tokio::test]
async fn test_second_instance_restores_from_snapshot() {
    let store = MemorySnapshotStore::default();
    let clock = ManualClock::at(start_time());

    let first = cache_with(
        Arc::new(sample_source()),
        Arc::new(store.clone()),
        clock.clone(),
    );
    let original = first.ensure_loaded().await.unwrap();

    clock.advance(Duration::hours(1));

    let offline = Arc::new(sample_source());
    offline.fail_level(Some(RegionLevel::City));
    let second = cache_with(offline.clone(), Arc::new(store.clone()), clock.clone());

    let restored = second.ensure_loaded().await.unwrap();

    assert_eq!(offline.calls(), 0);
    assert_eq!(*restored, *original);
    assert_eq!(second.cache_stats().await.unwrap().age_millis, 3_600_000);
}

#[tokio::test]
async fn test_expired_snapshot_is_refetched() {
    let store = MemorySnapshotStore::default();
    let stale = RegionDirectory::new(
        vec![RegionRecord::new("Stale")],
        vec![],
        vec![],
        start_time() - ttl() - Duration::milliseconds(1),
    );
    store
        .set(SNAPSHOT_KEY, &snapshot::encode(&stale).unwrap(), None)
        .await
        .unwrap();

    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(store.clone()),
        ManualClock::at(start_time()),
    );

    let directory = cache.ensure_loaded().await.unwrap();

    assert_eq!(source.calls(), 3);
    assert_eq!(directory.cities[0].name, "Guangzhou");

    let written = store.get(SNAPSHOT_KEY).await.unwrap().unwrap();
    assert_eq!(snapshot::decode(&written).unwrap().loaded_at, start_time());
}

#[tokio::test]
async fn test_legacy_snapshot_is_discarded() {
    let store = MemorySnapshotStore::default();
    store
        .set(
            SNAPSHOT_KEY,
            r#"{"cities":[{"name":"Old"}],"counties":[],"townships":[],"timestamp":1}"#,
            None,
        )
        .await
        .unwrap();

    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(store),
        ManualClock::at(start_time()),
    );

    let cities = cache.cities().await.unwrap();

    assert_eq!(source.calls(), 3);
    assert!(cities.iter().all(|c| c.name != "Old"));
}

#[tokio::test]
async fn test_quota_exceeded_only_skips_the_snapshot() {
    let store = MemorySnapshotStore::new(16);
    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(store.clone()),
        ManualClock::at(start_time()),
    );

    let directory = cache.ensure_loaded().await.unwrap();

    assert_eq!(directory.cities.len(), 2);
    assert_eq!(store.used_bytes(), 0);
}

#[tokio::test]
async fn test_invalidate_forces_reload_and_drops_snapshot() {
    let store = MemorySnapshotStore::default();
    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(store.clone()),
        ManualClock::at(start_time()),
    );

    cache.ensure_loaded().await.unwrap();
    assert!(store.get(SNAPSHOT_KEY).await.unwrap().is_some());

    cache.invalidate().await;

    assert_eq!(cache.status().await, CacheStatus::Empty);
    assert!(cache.cache_stats().await.is_none());
    assert!(store.get(SNAPSHOT_KEY).await.unwrap().is_none());

    cache.ensure_loaded().await.unwrap();
    assert_eq!(source.calls(), 6);
}

#[tokio::test]
async fn test_repeated_invalidate_is_harmless() {
    let store = MemorySnapshotStore::default();
    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(store.clone()),
        ManualClock::at(start_time()),
    );

    cache.invalidate().await;
    cache.invalidate().await;
    assert_eq!(cache.status().await, CacheStatus::Empty);
    assert_eq!(source.calls(), 0);

    assert_eq!(cache.cities().await.unwrap().len(), 2);
    assert_eq!(source.calls(), 3);

    cache.invalidate().await;
    cache.invalidate().await;
    assert_eq!(cache.status().await, CacheStatus::Empty);
    assert!(store.get(SNAPSHOT_KEY).await.unwrap().is_none());

    assert_eq!(cache.cities().await.unwrap().len(), 2);
    assert_eq!(source.calls(), 6);
    assert_eq!(cache.status().await, CacheStatus::Ready);
}

#[tokio::test]
async fn test_invalidate_during_load_is_not_overwritten() {
    let (source, gate) = sample_source().gated();
    let source = Arc::new(source);
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    let waiter = tokio::spawn({
        let cache = cache.clone();
        async move { cache.ensure_loaded().await }
    });

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    cache.invalidate().await;
    gate.send(true).unwrap();

    // The waiter still gets its result, but it is not installed.
    assert!(waiter.await.unwrap().is_ok());
    assert_eq!(cache.status().await, CacheStatus::Empty);
}

#[tokio::test]
async fn test_loaded_at_never_moves_backwards() {
    let source = Arc::new(sample_source());
    let clock = ManualClock::at(start_time());
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        clock.clone(),
    );

    cache.ensure_loaded().await.unwrap();
    cache.invalidate().await;

    clock.set(start_time() - Duration::minutes(5));
    let reloaded = cache.ensure_loaded().await.unwrap();

    assert_eq!(reloaded.loaded_at, start_time());
}

#[tokio::test]
async fn test_snapshot_older_than_installed_directory_is_ignored() {
    let store = MemorySnapshotStore::default();
    let source = Arc::new(sample_source());
    let clock = ManualClock::at(start_time());
    let cache = cache_with(source.clone(), Arc::new(store.clone()), clock.clone());

    cache.ensure_loaded().await.unwrap();
    cache.invalidate().await;

    // Another writer puts back an older snapshot.
    let older = RegionDirectory::new(
        vec![RegionRecord::new("Older")],
        vec![],
        vec![],
        start_time() - Duration::minutes(1),
    );
    store
        .set(SNAPSHOT_KEY, &snapshot::encode(&older).unwrap(), None)
        .await
        .unwrap();

    let directory = cache.ensure_loaded().await.unwrap();

    assert_eq!(source.calls(), 6);
    assert_eq!(directory.cities[0].name, "Guangzhou");
}

#[tokio::test]
async fn test_stats_never_trigger_a_load() {
    let source = Arc::new(sample_source());
    let cache = cache_with(
        source.clone(),
        Arc::new(NullSnapshotStore::new()),
        ManualClock::at(start_time()),
    );

    assert!(cache.cache_stats().await.is_none());
    assert!(cache.peek().await.is_none());
    assert_eq!(source.calls(), 0);
}
