//! DTOs for region directory endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{CacheStats, RegionLevel, RegionRecord};
use crate::utils::region_display::{PathOptions, build_region_path};

/// Query parameters for `GET /api/regions/counties`.
#[derive(Debug, Default, Deserialize)]
pub struct CountiesQuery {
    pub city: Option<String>,
}

/// Query parameters for `GET /api/regions/townships`.
///
/// `county` takes precedence; `city` alone selects townships attached
/// directly to the city.
#[derive(Debug, Default, Deserialize)]
pub struct TownshipsQuery {
    pub county: Option<String>,
    pub city: Option<String>,
}

/// One region in a list response.
#[derive(Debug, Serialize)]
pub struct RegionItem {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub township: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub village_count: Option<u64>,

    /// Full hierarchy path, e.g. `Guangzhou > Panyu > Shiqiao`.
    pub path: String,
}

impl RegionItem {
    pub fn from_record(record: RegionRecord, level: RegionLevel) -> Self {
        let options = PathOptions {
            skip_city: false,
            ..PathOptions::default()
        };
        let path = build_region_path(&record.to_path(level), &options);

        Self {
            name: record.name,
            city: record.city,
            county: record.county,
            township: record.township,
            village_count: record.village_count,
            path,
        }
    }
}

/// List of regions at one level.
#[derive(Debug, Serialize)]
pub struct RegionListResponse {
    pub level: RegionLevel,
    pub count: usize,
    pub items: Vec<RegionItem>,
}

impl RegionListResponse {
    pub fn new(level: RegionLevel, records: Vec<RegionRecord>) -> Self {
        let items: Vec<RegionItem> = records
            .into_iter()
            .map(|record| RegionItem::from_record(record, level))
            .collect();

        Self {
            level,
            count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HasCountiesResponse {
    pub city: String,
    pub has_counties: bool,
}

/// Response for `GET /api/regions/stats`.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// `ready`, `expired` or `loading`.
    pub status: &'static str,
    pub cities: usize,
    pub counties: usize,
    pub townships: usize,
    pub total: usize,
    pub loaded_at: DateTime<Utc>,
    pub age_ms: i64,
    pub snapshot_backend: &'static str,
}

impl StatsResponse {
    pub fn new(status: &'static str, stats: CacheStats, snapshot_backend: &'static str) -> Self {
        Self {
            status,
            cities: stats.city_count,
            counties: stats.county_count,
            townships: stats.township_count,
            total: stats.total,
            loaded_at: stats.loaded_at,
            age_ms: stats.age_millis,
            snapshot_backend,
        }
    }
}
