//! The deduplicated region directory and its diagnostic snapshot.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::region::RegionRecord;
use crate::utils::normalize::normalize;

/// All three hierarchy levels, deduplicated, as of `loaded_at`.
///
/// A directory is built once per load and replaced wholesale; it is shared
/// between callers behind an `Arc` and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDirectory {
    pub cities: Vec<RegionRecord>,
    pub counties: Vec<RegionRecord>,
    pub townships: Vec<RegionRecord>,
    pub loaded_at: DateTime<Utc>,
}

impl RegionDirectory {
    pub fn new(
        cities: Vec<RegionRecord>,
        counties: Vec<RegionRecord>,
        townships: Vec<RegionRecord>,
        loaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            cities,
            counties,
            townships,
            loaded_at,
        }
    }

    /// Counties under `city`, or every county when `city` is absent.
    pub fn counties_in(&self, city: Option<&str>) -> Vec<RegionRecord> {
        match normalize(city) {
            None => self.counties.clone(),
            Some(city) => self
                .counties
                .iter()
                .filter(|c| c.city_key() == Some(city))
                .cloned()
                .collect(),
        }
    }

    /// Townships under `county`; without a county, townships attached
    /// directly to `city` (no county of their own); without either, all.
    pub fn townships_in(&self, county: Option<&str>, city: Option<&str>) -> Vec<RegionRecord> {
        match (normalize(county), normalize(city)) {
            (Some(county), _) => self
                .townships
                .iter()
                .filter(|t| t.county_key() == Some(county))
                .cloned()
                .collect(),
            (None, Some(city)) => self
                .townships
                .iter()
                .filter(|t| t.city_key() == Some(city) && t.county_key().is_none())
                .cloned()
                .collect(),
            (None, None) => self.townships.clone(),
        }
    }

    /// Milliseconds elapsed since `loaded_at`, clamped at zero.
    pub fn age_millis(&self, now: DateTime<Utc>) -> i64 {
        (now - self.loaded_at).num_milliseconds().max(0)
    }

    /// Returns true once the directory is strictly older than `ttl_millis`.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl_millis: i64) -> bool {
        self.age_millis(now) > ttl_millis
    }

    pub fn stats(&self, now: DateTime<Utc>) -> CacheStats {
        CacheStats {
            city_count: self.cities.len(),
            county_count: self.counties.len(),
            township_count: self.townships.len(),
            total: self.cities.len() + self.counties.len() + self.townships.len(),
            loaded_at: self.loaded_at,
            age_millis: self.age_millis(now),
        }
    }
}

/// Counts and age of the directory currently held in memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub city_count: usize,
    pub county_count: usize,
    pub township_count: usize,
    pub total: usize,
    pub loaded_at: DateTime<Utc>,
    pub age_millis: i64,
}
