//! Per-level deduplication of raw region lists.
//!
//! The region API occasionally returns the same unit more than once (for
//! example from two source tables with different village counts). Each level
//! is collapsed to one record per identity key:
//!
//! | Level      | Identity key                 |
//! |------------|------------------------------|
//! | `city`     | `name`                       |
//! | `county`   | `city`, `name`               |
//! | `township` | `city`, `county`, `name`     |
//!
//! Every part is normalized first, so a missing parent and an empty one
//! collide.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::domain::entities::{RegionLevel, RegionRecord};
use crate::utils::normalize::normalize;

/// Separator between key parts; the ASCII unit separator never occurs in names.
const KEY_SEPARATOR: char = '\u{1f}';

/// Result of deduplicating one level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduplicated {
    pub records: Vec<RegionRecord>,
    /// Number of input records dropped as duplicates.
    pub collisions: usize,
}

/// Builds the identity key of `record` at `level`.
pub fn identity_key(record: &RegionRecord, level: RegionLevel) -> String {
    let name = normalize(Some(record.name.as_str())).unwrap_or("");
    let city = record.city_key().unwrap_or("");
    let county = record.county_key().unwrap_or("");

    match level {
        RegionLevel::City => name.to_string(),
        RegionLevel::County => format!("{city}{KEY_SEPARATOR}{name}"),
        RegionLevel::Township => {
            format!("{city}{KEY_SEPARATOR}{county}{KEY_SEPARATOR}{name}")
        }
    }
}

/// Collapses `records` to one record per identity key.
///
/// Keys keep their first-seen order. On a collision the record with the
/// strictly larger `village_count` (missing counts as 0) takes the slot;
/// ties keep the earlier record.
pub fn deduplicate(records: &[RegionRecord], level: RegionLevel) -> Deduplicated {
    let mut slots: HashMap<String, usize> = HashMap::with_capacity(records.len());
    let mut kept: Vec<&RegionRecord> = Vec::with_capacity(records.len());

    for record in records {
        match slots.entry(identity_key(record, level)) {
            Entry::Vacant(entry) => {
                entry.insert(kept.len());
                kept.push(record);
            }
            Entry::Occupied(entry) => {
                let slot = &mut kept[*entry.get()];
                if record.weight() > slot.weight() {
                    *slot = record;
                }
            }
        }
    }

    Deduplicated {
        collisions: records.len() - kept.len(),
        records: kept.into_iter().cloned().collect(),
    }
}
