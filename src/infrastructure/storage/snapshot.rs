//! Serialized form of a [`RegionDirectory`] as kept in a snapshot store.
//!
//! The payload is a JSON envelope tagged with a schema version:
//!
//! ```json
//! { "schema_version": 2, "loaded_at": 1718000000000,
//!   "cities": [...], "counties": [...], "townships": [...] }
//! ```
//!
//! `loaded_at` is epoch milliseconds. A payload with any other version, or one
//! that does not parse, is rejected so the caller can discard it; bumping
//! [`SCHEMA_VERSION`] is therefore enough to retire every older snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::{RegionDirectory, RegionRecord};

/// Store key under which the directory snapshot is kept.
pub const SNAPSHOT_KEY: &str = "regions_directory_snapshot";

/// Current envelope version. Version 1 was the untagged legacy format.
pub const SCHEMA_VERSION: u32 = 2;

/// Errors from encoding or decoding a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Snapshot is malformed: {0}")]
    Malformed(String),

    #[error("Snapshot schema version {found:?} does not match expected {expected}")]
    SchemaMismatch { found: Option<u32>, expected: u32 },

    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    schema_version: u32,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    loaded_at: DateTime<Utc>,
    cities: &'a [RegionRecord],
    counties: &'a [RegionRecord],
    townships: &'a [RegionRecord],
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    loaded_at: DateTime<Utc>,
    cities: Vec<RegionRecord>,
    counties: Vec<RegionRecord>,
    townships: Vec<RegionRecord>,
}

#[derive(Deserialize)]
struct VersionProbe {
    #[serde(default)]
    schema_version: Option<u32>,
}

/// Serializes a directory into a snapshot payload.
pub fn encode(directory: &RegionDirectory) -> Result<String, SnapshotError> {
    let envelope = EnvelopeRef {
        schema_version: SCHEMA_VERSION,
        loaded_at: directory.loaded_at,
        cities: &directory.cities,
        counties: &directory.counties,
        townships: &directory.townships,
    };

    serde_json::to_string(&envelope).map_err(|e| SnapshotError::Encode(e.to_string()))
}

/// Parses a snapshot payload, checking the schema version first.
///
/// # Errors
///
/// Returns [`SnapshotError::SchemaMismatch`] for payloads written by another
/// version and [`SnapshotError::Malformed`] for anything that does not parse.
pub fn decode(payload: &str) -> Result<RegionDirectory, SnapshotError> {
    let probe: VersionProbe =
        serde_json::from_str(payload).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

    if probe.schema_version != Some(SCHEMA_VERSION) {
        return Err(SnapshotError::SchemaMismatch {
            found: probe.schema_version,
            expected: SCHEMA_VERSION,
        });
    }

    let envelope: Envelope =
        serde_json::from_str(payload).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

    if let Some(record) = envelope
        .cities
        .iter()
        .chain(&envelope.counties)
        .chain(&envelope.townships)
        .find(|record| !record.has_name())
    {
        return Err(SnapshotError::Malformed(format!(
            "record without a name: {:?}",
            record
        )));
    }

    Ok(RegionDirectory::new(
        envelope.cities,
        envelope.counties,
        envelope.townships,
        envelope.loaded_at,
    ))
}
