//! Core domain entities representing the region data model.
//!
//! Entities are plain data structures with small accessors; loading and
//! caching live in [`crate::application::services`].
//!
//! # Entity Types
//!
//! - [`RegionRecord`] - One administrative unit (city, county or township)
//! - [`RegionLevel`] - Which level of the hierarchy a record belongs to
//! - [`RegionDirectory`] - All three levels, deduplicated, with a load timestamp
//! - [`CacheStats`] - Diagnostic counts for a loaded directory

pub mod directory;
pub mod region;

pub use directory::{CacheStats, RegionDirectory};
pub use region::{RegionLevel, RegionRecord};
