//! Source trait definitions for the domain layer.
//!
//! Traits define the contract for external data; implementations live in
//! `crate::infrastructure::source`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! # Available Sources
//!
//! - [`RegionSource`] - Raw region lists per hierarchy level

pub mod region_source;

pub use region_source::{RegionSource, SourceError};

#[cfg(test)]
pub use region_source::MockRegionSource;
