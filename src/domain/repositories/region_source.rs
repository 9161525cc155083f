//! Source trait for raw region lists.

use crate::domain::entities::{RegionLevel, RegionRecord};
use async_trait::async_trait;

/// Errors reported by a region source.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    /// The request did not complete (connection, timeout, non-success status).
    #[error("Region source transport error: {0}")]
    Transport(String),

    /// The response arrived but could not be decoded into region records.
    #[error("Region source returned malformed data: {0}")]
    Malformed(String),
}

/// Interface to the remote region API.
///
/// Each call returns every unit at `level`, optionally restricted to the
/// children of `parent`. Records always carry at least a `name`.
///
/// # Implementations
///
/// - [`crate::infrastructure::source::HttpRegionSource`] - HTTP implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/http_source.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegionSource: Send + Sync {
    /// Fetches the raw (possibly duplicated) region list for one level.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Transport`] if the request fails and
    /// [`SourceError::Malformed`] if the payload cannot be decoded.
    async fn fetch_region_list(
        &self,
        level: RegionLevel,
        parent: Option<String>,
    ) -> Result<Vec<RegionRecord>, SourceError>;
}
