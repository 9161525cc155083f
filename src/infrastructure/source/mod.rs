//! Region source implementations.
//!
//! - [`HttpRegionSource`] - Reads region lists from the villages metadata API

mod http_source;

pub use http_source::{HttpRegionSource, REGIONS_ENDPOINT};
