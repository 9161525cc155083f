//! Business logic services for the application layer.

pub mod region_directory;

pub use region_directory::{CacheStatus, DEFAULT_TTL, RegionDirectoryCache};
