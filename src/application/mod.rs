//! Application layer services.
//!
//! Services coordinate domain logic with the source and store traits and
//! expose the API used by HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::region_directory::RegionDirectoryCache`] - Loading, caching and querying the region hierarchy

pub mod services;
