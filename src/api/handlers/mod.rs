//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod health;
pub mod regions;

pub use health::health_handler;
pub use regions::{
    cities_handler, city_has_counties_handler, counties_handler, invalidate_handler,
    stats_handler, townships_handler,
};
