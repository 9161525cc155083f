//! # Region Directory
//!
//! A deduplicating, persisted cache of the city → county → township hierarchy
//! served by a remote villages metadata API, exposed over HTTP with Axum.
//!
//! ## Architecture
//!
//! This crate follows Clean Architecture principles with clear layer separation:
//!
//! - **Domain Layer** ([`domain`]) - Region records, deduplication and the source trait
//! - **Application Layer** ([`application`]) - The single-flight directory cache
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP source and snapshot stores
//! - **API Layer** ([`api`]) - REST API handlers, DTOs, and middleware
//!
//! ## Features
//!
//! - One load of all three levels shared by every concurrent caller
//! - Duplicate collapsing per level, keeping the record with more villages
//! - 24 hour TTL with lazy expiry
//! - Versioned snapshots in memory or Redis, so restarts skip the fetch
//! - Rate-limited invalidation and observability
//!
//! ## Quick Start
//!
//! ```bash
//! export REGION_API_URL="https://villages.example.com"
//! export REDIS_URL="redis://localhost:6379"  # Optional
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::{AppError, RegionError};
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{CacheStatus, RegionDirectoryCache};
    pub use crate::domain::entities::{CacheStats, RegionDirectory, RegionLevel, RegionRecord};
    pub use crate::domain::repositories::{RegionSource, SourceError};
    pub use crate::error::{AppError, RegionError};
    pub use crate::infrastructure::storage::{MemorySnapshotStore, SnapshotStore};
    pub use crate::state::AppState;
}
