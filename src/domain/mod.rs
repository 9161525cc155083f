//! Domain layer containing region entities and pure logic.
//!
//! # Architecture
//!
//! - [`entities`] - Region records, levels and the assembled directory
//! - [`repositories`] - Trait for the remote region source
//! - [`dedup`] - Per-level collapsing of duplicated records
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Source traits define contracts implemented by the infrastructure layer
//! - Loading and caching are orchestrated in [`crate::application::services`]

pub mod dedup;
pub mod entities;
pub mod repositories;
