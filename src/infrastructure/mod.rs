//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain and application
//! layers, providing concrete implementations for the region source and
//! snapshot persistence.
//!
//! # Modules
//!
//! - [`source`] - HTTP client for the remote region API
//! - [`storage`] - Snapshot stores (memory, Redis and no-op) and the snapshot codec

pub mod source;
pub mod storage;
