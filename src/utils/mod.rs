//! Utility functions shared across layers.
//!
//! - [`normalize`] - Absent-value normalization for optional region fields
//! - [`region_display`] - Rendering of hierarchical region references
//! - [`base_url`] - Region API base URL parsing
//! - [`clock`] - Injectable wall clock for expiry checks

pub mod base_url;
pub mod clock;
pub mod normalize;
pub mod region_display;
