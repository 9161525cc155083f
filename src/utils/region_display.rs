//! Display helpers for hierarchical region references.
//!
//! API results identify a region either by its hierarchy (`city`, `county`,
//! `township`) or, for older endpoints, only by a flat `region_name`. These
//! helpers render both forms consistently for pickers and table cells.

use serde::{Deserialize, Serialize};

use crate::utils::normalize::normalize;

/// A region identified by its position in the hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionPath {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub county: Option<String>,
    #[serde(default)]
    pub township: Option<String>,
    /// Flat name used by endpoints that predate hierarchical results.
    #[serde(default)]
    pub region_name: Option<String>,
}

impl RegionPath {
    fn city(&self) -> Option<&str> {
        normalize(self.city.as_deref())
    }

    fn county(&self) -> Option<&str> {
        normalize(self.county.as_deref())
    }

    fn township(&self) -> Option<&str> {
        normalize(self.township.as_deref())
    }

    fn region_name(&self) -> &str {
        normalize(self.region_name.as_deref()).unwrap_or("")
    }
}

/// Rendering options for [`build_region_path`].
#[derive(Debug, Clone)]
pub struct PathOptions<'a> {
    pub separator: &'a str,
    /// Omit the city level; most views are already scoped to one city.
    pub skip_city: bool,
}

impl Default for PathOptions<'_> {
    fn default() -> Self {
        Self {
            separator: " > ",
            skip_city: true,
        }
    }
}

/// Joins the present hierarchy levels, falling back to `region_name`.
pub fn build_region_path(path: &RegionPath, options: &PathOptions<'_>) -> String {
    let mut parts = Vec::with_capacity(3);
    if !options.skip_city
        && let Some(city) = path.city()
    {
        parts.push(city);
    }
    parts.extend(path.county());
    parts.extend(path.township());

    if parts.is_empty() {
        return path.region_name().to_string();
    }

    parts.join(options.separator)
}

/// Returns the most specific name available.
pub fn short_name(path: &RegionPath) -> &str {
    path.township()
        .or_else(|| path.county())
        .or_else(|| path.city())
        .unwrap_or_else(|| path.region_name())
}

/// Returns true if any hierarchy level is present.
pub fn has_hierarchy_info(path: &RegionPath) -> bool {
    path.city().is_some() || path.county().is_some() || path.township().is_some()
}

/// Full path or short name for hierarchical references, `region_name` otherwise.
pub fn format_region_display(path: &RegionPath, show_full: bool, options: &PathOptions<'_>) -> String {
    if !has_hierarchy_info(path) {
        return path.region_name().to_string();
    }

    if show_full {
        build_region_path(path, options)
    } else {
        short_name(path).to_string()
    }
}
