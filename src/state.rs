use crate::application::services::RegionDirectoryCache;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub regions: RegionDirectoryCache,
}

impl AppState {
    pub fn new(regions: RegionDirectoryCache) -> Self {
        Self { regions }
    }
}
