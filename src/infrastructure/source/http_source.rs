//! HTTP implementation of the region source.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::domain::entities::{RegionLevel, RegionRecord};
use crate::domain::repositories::{RegionSource, SourceError};
use crate::utils::base_url::parse_base_url;

/// Path of the region list endpoint, relative to the API base URL.
pub const REGIONS_ENDPOINT: &str = "api/villages/metadata/stats/regions";

/// Region source backed by the villages metadata API.
///
/// Issues `GET {base}/api/villages/metadata/stats/regions?level=<level>[&parent=<parent>]`
/// and expects a JSON array of region records. The client's request timeout
/// is the only timeout applied to a directory load.
pub struct HttpRegionSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpRegionSource {
    /// Creates a source for the API at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be built.
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = parse_base_url(base_url)?.join(REGIONS_ENDPOINT)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("region-directory/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// Full request URL for one level.
    pub fn request_url(&self, level: RegionLevel, parent: Option<&str>) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("level", level.as_str());
            if let Some(parent) = parent.filter(|p| !p.is_empty()) {
                query.append_pair("parent", parent);
            }
        }
        url
    }
}

#[async_trait]
impl RegionSource for HttpRegionSource {
    async fn fetch_region_list(
        &self,
        level: RegionLevel,
        parent: Option<String>,
    ) -> Result<Vec<RegionRecord>, SourceError> {
        let url = self.request_url(level, parent.as_deref());
        debug!("Fetching {} list from {}", level, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| SourceError::Transport(format!("GET {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(SourceError::Transport(format!(
                "GET {}: {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::Transport(format!("GET {}: {}", url, e)))?;

        let records: Vec<RegionRecord> = serde_json::from_str(&body)
            .map_err(|e| SourceError::Malformed(format!("{} list: {}", level, e)))?;

        debug!("Fetched {} {} records", records.len(), level);
        Ok(records)
    }
}
