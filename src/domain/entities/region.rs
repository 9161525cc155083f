//! Region entities: a single administrative unit and its hierarchy level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::normalize::{is_absent, normalize};
use crate::utils::region_display::RegionPath;

/// Level of an administrative unit in the city → county → township hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLevel {
    City,
    County,
    Township,
}

impl RegionLevel {
    /// All levels, outermost first.
    pub const ALL: [RegionLevel; 3] = [RegionLevel::City, RegionLevel::County, RegionLevel::Township];

    /// Wire name used by the remote region API (`level=` query parameter).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::City => "city",
            Self::County => "county",
            Self::Township => "township",
        }
    }
}

impl fmt::Display for RegionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "city" => Ok(Self::City),
            "county" => Ok(Self::County),
            "township" => Ok(Self::Township),
            other => Err(format!("unknown region level '{}'", other)),
        }
    }
}

/// One administrative unit as returned by the region source.
///
/// `name` is the unit's own label; `city` and `county` name its ancestors when
/// present. Records are never mutated after fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionRecord {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub county: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub township: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village_count: Option<u64>,
}

impl RegionRecord {
    /// Creates a record with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            city: None,
            county: None,
            township: None,
            village_count: None,
        }
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn with_county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn with_village_count(mut self, count: u64) -> Self {
        self.village_count = Some(count);
        self
    }

    /// Village count used for collision resolution; missing counts as zero.
    pub fn weight(&self) -> u64 {
        self.village_count.unwrap_or(0)
    }

    /// Returns true if the record carries a usable `name`.
    pub fn has_name(&self) -> bool {
        !is_absent(Some(self.name.as_str()))
    }

    /// Normalized parent city, if any.
    pub fn city_key(&self) -> Option<&str> {
        normalize(self.city.as_deref())
    }

    /// Normalized parent county, if any.
    pub fn county_key(&self) -> Option<&str> {
        normalize(self.county.as_deref())
    }

    /// Places this record in the hierarchy, with `name` at `level`.
    pub fn to_path(&self, level: RegionLevel) -> RegionPath {
        let own = normalize(Some(self.name.as_str())).map(str::to_string);
        let city = self.city_key().map(str::to_string);
        let county = self.county_key().map(str::to_string);

        match level {
            RegionLevel::City => RegionPath {
                city: own,
                ..RegionPath::default()
            },
            RegionLevel::County => RegionPath {
                city,
                county: own,
                ..RegionPath::default()
            },
            RegionLevel::Township => RegionPath {
                city,
                county,
                township: own,
                region_name: None,
            },
        }
    }
}
