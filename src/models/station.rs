use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sentinel region for stations whose export row has no usable region label.
pub const UNKNOWN_REGION: &str = "Unknown";

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Station {
    #[serde(rename = "stationid")]
    pub station_id: u32,

    #[serde(rename = "stationname")]
    #[validate(length(min = 1))]
    pub name: String,

    #[serde(rename = "lat")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,

    #[serde(rename = "lon")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,

    #[serde(rename = "regio")]
    pub region: Option<String>,
}

impl Station {
    pub fn new(station_id: u32, name: &str, region: Option<&str>) -> Self {
        Self {
            station_id,
            name: name.to_string(),
            latitude: None,
            longitude: None,
            region: region.map(|r| r.to_string()),
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Region label after normalization: trimmed, blank or absent collapses
    /// to [`UNKNOWN_REGION`].
    pub fn normalized_region(&self) -> &str {
        match self.region.as_deref().map(str::trim) {
            Some(r) if !r.is_empty() => r,
            _ => UNKNOWN_REGION,
        }
    }

    pub fn region_matches(&self, label: &str) -> bool {
        self.normalized_region().eq_ignore_ascii_case(label)
    }

    pub fn name_contains(&self, fragment: &str) -> bool {
        self.name.to_lowercase().contains(&fragment.to_lowercase())
    }
}
