use std::collections::{BTreeMap, HashMap};

use crate::models::{Measurement, Station};

/// Stations of one region, with the alphabetically-first station as the
/// region's representative when a single station must stand in.
#[derive(Debug, Clone)]
pub struct RegionGroup<'a> {
    pub region: String,
    pub stations: Vec<&'a Station>,
}

impl<'a> RegionGroup<'a> {
    pub fn representative(&self) -> &'a Station {
        // Groups are never built empty; stations are sorted by name.
        self.stations[0]
    }

    pub fn station_ids(&self) -> Vec<u32> {
        self.stations.iter().map(|s| s.station_id).collect()
    }

    pub fn contains(&self, station_id: u32) -> bool {
        self.stations.iter().any(|s| s.station_id == station_id)
    }
}

/// Partition stations by normalized region label. Station lists sort by
/// display name, region entries sort by label, for stable presentation.
pub fn group_by_region(stations: &[Station]) -> Vec<RegionGroup<'_>> {
    let mut by_region: HashMap<&str, Vec<&Station>> = HashMap::new();
    for station in stations {
        by_region
            .entry(station.normalized_region())
            .or_default()
            .push(station);
    }

    let mut groups: Vec<RegionGroup<'_>> = by_region
        .into_iter()
        .map(|(region, mut stations)| {
            stations.sort_by(|a, b| a.name.cmp(&b.name));
            RegionGroup {
                region: region.to_string(),
                stations,
            }
        })
        .collect();

    groups.sort_by(|a, b| a.region.cmp(&b.region));
    groups
}

/// Partition a measurement subset by exact timestamp string equality.
///
/// Equality is on the literal string, not the parsed instant: two
/// timestamps differing in a format artifact are intentionally distinct
/// groups. The BTreeMap keeps rows ascending by timestamp.
pub fn group_by_timestamp<'a>(
    measurements: impl IntoIterator<Item = &'a Measurement>,
) -> BTreeMap<&'a str, Vec<&'a Measurement>> {
    let mut by_timestamp: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
    for measurement in measurements {
        by_timestamp
            .entry(measurement.timestamp.as_str())
            .or_default()
            .push(measurement);
    }
    by_timestamp
}
