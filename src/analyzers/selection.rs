use std::collections::HashSet;

use crate::analyzers::grouping::RegionGroup;
use crate::analyzers::window::TimeWindow;
use crate::models::Metric;

/// The four independently selectable dashboard dimensions.
///
/// `station: None` means "all stations" in the selected region, rendered
/// as a cross-station average. The selection never holds a station outside
/// the selected region: region changes reset a stale station selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub region: String,
    pub station: Option<u32>,
    pub metric: Metric,
    pub window: TimeWindow,
}

impl Selection {
    /// Defaults applied on first successful data load: alphabetically-first
    /// region (the groups come in sorted), all stations, the given metric
    /// and window defaults.
    pub fn first_load(groups: &[RegionGroup<'_>], metric: Metric, window: TimeWindow) -> Self {
        Self {
            region: groups
                .first()
                .map(|g| g.region.clone())
                .unwrap_or_default(),
            station: None,
            metric,
            window,
        }
    }

    fn region_index(&self, groups: &[RegionGroup<'_>]) -> Option<usize> {
        groups.iter().position(|g| g.region == self.region)
    }

    /// Select a region. When the previously selected station does not
    /// belong to it, the station selection falls back to all-stations.
    pub fn select_region(&mut self, region: &str, groups: &[RegionGroup<'_>]) {
        self.region = region.to_string();
        if let Some(station_id) = self.station {
            let still_in_scope = groups
                .iter()
                .find(|g| g.region == region)
                .is_some_and(|g| g.contains(station_id));
            if !still_in_scope {
                self.station = None;
            }
        }
    }

    /// Cycle to the next region in sorted order, wrapping at the end.
    pub fn next_region(&mut self, groups: &[RegionGroup<'_>]) {
        if groups.is_empty() {
            return;
        }
        let next = self
            .region_index(groups)
            .map(|i| (i + 1) % groups.len())
            .unwrap_or(0);
        let region = groups[next].region.clone();
        self.select_region(&region, groups);
    }

    /// Cycle to the previous region in sorted order, wrapping at the start.
    pub fn previous_region(&mut self, groups: &[RegionGroup<'_>]) {
        if groups.is_empty() {
            return;
        }
        let previous = self
            .region_index(groups)
            .map(|i| (i + groups.len() - 1) % groups.len())
            .unwrap_or(0);
        let region = groups[previous].region.clone();
        self.select_region(&region, groups);
    }

    pub fn select_station(&mut self, station: Option<u32>) {
        self.station = station;
    }

    /// Resolve the station-id set implied by the region/station selection.
    pub fn scope(&self, groups: &[RegionGroup<'_>]) -> Scope {
        let station_ids = match self.station {
            Some(station_id) => HashSet::from([station_id]),
            None => groups
                .iter()
                .find(|g| g.region == self.region)
                .map(|g| g.station_ids().into_iter().collect())
                .unwrap_or_default(),
        };
        Scope { station_ids }
    }
}

/// The resolved subset of stations implied by the current selection.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub station_ids: HashSet<u32>,
}

impl Scope {
    /// A scope spanning every station, for globally-scoped aggregates.
    pub fn all(groups: &[RegionGroup<'_>]) -> Self {
        Self {
            station_ids: groups
                .iter()
                .flat_map(|g| g.station_ids())
                .collect(),
        }
    }

    pub fn contains(&self, station_id: u32) -> bool {
        self.station_ids.contains(&station_id)
    }

    pub fn is_empty(&self) -> bool {
        self.station_ids.is_empty()
    }
}
