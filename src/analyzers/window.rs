use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};
use crate::models::{parse_naive_timestamp, Measurement};

/// Named lookback window anchored on the latest timestamp of the full,
/// unfiltered measurement collection, so the window stays stable while
/// other filters change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    All,
    LastSixHours,
    LastDay,
    LastWeek,
}

impl TimeWindow {
    pub const ALL_WINDOWS: [TimeWindow; 4] = [
        TimeWindow::All,
        TimeWindow::LastSixHours,
        TimeWindow::LastDay,
        TimeWindow::LastWeek,
    ];

    pub fn duration(&self) -> Option<Duration> {
        match self {
            TimeWindow::All => None,
            TimeWindow::LastSixHours => Some(Duration::hours(6)),
            TimeWindow::LastDay => Some(Duration::hours(24)),
            TimeWindow::LastWeek => Some(Duration::hours(168)),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeWindow::All => "all",
            TimeWindow::LastSixHours => "last 6 hours",
            TimeWindow::LastDay => "last 24 hours",
            TimeWindow::LastWeek => "last 7 days",
        }
    }

    /// Lower bound implied by this window and a reference instant, or
    /// `None` when the window is unbounded.
    pub fn cutoff(&self, reference: &str) -> Result<Option<NaiveDateTime>> {
        match self.duration() {
            None => Ok(None),
            Some(duration) => Ok(Some(parse_naive_timestamp(reference)? - duration)),
        }
    }

    /// Whether a measurement falls inside this window. Unparseable
    /// timestamps never qualify for a bounded window.
    pub fn admits(&self, measurement: &Measurement, cutoff: Option<NaiveDateTime>) -> bool {
        match cutoff {
            None => true,
            Some(bound) => measurement
                .parsed_timestamp()
                .map(|ts| ts >= bound)
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeWindow {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(TimeWindow::All),
            "6h" | "last_six_hours" => Ok(TimeWindow::LastSixHours),
            "24h" | "last_day" => Ok(TimeWindow::LastDay),
            "7d" | "last_week" => Ok(TimeWindow::LastWeek),
            other => Err(DashboardError::UnknownWindow(other.to_string())),
        }
    }
}

// Accept both the canonical names and the short CLI aliases in config files.
impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Filter a measurement subset down to the window anchored on `reference`.
///
/// With no reference instant (empty collection) a bounded window admits
/// nothing; callers get an empty subset and all aggregates come out absent.
pub fn filter_window<'a>(
    measurements: impl IntoIterator<Item = &'a Measurement>,
    window: TimeWindow,
    reference: Option<&str>,
) -> Vec<&'a Measurement> {
    let cutoff = match (window.duration(), reference) {
        (None, _) => None,
        (Some(_), None) => return Vec::new(),
        (Some(_), Some(reference)) => match window.cutoff(reference) {
            Ok(cutoff) => cutoff,
            Err(_) => return Vec::new(),
        },
    };

    measurements
        .into_iter()
        .filter(|m| window.admits(m, cutoff))
        .collect()
}
