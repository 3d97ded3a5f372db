use std::collections::HashMap;

use crate::models::{Measurement, Station};

/// Arithmetic mean over optional values, ignoring absent and non-finite
/// entries. Returns `None` when nothing remains, never divides by zero.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut sum = 0.0;
    let mut count = 0usize;

    for value in values.into_iter().flatten() {
        if value.is_finite() {
            sum += value;
            count += 1;
        }
    }

    if count > 0 {
        Some(sum / count as f64)
    } else {
        None
    }
}

/// Item with the maximum score. Items scoring `None` never win; ties keep
/// the first-encountered item (strict `>` comparison on a left-to-right
/// scan), which keeps results deterministic in load order.
pub fn best_of<'a, T, F>(items: &'a [T], score: F) -> Option<&'a T>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut winner: Option<(&T, f64)> = None;

    for item in items {
        let Some(s) = score(item).filter(|s| s.is_finite()) else {
            continue;
        };
        match winner {
            Some((_, best)) if s <= best => {}
            _ => winner = Some((item, s)),
        }
    }

    winner.map(|(item, _)| item)
}

/// Lexicographically maximal timestamp string, which equals the
/// chronological maximum given the naive ISO-8601 format invariant.
pub fn latest_timestamp(measurements: &[Measurement]) -> Option<&str> {
    measurements
        .iter()
        .map(|m| m.timestamp.as_str())
        .max_by(|a, b| a.cmp(b))
}

/// Station lookup keyed by identifier. Later duplicates overwrite earlier
/// ones; ingestion guarantees uniqueness upstream.
pub fn index_by_id(stations: &[Station]) -> HashMap<u32, &Station> {
    let mut map = HashMap::with_capacity(stations.len());
    for station in stations {
        map.insert(station.station_id, station);
    }
    map
}
