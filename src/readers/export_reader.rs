use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use validator::Validate;

use crate::error::{DashboardError, Result};
use crate::models::{ExportMeta, Measurement, Station};

pub const STATIONS_FILE: &str = "stations.json";
pub const MEASUREMENTS_FILE: &str = "measurements.json";
pub const META_FILE: &str = "meta.json";

/// The three export collections, loaded as one immutable snapshot.
#[derive(Debug)]
pub struct DashboardData {
    pub stations: Vec<Station>,
    pub measurements: Vec<Measurement>,
    pub meta: Option<ExportMeta>,
}

impl DashboardData {
    /// Station count, preferring the advisory meta when present.
    pub fn station_count(&self) -> usize {
        self.meta
            .as_ref()
            .map(|m| m.stations_count)
            .unwrap_or(self.stations.len())
    }

    /// Measurement count, preferring the advisory meta when present.
    pub fn measurement_count(&self) -> usize {
        self.meta
            .as_ref()
            .map(|m| m.measurements_count)
            .unwrap_or(self.measurements.len())
    }
}

/// Loads the JSON export directory the upstream pipeline writes.
///
/// The three files are read concurrently and must all settle before any
/// derived computation starts. Stations and measurements are required;
/// meta is advisory and degrades to `None`. There is no partial-results
/// path: a failed required read fails the whole load.
pub struct ExportReader {
    export_dir: PathBuf,
}

impl ExportReader {
    pub fn new(export_dir: &Path) -> Self {
        Self {
            export_dir: export_dir.to_path_buf(),
        }
    }

    pub async fn load(&self) -> Result<DashboardData> {
        let stations_path = self.export_dir.join(STATIONS_FILE);
        let measurements_path = self.export_dir.join(MEASUREMENTS_FILE);
        let meta_path = self.export_dir.join(META_FILE);

        let stations_handle =
            tokio::spawn(async move { read_collection::<Station>(&stations_path).await });
        let measurements_handle =
            tokio::spawn(async move { read_collection::<Measurement>(&measurements_path).await });
        let meta_handle = tokio::spawn(async move { read_meta(&meta_path).await });

        let (stations, measurements, meta) =
            tokio::try_join!(stations_handle, measurements_handle, meta_handle)?;

        let data = DashboardData {
            stations: stations?,
            measurements: measurements?,
            meta: meta?,
        };

        // Out-of-range coordinates are advisory problems, not load failures
        for station in &data.stations {
            if let Err(errors) = station.validate() {
                warn!(
                    station_id = station.station_id,
                    %errors,
                    "station failed validation"
                );
            }
        }

        debug!(
            stations = data.stations.len(),
            measurements = data.measurements.len(),
            has_meta = data.meta.is_some(),
            "export loaded"
        );

        if let Some(meta) = &data.meta {
            if meta.stations_count != data.stations.len()
                || meta.measurements_count != data.measurements.len()
            {
                warn!(
                    meta_stations = meta.stations_count,
                    loaded_stations = data.stations.len(),
                    meta_measurements = meta.measurements_count,
                    loaded_measurements = data.measurements.len(),
                    "export meta counts disagree with loaded collections"
                );
            }
        }

        Ok(data)
    }
}

async fn read_collection<T>(path: &Path) -> Result<Vec<T>>
where
    T: serde::de::DeserializeOwned,
{
    if !path.exists() {
        return Err(DashboardError::MissingExport(path.to_path_buf()));
    }
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

async fn read_meta(path: &Path) -> Result<Option<ExportMeta>> {
    if !path.exists() {
        warn!(path = %path.display(), "meta.json absent, falling back to collection counts");
        return Ok(None);
    }
    let raw = tokio::fs::read_to_string(path).await?;
    match serde_json::from_str(&raw) {
        Ok(meta) => Ok(Some(meta)),
        Err(err) => {
            warn!(%err, "meta.json unreadable, falling back to collection counts");
            Ok(None)
        }
    }
}
