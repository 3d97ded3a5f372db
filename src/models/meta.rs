use serde::{Deserialize, Serialize};

/// Advisory metadata written alongside the export collections.
///
/// The engine tolerates its absence entirely; counts fall back to the
/// lengths of the loaded collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMeta {
    pub generated_at_utc: String,

    #[serde(rename = "db_path")]
    pub source_path: String,

    pub stations_count: usize,

    pub measurements_count: usize,
}
