use config::{Config, Environment, File};
use serde::Deserialize;

use crate::analyzers::window::TimeWindow;
use crate::error::Result;

/// Engine configuration with sensible defaults, overridable by a
/// `weerdash.toml` next to the binary and by `WEERDASH_`-prefixed
/// environment variables.
///
/// The offshore lookup labels live here because the station taxonomy is
/// reference data the engine does not control; hardcoding the literals in
/// the lookup would break the first time upstream relabels a region.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Region label for the fixed offshore-station lookup.
    pub offshore_region_label: String,

    /// Station-name fragment to fall back to when no station carries the
    /// offshore region label.
    pub offshore_name_hint: String,

    /// Time window selected on first load.
    pub default_window: TimeWindow,

    /// Ranking length when the caller does not pass one.
    pub top_n: usize,
}

impl EngineConfig {
    pub fn load() -> Result<Self> {
        let settings = Config::builder()
            .set_default("offshore_region_label", "Noordzee")?
            .set_default("offshore_name_hint", "zeeplatform")?
            .set_default("default_window", "all")?
            .set_default("top_n", 10)?
            .add_source(File::with_name("weerdash").required(false))
            .add_source(Environment::with_prefix("WEERDASH"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            offshore_region_label: "Noordzee".to_string(),
            offshore_name_hint: "zeeplatform".to_string(),
            default_window: TimeWindow::All,
            top_n: 10,
        }
    }
}
