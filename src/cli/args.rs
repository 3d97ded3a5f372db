use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analyzers::window::TimeWindow;
use crate::models::Metric;

#[derive(Parser)]
#[command(name = "weerdash")]
#[command(about = "Weather-station snapshot analytics for the dashboard export")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display export counts, latest snapshot, and region tallies
    Info {
        #[arg(short, long, help = "Export directory with the JSON collections")]
        dir: PathBuf,
    },

    /// List region groups with their representative stations
    Regions {
        #[arg(short, long, help = "Export directory with the JSON collections")]
        dir: PathBuf,
    },

    /// Current extremes: hottest station, largest feel gap, global averages
    Extremes {
        #[arg(short, long, help = "Export directory with the JSON collections")]
        dir: PathBuf,
    },

    /// Per-metric time series over a scope and time window
    Series {
        #[arg(short, long, help = "Export directory with the JSON collections")]
        dir: PathBuf,

        #[arg(short, long, default_value = "temperature")]
        metric: Metric,

        #[arg(
            short,
            long,
            help = "Time window: all, 6h, 24h, 7d [default: from configuration]"
        )]
        window: Option<TimeWindow>,

        #[arg(short, long, help = "Region to scope to [default: first region]")]
        region: Option<String>,

        #[arg(short, long, help = "Station id to scope to [default: all in region]")]
        station: Option<u32>,

        #[arg(long, default_value = "false", help = "One column per station")]
        wide: bool,
    },

    /// Top-N stations by metric at the latest snapshot
    Top {
        #[arg(short, long, help = "Export directory with the JSON collections")]
        dir: PathBuf,

        #[arg(short, long, default_value = "temperature")]
        metric: Metric,

        #[arg(short, long, help = "Ranking length [default: from configuration]")]
        n: Option<usize>,
    },
}
