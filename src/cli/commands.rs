use std::path::Path;

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::analyzers::selection::{Scope, Selection};
use crate::analyzers::DashboardAnalyzer;
use crate::cli::args::{Cli, Commands};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::Metric;
use crate::readers::{DashboardData, ExportReader};
use crate::utils::ProgressReporter;

pub async fn run(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);
    let config = EngineConfig::load()?;

    match cli.command {
        Commands::Info { dir } => {
            let data = load_export(&dir).await?;
            let analyzer = DashboardAnalyzer::new(&data.stations, &data.measurements, config);
            print_info(&data, &analyzer);
        }

        Commands::Regions { dir } => {
            let data = load_export(&dir).await?;
            let analyzer = DashboardAnalyzer::new(&data.stations, &data.measurements, config);

            for group in analyzer.region_groups() {
                println!(
                    "{} ({} stations, representative: {})",
                    group.region,
                    group.stations.len(),
                    group.representative().name
                );
                for station in &group.stations {
                    println!("  {:>6}  {}", station.station_id, station.name);
                }
            }
        }

        Commands::Extremes { dir } => {
            let data = load_export(&dir).await?;
            let analyzer = DashboardAnalyzer::new(&data.stations, &data.measurements, config);
            print_extremes(&analyzer);
        }

        Commands::Series {
            dir,
            metric,
            window,
            region,
            station,
            wide,
        } => {
            let data = load_export(&dir).await?;
            let analyzer = DashboardAnalyzer::new(&data.stations, &data.measurements, config);
            let groups = analyzer.region_groups();

            let window = window.unwrap_or(analyzer.config().default_window);
            let mut selection = Selection::first_load(&groups, metric, window);
            if let Some(region) = region {
                selection.select_region(&region, &groups);
            }
            if let Some(station) = station {
                selection.select_station(Some(station));
            }
            let scope = selection.scope(&groups);

            info!(
                region = %selection.region,
                ?station,
                %metric,
                %window,
                "computing series"
            );

            if wide {
                for row in analyzer.series_wide(metric, &scope, window) {
                    let columns: Vec<String> = row
                        .values
                        .iter()
                        .map(|(id, value)| format!("{id}={value:.1}"))
                        .collect();
                    println!(
                        "{}  mean={}  {}",
                        row.timestamp,
                        format_value(row.mean),
                        columns.join(" ")
                    );
                }
            } else {
                for row in analyzer.series_narrow(metric, &scope, window) {
                    println!("{}  {}", row.timestamp, format_value(row.mean));
                }
            }
        }

        Commands::Top { dir, metric, n } => {
            let data = load_export(&dir).await?;
            let analyzer = DashboardAnalyzer::new(&data.stations, &data.measurements, config);
            let groups = analyzer.region_groups();
            let scope = Scope::all(&groups);

            for (rank, entry) in analyzer.top_ranking(metric, &scope, n).iter().enumerate() {
                println!("{:>2}. {:<32} {:.1}", rank + 1, entry.station_name, entry.value);
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "weerdash=debug" } else { "weerdash=info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn load_export(dir: &Path) -> Result<DashboardData> {
    let progress = ProgressReporter::new_spinner("Loading export collections...", false);
    let result = ExportReader::new(dir).load().await;
    match &result {
        Ok(data) => progress.finish_with_message(&format!(
            "Loaded {} stations, {} measurements",
            data.station_count(),
            data.measurement_count()
        )),
        Err(_) => progress.finish_with_message("Load failed"),
    }
    result
}

fn print_info(data: &DashboardData, analyzer: &DashboardAnalyzer<'_>) {
    println!("Stations:     {}", data.station_count());
    println!("Measurements: {}", data.measurement_count());
    match &data.meta {
        Some(meta) => println!("Generated:    {} (from {})", meta.generated_at_utc, meta.source_path),
        None => println!("Generated:    unknown (no meta.json)"),
    }
    println!(
        "Latest:       {}",
        analyzer.latest_timestamp().unwrap_or("no measurements")
    );
    println!("Regions:      {}", analyzer.region_groups().len());
}

fn print_extremes(analyzer: &DashboardAnalyzer<'_>) {
    match analyzer.extreme_at_latest(Metric::Temperature) {
        Some(hottest) => println!(
            "Hottest now:      {:.1} °C at {}",
            hottest.value,
            hottest
                .station
                .map(|s| s.name.as_str())
                .unwrap_or("unknown station")
        ),
        None => println!("Hottest now:      no data"),
    }

    match analyzer.largest_gap_overall(Metric::FeelTemperature, Metric::Temperature) {
        Some(gap) => println!(
            "Largest feel gap: {:.1} °C at {} ({})",
            gap.gap,
            gap.station
                .map(|s| s.name.as_str())
                .unwrap_or("unknown station"),
            gap.measurement.timestamp
        ),
        None => println!("Largest feel gap: no data"),
    }

    println!(
        "Avg temperature:  {}",
        format_value(analyzer.global_average(Metric::Temperature))
    );
    println!(
        "Avg humidity:     {}",
        format_value(analyzer.global_average(Metric::Humidity))
    );

    match analyzer.offshore_station() {
        Some(station) => println!("Offshore station: {}", station.name),
        None => println!("Offshore station: none found"),
    }

    // Window selection never moves the "now" extremes; show the anchor
    if let Some(latest) = analyzer.latest_timestamp() {
        println!("Snapshot:         {latest}");
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.1}"),
        None => "-".to_string(),
    }
}
