pub mod export_reader;

pub use export_reader::{DashboardData, ExportReader};
