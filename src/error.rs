use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid timestamp: '{0}'")]
    InvalidTimestamp(String),

    #[error("Missing export file: {0}")]
    MissingExport(PathBuf),

    #[error("Unknown metric: '{0}'")]
    UnknownMetric(String),

    #[error("Unknown time window: '{0}'")]
    UnknownWindow(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Async task error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
