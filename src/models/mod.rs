pub mod measurement;
pub mod meta;
pub mod station;

pub use measurement::{parse_naive_timestamp, Measurement, Metric};
pub use meta::ExportMeta;
pub use station::{Station, UNKNOWN_REGION};
