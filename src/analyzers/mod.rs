pub mod dashboard;
pub mod grouping;
pub mod reducers;
pub mod selection;
pub mod window;

pub use dashboard::{
    DashboardAnalyzer, ExtremeReading, GapReading, RankedReading, ScatterPoint, SeriesRow,
    WideSeriesRow,
};
pub use grouping::{group_by_region, group_by_timestamp, RegionGroup};
pub use reducers::{best_of, index_by_id, latest_timestamp, mean};
pub use selection::{Scope, Selection};
pub use window::{filter_window, TimeWindow};
