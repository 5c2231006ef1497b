// Media Analysis - Core Library
// Filtering-and-aggregation engine over news article tables.
// Exposes all modules for use in the CLI, the API server, and tests.

pub mod adapter;
pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod list_codec;
pub mod store;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use adapter::{DisplayOptions, QueryInput};
pub use aggregate::{
    category_time_series, co_occurrence_pairs, geo_count, numeric_bucket_distribution,
    source_category_crosstab, time_series, word_frequency, Buckets, CoOccurrence, Dimension,
    Distribution, Granularity, LabelCount, ListField, NumericField, SourceCategoryCrosstab,
    TimeSeries,
};
pub use config::AppConfig;
pub use dashboard::{Dashboard, DashboardSettings, TrendPanel};
pub use error::{BucketError, ConfigError, DateParseError, FilterError, LoadError, SchemaError};
pub use filter::{evaluate, DateRange, FilterSpec, FilteredView, QueryMode, Selection};
pub use list_codec::ListFormat;
pub use store::{LoadOptions, RawRecord, Record, RecordTable};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
