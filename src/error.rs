// 🚨 Error Taxonomy
// Load-time errors are fatal, query-time errors are recoverable

use thiserror::Error;

// ============================================================================
// LOAD ERRORS (fatal - no partial dataset is served)
// ============================================================================

/// Malformed or missing input column
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: String },

    #[error("row {row}: column '{column}' is not a well-formed list ({reason}): {value}")]
    MalformedList {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    #[error("row {row}: column '{column}' is not a finite number: {value}")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}

/// A `date` value that cannot be resolved to a calendar day
#[derive(Debug, Clone, PartialEq, Error)]
#[error("row {row}: cannot parse date '{value}'")]
pub struct DateParseError {
    pub row: usize,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("failed to read delimited input: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open dataset: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// QUERY ERRORS (recoverable - surfaced to the caller, pipeline not run)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("no date selected")]
    MissingDate,

    #[error("end date {end} given without a start date")]
    EndWithoutStart { end: String },

    #[error("expected one or two dates, got {count}")]
    TooManyDates { count: usize },

    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },

    #[error("no {dimension} selected")]
    EmptySelection { dimension: String },

    #[error("unknown {dimension} '{value}'")]
    UnknownValue { dimension: String, value: String },
}

// ============================================================================
// PARAMETER ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BucketError {
    #[error("at least two bucket boundaries are required, got {count}")]
    TooFewBoundaries { count: usize },

    #[error("bucket boundary {value} is not finite")]
    NonFinite { value: f64 },

    #[error("bucket boundaries must be strictly increasing ({previous} >= {next})")]
    NotIncreasing { previous: f64, next: f64 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("delimiter {value:?} must be a single ASCII character")]
    Delimiter { value: char },

    #[error("invalid bucket layout for {field}: {source}")]
    Buckets {
        field: String,
        #[source]
        source: BucketError,
    },
}
