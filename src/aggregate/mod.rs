// 📊 Aggregators - pure functions over a FilteredView
//
// Every aggregator takes the view (which borrows the table) and returns an
// owned value with no reference back to the table. An empty view always
// yields an empty aggregate.

pub mod buckets;
pub mod cooccurrence;
pub mod crosstab;
pub mod frequency;
pub mod timeline;

use crate::store::Record;
use serde::{Deserialize, Serialize};

pub use buckets::{numeric_bucket_distribution, BucketCount, Buckets, Distribution};
pub use cooccurrence::{co_occurrence_pairs, CoOccurrence};
pub use crosstab::{source_category_crosstab, SourceBreakdown, SourceCategoryCrosstab};
pub use frequency::{geo_count, word_frequency};
pub use timeline::{category_time_series, time_series, Granularity, TimePoint, TimeSeries};

// ============================================================================
// FIELD SELECTORS
// ============================================================================

/// List-valued record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListField {
    Countries,
    Entities,
    People,
}

impl ListField {
    pub fn values<'r>(&self, record: &'r Record) -> &'r [String] {
        match self {
            ListField::Countries => &record.countries,
            ListField::Entities => &record.entities,
            ListField::People => &record.people,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ListField::Countries => "countries",
            ListField::Entities => "entities",
            ListField::People => "people",
        }
    }
}

/// Numeric record fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumericField {
    Sentiment,
    Subjectivity,
}

impl NumericField {
    pub fn value(&self, record: &Record) -> f64 {
        match self {
            NumericField::Sentiment => record.sentiment,
            NumericField::Subjectivity => record.subjectivity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NumericField::Sentiment => "sentiment",
            NumericField::Subjectivity => "subjectivity",
        }
    }
}

/// Categorical record fields a count can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Category,
    Source,
}

impl Dimension {
    pub fn key<'r>(&self, record: &'r Record) -> &'r str {
        match self {
            Dimension::Category => &record.category,
            Dimension::Source => &record.source,
        }
    }
}

// ============================================================================
// SHARED OUTPUT
// ============================================================================

/// One label with its count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

impl LabelCount {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        LabelCount {
            label: label.into(),
            count,
        }
    }
}
