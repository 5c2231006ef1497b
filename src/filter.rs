// 🔎 Filter Layer - query value objects and predicate evaluation
//
// A FilterSpec is a pure value (date range + category set + source set).
// `evaluate` scans the table once and returns the matching row indices,
// together with the QueryMode every downstream consumer must follow.

use crate::error::FilterError;
use crate::store::{Record, RecordTable};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

// ============================================================================
// QUERY MODE
// ============================================================================

/// Which trend view a query produces
///
/// Decided once from the date range. Aggregation consumers branch on this
/// flag, never on the shape of the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Range spans more than one day
    TimeSeries,
    /// Start equals end
    SingleDayBreakdown,
}

// ============================================================================
// DATE RANGE
// ============================================================================

/// Inclusive day range, always `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(DateRange { start, end })
    }

    /// Degenerate range covering exactly one day
    pub fn single(day: NaiveDate) -> Self {
        DateRange {
            start: day,
            end: day,
        }
    }

    /// Range that admits every representable day
    pub fn unbounded() -> Self {
        DateRange {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn is_single_day(&self) -> bool {
        self.start == self.end
    }

    pub fn mode(&self) -> QueryMode {
        if self.is_single_day() {
            QueryMode::SingleDayBreakdown
        } else {
            QueryMode::TimeSeries
        }
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// A set of accepted values, or the "all" sentinel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    pub fn only<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Only(values.into_iter().map(Into::into).collect())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.contains(value),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

// ============================================================================
// FILTER SPEC
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub date_range: DateRange,
    pub categories: Selection,
    pub sources: Selection,
}

impl FilterSpec {
    /// Spec over a date range with no category/source restriction
    pub fn new(date_range: DateRange) -> Self {
        FilterSpec {
            date_range,
            categories: Selection::All,
            sources: Selection::All,
        }
    }

    /// Spec that admits every record of any table
    pub fn everything() -> Self {
        Self::new(DateRange::unbounded())
    }

    pub fn with_categories(mut self, categories: Selection) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_sources(mut self, sources: Selection) -> Self {
        self.sources = sources;
        self
    }

    pub fn mode(&self) -> QueryMode {
        self.date_range.mode()
    }

    /// Logical AND across all three dimensions
    pub fn matches(&self, record: &Record) -> bool {
        self.date_range.contains(record.date)
            && self.categories.matches(&record.category)
            && self.sources.matches(&record.source)
    }
}

// ============================================================================
// FILTERED VIEW
// ============================================================================

/// Row indices of a table that satisfy one FilterSpec
///
/// Borrows the table; nothing is copied.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a RecordTable,
    indices: Vec<usize>,
    mode: QueryMode,
}

impl<'a> FilteredView<'a> {
    pub fn table(&self) -> &'a RecordTable {
        self.table
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in table order
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let table = self.table;
        self.indices.iter().filter_map(move |&i| table.get(i))
    }
}

/// Single linear scan producing the matching index set
pub fn evaluate<'a>(table: &'a RecordTable, spec: &FilterSpec) -> FilteredView<'a> {
    let indices: Vec<usize> = table
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(record))
        .map(|(i, _)| i)
        .collect();

    debug!(
        matched = indices.len(),
        total = table.len(),
        mode = ?spec.mode(),
        "filter evaluated"
    );

    FilteredView {
        table,
        indices,
        mode: spec.mode(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
