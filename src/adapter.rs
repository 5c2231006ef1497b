// 🔌 View Adapter - boundary between the engine and its collaborators
//
// Inbound:  raw UI selections -> validated FilterSpec
// Outbound: aggregates -> the value shapes the chart renderers consume
//
// Nothing here computes statistics. Outbound functions only rename fields
// and reshape (ordered mappings -> parallel arrays, zero-filled grids).

use crate::aggregate::{CoOccurrence, Distribution, LabelCount, SourceCategoryCrosstab, TimeSeries};
use crate::error::FilterError;
use crate::filter::{DateRange, FilterSpec, FilteredView, Selection};
use crate::store::RecordTable;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// QUERY BOUNDARY
// ============================================================================

/// Selections exactly as the UI delivers them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryInput {
    /// One date (single day) or two (start, end), `YYYY-MM-DD`
    pub dates: Vec<String>,
    /// Category names, or a sentinel entry
    pub categories: Vec<String>,
    /// Source names, or a sentinel entry
    pub sources: Vec<String>,
}

impl QueryInput {
    /// Validate shape and build a FilterSpec
    ///
    /// `all_sentinels` lists every spelling (case-insensitive) that selects
    /// the whole dimension.
    pub fn to_filter_spec<S: AsRef<str>>(&self, all_sentinels: &[S]) -> Result<FilterSpec, FilterError> {
        let date_range = match self.dates.as_slice() {
            [] => return Err(FilterError::MissingDate),
            [day] => DateRange::single(parse_query_date(day)?),
            [start, end] => DateRange::new(parse_query_date(start)?, parse_query_date(end)?)?,
            more => return Err(FilterError::TooManyDates { count: more.len() }),
        };

        Ok(FilterSpec::new(date_range)
            .with_categories(selection(&self.categories, "category", all_sentinels)?)
            .with_sources(selection(&self.sources, "source", all_sentinels)?))
    }

    /// Like `to_filter_spec`, additionally rejecting values the table never saw
    pub fn to_filter_spec_for<S: AsRef<str>>(
        &self,
        table: &RecordTable,
        all_sentinels: &[S],
    ) -> Result<FilterSpec, FilterError> {
        let spec = self.to_filter_spec(all_sentinels)?;

        check_known(&spec.categories, "category", |v| table.category_rank(v).is_some())?;
        check_known(&spec.sources, "source", |v| table.source_rank(v).is_some())?;

        Ok(spec)
    }
}

fn parse_query_date(value: &str) -> Result<NaiveDate, FilterError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| FilterError::InvalidDate {
        value: value.to_string(),
    })
}

fn is_sentinel<S: AsRef<str>>(value: &str, all_sentinels: &[S]) -> bool {
    let value = value.trim();
    all_sentinels
        .iter()
        .any(|sentinel| value.eq_ignore_ascii_case(sentinel.as_ref()))
}

/// A sentinel anywhere in the list selects everything
fn selection<S: AsRef<str>>(
    values: &[String],
    dimension: &str,
    all_sentinels: &[S],
) -> Result<Selection, FilterError> {
    let values: Vec<&str> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect();

    if values.is_empty() {
        return Err(FilterError::EmptySelection {
            dimension: dimension.to_string(),
        });
    }

    if values.iter().any(|v| is_sentinel(v, all_sentinels)) {
        return Ok(Selection::All);
    }

    Ok(Selection::only(values))
}

fn check_known<F>(selection: &Selection, dimension: &str, known: F) -> Result<(), FilterError>
where
    F: Fn(&str) -> bool,
{
    if let Selection::Only(values) = selection {
        if let Some(unknown) = values.iter().find(|v| !known(v.as_str())) {
            return Err(FilterError::UnknownValue {
                dimension: dimension.to_string(),
                value: unknown.clone(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// DISPLAY OPTIONS
// ============================================================================

/// Passed through to the renderer untouched; absent means "renderer decides"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl DisplayOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        DisplayOptions {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = Some(x_label.into());
        self.y_label = Some(y_label.into());
        self
    }
}

// ============================================================================
// RENDER INPUTS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<usize>,
}

/// Multi-line chart: shared x axis, one zero-filled series per group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineChartInput {
    pub options: DisplayOptions,
    pub x: Vec<String>,
    pub series: Vec<Series>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarTrace {
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<usize>,
}

/// Stacked bars, one trace per source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackedBarInput {
    pub options: DisplayOptions,
    pub traces: Vec<BarTrace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarChartInput {
    pub options: DisplayOptions,
    pub labels: Vec<String>,
    pub values: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeightedWord {
    pub text: String,
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordCloudInput {
    pub options: DisplayOptions,
    pub words: Vec<WeightedWord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordLink {
    pub source: usize,
    pub target: usize,
    pub value: usize,
}

/// Chord diagram: node names plus links that index into them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChordInput {
    pub options: DisplayOptions,
    pub nodes: Vec<String>,
    pub links: Vec<ChordLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramInput {
    pub options: DisplayOptions,
    /// `counts.len() + 1` bucket edges
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    pub out_of_range: usize,
}

/// Choropleth keyed by raw location names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoroplethInput {
    pub options: DisplayOptions,
    pub locations: Vec<String>,
    pub z: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRow {
    pub source: String,
    pub headline: String,
    pub category: String,
    /// `dd.mm.yyyy`
    pub date: String,
}

// ============================================================================
// OUTBOUND ADAPTERS
// ============================================================================

pub fn line_chart(series: &TimeSeries, options: DisplayOptions) -> LineChartInput {
    let x = series
        .points
        .iter()
        .map(|p| p.date.format("%Y-%m-%d").to_string())
        .collect();

    let mut grid: HashMap<&str, Vec<usize>> = series
        .groups
        .iter()
        .map(|g| (g.as_str(), vec![0; series.points.len()]))
        .collect();

    for (col, point) in series.points.iter().enumerate() {
        for cell in &point.counts {
            if let Some(values) = grid.get_mut(cell.label.as_str()) {
                values[col] = cell.count;
            }
        }
    }

    let series = series
        .groups
        .iter()
        .map(|g| Series {
            name: g.clone(),
            values: grid.remove(g.as_str()).unwrap_or_default(),
        })
        .collect();

    LineChartInput { options, x, series }
}

pub fn stacked_bar(crosstab: &SourceCategoryCrosstab, options: DisplayOptions) -> StackedBarInput {
    let traces = crosstab
        .sources
        .iter()
        .map(|row| BarTrace {
            name: row.source.clone(),
            x: row.categories.iter().map(|c| c.label.clone()).collect(),
            y: row.categories.iter().map(|c| c.count).collect(),
        })
        .collect();

    StackedBarInput { options, traces }
}

pub fn bar_chart(counts: &[LabelCount], options: DisplayOptions) -> BarChartInput {
    BarChartInput {
        options,
        labels: counts.iter().map(|c| c.label.clone()).collect(),
        values: counts.iter().map(|c| c.count).collect(),
    }
}

pub fn word_cloud(counts: &[LabelCount], options: DisplayOptions) -> WordCloudInput {
    WordCloudInput {
        options,
        words: counts
            .iter()
            .map(|c| WeightedWord {
                text: c.label.clone(),
                weight: c.count,
            })
            .collect(),
    }
}

/// Nodes are listed in the order they first appear in `pairs`
pub fn chord(pairs: &[CoOccurrence], options: DisplayOptions) -> ChordInput {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<String> = Vec::new();

    let links = pairs
        .iter()
        .map(|pair| ChordLink {
            source: node_index(&pair.a, &mut index, &mut nodes),
            target: node_index(&pair.b, &mut index, &mut nodes),
            value: pair.count,
        })
        .collect();

    ChordInput {
        options,
        nodes,
        links,
    }
}

fn node_index<'p>(name: &'p str, index: &mut HashMap<&'p str, usize>, nodes: &mut Vec<String>) -> usize {
    *index.entry(name).or_insert_with(|| {
        nodes.push(name.to_string());
        nodes.len() - 1
    })
}

pub fn histogram(distribution: &Distribution, options: DisplayOptions) -> HistogramInput {
    let mut edges: Vec<f64> = distribution.buckets.iter().map(|b| b.lower).collect();
    if let Some(last) = distribution.buckets.last() {
        edges.push(last.upper);
    }

    HistogramInput {
        options,
        edges,
        counts: distribution.counts(),
        out_of_range: distribution.out_of_range,
    }
}

pub fn choropleth(counts: &[LabelCount], options: DisplayOptions) -> ChoroplethInput {
    ChoroplethInput {
        options,
        locations: counts.iter().map(|c| c.label.clone()).collect(),
        z: counts.iter().map(|c| c.count).collect(),
    }
}

/// First `limit` articles of the view in table order
pub fn article_table(view: &FilteredView<'_>, limit: usize) -> Vec<ArticleRow> {
    view.records()
        .take(limit)
        .map(|r| ArticleRow {
            source: r.source.clone(),
            headline: r.headline.clone(),
            category: r.category.clone(),
            date: r.date.format("%d.%m.%Y").to_string(),
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
