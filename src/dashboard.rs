// 🖥️ Dashboard Pipeline - one interaction, start to finish
//
// FilterSpec -> evaluate -> every aggregator -> adapter
//
// The trend panel is chosen from the view's QueryMode and nowhere else.

use crate::adapter::{
    self, ArticleRow, BarChartInput, ChordInput, ChoroplethInput, DisplayOptions,
    HistogramInput, LineChartInput, StackedBarInput, WordCloudInput,
};
use crate::aggregate::{
    co_occurrence_pairs, geo_count, numeric_bucket_distribution, source_category_crosstab,
    time_series, word_frequency, Buckets, Dimension, Granularity, ListField, NumericField,
};
use crate::config::AggregateConfig;
use crate::error::BucketError;
use crate::filter::{evaluate, FilterSpec, QueryMode};
use crate::store::RecordTable;
use serde::Serialize;
use tracing::debug;

// ============================================================================
// SETTINGS
// ============================================================================

/// Validated aggregation parameters, prepared once per process
#[derive(Debug, Clone)]
pub struct DashboardSettings {
    pub top_n: usize,
    pub topic_field: ListField,
    pub granularity: Granularity,
    pub country_pair_threshold: usize,
    pub people_pair_threshold: usize,
    pub sentiment_buckets: Buckets,
    pub subjectivity_buckets: Buckets,
    pub article_limit: usize,
}

impl DashboardSettings {
    pub fn from_config(config: &AggregateConfig) -> Result<Self, BucketError> {
        Ok(DashboardSettings {
            top_n: config.top_n,
            topic_field: config.topic_field,
            granularity: config.granularity,
            country_pair_threshold: config.country_pair_threshold,
            people_pair_threshold: config.people_pair_threshold,
            sentiment_buckets: config.sentiment_buckets()?,
            subjectivity_buckets: config.subjectivity_buckets()?,
            article_limit: config.article_limit,
        })
    }
}

// ============================================================================
// PANELS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrendPanel {
    TimeSeries {
        by_category: LineChartInput,
        by_source: LineChartInput,
    },
    SingleDayBreakdown {
        by_source: StackedBarInput,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub filter: FilterSpec,
    pub mode: QueryMode,
    pub article_count: usize,
    pub trend: TrendPanel,
    pub topics: BarChartInput,
    pub word_cloud: WordCloudInput,
    pub country_relations: ChordInput,
    pub people_relations: ChordInput,
    pub sentiment: HistogramInput,
    pub subjectivity: HistogramInput,
    pub countries: ChoroplethInput,
    pub articles: Vec<ArticleRow>,
}

impl Dashboard {
    pub fn summary(&self) -> String {
        format!(
            "{} articles ({:?}), {} topics, {} country links, {} people links, {} countries",
            self.article_count,
            self.mode,
            self.topics.labels.len(),
            self.country_relations.links.len(),
            self.people_relations.links.len(),
            self.countries.locations.len()
        )
    }
}

/// Run the full pipeline for one query
pub fn build(table: &RecordTable, spec: &FilterSpec, settings: &DashboardSettings) -> Dashboard {
    let view = evaluate(table, spec);

    let trend = match view.mode() {
        QueryMode::TimeSeries => TrendPanel::TimeSeries {
            by_category: adapter::line_chart(
                &time_series(&view, Dimension::Category, settings.granularity),
                DisplayOptions::titled("Anzahl Artikel nach Kategorien"),
            ),
            by_source: adapter::line_chart(
                &time_series(&view, Dimension::Source, settings.granularity),
                DisplayOptions::titled("Anzahl Artikel nach Zeitung"),
            ),
        },
        QueryMode::SingleDayBreakdown => TrendPanel::SingleDayBreakdown {
            by_source: adapter::stacked_bar(
                &source_category_crosstab(&view),
                DisplayOptions::titled("Häufigkeiten nach Kategorien")
                    .with_axes("Kategorie", "Häufigkeit"),
            ),
        },
    };

    let topics = word_frequency(&view, settings.topic_field, settings.top_n);

    let sentiment = numeric_bucket_distribution(
        &view,
        NumericField::Sentiment,
        &settings.sentiment_buckets,
    );
    let subjectivity = numeric_bucket_distribution(
        &view,
        NumericField::Subjectivity,
        &settings.subjectivity_buckets,
    );
    if sentiment.out_of_range + subjectivity.out_of_range > 0 {
        debug!(
            sentiment = sentiment.out_of_range,
            subjectivity = subjectivity.out_of_range,
            "scores outside bucket range were clamped"
        );
    }

    let dashboard = Dashboard {
        filter: spec.clone(),
        mode: view.mode(),
        article_count: view.len(),
        trend,
        topics: adapter::bar_chart(&topics, DisplayOptions::titled("Themen Analyse")),
        word_cloud: adapter::word_cloud(&topics, DisplayOptions::default()),
        country_relations: adapter::chord(
            &co_occurrence_pairs(&view, ListField::Countries, settings.country_pair_threshold),
            DisplayOptions::titled("Länder"),
        ),
        people_relations: adapter::chord(
            &co_occurrence_pairs(&view, ListField::People, settings.people_pair_threshold),
            DisplayOptions::titled("Personen"),
        ),
        sentiment: adapter::histogram(&sentiment, DisplayOptions::titled("Sentiment")),
        subjectivity: adapter::histogram(&subjectivity, DisplayOptions::titled("Subjektivität")),
        countries: adapter::choropleth(
            &geo_count(&view, ListField::Countries),
            DisplayOptions::default(),
        ),
        articles: adapter::article_table(&view, settings.article_limit),
    };

    debug!(summary = %dashboard.summary(), "dashboard built");
    dashboard
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DateRange, Selection};
    use crate::store::tests::{create_test_record, day};
    use crate::store::LoadOptions;

    fn settings() -> DashboardSettings {
        DashboardSettings::from_config(&AggregateConfig::default()).unwrap()
    }

    fn sample_table() -> RecordTable {
        RecordTable::load(
            include_str!("../data/sample_articles.tsv").as_bytes(),
            &LoadOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_multi_day_builds_time_series() {
        let table = sample_table();
        let (start, end) = table.date_span().unwrap();
        let spec = FilterSpec::new(DateRange::new(start, end).unwrap());

        let dashboard = build(&table, &spec, &settings());

        println!("Dashboard: {}", dashboard.summary());
        assert_eq!(dashboard.mode, QueryMode::TimeSeries);
        assert_eq!(dashboard.article_count, table.len());
        assert!(matches!(dashboard.trend, TrendPanel::TimeSeries { .. }));
        assert!(!dashboard.topics.labels.is_empty());
        assert!(dashboard.topics.labels.len() <= 20);
        assert_eq!(
            dashboard.sentiment.counts.iter().sum::<usize>(),
            table.len()
        );
    }

    #[test]
    fn test_single_day_builds_breakdown() {
        let table = sample_table();
        let first_day = table.get(0).unwrap().date;
        let spec = FilterSpec::new(DateRange::single(first_day));

        let dashboard = build(&table, &spec, &settings());

        assert_eq!(dashboard.mode, QueryMode::SingleDayBreakdown);
        match &dashboard.trend {
            TrendPanel::SingleDayBreakdown { by_source } => {
                let total: usize = by_source.traces.iter().flat_map(|t| t.y.iter()).sum();
                assert_eq!(total, dashboard.article_count);
            }
            other => panic!("expected single-day breakdown, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_view_is_well_formed() {
        let table = RecordTable::from_records(vec![create_test_record("NZZ", "Sport", "2022-01-01")]);
        let spec = FilterSpec::new(DateRange::new(day("2023-01-01"), day("2023-01-31")).unwrap())
            .with_sources(Selection::only(["NZZ"]));

        let dashboard = build(&table, &spec, &settings());

        assert_eq!(dashboard.article_count, 0);
        assert!(dashboard.topics.labels.is_empty());
        assert!(dashboard.country_relations.nodes.is_empty());
        assert!(dashboard.countries.locations.is_empty());
        assert!(dashboard.articles.is_empty());
        assert_eq!(dashboard.sentiment.counts.len(), 10);
        assert!(dashboard.sentiment.counts.iter().all(|&c| c == 0));
        match &dashboard.trend {
            TrendPanel::TimeSeries { by_category, .. } => assert!(by_category.x.is_empty()),
            other => panic!("unexpected trend panel {other:?}"),
        }

        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["trend"]["kind"], "time_series");
        println!("✅ Empty dashboard PASSED");
    }
}
