// 🧮 Source × Category crosstab - single-day breakdown

use super::LabelCount;
use crate::filter::FilteredView;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBreakdown {
    pub source: String,
    /// Count descending, ties by category first-seen order in the table
    pub categories: Vec<LabelCount>,
}

impl SourceBreakdown {
    pub fn total(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceCategoryCrosstab {
    /// Sources in table first-seen order; only sources present in the view
    pub sources: Vec<SourceBreakdown>,
}

impl SourceCategoryCrosstab {
    pub fn get(&self, source: &str, category: &str) -> usize {
        self.sources
            .iter()
            .find(|s| s.source == source)
            .and_then(|s| s.categories.iter().find(|c| c.label == category))
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Count records per (source, category)
pub fn source_category_crosstab(view: &FilteredView<'_>) -> SourceCategoryCrosstab {
    let table = view.table();
    let mut cells: HashMap<&str, HashMap<&str, usize>> = HashMap::new();

    for record in view.records() {
        *cells
            .entry(record.source.as_str())
            .or_default()
            .entry(record.category.as_str())
            .or_insert(0) += 1;
    }

    let mut sources: Vec<(&str, HashMap<&str, usize>)> = cells.into_iter().collect();
    sources.sort_by_key(|(source, _)| table.source_rank(source).unwrap_or(usize::MAX));

    let sources = sources
        .into_iter()
        .map(|(source, counts)| {
            let mut counts: Vec<(&str, usize)> = counts.into_iter().collect();
            counts.sort_by(|a, b| {
                b.1.cmp(&a.1).then_with(|| {
                    let rank_a = table.category_rank(a.0).unwrap_or(usize::MAX);
                    let rank_b = table.category_rank(b.0).unwrap_or(usize::MAX);
                    rank_a.cmp(&rank_b)
                })
            });

            SourceBreakdown {
                source: source.to_string(),
                categories: counts
                    .into_iter()
                    .map(|(category, count)| LabelCount::new(category, count))
                    .collect(),
            }
        })
        .collect();

    SourceCategoryCrosstab { sources }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{evaluate, DateRange, FilterSpec, QueryMode};
    use crate::store::tests::{create_test_record, day};
    use crate::store::RecordTable;

    #[test]
    fn test_single_day_crosstab() {
        let table = RecordTable::from_records(vec![
            create_test_record("Source1", "Cat1", "2022-02-24"),
            create_test_record("Source1", "Cat1", "2022-02-24"),
            create_test_record("Source1", "Cat2", "2022-02-24"),
            create_test_record("Source2", "Cat1", "2022-02-24"),
            create_test_record("Source2", "Cat2", "2022-02-25"),
        ]);
        let view = evaluate(&table, &FilterSpec::new(DateRange::single(day("2022-02-24"))));
        assert_eq!(view.mode(), QueryMode::SingleDayBreakdown);

        let crosstab = source_category_crosstab(&view);

        assert_eq!(
            crosstab.sources,
            vec![
                SourceBreakdown {
                    source: "Source1".to_string(),
                    categories: vec![LabelCount::new("Cat1", 2), LabelCount::new("Cat2", 1)],
                },
                SourceBreakdown {
                    source: "Source2".to_string(),
                    categories: vec![LabelCount::new("Cat1", 1)],
                },
            ]
        );
        assert_eq!(crosstab.get("Source1", "Cat2"), 1);
        assert_eq!(crosstab.get("Source2", "Cat2"), 0);
    }

    #[test]
    fn test_ties_follow_table_order() {
        let table = RecordTable::from_records(vec![
            create_test_record("Other", "Wirtschaft", "2022-01-01"),
            create_test_record("Other", "Kultur", "2022-01-01"),
            create_test_record("Other", "Sport", "2022-01-01"),
            create_test_record("NZZ", "Sport", "2022-03-01"),
            create_test_record("NZZ", "Kultur", "2022-03-01"),
            create_test_record("NZZ", "Wirtschaft", "2022-03-01"),
            create_test_record("NZZ", "Sport", "2022-03-01"),
        ]);
        let view = evaluate(&table, &FilterSpec::new(DateRange::single(day("2022-03-01"))));

        let crosstab = source_category_crosstab(&view);
        let labels: Vec<&str> = crosstab.sources[0]
            .categories
            .iter()
            .map(|c| c.label.as_str())
            .collect();

        // Sport leads on count; Kultur and Wirtschaft tie and follow table order
        assert_eq!(labels, vec!["Sport", "Wirtschaft", "Kultur"]);
        assert_eq!(crosstab.sources[0].total(), 4);
    }

    #[test]
    fn test_empty_view() {
        let table = RecordTable::from_records(vec![create_test_record("NZZ", "Sport", "2022-01-01")]);
        let view = evaluate(&table, &FilterSpec::new(DateRange::single(day("2022-06-01"))));

        assert!(source_category_crosstab(&view).is_empty());
    }
}
