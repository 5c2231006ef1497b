// 🔤 Flatten-and-count aggregators (topics, geography)

use super::{LabelCount, ListField};
use crate::filter::FilteredView;
use std::collections::HashMap;

/// Count every item of `field` across the view
///
/// Result is ordered by count descending. Equal counts keep the order in
/// which the token first appeared in the flattened sequence.
fn flatten_and_count(view: &FilteredView<'_>, field: ListField) -> Vec<LabelCount> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for record in view.records() {
        for token in field.values(record) {
            match position.get(token.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    position.insert(token.as_str(), counts.len());
                    counts.push((token.as_str(), 1));
                }
            }
        }
    }

    // sort_by is stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    counts
        .into_iter()
        .map(|(label, count)| LabelCount::new(label, count))
        .collect()
}

/// Most frequent tokens of a list field, case-sensitive as stored
pub fn word_frequency(view: &FilteredView<'_>, field: ListField, top_n: usize) -> Vec<LabelCount> {
    let mut counts = flatten_and_count(view, field);
    counts.truncate(top_n);
    counts
}

/// Occurrences per value (e.g. country name) across the view
pub fn geo_count(view: &FilteredView<'_>, field: ListField) -> Vec<LabelCount> {
    flatten_and_count(view, field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{evaluate, DateRange, FilterSpec};
    use crate::store::tests::{create_test_record, day};
    use crate::store::RecordTable;

    fn table_with_entities(entities: &[&[&str]]) -> RecordTable {
        let records = entities
            .iter()
            .map(|tokens| {
                let mut record = create_test_record("NZZ", "Schweiz", "2022-02-01");
                record.entities = tokens.iter().map(|t| t.to_string()).collect();
                record.countries = record.entities.clone();
                record
            })
            .collect();
        RecordTable::from_records(records)
    }

    #[test]
    fn test_top_n_with_counts() {
        let table = table_with_entities(&[&["a", "b", "a"], &["c", "b", "a"]]);
        let view = evaluate(&table, &FilterSpec::everything());

        let top = word_frequency(&view, ListField::Entities, 2);

        assert_eq!(top, vec![LabelCount::new("a", 3), LabelCount::new("b", 2)]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = table_with_entities(&[&["zeta", "alpha"], &["mid", "alpha", "zeta", "mid"]]);
        let view = evaluate(&table, &FilterSpec::everything());

        let top = word_frequency(&view, ListField::Entities, 10);
        let labels: Vec<&str> = top.iter().map(|c| c.label.as_str()).collect();

        // all three have count 2; not alphabetical
        assert_eq!(labels, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_case_sensitive_and_fewer_than_top_n() {
        let table = table_with_entities(&[&["Bund", "bund", "Bund"]]);
        let view = evaluate(&table, &FilterSpec::everything());

        let top = word_frequency(&view, ListField::Entities, 20);

        assert_eq!(top, vec![LabelCount::new("Bund", 2), LabelCount::new("bund", 1)]);
    }

    #[test]
    fn test_empty_view_yields_empty() {
        let table = table_with_entities(&[&["a"]]);
        let range = DateRange::new(day("2030-01-01"), day("2030-01-02")).unwrap();
        let view = evaluate(&table, &FilterSpec::new(range));

        assert!(word_frequency(&view, ListField::Entities, 20).is_empty());
        assert!(geo_count(&view, ListField::Countries).is_empty());
    }

    #[test]
    fn test_geo_count_counts_repeats() {
        let table = table_with_entities(&[
            &["Switzerland", "Germany"],
            &["Germany"],
            &["France", "Germany", "Germany"],
            &["Qatar", "Qatar"],
        ]);
        let view = evaluate(&table, &FilterSpec::everything());

        let geo = geo_count(&view, ListField::Countries);

        assert_eq!(
            geo,
            vec![
                LabelCount::new("Germany", 4),
                LabelCount::new("Qatar", 2),
                LabelCount::new("Switzerland", 1),
                LabelCount::new("France", 1),
            ]
        );
        println!("✅ Geo count PASSED: {} countries", geo.len());
    }
}
