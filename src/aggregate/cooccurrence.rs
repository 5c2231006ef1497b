// 🔗 Co-occurrence Pairs - relation network behind chord diagrams

use super::ListField;
use crate::filter::FilteredView;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Unordered pair of distinct values with the number of records containing both
///
/// `a` < `b` lexicographically, so each pair has exactly one representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoOccurrence {
    pub a: String,
    pub b: String,
    pub count: usize,
}

impl CoOccurrence {
    pub fn involves(&self, value: &str) -> bool {
        self.a == value || self.b == value
    }
}

/// Count unordered pairs of distinct values per record and keep those with
/// `count >= threshold`
///
/// Duplicates inside one record are collapsed first, so a record lists each
/// pair at most once and never pairs a value with itself. Output is ordered
/// by count descending, ties by the first record the pair appeared in.
pub fn co_occurrence_pairs(
    view: &FilteredView<'_>,
    field: ListField,
    threshold: usize,
) -> Vec<CoOccurrence> {
    let mut position: HashMap<(&str, &str), usize> = HashMap::new();
    let mut pairs: Vec<((&str, &str), usize)> = Vec::new();

    for record in view.records() {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = field
            .values(record)
            .iter()
            .map(String::as_str)
            .filter(|v| seen.insert(*v))
            .collect();

        if distinct.len() < 2 {
            continue;
        }

        for (i, &first) in distinct.iter().enumerate() {
            for &second in &distinct[i + 1..] {
                let key = if first <= second {
                    (first, second)
                } else {
                    (second, first)
                };

                match position.get(&key) {
                    Some(&idx) => pairs[idx].1 += 1,
                    None => {
                        position.insert(key, pairs.len());
                        pairs.push((key, 1));
                    }
                }
            }
        }
    }

    let mut kept: Vec<((&str, &str), usize)> = pairs
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .collect();
    kept.sort_by(|x, y| y.1.cmp(&x.1));

    kept.into_iter()
        .map(|((a, b), count)| CoOccurrence {
            a: a.to_string(),
            b: b.to_string(),
            count,
        })
        .collect()
}
