// 📈 Time Series - article counts per day and group

use super::{Dimension, LabelCount};
use crate::filter::FilteredView;
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Width of one time step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    /// Keyed by the Monday of the ISO week
    Week,
    /// Keyed by the first day of the month
    Month,
}

impl Granularity {
    pub fn bucket(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Day => date,
            Granularity::Week => {
                let back = u64::from(date.weekday().num_days_from_monday());
                date.checked_sub_days(Days::new(back)).unwrap_or(date)
            }
            Granularity::Month => date.with_day(1).unwrap_or(date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    /// Groups observed on this date, in the series' group order
    pub counts: Vec<LabelCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeSeries {
    pub dimension: Dimension,
    pub granularity: Granularity,
    /// Every group in the view, first-seen order
    pub groups: Vec<String>,
    /// Ascending by date
    pub points: Vec<TimePoint>,
}

impl TimeSeries {
    pub fn count(&self, date: NaiveDate, group: &str) -> usize {
        self.points
            .iter()
            .find(|p| p.date == date)
            .and_then(|p| p.counts.iter().find(|c| c.label == group))
            .map(|c| c.count)
            .unwrap_or(0)
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Count records per (time bucket, group)
pub fn time_series(
    view: &FilteredView<'_>,
    dimension: Dimension,
    granularity: Granularity,
) -> TimeSeries {
    let mut group_index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<&str> = Vec::new();
    let mut by_date: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();

    for record in view.records() {
        let key = dimension.key(record);
        let idx = *group_index.entry(key).or_insert_with(|| {
            groups.push(key);
            groups.len() - 1
        });

        let row = by_date.entry(granularity.bucket(record.date)).or_default();
        if row.len() <= idx {
            row.resize(idx + 1, 0);
        }
        row[idx] += 1;
    }

    let points = by_date
        .into_iter()
        .map(|(date, row)| TimePoint {
            date,
            counts: row
                .into_iter()
                .enumerate()
                .filter(|(_, count)| *count > 0)
                .map(|(idx, count)| LabelCount::new(groups[idx], count))
                .collect(),
        })
        .collect();

    TimeSeries {
        dimension,
        granularity,
        groups: groups.into_iter().map(str::to_string).collect(),
        points,
    }
}

/// Daily article count per category
pub fn category_time_series(view: &FilteredView<'_>) -> TimeSeries {
    time_series(view, Dimension::Category, Granularity::Day)
}
