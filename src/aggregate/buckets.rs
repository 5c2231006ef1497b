// 📦 Numeric Bucket Distribution - sentiment / subjectivity histograms
//
// Intervals are half-open [lo, hi) except the last, which is closed so the
// upper end of the domain (e.g. subjectivity 1.0) is still in range.
// Values outside [first, last] are clamped into the nearest end bucket and
// also counted in `out_of_range`.

use super::NumericField;
use crate::error::BucketError;
use crate::filter::FilteredView;
use serde::Serialize;

// ============================================================================
// BUCKET LAYOUT
// ============================================================================

/// Generated boundaries are rounded to this many steps per unit, so that
/// `uniform(0.0, 1.0, 10)` yields exactly the literals 0.1, 0.2, 0.3, ...
const BOUNDARY_PRECISION: f64 = 1e9;

fn snap(value: f64) -> f64 {
    (value * BOUNDARY_PRECISION).round() / BOUNDARY_PRECISION
}

/// Validated, strictly increasing bucket boundaries
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Buckets {
    boundaries: Vec<f64>,
}

impl Buckets {
    pub fn new(boundaries: Vec<f64>) -> Result<Self, BucketError> {
        if boundaries.len() < 2 {
            return Err(BucketError::TooFewBoundaries {
                count: boundaries.len(),
            });
        }

        if let Some(&value) = boundaries.iter().find(|b| !b.is_finite()) {
            return Err(BucketError::NonFinite { value });
        }

        for pair in boundaries.windows(2) {
            if pair[0] >= pair[1] {
                return Err(BucketError::NotIncreasing {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }

        Ok(Buckets { boundaries })
    }

    /// `count` equal-width intervals between `min` and `max`
    pub fn uniform(min: f64, max: f64, count: usize) -> Result<Self, BucketError> {
        if count == 0 {
            return Err(BucketError::TooFewBoundaries { count: 1 });
        }

        let mut boundaries: Vec<f64> = (0..count)
            .map(|i| snap(min + (max - min) * i as f64 / count as f64))
            .collect();
        boundaries.push(max);

        Self::new(boundaries)
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// Number of intervals
    pub fn len(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Interval index for `value`, and whether it had to be clamped
    ///
    /// NaN has no position on the axis; it is clamped into the first bucket.
    pub fn locate(&self, value: f64) -> (usize, bool) {
        let first = self.boundaries[0];
        let last = self.boundaries[self.boundaries.len() - 1];

        if value.is_nan() || value < first {
            return (0, true);
        }
        if value > last {
            return (self.len() - 1, true);
        }
        if value == last {
            return (self.len() - 1, false);
        }

        // number of boundaries <= value is at least 1 here
        let upto = self.boundaries.partition_point(|b| *b <= value);
        (upto.saturating_sub(1), false)
    }
}

// ============================================================================
// DISTRIBUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Distribution {
    pub field: NumericField,
    pub buckets: Vec<BucketCount>,
    /// Records clamped into an end bucket
    pub out_of_range: usize,
}

impl Distribution {
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }
}

/// Histogram of one numeric field over the view
///
/// An empty view yields every bucket with count 0.
pub fn numeric_bucket_distribution(
    view: &FilteredView<'_>,
    field: NumericField,
    buckets: &Buckets,
) -> Distribution {
    let mut counts = vec![0usize; buckets.len()];
    let mut out_of_range = 0;

    for record in view.records() {
        let (idx, clamped) = buckets.locate(field.value(record));
        counts[idx] += 1;
        if clamped {
            out_of_range += 1;
        }
    }

    let bounds = buckets.boundaries();
    Distribution {
        field,
        buckets: counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| BucketCount {
                lower: bounds[i],
                upper: bounds[i + 1],
                count,
            })
            .collect(),
        out_of_range,
    }
}
