//! Pupil diameter dynamics.
//!
//! Computed over the whole table in row order (not per trial):
//!
//! ```text
//! diff_left[i]  = round3(left[i]  − left[i−1])
//! diff_right[i] = round3(right[i] − right[i−1])
//! avg[i]        = round3((left[i] + right[i]) / 2)
//! diff_avg[i]   = round3(avg[i] − avg[i−1])
//! significant   = diff_avg[i] > threshold
//! ```
//!
//! Any missing operand makes the result missing; row 0 has no differences.
//! A missing `diff_avg` is never significant.
use crate::table::SampleTable;

/// Decimal places kept by every derived pupil value.
pub const PUPIL_DECIMALS: i32 = 3;

/// Round to `decimals` places, ties to even (`numpy.round` semantics).
pub fn round_decimals(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round_ties_even() / scale
}

#[inline]
fn round3(x: f64) -> f64 {
    round_decimals(x, PUPIL_DECIMALS)
}

/// First difference of a nullable series, rounded.
pub fn diff(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<f64> = None;
    for (i, &cur) in series.iter().enumerate() {
        out.push(match (i, prev, cur) {
            (0, _, _) => None,
            (_, Some(p), Some(c)) => Some(round3(c - p)),
            _ => None,
        });
        prev = cur;
    }
    out
}

/// Derived pupil columns, one entry per table row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PupilFeatures {
    pub diff_left: Vec<Option<f64>>,
    pub diff_right: Vec<Option<f64>>,
    pub avg: Vec<Option<f64>>,
    pub diff_avg: Vec<Option<f64>>,
    pub significant: Vec<bool>,
}

impl PupilFeatures {
    #[inline]
    pub fn len(&self) -> usize {
        self.avg.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.avg.is_empty()
    }
}

/// Compute every pupil feature for `table` with the given significance
/// threshold.
pub fn aggregate_pupil(table: &SampleTable, threshold: f64) -> PupilFeatures {
    let avg: Vec<Option<f64>> = table
        .pupil_left
        .iter()
        .zip(&table.pupil_right)
        .map(|(l, r)| Some(round3((l.as_ref()? + r.as_ref()?) / 2.0)))
        .collect();
    let diff_avg = diff(&avg);
    let significant = flag_significant(&diff_avg, threshold);

    PupilFeatures {
        diff_left: diff(&table.pupil_left),
        diff_right: diff(&table.pupil_right),
        avg,
        diff_avg,
        significant,
    }
}

/// `d > threshold`, with missing differences counted as not significant.
pub fn flag_significant(diff_avg: &[Option<f64>], threshold: f64) -> Vec<bool> {
    diff_avg
        .iter()
        .map(|d| d.is_some_and(|d| d > threshold))
        .collect()
}
