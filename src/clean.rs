//! Row filtering ahead of feature extraction.
//!
//! Drops rows whose stimulus fails the inclusion filter and rows with an
//! invalid eye-movement type.  The input table is never modified; a new one
//! is built from the surviving row indices.
use std::collections::HashSet;

use regex::Regex;

use crate::table::SampleTable;

/// Resolved filter settings.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    /// Stimulus inclusion filter.  Rows without a stimulus are kept.
    pub stimulus_filter: Regex,
    /// Eye-movement types to drop.
    pub invalid_eye_movements: HashSet<String>,
}

impl CleanOptions {
    pub fn new(stimulus_filter: Regex, invalid_eye_movements: &[String]) -> Self {
        Self {
            stimulus_filter,
            invalid_eye_movements: invalid_eye_movements.iter().cloned().collect(),
        }
    }

    /// Whether row `i` of `table` survives both filters.
    pub fn keeps(&self, table: &SampleTable, i: usize) -> bool {
        let stim_ok = table.stimulus[i]
            .as_deref()
            .map_or(true, |s| self.stimulus_filter.is_match(s));
        stim_ok && !self.invalid_eye_movements.contains(&table.eye_movement[i])
    }
}

/// Indices of the rows kept by `opts`, in input order.
pub fn kept_rows(table: &SampleTable, opts: &CleanOptions) -> Vec<usize> {
    (0..table.len()).filter(|&i| opts.keeps(table, i)).collect()
}

/// Filtered copy of `table`.
pub fn clean(table: &SampleTable, opts: &CleanOptions) -> SampleTable {
    let rows = kept_rows(table, opts);
    log::debug!("cleaning kept {} of {} rows", rows.len(), table.len());
    table.select(&rows)
}
