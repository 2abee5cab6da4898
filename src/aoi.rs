//! AOI dwell segmentation.
//!
//! Each sample is labelled with the area of interest it hits (or
//! `neither`), then every trial is walked in temporal order.  A segment is
//! emitted whenever the label changes:
//!
//! ```text
//! ts     100      150      200      260
//! label  neither  bottom   bottom   top
//!        └── (neither, 100, 50) ──┘
//!                 └─── (bottom, 150, 110) ───┘
//!                                   top run from 260: still open, not emitted
//! ```
//!
//! The run that is still open when the trial ends produces no segment.
use ndarray::ArrayView1;

use crate::config::AmbiguityPolicy;
use crate::table::SampleTable;
use crate::trial::Trial;

/// Label of the region a sample falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AoiLabel {
    /// Index of the AOI indicator column that was hit.
    Region(usize),
    Neither,
}

/// Ordered classification rules: indicator columns checked in priority
/// order, falling through to [`AoiLabel::Neither`].
#[derive(Debug, Clone)]
pub struct AoiRules {
    names: Vec<String>,
    policy: AmbiguityPolicy,
}

impl AoiRules {
    pub fn new(names: Vec<String>, policy: AmbiguityPolicy) -> Self {
        Self { names, policy }
    }

    /// Rules for the indicator columns of `table`.
    pub fn for_table(table: &SampleTable, policy: AmbiguityPolicy) -> Self {
        Self::new(table.aoi_names.clone(), policy)
    }

    /// Classify one row of hit flags.
    ///
    /// Returns the label and whether more than one indicator was set.
    pub fn classify(&self, hits: ArrayView1<'_, u8>) -> (AoiLabel, bool) {
        let mut first = None;
        let mut n_hits = 0usize;
        for (idx, &h) in hits.iter().enumerate() {
            if h != 0 {
                n_hits += 1;
                first.get_or_insert(idx);
            }
        }
        let ambiguous = n_hits > 1;
        let label = match (first, ambiguous, self.policy) {
            (None, _, _) => AoiLabel::Neither,
            (Some(_), true, AmbiguityPolicy::Neither) => AoiLabel::Neither,
            (Some(idx), _, _) => AoiLabel::Region(idx),
        };
        (label, ambiguous)
    }

    /// Display name of a label: the indicator column name, or `neither`.
    pub fn name(&self, label: AoiLabel) -> &str {
        match label {
            AoiLabel::Region(idx) => self.names.get(idx).map_or("unknown", String::as_str),
            AoiLabel::Neither => "neither",
        }
    }
}

/// One maximal run of a single label within a trial.
#[derive(Debug, Clone, PartialEq)]
pub struct AoiSegment {
    pub participant: String,
    pub recording: String,
    pub stimulus: String,
    pub label: AoiLabel,
    /// Timestamp of the first sample in the run.
    pub start: f64,
    /// Time until the first sample with a different label.
    pub duration: f64,
}

/// Walk one trial and emit a segment at every label change.
///
/// Identifying fields are taken from the sample that ends the run.  Empty
/// trials produce nothing.
pub fn track_aoi_changes(table: &SampleTable, trial: &Trial, rules: &AoiRules) -> Vec<AoiSegment> {
    let Some(first) = trial.first_row() else {
        return Vec::new();
    };

    let (mut label, amb) = rules.classify(table.aoi_hits.row(first));
    let mut ambiguous = usize::from(amb);
    let mut start = table.timestamp[first];
    let mut segments = Vec::new();

    for &row in &trial.rows[1..] {
        let (next, amb) = rules.classify(table.aoi_hits.row(row));
        ambiguous += usize::from(amb);
        if next != label {
            let ts = table.timestamp[row];
            segments.push(AoiSegment {
                participant: table.participant[row].clone(),
                recording: table.recording[row].clone(),
                stimulus: trial.stimulus.clone(),
                label,
                start,
                duration: ts - start,
            });
            label = next;
            start = ts;
        }
    }

    if ambiguous > 0 {
        log::warn!(
            "{} samples with several AOI hits in trial ({}, {})",
            ambiguous,
            trial.participant,
            trial.stimulus
        );
    }
    segments
}

/// Segments of every trial, concatenated in trial order.
pub fn segment_trials(table: &SampleTable, trials: &[Trial], rules: &AoiRules) -> Vec<AoiSegment> {
    trials
        .iter()
        .flat_map(|t| track_aoi_changes(table, t, rules))
        .collect()
}
