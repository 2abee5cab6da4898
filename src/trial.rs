//! Trial partitioning.
//!
//! A trial is every row of one `(participant, stimulus)` pair, ordered by
//! `recording_timestamp` with ties kept in input order.  Every pair in the
//! [`Universe`] yields a trial, including pairs with no rows, so that
//! per-trial outputs keep a fixed cardinality.
//!
//! ```text
//! universe: participants [P1, P2] × stimuli [S1, S2]
//!
//! ParticipantMajor:  (P1,S1) (P1,S2) (P2,S1) (P2,S2)
//! StimulusMajor:     (P1,S1) (P2,S1) (P1,S2) (P2,S2)
//! ```
use std::collections::{HashMap, HashSet};

use crate::config::IterationOrder;
use crate::table::SampleTable;

/// Distinct participants and stimuli, in the order trials are walked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Universe {
    pub participants: Vec<String>,
    pub stimuli: Vec<String>,
}

impl Universe {
    /// Participants and stimuli observed in `table`, in first-appearance
    /// order.  Rows without a stimulus do not contribute a stimulus.
    pub fn observed(table: &SampleTable) -> Self {
        let mut participants: Vec<String> = Vec::new();
        let mut stimuli: Vec<String> = Vec::new();
        for p in &table.participant {
            if !participants.contains(p) {
                participants.push(p.clone());
            }
        }
        for s in table.stimulus.iter().flatten() {
            if !stimuli.contains(s) {
                stimuli.push(s.clone());
            }
        }
        Self { participants, stimuli }
    }

    /// A universe supplied by the caller (e.g. the intended design).
    ///
    /// Repeated names are dropped, keeping the first occurrence.
    pub fn new(participants: Vec<String>, stimuli: Vec<String>) -> Self {
        Self {
            participants: dedup_keep_first(participants),
            stimuli: dedup_keep_first(stimuli),
        }
    }

    /// Number of (participant, stimulus) pairs.
    pub fn n_pairs(&self) -> usize {
        self.participants.len() * self.stimuli.len()
    }

    /// All pairs in the requested nesting order.
    pub fn pairs(&self, order: IterationOrder) -> Vec<(&str, &str)> {
        let mut out = Vec::with_capacity(self.n_pairs());
        match order {
            IterationOrder::ParticipantMajor => {
                for p in &self.participants {
                    for s in &self.stimuli {
                        out.push((p.as_str(), s.as_str()));
                    }
                }
            }
            IterationOrder::StimulusMajor => {
                for s in &self.stimuli {
                    for p in &self.participants {
                        out.push((p.as_str(), s.as_str()));
                    }
                }
            }
        }
        out
    }
}

fn dedup_keep_first(names: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.into_iter().filter(|n| seen.insert(n.clone())).collect()
}

/// Rows of one (participant, stimulus) pair, in temporal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trial {
    pub participant: String,
    pub stimulus: String,
    /// Row indices into the source table.
    pub rows: Vec<usize>,
}

impl Trial {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row index of the sample that starts the trial.
    #[inline]
    pub fn first_row(&self) -> Option<usize> {
        self.rows.first().copied()
    }
}

/// Split `table` into one [`Trial`] per universe pair.
///
/// Rows outside the universe, and rows with no stimulus, belong to no trial.
pub fn partition(table: &SampleTable, universe: &Universe, order: IterationOrder) -> Vec<Trial> {
    let mut groups: HashMap<(&str, &str), Vec<usize>> = HashMap::new();
    for i in 0..table.len() {
        if let Some(stim) = table.stimulus[i].as_deref() {
            groups
                .entry((table.participant[i].as_str(), stim))
                .or_default()
                .push(i);
        }
    }

    let ts = &table.timestamp;
    let trials: Vec<Trial> = universe
        .pairs(order)
        .into_iter()
        .map(|(p, s)| {
            let mut rows = groups.get(&(p, s)).cloned().unwrap_or_default();
            // Vec::sort_by is stable, so equal timestamps keep row order.
            rows.sort_by(|&a, &b| ts[a].total_cmp(&ts[b]));
            Trial {
                participant: p.to_string(),
                stimulus: s.to_string(),
                rows,
            }
        })
        .collect();

    let n_empty = trials.iter().filter(|t| t.is_empty()).count();
    log::debug!(
        "partitioned {} rows into {} trials ({} empty)",
        table.len(),
        trials.len(),
        n_empty
    );
    trials
}
