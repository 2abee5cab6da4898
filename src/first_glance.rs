//! First-glance latency.
//!
//! For every trial, the first sample hitting a target AOI and its latency
//! from the trial's first sample.  Trials that never hit the target (or have
//! no samples at all) still get a record, with only the participant and
//! stimulus filled in.
use anyhow::{Context, Result};

use crate::table::SampleTable;
use crate::trial::Trial;

/// First hit on the target AOI within one trial.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstGlance {
    pub participant: String,
    pub stimulus: String,
    pub recording: Option<String>,
    pub trial_start: Option<f64>,
    pub first_glance: Option<f64>,
    pub latency: Option<f64>,
}

impl FirstGlance {
    /// Record for a trial without any target hit.
    pub fn missing(trial: &Trial) -> Self {
        Self {
            participant: trial.participant.clone(),
            stimulus: trial.stimulus.clone(),
            recording: None,
            trial_start: None,
            first_glance: None,
            latency: None,
        }
    }

    #[inline]
    pub fn is_found(&self) -> bool {
        self.first_glance.is_some()
    }
}

/// Locate the first sample of `trial` whose `target` indicator is set.
///
/// `target` is a column index into `table.aoi_hits`.
pub fn find_first_glance(table: &SampleTable, trial: &Trial, target: usize) -> FirstGlance {
    let hit = trial
        .rows
        .iter()
        .copied()
        .find(|&row| table.aoi_hits[[row, target]] == 1);

    match (trial.first_row(), hit) {
        (Some(first), Some(row)) => {
            let start = table.timestamp[first];
            let at = table.timestamp[row];
            FirstGlance {
                participant: trial.participant.clone(),
                stimulus: trial.stimulus.clone(),
                recording: Some(table.recording[row].clone()),
                trial_start: Some(start),
                first_glance: Some(at),
                latency: Some(at - start),
            }
        }
        _ => {
            log::info!(
                "no '{}' hit for participant {} stimulus {} ({} samples)",
                table.aoi_names[target],
                trial.participant,
                trial.stimulus,
                trial.rows.len()
            );
            FirstGlance::missing(trial)
        }
    }
}

/// One record per trial, targeting the indicator column named `target`.
pub fn first_glances(table: &SampleTable, trials: &[Trial], target: &str) -> Result<Vec<FirstGlance>> {
    let idx = table
        .aoi_index(target)
        .with_context(|| format!("target indicator '{target}' is not an AOI column"))?;
    Ok(trials
        .iter()
        .map(|t| find_first_glance(table, t, idx))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{SampleRow, TableBuilder};

    fn table(ts: &[f64], bottom: &[u8]) -> SampleTable {
        let mut b = TableBuilder::new(vec!["aoi_hit_[box:bottom]".into(), "aoi_hit_[box:top]".into()]);
        for (&t, &h) in ts.iter().zip(bottom) {
            b.push(SampleRow {
                participant: "P1".into(),
                recording: "R1".into(),
                stimulus: Some("S1".into()),
                timestamp: t,
                hits: vec![h, 1 - h],
                ..SampleRow::default()
            })
            .unwrap();
        }
        b.build()
    }

    fn trial(n: usize) -> Trial {
        Trial { participant: "P1".into(), stimulus: "S1".into(), rows: (0..n).collect() }
    }

    #[test]
    fn latency_from_trial_start() {
        let t = table(&[100.0, 150.0, 200.0], &[0, 1, 1]);
        let fg = find_first_glance(&t, &trial(3), 0);
        assert_eq!(fg.trial_start, Some(100.0));
        assert_eq!(fg.first_glance, Some(150.0));
        assert_eq!(fg.latency, Some(50.0));
        assert_eq!(fg.recording.as_deref(), Some("R1"));
    }

    #[test]
    fn no_hit_gives_placeholder() {
        let t = table(&[100.0, 150.0], &[0, 0]);
        let fg = find_first_glance(&t, &trial(2), 0);
        assert_eq!(fg, FirstGlance::missing(&trial(2)));
        assert!(!fg.is_found());
    }

    #[test]
    fn other_indicator_can_be_targeted() {
        let t = table(&[100.0, 150.0], &[1, 0]);
        let fg = first_glances(&t, &[trial(2)], "aoi_hit_[box:top]").unwrap();
        assert_eq!(fg[0].latency, Some(50.0));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let t = table(&[100.0], &[1]);
        assert!(first_glances(&t, &[trial(1)], "aoi_hit_[box:left]").is_err());
    }
}
