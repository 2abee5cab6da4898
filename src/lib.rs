//! # gazeprep — eye-tracking preprocessing in Rust
//!
//! `gazeprep` turns raw eye-tracker exports (one row per gaze sample) into
//! per-trial features: AOI dwell segments, first-glance latency, time since
//! stimulus onset, and pupil-diameter dynamics.
//!
//! ## Pipeline overview
//!
//! ```text
//! recording.tsv
//!   │
//!   ├─ io::read_samples()          normalised headers, −1 pupil → None
//!   ├─ clean::clean()              stimulus regex + invalid eye movements
//!   ├─ trial::partition()          (participant, stimulus) trials, time-sorted
//!   │    ├─ aoi::segment_trials()          dwell segments per label change
//!   │    ├─ first_glance::first_glances()  first target hit + latency
//!   │    └─ temporal::time_since_stimulus()
//!   └─ pupil::aggregate_pupil()    diffs, averages, significance flag
//!        │
//!        └─→ FeatureSet  →  io::write_feature_set()  (four CSV tables)
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use gazeprep::{preprocess, PipelineConfig};
//! use gazeprep::io::read_samples;
//! use std::path::Path;
//!
//! let cfg = PipelineConfig::default();
//! let raw = read_samples(Path::new("data/session1.tsv"), &cfg).unwrap();
//! let features = preprocess(&raw, &cfg).unwrap();
//!
//! for seg in &features.segments {
//!     println!("{} {} {}", seg.participant, features.aoi_rules.name(seg.label), seg.duration);
//! }
//! ```
//!
//! ## Running individual steps
//!
//! ```no_run
//! use gazeprep::{partition, segment_trials, first_glances, aggregate_pupil};
//! use gazeprep::{AoiRules, AmbiguityPolicy, IterationOrder, SampleTable, Universe};
//!
//! # fn load() -> SampleTable { unimplemented!() }
//! let table = load();
//! let trials = partition(&table, &Universe::observed(&table), IterationOrder::ParticipantMajor);
//! let rules = AoiRules::for_table(&table, AmbiguityPolicy::FirstDeclared);
//! let segments = segment_trials(&table, &trials, &rules);
//! let glances = first_glances(&table, &trials, "aoi_hit_[box:bottom]").unwrap();
//! let pupil = aggregate_pupil(&table, 0.05);
//! ```

pub mod aoi;
pub mod clean;
pub mod config;
pub mod first_glance;
pub mod io;
pub mod pupil;
pub mod table;
pub mod temporal;
pub mod trial;

use anyhow::{bail, Result};

// ── Crate-root re-exports ─────────────────────────────────────────────────

// config
pub use config::{AmbiguityPolicy, IterationOrder, PipelineConfig};

// table
pub use table::{SampleRow, SampleTable, TableBuilder};

// trial
pub use trial::{partition, Trial, Universe};

// aoi
pub use aoi::{segment_trials, track_aoi_changes, AoiLabel, AoiRules, AoiSegment};

// first glance
pub use first_glance::{find_first_glance, first_glances, FirstGlance};

// temporal
pub use temporal::time_since_stimulus;

// pupil
pub use pupil::{aggregate_pupil, PupilFeatures};

// clean
pub use clean::{clean, CleanOptions};

/// Everything derived from one input table.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Table the features were computed on.
    pub cleaned: SampleTable,
    /// Trials in output order.
    pub trials: Vec<Trial>,
    /// Labelling rules used for `segments`.
    pub aoi_rules: AoiRules,
    pub segments: Vec<AoiSegment>,
    /// One record per trial.
    pub first_glances: Vec<FirstGlance>,
    /// Aligned with `cleaned` rows.
    pub time_since_stimulus: Vec<Option<f64>>,
    /// Aligned with `cleaned` rows.
    pub pupil: PupilFeatures,
}

/// Run the **full preprocessing pipeline** on one raw table.
///
/// 1. Drop rows failing the stimulus filter or with an invalid eye-movement
///    type ([`clean`]).
/// 2. Take the participant / stimulus universe from the cleaned rows.
/// 3. Extract every feature ([`extract_features`]).
///
/// # Errors
///
/// Returns an error if the stimulus filter does not compile, the table's
/// columns disagree in length, or the target indicator is not one of the
/// table's AOI columns.
pub fn preprocess(raw: &SampleTable, cfg: &PipelineConfig) -> Result<FeatureSet> {
    let opts = CleanOptions::new(cfg.stimulus_regex()?, &cfg.invalid_eye_movements);
    let cleaned = clean::clean(raw, &opts);
    let universe = Universe::observed(&cleaned);
    extract_features(cleaned, &universe, cfg)
}

/// Extract every feature from an already-cleaned table.
///
/// `universe` fixes which (participant, stimulus) pairs get a trial; pairs
/// without samples still produce a first-glance record.
pub fn extract_features(
    table: SampleTable,
    universe: &Universe,
    cfg: &PipelineConfig,
) -> Result<FeatureSet> {
    table.validate()?;
    if table.aoi_index(&cfg.target_indicator).is_none() {
        bail!(
            "target indicator '{}' is not among the table's AOI columns {:?}",
            cfg.target_indicator,
            table.aoi_names
        );
    }

    let trials = trial::partition(&table, universe, cfg.iteration_order);
    let aoi_rules = AoiRules::for_table(&table, cfg.ambiguity);
    let segments = aoi::segment_trials(&table, &trials, &aoi_rules);
    let first_glances = first_glance::first_glances(&table, &trials, &cfg.target_indicator)?;
    let time_since_stimulus = temporal::time_since_stimulus(&table, &trials);
    let pupil = pupil::aggregate_pupil(&table, cfg.pupil_threshold);

    log::debug!(
        "{} trials, {} segments, {} first glances found",
        trials.len(),
        segments.len(),
        first_glances.iter().filter(|g| g.is_found()).count()
    );

    Ok(FeatureSet {
        cleaned: table,
        trials,
        aoi_rules,
        segments,
        first_glances,
        time_since_stimulus,
        pupil,
    })
}
