//! Pipeline configuration.
//!
//! [`PipelineConfig`] holds every tunable parameter for a preprocessing run.
//! It is normally loaded from a YAML file with [`PipelineConfig::load`]; all
//! fields except `files_to_process` have defaults matching the two-box
//! (top / bottom) experiment layout.
//!
//! ```yaml
//! files_to_process:
//!   - data/session1.tsv
//! outdir: output
//! stimulus_name_filter: "^trial_"
//! invalid_eye_movements: [EyesNotFound, Unclassified]
//! pupil_threshold: 0.05
//! ```
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Deserialize;

/// How a sample with more than one AOI indicator set is labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// The first indicator in declaration order wins.
    #[default]
    FirstDeclared,
    /// Any sample with several hits is labelled `neither`.
    Neither,
}

/// Nesting order used when walking the (participant, stimulus) universe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IterationOrder {
    /// Participants outer, stimuli inner.
    #[default]
    ParticipantMajor,
    /// Stimuli outer, participants inner.
    StimulusMajor,
}

/// Configuration for a preprocessing run.
///
/// Construct with struct-update syntax for library use:
///
/// ```
/// use gazeprep::PipelineConfig;
///
/// let cfg = PipelineConfig {
///     pupil_threshold: 0.1,
///     ..PipelineConfig::default()
/// };
/// assert_eq!(cfg.target_indicator, "aoi_hit_[box:bottom]");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Input CSV / TSV files, processed in order.
    #[serde(alias = "filesToProcess")]
    pub files_to_process: Vec<PathBuf>,

    /// Directory receiving the four output tables per input file.
    ///
    /// Default: `output`.
    pub outdir: PathBuf,

    /// Inclusion filter for `presented_stimulus_name`.
    ///
    /// Matched from the start of the name (like Python's `re.match`), so
    /// `"trial"` keeps `trial_01` but not `pretrial_01`.  Rows without a
    /// stimulus are always kept.
    ///
    /// Default: `.*` (keep everything).
    #[serde(alias = "stimulusNameFilter")]
    pub stimulus_name_filter: String,

    /// Eye-movement types whose rows are dropped before feature extraction.
    ///
    /// Default: `[]`.
    #[serde(alias = "invalidEyeMovements")]
    pub invalid_eye_movements: Vec<String>,

    /// Cutoff on `diff_avg_pupil_diameter` above which a change is flagged.
    ///
    /// Default: `0.05`.
    #[serde(alias = "pupilThreshold")]
    pub pupil_threshold: f64,

    /// AOI indicator columns, in priority order.
    ///
    /// Default: `["aoi_hit_[box:bottom]", "aoi_hit_[box:top]"]`.
    #[serde(alias = "aoiIndicators")]
    pub aoi_indicators: Vec<String>,

    /// Indicator whose first hit defines the first-glance latency.
    ///
    /// Default: `aoi_hit_[box:bottom]`.
    #[serde(alias = "targetIndicator")]
    pub target_indicator: String,

    /// Resolution of samples with several AOI hits.
    pub ambiguity: AmbiguityPolicy,

    /// Order in which (participant, stimulus) trials are emitted.
    #[serde(alias = "iterationOrder")]
    pub iteration_order: IterationOrder,

    /// Pupil diameter value the tracker writes for "not measured".
    ///
    /// Mapped to a missing value once, at ingestion.
    ///
    /// Default: `-1.0`.
    #[serde(alias = "missingPupilValue")]
    pub missing_pupil_value: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            files_to_process: vec![],
            outdir: PathBuf::from("output"),
            stimulus_name_filter: ".*".to_string(),
            invalid_eye_movements: vec![],
            pupil_threshold: 0.05,
            aoi_indicators: vec![
                "aoi_hit_[box:bottom]".to_string(),
                "aoi_hit_[box:top]".to_string(),
            ],
            target_indicator: "aoi_hit_[box:bottom]".to_string(),
            ambiguity: AmbiguityPolicy::default(),
            iteration_order: IterationOrder::default(),
            missing_pupil_value: -1.0,
        }
    }
}

impl PipelineConfig {
    /// Load a YAML configuration file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = Self::from_yaml(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse YAML without validating.
    pub fn from_yaml(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            bail!("no configuration was provided");
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Reject settings that would make every file fail.
    pub fn validate(&self) -> Result<()> {
        if self.files_to_process.is_empty() {
            bail!("files_to_process is empty: no input files were provided");
        }
        self.stimulus_regex()?;
        if !self.pupil_threshold.is_finite() {
            bail!("pupil_threshold must be finite, got {}", self.pupil_threshold);
        }
        if self.aoi_indicators.is_empty() {
            bail!("aoi_indicators must name at least one column");
        }
        if !self.aoi_indicators.contains(&self.target_indicator) {
            bail!(
                "target_indicator '{}' is not one of aoi_indicators {:?}",
                self.target_indicator,
                self.aoi_indicators
            );
        }
        Ok(())
    }

    /// Compile the stimulus filter, anchored at the start of the name.
    pub fn stimulus_regex(&self) -> Result<Regex> {
        Regex::new(&format!("^(?:{})", self.stimulus_name_filter))
            .with_context(|| format!("invalid stimulus_name_filter '{}'", self.stimulus_name_filter))
    }
}
