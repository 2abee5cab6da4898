//! CSV / TSV I/O for the preprocessing pipeline.
//!
//! Reader: parses an eye-tracker export into a [`SampleTable`], normalising
//! headers (`"AOI hit [Box:Top]"` → `"aoi_hit_[box:top]"`) and mapping the
//! tracker's missing-pupil sentinel to `None`.
//!
//! Writer: stages the output tables of one input file as `*.csv.tmp` and
//! renames them into place only once every table has been written.
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::aoi::AoiRules;
use crate::config::PipelineConfig;
use crate::table::{columns, SampleRow, SampleTable, TableBuilder};
use crate::FeatureSet;

// ── Reader ────────────────────────────────────────────────────────────────────

/// Lower-case a header and join its words with `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

/// Field delimiter for `path`: tab for `.tsv`, comma otherwise.
pub fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Read an eye-tracker export from disk.
pub fn read_samples(path: &Path, cfg: &PipelineConfig) -> Result<SampleTable> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_samples_from_reader(file, delimiter_for(path), cfg)
        .with_context(|| format!("reading {}", path.display()))
}

/// Read an eye-tracker export from any byte source.
pub fn read_samples_from_reader<R: std::io::Read>(
    reader: R,
    delimiter: u8,
    cfg: &PipelineConfig,
) -> Result<SampleTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let header_index: HashMap<String, usize> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .enumerate()
        .map(|(i, h)| (normalize_column_name(h), i))
        .collect();
    let column = |name: &str| -> Result<usize> {
        header_index
            .get(name)
            .copied()
            .with_context(|| format!("missing required column '{name}'"))
    };

    let participant = column(columns::PARTICIPANT)?;
    let recording = column(columns::RECORDING)?;
    let stimulus = column(columns::STIMULUS)?;
    let timestamp = column(columns::TIMESTAMP)?;
    let eye_movement = column(columns::EYE_MOVEMENT)?;
    let pupil_left = column(columns::PUPIL_LEFT)?;
    let pupil_right = column(columns::PUPIL_RIGHT)?;
    let aoi_cols: Vec<usize> = cfg
        .aoi_indicators
        .iter()
        .map(|name| column(name))
        .collect::<Result<_>>()?;

    let mut builder = TableBuilder::new(cfg.aoi_indicators.clone());
    for (n, record) in rdr.records().enumerate() {
        let line = n + 1;
        let record = record.with_context(|| format!("data row {line}: malformed record"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let text = |idx: usize| field(idx).to_string();

        let ts = parse_number(field(timestamp))
            .with_context(|| format!("data row {line}: column '{}'", columns::TIMESTAMP))?
            .with_context(|| format!("data row {line}: column '{}' is empty", columns::TIMESTAMP))?;

        let pupil = |idx: usize, name: &str| -> Result<Option<f64>> {
            let v = parse_number(field(idx))
                .with_context(|| format!("data row {line}: column '{name}'"))?;
            Ok(v.filter(|&d| d != cfg.missing_pupil_value))
        };

        let hits = aoi_cols
            .iter()
            .zip(&cfg.aoi_indicators)
            .map(|(&idx, name)| {
                let v = parse_number(field(idx))
                    .with_context(|| format!("data row {line}: column '{name}'"))?;
                Ok(u8::from(v.is_some_and(|h| h != 0.0)))
            })
            .collect::<Result<Vec<u8>>>()?;

        let stim = field(stimulus);
        builder.push(SampleRow {
            participant: text(participant),
            recording: text(recording),
            stimulus: (!stim.is_empty()).then(|| stim.to_string()),
            timestamp: ts,
            eye_movement: text(eye_movement),
            pupil_left: pupil(pupil_left, columns::PUPIL_LEFT)?,
            pupil_right: pupil(pupil_right, columns::PUPIL_RIGHT)?,
            hits,
        })?;
    }

    Ok(builder.build())
}

/// Parse a numeric cell; empty cells are `None`.
///
/// `NaN` and infinities are rejected even though `f64::from_str` takes them.
fn parse_number(cell: &str) -> Result<Option<f64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    let v: f64 = cell
        .parse()
        .with_context(|| format!("'{cell}' is not a number"))?;
    if !v.is_finite() {
        bail!("'{cell}' is not a finite number");
    }
    Ok(Some(v))
}

// ── Writer ────────────────────────────────────────────────────────────────────

/// Which output tables to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifacts {
    pub aoi_segments: bool,
    pub first_glance: bool,
    pub pupil_features: bool,
    pub cleaned: bool,
}

impl Artifacts {
    pub const ALL: Self = Self {
        aoi_segments: true,
        first_glance: true,
        pupil_features: true,
        cleaned: true,
    };
}

impl Default for Artifacts {
    fn default() -> Self {
        Self::ALL
    }
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn write_table<I>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    w.write_record(header)?;
    for row in rows {
        w.write_record(&row)?;
    }
    w.flush()
        .with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// AOI segment table.
pub fn write_aoi_segments(fs: &FeatureSet, path: &Path) -> Result<()> {
    let rules: &AoiRules = &fs.aoi_rules;
    write_table(
        path,
        &[
            columns::PARTICIPANT,
            columns::RECORDING,
            columns::STIMULUS,
            "aoi",
            "start_timestamp",
            "duration",
        ],
        fs.segments.iter().map(|s| {
            vec![
                s.participant.clone(),
                s.recording.clone(),
                s.stimulus.clone(),
                rules.name(s.label).to_string(),
                s.start.to_string(),
                s.duration.to_string(),
            ]
        }),
    )
}

/// First-glance table.
pub fn write_first_glance(fs: &FeatureSet, path: &Path) -> Result<()> {
    write_table(
        path,
        &[
            columns::PARTICIPANT,
            columns::RECORDING,
            columns::STIMULUS,
            "stimulus_start",
            "first_glance_timestamp",
            "latency",
        ],
        fs.first_glances.iter().map(|g| {
            vec![
                g.participant.clone(),
                g.recording.clone().unwrap_or_default(),
                g.stimulus.clone(),
                fmt_opt(g.trial_start),
                fmt_opt(g.first_glance),
                fmt_opt(g.latency),
            ]
        }),
    )
}

/// Pupil feature table, one row per cleaned sample.
pub fn write_pupil_features(fs: &FeatureSet, path: &Path) -> Result<()> {
    let t = &fs.cleaned;
    let p = &fs.pupil;
    write_table(
        path,
        &[
            columns::PARTICIPANT,
            columns::RECORDING,
            columns::STIMULUS,
            columns::TIMESTAMP,
            columns::PUPIL_LEFT,
            columns::PUPIL_RIGHT,
            "diff_pupil_diameter_left",
            "diff_pupil_diameter_right",
            "avg_pupil_diameter",
            "diff_avg_pupil_diameter",
            "sign_diff_in_pupil_size",
        ],
        (0..t.len()).map(|i| {
            let r = t.row(i);
            vec![
                r.participant.to_string(),
                r.recording.to_string(),
                r.stimulus.unwrap_or_default().to_string(),
                r.timestamp.to_string(),
                fmt_opt(r.pupil_left),
                fmt_opt(r.pupil_right),
                fmt_opt(p.diff_left[i]),
                fmt_opt(p.diff_right[i]),
                fmt_opt(p.avg[i]),
                fmt_opt(p.diff_avg[i]),
                u8::from(p.significant[i]).to_string(),
            ]
        }),
    )
}

/// Cleaned base table with the `time_since_stimulus_appeared` column.
pub fn write_cleaned(fs: &FeatureSet, path: &Path) -> Result<()> {
    let t = &fs.cleaned;
    let mut header: Vec<&str> = columns::REQUIRED.to_vec();
    header.extend(t.aoi_names.iter().map(String::as_str));
    header.push("time_since_stimulus_appeared");

    write_table(
        path,
        &header,
        (0..t.len()).map(|i| {
            let r = t.row(i);
            let mut row = vec![
                r.participant.to_string(),
                r.recording.to_string(),
                r.stimulus.unwrap_or_default().to_string(),
                r.timestamp.to_string(),
                r.eye_movement.to_string(),
                fmt_opt(r.pupil_left),
                fmt_opt(r.pupil_right),
            ];
            row.extend(r.hits.iter().map(|h| h.to_string()));
            row.push(fmt_opt(fs.time_since_stimulus[i]));
            row
        }),
    )
}

/// Output path for one artifact of the input `stem`.
pub fn artifact_path(outdir: &Path, stem: &str, suffix: &str) -> PathBuf {
    outdir.join(format!("{stem}_{suffix}.csv"))
}

/// Write the selected tables of `fs` into `outdir`.
///
/// Every table is first written to a `.tmp` sibling; the final files only
/// appear once all of them succeeded.  If moving one into place fails, the
/// ones already moved are removed again.  Returns the final paths.
pub fn write_feature_set(
    fs: &FeatureSet,
    outdir: &Path,
    stem: &str,
    artifacts: Artifacts,
) -> Result<Vec<PathBuf>> {
    type Writer = fn(&FeatureSet, &Path) -> Result<()>;
    let plan: [(bool, &str, Writer); 4] = [
        (artifacts.aoi_segments, "aoi_segments", write_aoi_segments),
        (artifacts.first_glance, "first_glance", write_first_glance),
        (artifacts.pupil_features, "pupil_features", write_pupil_features),
        (artifacts.cleaned, "cleaned", write_cleaned),
    ];

    let mut staged: Vec<(PathBuf, PathBuf)> = Vec::new();
    for (enabled, suffix, write) in plan {
        if !enabled {
            continue;
        }
        let final_path = artifact_path(outdir, stem, suffix);
        let tmp_path = final_path.with_extension("csv.tmp");
        // Track before writing so a half-written temp file is cleaned up too.
        staged.push((tmp_path.clone(), final_path));
        if let Err(e) = write(fs, &tmp_path) {
            discard(&staged);
            return Err(e);
        }
    }

    for (i, (tmp, dst)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, dst) {
            // Tables already moved by this call go too: no partial output.
            for (_, done) in &staged[..i] {
                let _ = std::fs::remove_file(done);
            }
            discard(&staged[i..]);
            bail!("moving {} into place: {e}", dst.display());
        }
    }
    Ok(staged.into_iter().map(|(_, dst)| dst).collect())
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        if tmp.exists() {
            let _ = std::fs::remove_file(tmp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names_are_normalised() {
        assert_eq!(normalize_column_name("AOI hit [Box:Bottom]"), "aoi_hit_[box:bottom]");
        assert_eq!(normalize_column_name(" Recording  timestamp "), "recording_timestamp");
        assert_eq!(normalize_column_name("Pupil diameter left"), "pupil_diameter_left");
    }

    #[test]
    fn delimiter_follows_extension() {
        assert_eq!(delimiter_for(Path::new("a/b.tsv")), b'\t');
        assert_eq!(delimiter_for(Path::new("a/b.TSV")), b'\t');
        assert_eq!(delimiter_for(Path::new("a/b.csv")), b',');
        assert_eq!(delimiter_for(Path::new("noext")), b',');
    }

    #[test]
    fn numbers_parse_with_empty_as_none() {
        assert_eq!(parse_number("").unwrap(), None);
        assert_eq!(parse_number("4.25").unwrap(), Some(4.25));
        assert!(parse_number("abc").is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        for cell in ["NaN", "nan", "inf", "-inf", "infinity"] {
            assert!(parse_number(cell).is_err(), "{cell}");
        }
    }
}
