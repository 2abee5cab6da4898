//! Columnar sample table.
//!
//! Every derived projection (trials, segments, offsets, pupil rows) refers
//! back to rows of a [`SampleTable`] by index, so the table itself is never
//! re-sorted or mutated once built.
//!
//! ```text
//! row  participant  recording  stimulus  timestamp  eye_movement  left  right  hits[A]
//!  0   P1           R1         S1        100.0      Fixation      4.0   4.2    [0, 1]
//!  1   P1           R1         S1        150.0      Fixation      4.1   4.3    [1, 0]
//! ```
use anyhow::{bail, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Required column names after normalisation.
pub mod columns {
    pub const PARTICIPANT: &str = "participant_name";
    pub const RECORDING: &str = "recording_name";
    pub const STIMULUS: &str = "presented_stimulus_name";
    pub const TIMESTAMP: &str = "recording_timestamp";
    pub const EYE_MOVEMENT: &str = "eye_movement_type";
    pub const PUPIL_LEFT: &str = "pupil_diameter_left";
    pub const PUPIL_RIGHT: &str = "pupil_diameter_right";

    pub const REQUIRED: [&str; 7] = [
        PARTICIPANT,
        RECORDING,
        STIMULUS,
        TIMESTAMP,
        EYE_MOVEMENT,
        PUPIL_LEFT,
        PUPIL_RIGHT,
    ];
}

/// Normalised eye-tracking samples, one entry per row in every column.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleTable {
    pub participant: Vec<String>,
    pub recording: Vec<String>,
    /// `None` for rows recorded between stimuli.
    pub stimulus: Vec<Option<String>>,
    pub timestamp: Array1<f64>,
    pub eye_movement: Vec<String>,
    pub pupil_left: Vec<Option<f64>>,
    pub pupil_right: Vec<Option<f64>>,
    /// AOI indicator column names, in declaration order.
    pub aoi_names: Vec<String>,
    /// `[n_rows, n_indicators]`, 1 = hit.
    pub aoi_hits: Array2<u8>,
}

/// Borrowed view of one row, as the output writers walk the table.
#[derive(Debug, Clone, Copy)]
pub struct SampleRef<'a> {
    pub participant: &'a str,
    pub recording: &'a str,
    pub stimulus: Option<&'a str>,
    pub timestamp: f64,
    pub eye_movement: &'a str,
    pub pupil_left: Option<f64>,
    pub pupil_right: Option<f64>,
    pub hits: ArrayView1<'a, u8>,
}

impl SampleTable {
    /// An empty table with the given AOI indicator columns.
    pub fn empty(aoi_names: Vec<String>) -> Self {
        let n_aoi = aoi_names.len();
        Self {
            participant: Vec::new(),
            recording: Vec::new(),
            stimulus: Vec::new(),
            timestamp: Array1::zeros(0),
            eye_movement: Vec::new(),
            pupil_left: Vec::new(),
            pupil_right: Vec::new(),
            aoi_names,
            aoi_hits: Array2::zeros((0, n_aoi)),
        }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.participant.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column index of an AOI indicator, if declared.
    pub fn aoi_index(&self, name: &str) -> Option<usize> {
        self.aoi_names.iter().position(|n| n == name)
    }

    /// Row `i` as a borrowed view.  Panics if `i >= len()`.
    pub fn row(&self, i: usize) -> SampleRef<'_> {
        SampleRef {
            participant: &self.participant[i],
            recording: &self.recording[i],
            stimulus: self.stimulus[i].as_deref(),
            timestamp: self.timestamp[i],
            eye_movement: &self.eye_movement[i],
            pupil_left: self.pupil_left[i],
            pupil_right: self.pupil_right[i],
            hits: self.aoi_hits.row(i),
        }
    }

    /// Build a new table from the given rows, in the given order.
    ///
    /// This is how every filter produces its output: the input is left
    /// untouched.
    pub fn select(&self, rows: &[usize]) -> SampleTable {
        let pick_str = |col: &Vec<String>| rows.iter().map(|&i| col[i].clone()).collect();
        SampleTable {
            participant: pick_str(&self.participant),
            recording: pick_str(&self.recording),
            stimulus: rows.iter().map(|&i| self.stimulus[i].clone()).collect(),
            timestamp: self.timestamp.select(Axis(0), rows),
            eye_movement: pick_str(&self.eye_movement),
            pupil_left: rows.iter().map(|&i| self.pupil_left[i]).collect(),
            pupil_right: rows.iter().map(|&i| self.pupil_right[i]).collect(),
            aoi_names: self.aoi_names.clone(),
            aoi_hits: self.aoi_hits.select(Axis(0), rows),
        }
    }

    /// Check that every column has the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        let lens = [
            ("recording_name", self.recording.len()),
            ("presented_stimulus_name", self.stimulus.len()),
            ("recording_timestamp", self.timestamp.len()),
            ("eye_movement_type", self.eye_movement.len()),
            ("pupil_diameter_left", self.pupil_left.len()),
            ("pupil_diameter_right", self.pupil_right.len()),
            ("aoi hits", self.aoi_hits.nrows()),
        ];
        for (name, len) in lens {
            if len != n {
                bail!("column '{name}' has {len} rows, expected {n}");
            }
        }
        if self.aoi_hits.ncols() != self.aoi_names.len() {
            bail!(
                "aoi hit matrix has {} columns but {} indicator names",
                self.aoi_hits.ncols(),
                self.aoi_names.len()
            );
        }
        Ok(())
    }
}

// ── Row-wise builder ──────────────────────────────────────────────────────

/// One owned row, used to assemble a table incrementally.
#[derive(Debug, Clone, Default)]
pub struct SampleRow {
    pub participant: String,
    pub recording: String,
    pub stimulus: Option<String>,
    pub timestamp: f64,
    pub eye_movement: String,
    pub pupil_left: Option<f64>,
    pub pupil_right: Option<f64>,
    pub hits: Vec<u8>,
}

/// Accumulates [`SampleRow`]s and produces a [`SampleTable`].
#[derive(Debug)]
pub struct TableBuilder {
    aoi_names: Vec<String>,
    rows: Vec<SampleRow>,
}

impl TableBuilder {
    pub fn new(aoi_names: Vec<String>) -> Self {
        Self { aoi_names, rows: Vec::new() }
    }

    pub fn with_capacity(aoi_names: Vec<String>, n: usize) -> Self {
        Self { aoi_names, rows: Vec::with_capacity(n) }
    }

    pub fn push(&mut self, row: SampleRow) -> Result<()> {
        if row.hits.len() != self.aoi_names.len() {
            bail!(
                "row has {} aoi hit values, expected {}",
                row.hits.len(),
                self.aoi_names.len()
            );
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn build(self) -> SampleTable {
        let n = self.rows.len();
        let n_aoi = self.aoi_names.len();
        let mut table = SampleTable {
            participant: Vec::with_capacity(n),
            recording: Vec::with_capacity(n),
            stimulus: Vec::with_capacity(n),
            timestamp: Array1::zeros(n),
            eye_movement: Vec::with_capacity(n),
            pupil_left: Vec::with_capacity(n),
            pupil_right: Vec::with_capacity(n),
            aoi_names: self.aoi_names,
            aoi_hits: Array2::zeros((n, n_aoi)),
        };
        for (i, row) in self.rows.into_iter().enumerate() {
            table.timestamp[i] = row.timestamp;
            for (j, &h) in row.hits.iter().enumerate() {
                table.aoi_hits[[i, j]] = h;
            }
            table.participant.push(row.participant);
            table.recording.push(row.recording);
            table.stimulus.push(row.stimulus);
            table.eye_movement.push(row.eye_movement);
            table.pupil_left.push(row.pupil_left);
            table.pupil_right.push(row.pupil_right);
        }
        table
    }
}
