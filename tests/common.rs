/// Shared table builders for integration tests.
use gazeprep::{SampleRow, SampleTable, TableBuilder};

#[allow(unused)]
pub const BOTTOM: &str = "aoi_hit_[box:bottom]";
#[allow(unused)]
pub const TOP: &str = "aoi_hit_[box:top]";

#[allow(unused)]
pub fn aoi_names() -> Vec<String> {
    vec![BOTTOM.to_string(), TOP.to_string()]
}

/// One sample with (bottom, top) hit flags and no pupil data.
#[allow(unused)]
pub fn gaze(participant: &str, stimulus: Option<&str>, ts: f64, bottom: u8, top: u8) -> SampleRow {
    SampleRow {
        participant: participant.to_string(),
        recording: format!("{participant}_rec"),
        stimulus: stimulus.map(String::from),
        timestamp: ts,
        eye_movement: "Fixation".to_string(),
        pupil_left: None,
        pupil_right: None,
        hits: vec![bottom, top],
    }
}

/// One sample carrying only pupil diameters.
#[allow(unused)]
pub fn pupil(ts: f64, left: Option<f64>, right: Option<f64>) -> SampleRow {
    SampleRow {
        pupil_left: left,
        pupil_right: right,
        ..gaze("P1", Some("S1"), ts, 0, 0)
    }
}

#[allow(unused)]
pub fn table(rows: Vec<SampleRow>) -> SampleTable {
    let mut b = TableBuilder::new(aoi_names());
    for r in rows {
        b.push(r).unwrap();
    }
    b.build()
}

/// A small two-participant export in Tobii-like TSV layout.
#[allow(unused)]
pub const SAMPLE_TSV: &str = "\
Participant name\tRecording name\tPresented Stimulus name\tRecording timestamp\tEye movement type\tPupil diameter left\tPupil diameter right\tAOI hit [Box:Bottom]\tAOI hit [Box:Top]\tGaze point X
P1\tRec1\t\t0\tFixation\t-1\t-1\t\t\t10
P1\tRec1\ttrial_a\t100\tFixation\t4.0\t4.2\t0\t0\t11
P1\tRec1\ttrial_a\t150\tFixation\t4.1\t4.3\t1\t0\t12
P1\tRec1\ttrial_a\t200\tEyesNotFound\t-1\t-1\t0\t0\t
P1\tRec1\ttrial_a\t250\tSaccade\t4.1\t4.4\t0\t1\t13
P1\tRec1\tintro\t300\tFixation\t4.0\t4.0\t0\t0\t14
P2\tRec2\ttrial_a\t1000\tFixation\t3.0\t3.0\t0\t1\t15
P2\tRec2\ttrial_a\t1020\tFixation\t3.0\t3.1\t0\t1\t16
";
