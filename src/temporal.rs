//! Time since stimulus onset.
//!
//! `time_since_stimulus_appeared[i] = ts[i] − ts[first sample of i's trial]`
//!
//! The result is aligned with the table's own row order, not the sorted
//! trial order; rows that belong to no trial stay `None`.
use crate::table::SampleTable;
use crate::trial::Trial;

/// Offset of every row from the start of its trial.
pub fn time_since_stimulus(table: &SampleTable, trials: &[Trial]) -> Vec<Option<f64>> {
    let mut out = vec![None; table.len()];
    for trial in trials {
        let Some(first) = trial.first_row() else {
            continue;
        };
        let start = table.timestamp[first];
        for &row in &trial.rows {
            out[row] = Some(table.timestamp[row] - start);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IterationOrder;
    use crate::table::{SampleRow, TableBuilder};
    use crate::trial::{partition, Universe};

    fn table(rows: &[(&str, Option<&str>, f64)]) -> SampleTable {
        let mut b = TableBuilder::new(vec![]);
        for &(p, s, ts) in rows {
            b.push(SampleRow {
                participant: p.into(),
                stimulus: s.map(String::from),
                timestamp: ts,
                ..SampleRow::default()
            })
            .unwrap();
        }
        b.build()
    }

    #[test]
    fn offsets_follow_input_row_order() {
        let t = table(&[
            ("P1", Some("S1"), 1000.0),
            ("P2", Some("S1"), 40.0),
            ("P1", Some("S1"), 1016.0),
            ("P1", None, 1020.0),
            ("P2", Some("S1"), 56.5),
        ]);
        let trials = partition(&t, &Universe::observed(&t), IterationOrder::ParticipantMajor);
        let off = time_since_stimulus(&t, &trials);
        assert_eq!(off, vec![Some(0.0), Some(0.0), Some(16.0), None, Some(16.5)]);
    }

    #[test]
    fn unsorted_rows_measure_from_earliest_sample() {
        let t = table(&[("P1", Some("S1"), 30.0), ("P1", Some("S1"), 10.0)]);
        let trials = partition(&t, &Universe::observed(&t), IterationOrder::ParticipantMajor);
        assert_eq!(time_since_stimulus(&t, &trials), vec![Some(20.0), Some(0.0)]);
    }

    #[test]
    fn empty_table_gives_empty_column() {
        let t = table(&[]);
        assert!(time_since_stimulus(&t, &[]).is_empty());
    }
}
