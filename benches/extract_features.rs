use std::hint::black_box;
use criterion::{criterion_group, criterion_main, Criterion};
use gazeprep::{
    aggregate_pupil, partition, preprocess, IterationOrder, PipelineConfig, SampleRow,
    SampleTable, TableBuilder, Universe,
};

/// 20 participants × 12 stimuli × 600 samples at 60 Hz.
fn synthetic_table() -> SampleTable {
    let names = vec!["aoi_hit_[box:bottom]".to_string(), "aoi_hit_[box:top]".to_string()];
    let mut b = TableBuilder::with_capacity(names, 20 * 12 * 600);
    for p in 0..20 {
        let mut ts = 0.0;
        for s in 0..12 {
            for i in 0..600usize {
                let zone = (i / 45 + s) % 3;
                let d = 3.5 + ((i as f64) * 0.05).sin() * 0.3;
                b.push(SampleRow {
                    participant: format!("P{p:02}"),
                    recording: format!("R{p:02}"),
                    stimulus: Some(format!("trial_{s:02}")),
                    timestamp: ts,
                    eye_movement: "Fixation".into(),
                    pupil_left: (i % 97 != 0).then_some(d),
                    pupil_right: Some(d + 0.1),
                    hits: vec![u8::from(zone == 1), u8::from(zone == 2)],
                })
                .unwrap();
                ts += 16.667;
            }
        }
    }
    b.build()
}

fn bench_preprocess(c: &mut Criterion) {
    let table = synthetic_table();
    let cfg = PipelineConfig::default();
    c.bench_function("preprocess [144k samples]", |b| {
        b.iter(|| {
            let fs = preprocess(black_box(&table), &cfg).unwrap();
            black_box(fs.segments.len())
        })
    });
}

fn bench_partition(c: &mut Criterion) {
    let table = synthetic_table();
    let universe = Universe::observed(&table);
    c.bench_function("partition [240 trials]", |b| {
        b.iter(|| {
            let trials = partition(black_box(&table), &universe, IterationOrder::ParticipantMajor);
            black_box(trials.len())
        })
    });
}

fn bench_pupil(c: &mut Criterion) {
    let table = synthetic_table();
    c.bench_function("aggregate_pupil [144k samples]", |b| {
        b.iter(|| black_box(aggregate_pupil(black_box(&table), 0.05).len()))
    });
}

criterion_group!(benches, bench_preprocess, bench_partition, bench_pupil);
criterion_main!(benches);
