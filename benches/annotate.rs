//! Benchmark for the week-over-week annotator.

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use trendlens::anomaly::annotate;
use trendlens::models::{ObservationPoint, Series};

fn year_of_weeks() -> Series {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..52u64)
        .map(|i| ObservationPoint::new(start + chrono::Days::new(7 * i), ((i * 37) % 100) as f64))
        .collect()
}

fn bench_annotate(c: &mut Criterion) {
    let series = year_of_weeks();
    c.bench_function("annotate_52_weeks", |b| {
        b.iter(|| annotate(black_box(&series), black_box(0.30)))
    });
}

criterion_group!(benches, bench_annotate);
criterion_main!(benches);
