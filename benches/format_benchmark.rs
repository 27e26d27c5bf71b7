//! Performance benchmarks for Pollbar reading formatting
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pollbar::config::WidthMode;
use pollbar::progress::ProgressReading;

fn bench_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading_text");

    for value in [0.0, 42.3, 99.95, 150.0].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(value), value, |b, &value| {
            let reading = ProgressReading::new(value);
            b.iter(|| black_box(reading.text()));
        });
    }

    group.finish();
}

fn bench_bar_width(c: &mut Criterion) {
    let reading = ProgressReading::new(42.3);

    c.bench_function("bar_width_raw", |b| {
        b.iter(|| black_box(reading.bar_width(WidthMode::Raw)));
    });

    c.bench_function("bar_width_clamped", |b| {
        b.iter(|| black_box(reading.bar_width(WidthMode::Clamped)));
    });
}

fn bench_decode(c: &mut Criterion) {
    let body = br#"{"progress": 42.3}"#;

    c.bench_function("decode_reading", |b| {
        b.iter(|| {
            let reading: ProgressReading = serde_json::from_slice(black_box(body)).unwrap();
            black_box(reading)
        });
    });
}

criterion_group!(benches, bench_text, bench_bar_width, bench_decode);
criterion_main!(benches);
