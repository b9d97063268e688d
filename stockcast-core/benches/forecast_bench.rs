//! Criterion benchmarks for the forecast hot paths.
//!
//! Benchmarks:
//! 1. Full forecast (fit + uncertainty simulation) over growing histories
//! 2. Model fit alone
//! 3. History normalisation through the polars canonicaliser

use chrono::{Days, FixedOffset, NaiveDate, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use stockcast_core::data::history::normalize;
use stockcast_core::data::RawBar;
use stockcast_core::domain::{PriceBar, PriceHistory};
use stockcast_core::forecast::{training_frame, AdditiveForecaster, Forecaster, TrainingData};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_history(n: usize) -> PriceHistory {
    let base_date = NaiveDate::from_ymd_opt(2019, 1, 2).unwrap();
    let bars = (0..n)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.05 + (i as f64 * 0.1).sin() * 10.0;
            PriceBar {
                date: base_date + Days::new(i as u64),
                open: close - 0.3,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect();
    PriceHistory::new("BENCH", bars).unwrap()
}

fn make_raw_bars(n: usize) -> Vec<RawBar> {
    let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    make_history(n)
        .bars()
        .iter()
        .rev()
        .map(|b| RawBar {
            timestamp: offset
                .from_local_datetime(&b.date.and_hms_opt(9, 30, 0).unwrap())
                .unwrap(),
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("forecast");
    group.sample_size(20);
    let forecaster = AdditiveForecaster::default();
    for n in [250, 750, 1250] {
        let history = make_history(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &history, |b, history| {
            b.iter(|| forecaster.forecast(black_box(history), 60).unwrap())
        });
    }
    group.finish();
}

fn bench_fit(c: &mut Criterion) {
    let history = make_history(750);
    let data = TrainingData::from_frame(&training_frame(&history).unwrap()).unwrap();
    let forecaster = AdditiveForecaster::default();
    c.bench_function("fit_750", |b| b.iter(|| forecaster.fit(black_box(&data)).unwrap()));
}

fn bench_normalize(c: &mut Criterion) {
    let raw = make_raw_bars(1250);
    let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
    c.bench_function("normalize_1250", |b| {
        b.iter(|| normalize("BENCH", black_box(&raw), start, end).unwrap())
    });
}

criterion_group!(benches, bench_forecast, bench_fit, bench_normalize);
criterion_main!(benches);
