//! Test helpers for building dashboard state without a network.

use std::sync::mpsc::{self, Receiver};

use chrono::{Days, NaiveDate};
use ratatui::buffer::Buffer;

use stockcast_core::data::SymbolCatalog;
use stockcast_core::domain::{Forecast, PriceBar, PriceHistory, SymbolEntry};
use stockcast_core::forecast::{AdditiveForecaster, ForecastConfig, Forecaster};
use stockcast_core::{DashboardInputs, ForecastStage};

use crate::app::AppState;
use crate::worker::{WorkerCommand, WorkerResponse};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn catalog() -> SymbolCatalog {
    SymbolCatalog::from_entries([
        SymbolEntry::new("AAPL", "Apple Inc."),
        SymbolEntry::new("MSFT", "Microsoft Corporation"),
        SymbolEntry::new("NVDA", "NVIDIA Corporation"),
        SymbolEntry::new("AMZN", "Amazon.com, Inc."),
        SymbolEntry::new("GOOGL", "Alphabet Inc."),
    ])
}

/// `n` daily bars from 2023-01-02, alternating up and down days on a rising trend.
pub fn bars(n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let base = 100.0 + i as f64 * 0.5;
            let (open, close) = if i % 2 == 0 {
                (base, base + 1.0)
            } else {
                (base + 1.0, base)
            };
            PriceBar {
                date: d(2023, 1, 2) + Days::new(i as u64),
                open,
                high: base + 2.0,
                low: base - 1.0,
                close,
                volume: 1_000_000 + i as u64,
            }
        })
        .collect()
}

pub fn history(n: usize) -> PriceHistory {
    PriceHistory::new("TEST", bars(n)).unwrap()
}

pub fn forecast(history: &PriceHistory, horizon: u32) -> Forecast {
    AdditiveForecaster::new(ForecastConfig {
        uncertainty_samples: 50,
        ..ForecastConfig::default()
    })
    .forecast(history, horizon)
    .unwrap()
}

/// All cell symbols, row by row.
pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut content = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            content.push_str(buf[(x, y)].symbol());
        }
        content.push('\n');
    }
    content
}

/// App on AAPL with the default range ending 2024-03-01. Keep the receiver
/// alive or run requests will fail.
pub fn app() -> (AppState, Receiver<WorkerCommand>) {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (_resp_tx, resp_rx) = mpsc::channel();
    let inputs = DashboardInputs::new("AAPL", d(2024, 3, 1));
    (AppState::new(catalog(), inputs, cmd_tx, resp_rx), cmd_rx)
}

/// Deliver a finished run as if the worker had sent it.
pub fn load(app: &mut AppState, history: PriceHistory, stage: ForecastStage) {
    app.request_run();
    let generation = app.generation;
    app.apply_response(WorkerResponse::HistoryReady {
        generation,
        result: Ok(history),
    });
    app.apply_response(WorkerResponse::ForecastReady { generation, stage });
}
