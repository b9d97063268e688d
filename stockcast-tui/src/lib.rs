//! Stockcast TUI: terminal stock dashboard.
//!
//! Panels:
//! 1. Overview: all four panes at once
//! 2. Price: closing-price line chart with a range slider
//! 3. Candles: OHLC candlesticks over the same window
//! 4. Forecast: predicted line with uncertainty band and actual closes
//! 5. Data: the five most recent bars
//! 6. Help: keyboard shortcuts
//!
//! Fetching and fitting run on a worker thread; the UI thread only draws and
//! handles keys.

pub mod app;
pub mod config;
pub mod input;
pub mod logging;
pub mod theme;
pub mod ui;
pub mod view;
pub mod worker;

pub use app::AppState;
pub use config::{DashboardConfig, Settings};

#[cfg(test)]
mod test_helpers;
