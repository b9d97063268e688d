//! PriceBar: one trading day of a single symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar with a naive calendar date (no time of day, no time zone).
///
/// `close` is always a number once the bar is in a history. Providers may
/// leave `open`, `high` or `low` missing on a day with a close; those fields
/// are then NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// True when the close is missing. Such bars never enter a history.
    pub fn missing_close(&self) -> bool {
        self.close.is_nan()
    }

    /// True when any of open, high or low is missing.
    pub fn is_partial(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan()
    }

    /// True when the bar closed at or above its open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}
