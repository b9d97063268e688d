//! Forecast output types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Point estimate and uncertainty band for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Model output spanning the historical dates plus `horizon_days` future calendar days.
///
/// The first `history_len` points are in-sample fits on the historical dates;
/// the remaining points are the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
    pub history_len: usize,
    pub horizon_days: u32,
}

impl Forecast {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|p| p.date)
    }

    /// Points fitted on historical dates.
    pub fn in_sample(&self) -> &[ForecastPoint] {
        &self.points[..self.history_len.min(self.points.len())]
    }

    /// Points beyond the last historical date.
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.history_len.min(self.points.len())..]
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }
}
