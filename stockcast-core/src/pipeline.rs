//! One dashboard run: inputs → price history → forecast.
//!
//! Each stage turns its failure into a value on the report, so a failed fetch
//! or fit only degrades the panes that depend on it. The stage functions are
//! public so a host can render the history before the fit finishes.

use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::data::{fetch_history, DataProvider, ProviderError};
use crate::domain::{Forecast, PriceHistory};
use crate::forecast::{Forecaster, ModelFitError, MAX_HORIZON_DAYS};

/// Everything the user controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardInputs {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub horizon_days: u32,
}

impl DashboardInputs {
    pub const DEFAULT_HORIZON_DAYS: u32 = 60;

    pub fn default_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default()
    }

    /// Inputs for `symbol` with the default range ending on `today` and the default horizon.
    pub fn new(symbol: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            start: Self::default_start(),
            end: today,
            horizon_days: Self::DEFAULT_HORIZON_DAYS,
        }
    }

    pub fn with_horizon(mut self, days: i64) -> Self {
        self.horizon_days = clamp_horizon(days);
        self
    }
}

/// Clamp a requested horizon into `[0, MAX_HORIZON_DAYS]`.
pub fn clamp_horizon(days: i64) -> u32 {
    days.clamp(0, i64::from(MAX_HORIZON_DAYS)) as u32
}

/// Outcome of the forecast stage.
#[derive(Debug)]
pub enum ForecastStage {
    Ready(Forecast),
    /// The history was too short to fit; the model was not run or declined.
    NotEnoughData { points: usize },
    Failed(ModelFitError),
    /// The fetch failed, so there was nothing to fit.
    Blocked,
}

impl ForecastStage {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            ForecastStage::Ready(forecast) => Some(forecast),
            _ => None,
        }
    }

    /// User-facing explanation when there is no forecast to show.
    pub fn message(&self) -> Option<String> {
        match self {
            ForecastStage::Ready(_) => None,
            ForecastStage::NotEnoughData { points: 0 } => {
                Some("No price data in the selected range".to_string())
            }
            ForecastStage::NotEnoughData { points } => Some(format!(
                "Not enough data to forecast ({points} trading day(s), need at least 2)"
            )),
            ForecastStage::Failed(e) => Some(format!("Forecast failed: {e}")),
            ForecastStage::Blocked => {
                Some("Forecast unavailable: price history failed".to_string())
            }
        }
    }
}

/// Result of one full run.
#[derive(Debug)]
pub struct PipelineReport {
    pub inputs: DashboardInputs,
    pub history: Result<PriceHistory, ProviderError>,
    pub forecast: ForecastStage,
}

/// Fetch and normalise the history for `inputs`.
pub fn fetch_stage(
    provider: &dyn DataProvider,
    inputs: &DashboardInputs,
) -> Result<PriceHistory, ProviderError> {
    let result = fetch_history(provider, &inputs.symbol, inputs.start, inputs.end);
    if let Err(e) = &result {
        warn!(symbol = %inputs.symbol, error = %e, "price history fetch failed");
    }
    result
}

/// Fit and project, skipping the model when the history cannot support it.
pub fn forecast_stage(
    forecaster: &dyn Forecaster,
    history: &Result<PriceHistory, ProviderError>,
    horizon_days: u32,
) -> ForecastStage {
    let history = match history {
        Ok(history) => history,
        Err(_) => return ForecastStage::Blocked,
    };
    if history.len() < 2 {
        debug!(symbol = history.symbol(), points = history.len(), "skipping forecast fit");
        return ForecastStage::NotEnoughData {
            points: history.len(),
        };
    }

    match forecaster.forecast(history, horizon_days) {
        Ok(forecast) => ForecastStage::Ready(forecast),
        Err(ModelFitError::InsufficientData { points }) => ForecastStage::NotEnoughData { points },
        Err(e) => {
            warn!(symbol = history.symbol(), error = %e, "forecast fit failed");
            ForecastStage::Failed(e)
        }
    }
}

/// Run every stage for `inputs`.
pub fn run_pipeline(
    provider: &dyn DataProvider,
    forecaster: &dyn Forecaster,
    inputs: DashboardInputs,
) -> PipelineReport {
    let started = Instant::now();
    let history = fetch_stage(provider, &inputs);
    let forecast = forecast_stage(forecaster, &history, inputs.horizon_days);

    info!(
        symbol = %inputs.symbol,
        start = %inputs.start,
        end = %inputs.end,
        horizon_days = inputs.horizon_days,
        bars = history.as_ref().map_or(0, PriceHistory::len),
        forecast = forecast.forecast().map_or(0, Forecast::len),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline run complete"
    );
    PipelineReport {
        inputs,
        history,
        forecast,
    }
}
