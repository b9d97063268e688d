//! Forecast engine.
//!
//! The dashboard treats forecasting as a delegate: anything implementing
//! [`Forecaster`] can turn a [`PriceHistory`] into a [`Forecast`]. The bundled
//! [`AdditiveForecaster`] fits a piecewise-linear trend plus Fourier
//! seasonality and simulates uncertainty bands. Every call fits from scratch;
//! nothing is cached between calls.

pub mod frame;
pub mod linalg;
pub mod model;
pub mod rng;
pub mod seasonality;
pub mod uncertainty;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::FrameError;
use crate::domain::{Forecast, PriceHistory};

pub use frame::{training_frame, TrainingData, TrainingSchema};
pub use model::{AdditiveForecaster, FittedModel};
pub use seasonality::Seasonality;

/// Longest horizon the dashboard accepts, in calendar days.
pub const MAX_HORIZON_DAYS: u32 = 365;

/// Reasons a forecast could not be produced. None of them are fatal to the dashboard.
#[derive(Debug, Error)]
pub enum ModelFitError {
    #[error("not enough data to fit a model: {points} distinct date(s), need at least 2")]
    InsufficientData { points: usize },

    #[error("non-finite closing price on {date}")]
    NonFinite { date: NaiveDate },

    #[error("model fit failed: normal equations are not positive definite")]
    Singular,

    #[error("horizon of {requested} days exceeds the maximum of {max}")]
    HorizonOutOfRange { requested: u32, max: u32 },

    #[error("training frame: {0}")]
    Frame(#[from] FrameError),
}

/// A forecasting delegate.
pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    /// Fit on `history` and predict its dates plus `horizon_days` calendar days past the last one.
    fn forecast(
        &self,
        history: &PriceHistory,
        horizon_days: u32,
    ) -> Result<Forecast, ModelFitError>;
}

impl<F: Forecaster + ?Sized> Forecaster for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn forecast(
        &self,
        history: &PriceHistory,
        horizon_days: u32,
    ) -> Result<Forecast, ModelFitError> {
        (**self).forecast(history, horizon_days)
    }
}

/// Whether a seasonal component is fitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityToggle {
    /// Fitted when the history is long enough to observe it.
    #[default]
    Auto,
    On,
    Off,
}

impl SeasonalityToggle {
    pub fn enabled(self, span_days: i64, min_span_days: i64) -> bool {
        match self {
            SeasonalityToggle::Auto => span_days >= min_span_days,
            SeasonalityToggle::On => true,
            SeasonalityToggle::Off => false,
        }
    }
}

/// Tuning for [`AdditiveForecaster`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub n_changepoints: usize,
    /// Fraction of the history rows that may hold changepoints.
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub yearly: SeasonalityToggle,
    pub weekly: SeasonalityToggle,
    /// Coverage of the uncertainty band, e.g. 0.8 for the 10%..90% quantiles.
    pub interval_width: f64,
    pub uncertainty_samples: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly: SeasonalityToggle::Auto,
            weekly: SeasonalityToggle::Auto,
            interval_width: 0.8,
            uncertainty_samples: 1000,
        }
    }
}
