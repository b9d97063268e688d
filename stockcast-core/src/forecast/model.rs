//! Additive trend + seasonality model.
//!
//! `y(t) = m + k·t + Σ δⱼ·(t − sⱼ)₊ + seasonal(date) + ε`
//!
//! with `y` scaled by its largest magnitude and `t` scaled to [0, 1] over the
//! history. Parameters are the MAP estimate under Gaussian priors, which is a
//! ridge regression on the design matrix `[1, t, (t − sⱼ)₊…, fourier…]`.

use std::time::Instant;

use chrono::{Days, NaiveDate};
use tracing::debug;

use super::frame::{training_frame, TrainingData};
use super::linalg::ridge_solve;
use super::rng::rng_for;
use super::seasonality::Seasonality;
use super::uncertainty;
use super::{ForecastConfig, Forecaster, ModelFitError, MAX_HORIZON_DAYS};
use crate::domain::{Forecast, ForecastPoint, PriceHistory};

/// Prior scale of the intercept and base growth rate.
const TREND_PRIOR_SCALE: f64 = 5.0;

/// Noise re-estimation passes.
const FIT_PASSES: usize = 4;

/// Floor on the scaled noise variance; keeps the normal equations well conditioned
/// when the history is flat.
const MIN_SIGMA2: f64 = 1e-6;

/// The bundled forecaster.
#[derive(Debug, Clone, Default)]
pub struct AdditiveForecaster {
    config: ForecastConfig,
}

impl AdditiveForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Fit the model to a training set of at least two distinct dates.
    pub fn fit(&self, data: &TrainingData) -> Result<FittedModel, ModelFitError> {
        let n = data.len();
        let (Some(&start), Some(&end)) = (data.ds.first(), data.ds.last()) else {
            return Err(ModelFitError::InsufficientData { points: n });
        };
        let span_days = (end - start).num_days();
        if n < 2 || span_days <= 0 {
            return Err(ModelFitError::InsufficientData { points: n });
        }
        if let Some((date, _)) = data.ds.iter().zip(&data.y).find(|(_, y)| !y.is_finite()) {
            return Err(ModelFitError::NonFinite { date: *date });
        }

        let y_scale = match data.y.iter().fold(0.0_f64, |acc, y| acc.max(y.abs())) {
            s if s > 0.0 => s,
            _ => 1.0,
        };
        let ys: Vec<f64> = data.y.iter().map(|y| y / y_scale).collect();

        let mut model = FittedModel {
            start,
            span_days: span_days as f64,
            y_scale,
            changepoints: Vec::new(),
            seasonalities: Vec::new(),
            params: Vec::new(),
            sigma: 0.0,
        };
        let ts: Vec<f64> = data.ds.iter().map(|&d| model.scaled_time(d)).collect();
        model.changepoints =
            changepoint_grid(&ts, self.config.n_changepoints, self.config.changepoint_range);
        model.seasonalities = [
            (Seasonality::YEARLY, self.config.yearly),
            (Seasonality::WEEKLY, self.config.weekly),
        ]
        .into_iter()
        .filter(|(s, toggle)| toggle.enabled(span_days, s.min_span_days))
        .map(|(s, _)| s)
        .collect();

        let design: Vec<Vec<f64>> = data
            .ds
            .iter()
            .zip(&ts)
            .map(|(&d, &t)| model.design_row(t, d))
            .collect();
        let prior_var = self.prior_variances(&model);

        let mean = ys.iter().sum::<f64>() / n as f64;
        let mut sigma2 = (ys.iter().map(|y| (y - mean).powi(2)).sum::<f64>() / n as f64)
            .max(MIN_SIGMA2);
        for _ in 0..FIT_PASSES {
            let penalty: Vec<f64> = prior_var.iter().map(|v| sigma2 / v).collect();
            model.params = ridge_solve(&design, &ys, &penalty).ok_or(ModelFitError::Singular)?;
            let sse: f64 = design
                .iter()
                .zip(&ys)
                .map(|(row, y)| (y - dot(row, &model.params)).powi(2))
                .sum();
            sigma2 = (sse / n as f64).max(MIN_SIGMA2);
        }
        if model.params.iter().any(|p| !p.is_finite()) {
            return Err(ModelFitError::Singular);
        }
        model.sigma = sigma2.sqrt();

        debug!(
            rows = n,
            changepoints = model.changepoints.len(),
            seasonalities = ?model.seasonalities.iter().map(|s| s.name).collect::<Vec<_>>(),
            sigma = model.sigma,
            "additive model fitted"
        );
        Ok(model)
    }

    fn prior_variances(&self, model: &FittedModel) -> Vec<f64> {
        let trend = TREND_PRIOR_SCALE.powi(2);
        // Laplace(0, b) has variance 2b².
        let delta = 2.0 * self.config.changepoint_prior_scale.powi(2);
        let seasonal = self.config.seasonality_prior_scale.powi(2);
        let seasonal_width: usize = model.seasonalities.iter().map(Seasonality::width).sum();

        let mut var = vec![trend, trend];
        var.extend(std::iter::repeat(delta).take(model.changepoints.len()));
        var.extend(std::iter::repeat(seasonal).take(seasonal_width));
        var
    }
}

impl Forecaster for AdditiveForecaster {
    fn name(&self) -> &str {
        "additive"
    }

    fn forecast(
        &self,
        history: &PriceHistory,
        horizon_days: u32,
    ) -> Result<Forecast, ModelFitError> {
        if horizon_days > MAX_HORIZON_DAYS {
            return Err(ModelFitError::HorizonOutOfRange {
                requested: horizon_days,
                max: MAX_HORIZON_DAYS,
            });
        }
        let started = Instant::now();

        let frame = training_frame(history)?;
        let data = TrainingData::from_frame(&frame)?;
        let model = self.fit(&data)?;
        let last = data.ds[data.len() - 1];

        let dates: Vec<NaiveDate> = data
            .ds
            .iter()
            .copied()
            .chain(
                (1..=u64::from(horizon_days))
                    .filter_map(|d| last.checked_add_days(Days::new(d))),
            )
            .collect();
        let ts: Vec<f64> = dates.iter().map(|&d| model.scaled_time(d)).collect();
        let seasonal: Vec<f64> = dates.iter().map(|&d| model.seasonal(d)).collect();
        let predicted: Vec<f64> = dates.iter().map(|&d| model.predict(d)).collect();

        let mut rng = rng_for(history, horizon_days);
        let band = uncertainty::simulate(
            &model,
            &ts,
            &seasonal,
            &predicted,
            self.config.interval_width,
            self.config.uncertainty_samples,
            &mut rng,
        );

        let points = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| ForecastPoint {
                date,
                predicted: predicted[i],
                lower: band.lower[i],
                upper: band.upper[i],
            })
            .collect();

        debug!(
            symbol = history.symbol(),
            horizon_days,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "forecast computed"
        );
        Ok(Forecast {
            points,
            history_len: data.len(),
            horizon_days,
        })
    }
}

/// Parameters of a fitted model, in scaled units.
#[derive(Debug, Clone)]
pub struct FittedModel {
    start: NaiveDate,
    span_days: f64,
    y_scale: f64,
    changepoints: Vec<f64>,
    seasonalities: Vec<Seasonality>,
    /// `[m, k, δ…, β…]`
    params: Vec<f64>,
    sigma: f64,
}

impl FittedModel {
    pub fn scaled_time(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.span_days
    }

    pub fn y_scale(&self) -> f64 {
        self.y_scale
    }

    /// Residual standard deviation in scaled units.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn changepoints(&self) -> &[f64] {
        &self.changepoints
    }

    pub fn seasonalities(&self) -> &[Seasonality] {
        &self.seasonalities
    }

    pub fn deltas(&self) -> &[f64] {
        &self.params[2..2 + self.changepoints.len()]
    }

    /// Trend component at scaled time `t`, in scaled units.
    pub fn trend(&self, t: f64) -> f64 {
        let (m, k) = (self.params[0], self.params[1]);
        let bends: f64 = self
            .changepoints
            .iter()
            .zip(self.deltas())
            .map(|(s, d)| d * (t - s).max(0.0))
            .sum();
        m + k * t + bends
    }

    /// Seasonal component on `date`, in scaled units.
    pub fn seasonal(&self, date: NaiveDate) -> f64 {
        let offset = 2 + self.changepoints.len();
        let mut features = Vec::new();
        for s in &self.seasonalities {
            s.extend_row(date, &mut features);
        }
        dot(&features, &self.params[offset..])
    }

    /// Point prediction in price units.
    pub fn predict(&self, date: NaiveDate) -> f64 {
        (self.trend(self.scaled_time(date)) + self.seasonal(date)) * self.y_scale
    }

    fn design_row(&self, t: f64, date: NaiveDate) -> Vec<f64> {
        let mut row = Vec::with_capacity(2 + self.changepoints.len() + 26);
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));
        for s in &self.seasonalities {
            s.extend_row(date, &mut row);
        }
        row
    }
}

/// Changepoints at evenly spaced rows within the first `range` of the history.
///
/// Short histories get `floor(n·range) − 1` changepoints, possibly none.
fn changepoint_grid(ts: &[f64], requested: usize, range: f64) -> Vec<f64> {
    let hist_size = (ts.len() as f64 * range.clamp(0.0, 1.0)).floor() as usize;
    let count = requested.min(hist_size.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }
    let last = (hist_size - 1) as f64;
    (1..=count)
        .map(|i| {
            let row = (i as f64 * last / count as f64).round() as usize;
            ts[row.min(ts.len() - 1)]
        })
        .collect()
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use crate::forecast::SeasonalityToggle;

    fn history_from(closes: &[f64]) -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2022, 1, 3).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + Days::new(i as u64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000,
            })
            .collect();
        PriceHistory::new("TEST", bars).unwrap()
    }

    fn quick() -> AdditiveForecaster {
        AdditiveForecaster::new(ForecastConfig {
            uncertainty_samples: 200,
            ..ForecastConfig::default()
        })
    }

    #[test]
    fn changepoint_grid_matches_short_series_rule() {
        let ts: Vec<f64> = (0..5).map(|i| i as f64 / 4.0).collect();
        // floor(5 * 0.8) - 1 = 3 changepoints at rows 1, 2, 3.
        assert_eq!(changepoint_grid(&ts, 25, 0.8), vec![0.25, 0.5, 0.75]);
        assert!(changepoint_grid(&ts[..2], 25, 0.8).is_empty());
    }

    #[test]
    fn changepoint_grid_caps_at_requested() {
        let ts: Vec<f64> = (0..500).map(|i| i as f64 / 499.0).collect();
        let grid = changepoint_grid(&ts, 25, 0.8);
        assert_eq!(grid.len(), 25);
        assert!(grid.iter().all(|&s| s <= 0.8));
        assert!(grid.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn linear_series_is_tracked() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let forecaster = AdditiveForecaster::new(ForecastConfig {
            weekly: SeasonalityToggle::Off,
            uncertainty_samples: 100,
            ..ForecastConfig::default()
        });
        let forecast = forecaster.forecast(&history_from(&closes), 10).unwrap();
        assert_eq!(forecast.len(), 70);
        let last = forecast.last().unwrap();
        assert!((last.predicted - 169.0).abs() < 2.0, "got {}", last.predicted);
        for p in forecast.in_sample() {
            assert!(p.lower <= p.upper);
        }
    }

    #[test]
    fn future_dates_are_consecutive_calendar_days() {
        let closes = [10.0, 11.0, 10.5, 12.0, 12.5];
        let forecast = quick().forecast(&history_from(&closes), 7).unwrap();
        let future = forecast.future();
        assert_eq!(future.len(), 7);
        for pair in future.windows(2) {
            assert_eq!((pair[1].date - pair[0].date).num_days(), 1);
        }
        assert_eq!((future[0].date - forecast.in_sample()[4].date).num_days(), 1);
    }

    #[test]
    fn identical_inputs_give_identical_forecasts() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.3).sin() * 3.0).collect();
        let history = history_from(&closes);
        let a = quick().forecast(&history, 30).unwrap();
        let b = quick().forecast(&history, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn band_widens_with_horizon() {
        // Rises for 60 days, then falls: the fitted changes are large.
        let closes: Vec<f64> = (0..120)
            .map(|i| {
                let trend = if i < 60 { i as f64 } else { 120.0 - i as f64 };
                100.0 + trend + if i % 3 == 0 { 1.5 } else { -0.7 }
            })
            .collect();
        let forecast = quick().forecast(&history_from(&closes), 120).unwrap();
        let first = forecast.future()[0];
        let last = *forecast.last().unwrap();
        assert!(last.upper - last.lower > first.upper - first.lower);
    }

    #[test]
    fn horizon_zero_covers_history_only() {
        let forecast = quick().forecast(&history_from(&[1.0, 2.0, 3.0]), 0).unwrap();
        assert_eq!(forecast.len(), 3);
        assert!(forecast.future().is_empty());
    }

    #[test]
    fn too_few_points_is_insufficient_data() {
        let err = quick().forecast(&history_from(&[1.0]), 5).unwrap_err();
        assert!(matches!(err, ModelFitError::InsufficientData { points: 1 }));
        let err = quick().forecast(&PriceHistory::empty("TEST"), 5).unwrap_err();
        assert!(matches!(err, ModelFitError::InsufficientData { points: 0 }));
    }

    #[test]
    fn horizon_above_max_is_rejected() {
        let err = quick().forecast(&history_from(&[1.0, 2.0]), 366).unwrap_err();
        assert!(matches!(err, ModelFitError::HorizonOutOfRange { requested: 366, .. }));
    }

    #[test]
    fn infinite_close_is_rejected() {
        let err = quick()
            .forecast(&history_from(&[1.0, f64::INFINITY, 3.0]), 5)
            .unwrap_err();
        assert!(matches!(err, ModelFitError::NonFinite { .. }));
    }

    #[test]
    fn seasonality_auto_follows_span() {
        let short = TrainingData {
            ds: (0..10)
                .map(|i| NaiveDate::from_ymd_opt(2023, 1, 2).unwrap() + Days::new(i))
                .collect(),
            y: vec![1.0; 10],
        };
        assert!(quick().fit(&short).unwrap().seasonalities().is_empty());

        let long = TrainingData {
            ds: (0..800)
                .map(|i| NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + Days::new(i))
                .collect(),
            y: (0..800).map(|i| 10.0 + (i % 7) as f64).collect(),
        };
        let names: Vec<_> = quick()
            .fit(&long)
            .unwrap()
            .seasonalities()
            .iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["yearly", "weekly"]);
    }

    #[test]
    fn forecast_line_is_the_fitted_prediction() {
        let closes: Vec<f64> = (0..30).map(|i| 20.0 + (i % 5) as f64).collect();
        let history = history_from(&closes);
        let data = TrainingData::from_frame(&training_frame(&history).unwrap()).unwrap();
        let model = quick().fit(&data).unwrap();
        let forecast = quick().forecast(&history, 10).unwrap();
        for point in &forecast.points {
            assert_eq!(point.predicted, model.predict(point.date));
        }
    }

    #[test]
    fn constant_zero_series_fits() {
        let forecast = quick().forecast(&history_from(&[0.0, 0.0, 0.0, 0.0]), 3).unwrap();
        assert!(forecast.points.iter().all(|p| p.predicted.abs() < 1e-6));
    }
}
