//! Simulated uncertainty bands.
//!
//! Each sample path keeps the fitted trend up to the end of the history and,
//! past it, adds new changepoints at the rate the history showed, with rate
//! changes drawn from a Laplace distribution scaled by the mean fitted change.
//! Observation noise is added at every date. The band is a pair of empirical
//! quantiles across paths.

use rand::Rng;
use rand_distr::{Distribution, Exp, Normal, Poisson};

use super::model::FittedModel;

/// Lower and upper band values, aligned with the dates passed to [`simulate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Quantile levels for a central interval of the given coverage.
pub fn band_levels(interval_width: f64) -> (f64, f64) {
    let width = interval_width.clamp(0.0, 1.0);
    ((1.0 - width) / 2.0, (1.0 + width) / 2.0)
}

/// Run `samples` paths over `ts` (scaled time) and reduce them to a band in price units.
///
/// `baseline` is the deterministic prediction in price units; it is returned
/// as both edges of the band when `samples` is zero.
pub fn simulate<R: Rng + ?Sized>(
    model: &FittedModel,
    ts: &[f64],
    seasonal: &[f64],
    baseline: &[f64],
    interval_width: f64,
    samples: usize,
    rng: &mut R,
) -> Band {
    if samples == 0 {
        return Band {
            lower: baseline.to_vec(),
            upper: baseline.to_vec(),
        };
    }

    let t_max = ts.iter().copied().fold(1.0, f64::max);
    let trend: Vec<f64> = ts.iter().map(|&t| model.trend(t)).collect();
    let noise = Normal::new(0.0, model.sigma()).ok();

    let mut paths: Vec<Vec<f64>> = (0..ts.len()).map(|_| Vec::with_capacity(samples)).collect();
    for _ in 0..samples {
        let changes = future_changes(model, t_max, rng);
        for (i, &t) in ts.iter().enumerate() {
            let shift: f64 = changes
                .iter()
                .filter(|(s, _)| t > *s)
                .map(|(s, delta)| delta * (t - s))
                .sum();
            let eps = noise.as_ref().map_or(0.0, |n| n.sample(rng));
            paths[i].push((trend[i] + shift + seasonal[i] + eps) * model.y_scale());
        }
    }

    let (lo, hi) = band_levels(interval_width);
    let mut band = Band {
        lower: Vec::with_capacity(ts.len()),
        upper: Vec::with_capacity(ts.len()),
    };
    for mut values in paths {
        values.sort_by(f64::total_cmp);
        band.lower.push(quantile(&values, lo));
        band.upper.push(quantile(&values, hi));
    }
    band
}

/// New `(changepoint, rate change)` pairs in `(1, t_max]` for one path.
fn future_changes<R: Rng + ?Sized>(
    model: &FittedModel,
    t_max: f64,
    rng: &mut R,
) -> Vec<(f64, f64)> {
    let rate = model.changepoints().len().max(1) as f64 * (t_max - 1.0);
    if rate <= 0.0 {
        return Vec::new();
    }
    let Ok(poisson) = Poisson::new(rate) else {
        return Vec::new();
    };
    let count: f64 = poisson.sample(rng);

    let deltas = model.deltas();
    let mean_abs = if deltas.is_empty() {
        0.0
    } else {
        deltas.iter().map(|d| d.abs()).sum::<f64>() / deltas.len() as f64
    };
    let mean_delta = mean_abs + 1e-8;
    let Ok(magnitude) = Exp::new(1.0 / mean_delta) else {
        return Vec::new();
    };

    (0..count as usize)
        .map(|_| {
            let at = rng.gen_range(1.0..t_max);
            let size: f64 = magnitude.sample(rng);
            let delta = if rng.gen_bool(0.5) { size } else { -size };
            (at, delta)
        })
        .collect()
}

/// Linearly interpolated quantile of sorted values.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let below = pos.floor() as usize;
            let above = (below + 1).min(n - 1);
            let frac = pos - below as f64;
            sorted[below] + (sorted[above] - sorted[below]) * frac
        }
    }
}
