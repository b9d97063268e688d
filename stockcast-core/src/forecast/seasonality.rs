//! Fourier seasonal features.

use std::f64::consts::TAU;

use chrono::NaiveDate;

use crate::data::frame::date_to_days;

/// A periodic component modelled by `order` sine/cosine pairs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    /// Period in days.
    pub period: f64,
    pub order: usize,
    /// Shortest history span, in days, for which the component is fitted automatically.
    pub min_span_days: i64,
}

impl Seasonality {
    pub const YEARLY: Seasonality = Seasonality {
        name: "yearly",
        period: 365.25,
        order: 10,
        min_span_days: 730,
    };

    pub const WEEKLY: Seasonality = Seasonality {
        name: "weekly",
        period: 7.0,
        order: 3,
        min_span_days: 14,
    };

    /// Number of regression columns this component adds.
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Append this component's features for `date` to `row`.
    ///
    /// The phase is measured from 1970-01-01 so features line up across
    /// histories with different start dates.
    pub fn extend_row(&self, date: NaiveDate, row: &mut Vec<f64>) {
        let t = f64::from(date_to_days(date));
        for k in 1..=self.order {
            let x = TAU * k as f64 * t / self.period;
            row.push(x.sin());
            row.push(x.cos());
        }
    }
}
