//! Columnar view of price bars and the canonicaliser that orders them.
//!
//! Normalised bars pass through a polars frame on their way into a
//! `PriceHistory`: the canonicaliser sorts by date and keeps the first bar
//! per date, which is what gives the history its ordering invariant.

use chrono::{Days, NaiveDate};
use polars::prelude::*;
use thiserror::Error;

use crate::domain::PriceBar;

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("type mismatch in column {column}: expected {expected:?}, got {actual:?}")]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataType,
    },

    #[error("null value in column {column} at row {row}")]
    NullValue { column: String, row: usize },

    #[error("date out of range: {0} days from epoch")]
    DateOutOfRange(i64),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

/// Days since 1970-01-01, the physical representation of a polars `Date`.
pub fn date_to_days(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

pub fn days_to_date(days: i32) -> Result<NaiveDate, FrameError> {
    let out_of_range = || FrameError::DateOutOfRange(i64::from(days));
    if days >= 0 {
        epoch().checked_add_days(Days::new(days as u64)).ok_or_else(out_of_range)
    } else {
        epoch()
            .checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
            .ok_or_else(out_of_range)
    }
}

/// A `Date` column from calendar dates.
pub fn date_series(name: &str, dates: impl Iterator<Item = NaiveDate>) -> PolarsResult<Series> {
    let days: Vec<i32> = dates.map(date_to_days).collect();
    Series::new(name.into(), days).cast(&DataType::Date)
}

/// Read a `Date` column back into calendar dates.
pub fn read_dates(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>, FrameError> {
    let days = df.column(name)?.cast(&DataType::Int32)?;
    let days = days.i32()?;
    (0..days.len())
        .map(|row| {
            let d = days.get(row).ok_or_else(|| FrameError::NullValue {
                column: name.to_string(),
                row,
            })?;
            days_to_date(d)
        })
        .collect()
}

/// Read a `Float64` column, rejecting nulls.
pub fn read_f64(df: &DataFrame, name: &str) -> Result<Vec<f64>, FrameError> {
    let values = df.column(name)?.f64()?;
    (0..values.len())
        .map(|row| {
            values.get(row).ok_or_else(|| FrameError::NullValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Check that every expected column exists with the expected type.
pub fn validate_columns(df: &DataFrame, expected: &[(&str, DataType)]) -> Result<(), FrameError> {
    for (name, dtype) in expected {
        let column = df
            .column(name)
            .map_err(|_| FrameError::MissingColumn(name.to_string()))?;
        if column.dtype() != dtype {
            return Err(FrameError::TypeMismatch {
                column: name.to_string(),
                expected: dtype.clone(),
                actual: column.dtype().clone(),
            });
        }
    }
    Ok(())
}

/// Expected schema for bar frames
pub struct BarSchema;

impl BarSchema {
    pub fn columns() -> [(&'static str, DataType); 6] {
        [
            ("date", DataType::Date),
            ("open", DataType::Float64),
            ("high", DataType::Float64),
            ("low", DataType::Float64),
            ("close", DataType::Float64),
            ("volume", DataType::UInt64),
        ]
    }

    pub fn validate(df: &DataFrame) -> Result<(), FrameError> {
        validate_columns(df, &Self::columns())
    }

    pub fn to_frame(bars: &[PriceBar]) -> PolarsResult<DataFrame> {
        let column = |name: &str, f: fn(&PriceBar) -> f64| -> Column {
            Series::new(name.into(), bars.iter().map(f).collect::<Vec<f64>>()).into()
        };
        DataFrame::new(vec![
            date_series("date", bars.iter().map(|b| b.date))?.into(),
            column("open", |b| b.open),
            column("high", |b| b.high),
            column("low", |b| b.low),
            column("close", |b| b.close),
            Series::new(
                "volume".into(),
                bars.iter().map(|b| b.volume).collect::<Vec<u64>>(),
            )
            .into(),
        ])
    }

    pub fn from_frame(df: &DataFrame) -> Result<Vec<PriceBar>, FrameError> {
        Self::validate(df)?;
        let dates = read_dates(df, "date")?;
        let open = read_f64(df, "open")?;
        let high = read_f64(df, "high")?;
        let low = read_f64(df, "low")?;
        let close = read_f64(df, "close")?;
        let volume = df.column("volume")?.u64()?;

        Ok(dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| PriceBar {
                date,
                open: open[i],
                high: high[i],
                low: low[i],
                close: close[i],
                volume: volume.get(i).unwrap_or(0),
            })
            .collect())
    }
}

/// Canonicalizer for bar data
pub struct Canonicalizer;

impl Canonicalizer {
    /// Sort by date and keep the first bar of each date.
    pub fn canonicalize(df: LazyFrame) -> LazyFrame {
        df.sort(
            ["date"],
            SortMultipleOptions::default().with_maintain_order(true),
        )
        .unique_stable(Some(vec!["date".into()]), UniqueKeepStrategy::First)
    }

    /// Run bars through the canonicaliser.
    pub fn canonicalize_bars(bars: &[PriceBar]) -> Result<Vec<PriceBar>, FrameError> {
        let df = BarSchema::to_frame(bars)?;
        let canonical = Self::canonicalize(df.lazy()).collect()?;
        BarSchema::from_frame(&canonical)
    }
}
