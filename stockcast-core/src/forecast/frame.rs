//! The model's two-column training frame: `ds` (Date) and `y` (Float64).

use chrono::NaiveDate;
use polars::prelude::*;

use crate::data::frame::{read_dates, read_f64, validate_columns, BarSchema, FrameError};
use crate::domain::PriceHistory;

/// Expected schema for training frames
pub struct TrainingSchema;

impl TrainingSchema {
    pub fn columns() -> [(&'static str, DataType); 2] {
        [("ds", DataType::Date), ("y", DataType::Float64)]
    }

    pub fn validate(df: &DataFrame) -> Result<(), FrameError> {
        validate_columns(df, &Self::columns())
    }
}

/// Project a history onto `ds`/`y`, dropping everything but date and close.
pub fn training_frame(history: &PriceHistory) -> Result<DataFrame, FrameError> {
    let bars = BarSchema::to_frame(history.bars())?;
    let training = bars
        .lazy()
        .select([col("date").alias("ds"), col("close").alias("y")])
        .collect()?;
    TrainingSchema::validate(&training)?;
    Ok(training)
}

/// Training columns pulled back out of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingData {
    pub ds: Vec<NaiveDate>,
    pub y: Vec<f64>,
}

impl TrainingData {
    pub fn from_frame(df: &DataFrame) -> Result<Self, FrameError> {
        TrainingSchema::validate(df)?;
        Ok(Self {
            ds: read_dates(df, "ds")?,
            y: read_f64(df, "y")?,
        })
    }

    pub fn len(&self) -> usize {
        self.ds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ds.is_empty()
    }
}
