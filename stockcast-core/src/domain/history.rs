//! PriceHistory: the ordered daily bars of one symbol over one queried range.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::PriceBar;

/// Raised when bars handed to [`PriceHistory::new`] are not strictly increasing by date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bar dates must be strictly increasing: {next} follows {previous}")]
pub struct UnorderedDates {
    pub previous: NaiveDate,
    pub next: NaiveDate,
}

/// Daily bars for a single symbol, ordered by date ascending with no duplicate dates.
///
/// The ordering invariant is checked on construction, so every `PriceHistory`
/// in the program satisfies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Result<Self, UnorderedDates> {
        for pair in bars.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(UnorderedDates {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    /// A valid, empty result (no trading days in the queried range).
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.bars.iter().map(|b| b.date)
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|b| b.close)
    }

    /// The most recent `n` bars (fewer if the history is shorter).
    pub fn tail(&self, n: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}
