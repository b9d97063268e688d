//! Price history fetcher: provider call plus normalisation.

use std::time::Instant;

use chrono::NaiveDate;
use tracing::{debug, warn};

use super::frame::Canonicalizer;
use super::provider::{DataProvider, ProviderError, RawBar};
use crate::domain::{PriceBar, PriceHistory};

/// Fetch daily bars for `symbol` over the inclusive range `[start, end]`.
///
/// The symbol is passed through to the provider unvalidated. A reversed range
/// yields an empty history without contacting the provider, and a range with
/// no trading days yields an empty history rather than an error.
pub fn fetch_history(
    provider: &dyn DataProvider,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceHistory, ProviderError> {
    if start > end {
        debug!(symbol, %start, %end, "start after end, returning empty history");
        return Ok(PriceHistory::empty(symbol));
    }

    let started = Instant::now();
    let fetched = provider.fetch(symbol, start, end)?;
    let raw_count = fetched.bars.len();
    let history = normalize(symbol, &fetched.bars, start, end)?;

    debug!(
        symbol,
        provider = provider.name(),
        raw = raw_count,
        bars = history.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "history fetched"
    );
    Ok(history)
}

/// Strip provider timestamps to naive dates, clip to the range, and order the bars.
///
/// The calendar date is taken from the exchange-local wall clock, so a bar
/// stamped 09:30 at UTC+10 lands on its local trading day even though the
/// UTC instant falls on the previous day.
pub fn normalize(
    symbol: &str,
    raw: &[RawBar],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceHistory, ProviderError> {
    let mut no_close = 0usize;
    let mut partial = 0usize;
    let bars: Vec<PriceBar> = raw
        .iter()
        .map(|r| PriceBar {
            date: r.timestamp.naive_local().date(),
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume: r.volume,
        })
        .filter(|b| b.date >= start && b.date <= end)
        .filter(|b| {
            if b.missing_close() {
                no_close += 1;
                return false;
            }
            if b.is_partial() {
                partial += 1;
            }
            true
        })
        .collect();

    if no_close > 0 {
        warn!(symbol, dropped = no_close, "dropped bars without a close");
    }
    if partial > 0 {
        debug!(symbol, partial, "kept bars with a close but missing open/high/low");
    }
    if bars.is_empty() {
        return Ok(PriceHistory::empty(symbol));
    }

    let canonical = Canonicalizer::canonicalize_bars(&bars)
        .map_err(|e| ProviderError::Normalization(e.to_string()))?;
    if canonical.len() < bars.len() {
        debug!(symbol, dropped = bars.len() - canonical.len(), "duplicate dates removed");
    }
    PriceHistory::new(symbol, canonical).map_err(|e| ProviderError::Normalization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::StaticProvider;
    use chrono::{FixedOffset, TimeZone};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn raw(offset_hours: i32, y: i32, m: u32, day: u32, hour: u32, close: f64) -> RawBar {
        let offset = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        RawBar {
            timestamp: offset.with_ymd_and_hms(y, m, day, hour, 0, 0).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100,
        }
    }

    #[test]
    fn reversed_range_is_empty_not_error() {
        let provider = StaticProvider::unavailable("must not be called");
        let history = fetch_history(&provider, "TEST", d(2023, 2, 1), d(2023, 1, 1)).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn provider_failure_propagates() {
        let provider = StaticProvider::unavailable("offline");
        let err = fetch_history(&provider, "TEST", d(2023, 1, 1), d(2023, 1, 31)).unwrap_err();
        assert!(matches!(err, ProviderError::NetworkUnreachable(_)));
    }

    #[test]
    fn uses_exchange_local_date() {
        // 09:00 at UTC+10 on Jan 3 is Jan 2 in UTC.
        let bars = vec![raw(10, 2023, 1, 3, 9, 50.0)];
        let history = normalize("BHP", &bars, d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        assert_eq!(history.first_date(), Some(d(2023, 1, 3)));
    }

    #[test]
    fn sorts_dedupes_and_clips() {
        let bars = vec![
            raw(-5, 2023, 1, 5, 9, 3.0),
            raw(-5, 2023, 1, 3, 9, 1.0),
            raw(-5, 2023, 1, 3, 16, 1.5),
            raw(-5, 2023, 1, 4, 9, 2.0),
            raw(-5, 2022, 12, 30, 9, 0.5),
        ];
        let history = normalize("AAPL", &bars, d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        let closes: Vec<f64> = history.closes().collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn drops_bars_without_close() {
        let mut bad = raw(0, 2023, 1, 4, 9, 2.0);
        bad.close = f64::NAN;
        let bars = vec![raw(0, 2023, 1, 3, 9, 1.0), bad];
        let history = normalize("AAPL", &bars, d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn keeps_bar_with_close_but_missing_open() {
        let mut partial = raw(-5, 2023, 1, 4, 9, 11.0);
        partial.open = f64::NAN;
        partial.high = f64::NAN;
        let provider = StaticProvider::new(vec![
            raw(-5, 2023, 1, 3, 9, 10.0),
            partial,
            raw(-5, 2023, 1, 5, 9, 12.0),
        ]);
        let history = fetch_history(&provider, "TEST", d(2023, 1, 1), d(2023, 1, 10)).unwrap();
        assert_eq!(history.len(), 3);
        let closes: Vec<f64> = history.closes().collect();
        assert_eq!(closes, vec![10.0, 11.0, 12.0]);
        assert!(history.bars()[1].open.is_nan());
    }

    #[test]
    fn no_bars_is_empty_history() {
        let history = normalize("AAPL", &[], d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        assert!(history.is_empty());
        assert_eq!(history.symbol(), "AAPL");
    }
}
