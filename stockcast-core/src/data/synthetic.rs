//! Offline providers: deterministic synthetic bars and fixed stub data.

use chrono::{Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataProvider, FetchResult, ProviderError, RawBar};
use crate::domain::PriceBar;

/// Generates weekday-only bars from a hash of `(symbol, date)`.
///
/// Each bar depends only on its symbol and date, so overlapping ranges agree
/// bar-for-bar and repeated fetches are identical.
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider;

impl SyntheticProvider {
    pub fn new() -> Self {
        Self
    }

    fn symbol_seed(symbol: &str) -> u64 {
        let hash = blake3::hash(symbol.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    fn bar_for(symbol_seed: u64, date: NaiveDate) -> RawBar {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&symbol_seed.to_le_bytes());
        hasher.update(&date.num_days_from_ce().to_le_bytes());
        let mut seed = [0u8; 32];
        seed.copy_from_slice(hasher.finalize().as_bytes());
        let mut rng = StdRng::from_seed(seed);

        let base = 20.0 + (symbol_seed % 480) as f64;
        let drift = ((symbol_seed >> 16) % 21) as f64 / 100.0 - 0.05;
        let t = f64::from(date.num_days_from_ce() - 730_120) / 365.25;
        let level = base
            * (drift * t).exp()
            * (1.0 + 0.08 * (std::f64::consts::TAU * t).sin());

        let open = level * (1.0 + rng.gen_range(-0.015..0.015));
        let close = level * (1.0 + rng.gen_range(-0.015..0.015));
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000);

        RawBar {
            timestamp: market_open(date, &new_york()),
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, ProviderError> {
        let seed = Self::symbol_seed(symbol);
        let bars = start
            .iter_days()
            .take_while(|d| *d <= end)
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|d| Self::bar_for(seed, d))
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
        })
    }
}

/// Returns a fixed list of bars for every request, or a fixed failure.
///
/// The bars are returned as-is regardless of the requested range; clipping to
/// the range is the fetcher's job.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    bars: Vec<RawBar>,
    failure: Option<String>,
}

impl StaticProvider {
    pub fn new(bars: Vec<RawBar>) -> Self {
        Self {
            bars,
            failure: None,
        }
    }

    /// Stamp each bar at 09:30 local time in an exchange `offset_secs` east of UTC.
    pub fn from_bars(bars: &[PriceBar], offset_secs: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(utc);
        Self::new(
            bars.iter()
                .map(|b| RawBar {
                    timestamp: market_open(b.date, &offset),
                    open: b.open,
                    high: b.high,
                    low: b.low,
                    close: b.close,
                    volume: b.volume,
                })
                .collect(),
        )
    }

    /// A provider whose every fetch fails as unreachable.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            bars: Vec::new(),
            failure: Some(message.into()),
        }
    }
}

impl DataProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(
        &self,
        symbol: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<FetchResult, ProviderError> {
        if let Some(message) = &self.failure {
            return Err(ProviderError::NetworkUnreachable(message.clone()));
        }
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.bars.clone(),
        })
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn new_york() -> FixedOffset {
    FixedOffset::west_opt(5 * 3600).unwrap_or_else(utc)
}

fn market_open(date: NaiveDate, offset: &FixedOffset) -> chrono::DateTime<FixedOffset> {
    let open = NaiveTime::from_hms_opt(9, 30, 0).unwrap_or(NaiveTime::MIN);
    offset
        .from_local_datetime(&date.and_time(open))
        .single()
        .unwrap_or_else(|| offset.from_utc_datetime(&date.and_time(open)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn synthetic_skips_weekends() {
        let provider = SyntheticProvider::new();
        // 2023-01-01 is a Sunday; 2023-01-10 a Tuesday.
        let result = provider.fetch("TEST", d(2023, 1, 1), d(2023, 1, 10)).unwrap();
        assert_eq!(result.bars.len(), 7);
        assert!(result
            .bars
            .iter()
            .all(|b| !matches!(b.timestamp.weekday(), Weekday::Sat | Weekday::Sun)));
    }

    #[test]
    fn synthetic_bars_are_consistent_across_ranges() {
        let provider = SyntheticProvider::new();
        let wide = provider.fetch("AAPL", d(2023, 1, 2), d(2023, 1, 31)).unwrap();
        let narrow = provider.fetch("AAPL", d(2023, 1, 9), d(2023, 1, 13)).unwrap();
        let overlap: Vec<_> = wide
            .bars
            .iter()
            .filter(|b| (d(2023, 1, 9)..=d(2023, 1, 13)).contains(&b.timestamp.date_naive()))
            .cloned()
            .collect();
        assert_eq!(overlap, narrow.bars);
    }

    #[test]
    fn synthetic_bars_are_sane() {
        let provider = SyntheticProvider::new();
        let result = provider.fetch("MSFT", d(2022, 1, 1), d(2022, 12, 31)).unwrap();
        for bar in &result.bars {
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.low > 0.0);
        }
    }

    #[test]
    fn static_provider_can_fail() {
        let provider = StaticProvider::unavailable("offline");
        let err = provider.fetch("TEST", d(2023, 1, 1), d(2023, 1, 2)).unwrap_err();
        assert!(matches!(err, ProviderError::NetworkUnreachable(_)));
    }

    #[test]
    fn static_provider_stamps_exchange_offset() {
        let bar = PriceBar {
            date: d(2023, 1, 3),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10,
        };
        let provider = StaticProvider::from_bars(&[bar], 10 * 3600);
        let result = provider.fetch("TEST", d(2023, 1, 1), d(2023, 1, 31)).unwrap();
        let ts = result.bars[0].timestamp;
        assert_eq!(ts.offset().local_minus_utc(), 10 * 3600);
        assert_eq!(ts.date_naive(), d(2023, 1, 3));
        // 09:30 at UTC+10 is still the previous day in UTC.
        assert_eq!(ts.naive_utc().date(), d(2023, 1, 2));
    }
}
