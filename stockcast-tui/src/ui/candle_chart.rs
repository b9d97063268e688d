//! Candlestick pane: OHLC candles for the visible window.
//!
//! Renders with direct buffer writes:
//! - Each column = one candle; when the window has more bars than columns,
//!   consecutive bars merge into one candle
//! - Body: block char, green if close >= open, pink otherwise
//! - Wicks: vertical line chars to high/low

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Widget};
use ratatui::Frame;

use stockcast_core::domain::PriceBar;

use crate::app::{AppState, Panel};
use crate::theme::Theme;

/// One drawn column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Merge `bars` into at most `columns` candles, oldest first.
///
/// A missing open falls back to the close, and missing highs or lows are
/// skipped, so every candle spans at least its close.
pub fn bucket(bars: &[PriceBar], columns: usize) -> Vec<Candle> {
    if bars.is_empty() || columns == 0 {
        return Vec::new();
    }
    let per_column = bars.len().div_ceil(columns);
    bars.chunks(per_column)
        .filter_map(|chunk| {
            let first = chunk.first()?;
            let last = chunk.last()?;
            let open = if first.open.is_nan() { first.close } else { first.open };
            // f64::max/min ignore a NaN operand.
            let prices = || chunk.iter().flat_map(|b| [b.open, b.high, b.low, b.close]);
            Some(Candle {
                open,
                close: last.close,
                high: prices().fold(f64::NEG_INFINITY, f64::max),
                low: prices().fold(f64::INFINITY, f64::min),
            })
        })
        .collect()
}

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let theme = Theme::default();
    let title = format!(
        "{} [{}] · {}",
        Panel::Candles.label(),
        Panel::Candles.index() + 1,
        app.inputs.symbol
    );
    f.render_widget(CandleChart::new(app.visible_bars(), &title, &theme), area);
}

/// Candlestick chart widget.
pub struct CandleChart<'a> {
    bars: &'a [PriceBar],
    title: &'a str,
    theme: &'a Theme,
}

impl<'a> CandleChart<'a> {
    pub fn new(bars: &'a [PriceBar], title: &'a str, theme: &'a Theme) -> Self {
        Self { bars, title, theme }
    }

    /// Map a price to a row in the plot area (0 = top).
    fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
        if (y_max - y_min).abs() < 1e-9 || plot_height == 0 {
            return 0;
        }
        let frac = (price - y_min) / (y_max - y_min);
        let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
        y.round().max(0.0).min(plot_height.saturating_sub(1) as f64) as u16
    }
}

impl Widget for CandleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.bars.is_empty() {
            let block = Block::default()
                .title(format!(" {} [No Data] ", self.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted));
            let inner = block.inner(area);
            block.render(area, buf);
            if inner.height > 1 && inner.width >= 7 {
                let x = inner.x + (inner.width - 7) / 2;
                let y = inner.y + inner.height / 2;
                buf.set_string(x, y, "No Data", Style::default().fg(self.theme.muted));
            }
            return;
        }

        let up_count = self.bars.iter().filter(|b| b.is_up()).count();
        let down_count = self.bars.len() - up_count;
        let block = Block::default()
            .title(format!(
                " {} | {} bars | {} up {} down ",
                self.title,
                self.bars.len(),
                up_count,
                down_count
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent));
        let inner = block.inner(area);
        block.render(area, buf);

        // Left margin for price labels, bottom row for the date span.
        let label_width: u16 = 9;
        let plot_left = inner.x + label_width;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(label_width);
        let plot_height = inner.height.saturating_sub(1);
        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let candles = bucket(self.bars, plot_width as usize);
        let y_min = candles.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let y_max = candles.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
        let range = y_max - y_min;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        let y_lower = y_min - pad;
        let y_upper = y_max + pad;

        let muted = Style::default().fg(self.theme.muted);
        let y_labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let y_positions = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (value, y_pos) in y_labels.iter().zip(y_positions.iter()) {
            buf.set_string(inner.x, plot_top + y_pos, format!("{value:>8.2}"), muted);
        }

        for (i, candle) in candles.iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }
            let style = Style::default().fg(if candle.is_up() {
                self.theme.positive
            } else {
                self.theme.negative
            });

            let high_y = Self::price_to_y(candle.high, y_lower, y_upper, plot_height);
            let low_y = Self::price_to_y(candle.low, y_lower, y_upper, plot_height);
            let body_top_y =
                Self::price_to_y(candle.open.max(candle.close), y_lower, y_upper, plot_height);
            let body_bot_y =
                Self::price_to_y(candle.open.min(candle.close), y_lower, y_upper, plot_height);

            for y in high_y..body_top_y {
                buf.set_string(x, plot_top + y, "│", style);
            }
            // Full block for up, medium shade for down.
            let body = if candle.is_up() { "\u{2588}" } else { "\u{2593}" };
            for y in body_top_y..=body_bot_y {
                buf.set_string(x, plot_top + y, body, style);
            }
            for y in (body_bot_y + 1)..=low_y {
                buf.set_string(x, plot_top + y, "│", style);
            }
        }

        let info_y = plot_top + plot_height;
        if let (Some(first), Some(last)) = (self.bars.first(), self.bars.last()) {
            let per = self.bars.len().div_ceil(candles.len().max(1));
            let info = if per > 1 {
                format!("{} → {} · {} bars/candle", first.date, last.date, per)
            } else {
                format!("{} → {}", first.date, last.date)
            };
            buf.set_string(plot_left, info_y, info, muted);
        }
    }
}
