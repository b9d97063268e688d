//! Range slider: where the visible window sits inside the full history.
//!
//! Drawn as a two-row widget under the price chart:
//! - Track: full history as a line, the visible window as a solid bar
//! - Labels: first date, visible span and bar count, last date

use chrono::NaiveDate;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

use crate::theme::Theme;
use crate::view::ViewWindow;

const FILLED: char = '█';
const EMPTY: char = '─';

/// Cells `[lo, hi)` of a `width`-cell track covered by `[start, end)` out of `total`.
///
/// A non-empty window always covers at least one cell.
pub fn thumb(width: usize, start: usize, end: usize, total: usize) -> (usize, usize) {
    if total == 0 || width == 0 || start >= end {
        return (0, 0);
    }
    let lo = (start * width / total).min(width - 1);
    let hi = (end * width).div_ceil(total).clamp(lo + 1, width);
    (lo, hi)
}

/// Text track with `[start_frac, end_frac]` of `width` filled.
pub fn track(width: usize, start_frac: f64, end_frac: f64) -> String {
    let lo = (start_frac.clamp(0.0, 1.0) * width as f64).floor() as usize;
    let hi = (end_frac.clamp(0.0, 1.0) * width as f64).round() as usize;
    (0..width)
        .map(|i| if i >= lo && i < hi { FILLED } else { EMPTY })
        .collect()
}

pub struct RangeSlider<'a> {
    window: ViewWindow,
    /// Dates of every bar in the history.
    dates: &'a [NaiveDate],
    theme: &'a Theme,
}

impl<'a> RangeSlider<'a> {
    pub fn new(window: ViewWindow, dates: &'a [NaiveDate], theme: &'a Theme) -> Self {
        Self {
            window,
            dates,
            theme,
        }
    }
}

impl Widget for RangeSlider<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let muted = Style::default().fg(self.theme.muted);
        let accent = Style::default().fg(self.theme.accent);

        // Track row, between end caps.
        let inner_width = (area.width - 2) as usize;
        let total = self.dates.len().min(self.window.total());
        let (lo, hi) = thumb(inner_width, self.window.start(), self.window.end(), total);
        buf.set_string(area.x, area.y, "├", muted);
        for i in 0..inner_width {
            let (ch, style) = if i >= lo && i < hi {
                (FILLED, accent)
            } else {
                (EMPTY, muted)
            };
            buf.set_string(area.x + 1 + i as u16, area.y, ch.to_string(), style);
        }
        buf.set_string(area.right() - 1, area.y, "┤", muted);

        if area.height < 2 {
            return;
        }
        let y = area.y + 1;
        let (first, last) = match (self.dates.first(), self.dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return,
        };
        let visible = self.window.slice(self.dates);
        let middle = match (visible.first(), visible.last()) {
            (Some(a), Some(b)) => format!("{a} → {b} ({} bars)", visible.len()),
            _ => String::new(),
        };

        let left = first.to_string();
        let right = last.to_string();
        buf.set_string(area.x, y, &left, muted);
        let right_x = area.right().saturating_sub(right.chars().count() as u16);
        if right_x > area.x + left.len() as u16 {
            buf.set_string(right_x, y, &right, muted);
        }
        let middle_width = middle.chars().count() as u16;
        let middle_x = area.x + area.width.saturating_sub(middle_width) / 2;
        if middle_x > area.x + left.len() as u16 && middle_x + middle_width < right_x {
            buf.set_string(middle_x, y, &middle, accent);
        }
    }
}
