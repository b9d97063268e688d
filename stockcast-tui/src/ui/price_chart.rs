//! Price pane: close over date for the visible window, range slider below.

use chrono::NaiveDate;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::symbols;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Chart, Dataset, GraphType};
use ratatui::Frame;

use stockcast_core::domain::PriceBar;

use crate::app::{AppState, Panel};
use crate::theme::{self, Theme};
use crate::ui::widgets::range_slider::RangeSlider;
use crate::ui::{pane_block, render_no_data};

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let bars = app.visible_bars();
    let extra = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) if first.close != 0.0 => format!(
            "{} {:.2} ({:+.2}%)",
            app.inputs.symbol,
            last.close,
            (last.close / first.close - 1.0) * 100.0
        ),
        _ => app.inputs.symbol.clone(),
    };
    let block = pane_block(Panel::Price, &extra);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)])
        .split(inner);

    if bars.is_empty() {
        render_no_data(f, chunks[0], app.history_message().as_deref());
    } else {
        render_chart(f, chunks[0], bars);
    }

    let dates: Vec<NaiveDate> = app
        .history
        .as_ref()
        .map(|h| h.dates().collect())
        .unwrap_or_default();
    let theme = Theme::default();
    f.render_widget(RangeSlider::new(app.view, &dates, &theme), chunks[1]);
}

fn render_chart(f: &mut Frame, area: Rect, bars: &[PriceBar]) {
    let data = close_points(bars);
    let [y_min, y_max] = padded_bounds(bars.iter().map(|b| b.close));
    let x_max = data.last().map_or(1.0, |p| p.0.max(1.0));

    let dataset = Dataset::default()
        .name("close")
        .marker(symbols::Marker::Braille)
        .style(Style::default().fg(theme::ACCENT))
        .graph_type(GraphType::Line)
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([0.0, x_max])
                .labels(date_labels(bars)),
        )
        .y_axis(
            Axis::default()
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{y_min:.2}"), theme::muted()),
                    Span::styled(format!("{y_max:.2}"), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

/// `(days since the first bar, close)` so calendar gaps stay visible.
pub fn close_points(bars: &[PriceBar]) -> Vec<(f64, f64)> {
    let Some(origin) = bars.first().map(|b| b.date) else {
        return Vec::new();
    };
    bars.iter()
        .map(|b| ((b.date - origin).num_days() as f64, b.close))
        .collect()
}

/// Min/max of `values` padded by 5% of the range, or by 1 when flat.
pub fn padded_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    let range = hi - lo;
    let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
    [lo - pad, hi + pad]
}

/// First, middle and last date of `bars`.
pub fn date_labels(bars: &[PriceBar]) -> Vec<Span<'static>> {
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => {
            let mid = first.date + (last.date - first.date) / 2;
            [first.date, mid, last.date]
                .into_iter()
                .map(|d| Span::styled(d.format("%Y-%m-%d").to_string(), theme::muted()))
                .collect()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use stockcast_core::domain::PriceHistory;
    use stockcast_core::ForecastStage;

    use crate::test_helpers::{app, bars, buffer_text, d, load};

    fn draw(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal.draw(|f| render(f, f.area(), app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn gaps_keep_calendar_spacing() {
        let mut series = bars(3);
        series[2].date = d(2023, 1, 9);
        let points = close_points(&series);
        assert_eq!(points[0].0, 0.0);
        assert_eq!(points[1].0, 1.0);
        assert_eq!(points[2].0, 7.0);
    }

    #[test]
    fn bounds_pad_flat_and_empty_series() {
        assert_eq!(padded_bounds([5.0, 5.0].into_iter()), [4.0, 6.0]);
        assert_eq!(padded_bounds(std::iter::empty()), [0.0, 1.0]);
        let [lo, hi] = padded_bounds([10.0, 20.0].into_iter());
        assert!((lo - 9.5).abs() < 1e-12 && (hi - 20.5).abs() < 1e-12);
    }

    #[test]
    fn empty_history_renders_no_data() {
        let (mut app, _rx) = app();
        load(&mut app, PriceHistory::empty("AAPL"), ForecastStage::NotEnoughData { points: 0 });
        let text = draw(&app);
        assert!(text.contains("No Data"));
        assert!(text.contains("No price data in the selected range"));
    }

    #[test]
    fn loaded_history_shows_dates_and_change() {
        let (mut app, _rx) = app();
        load(&mut app, PriceHistory::new("AAPL", bars(40)).unwrap(), ForecastStage::Blocked);
        let text = draw(&app);
        assert!(!text.contains("No Data"));
        assert!(text.contains("2023-01-02"));
        assert!(text.contains("(40 bars)"));
        assert!(text.contains('%'));
    }
}
