//! Data pane: the most recent bars as a table.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::{Cell, Row, Table};
use ratatui::Frame;

use stockcast_core::domain::PriceBar;

use crate::app::{AppState, Panel};
use crate::theme::{self, Theme};
use crate::ui::{pane_block, render_no_data};

/// Rows shown in the preview.
pub const TAIL_ROWS: usize = 5;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let tail: &[PriceBar] = app
        .history
        .as_ref()
        .map(|h| h.tail(TAIL_ROWS))
        .unwrap_or(&[]);
    let extra = match &app.history {
        Some(history) if !history.is_empty() => {
            format!("last {} of {} bars", tail.len(), history.len())
        }
        _ => String::new(),
    };
    let block = pane_block(Panel::Data, &extra);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if tail.is_empty() {
        render_no_data(f, inner, app.history_message().as_deref());
        return;
    }

    let theme = Theme::default();
    let header = Row::new(
        ["Date", "Open", "High", "Low", "Close", "Volume"]
            .into_iter()
            .map(|h| Cell::from(Span::styled(h, theme::accent_bold()))),
    );
    let rows: Vec<Row> = tail
        .iter()
        .map(|bar| {
            let change_style = Style::default().fg(theme.change_color(bar.close - bar.open));
            Row::new(vec![
                Cell::from(bar.date.format("%Y-%m-%d").to_string()),
                Cell::from(format_price(bar.open)),
                Cell::from(format_price(bar.high)),
                Cell::from(format_price(bar.low)),
                Cell::from(Span::styled(format_price(bar.close), change_style)),
                Cell::from(format_volume(bar.volume)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Length(9),
        Constraint::Min(8),
    ];
    let table = Table::new(rows, widths).header(header).column_spacing(1);
    f.render_widget(table, inner);
}

/// Two decimals, or `-` when the provider left the price out.
pub fn format_price(price: f64) -> String {
    if price.is_nan() {
        "-".to_string()
    } else {
        format!("{price:.2}")
    }
}

/// Volume with thousands separators.
pub fn format_volume(volume: u64) -> String {
    let digits = volume.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
