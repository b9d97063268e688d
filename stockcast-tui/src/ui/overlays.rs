//! Overlay widgets: error history, symbol picker, date editor.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::app::{AppState, DateField, ErrorCategory};
use crate::theme;
use crate::ui::centered_rect;

/// Clear a centred popup, draw its border and return the inner area.
fn popup(f: &mut Frame, area: Rect, size: (u16, u16), title: String, style: Style) -> Rect {
    let rect = centered_rect(size.0, size.1, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(Span::styled(title, style.add_modifier(Modifier::BOLD)));
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    inner
}

fn category_style(category: ErrorCategory) -> Style {
    match category {
        ErrorCategory::Network | ErrorCategory::Worker => theme::negative(),
        ErrorCategory::Data => theme::warning(),
        ErrorCategory::Model => theme::neutral(),
    }
}

/// Recorded fetch and fit failures, newest first.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let title = format!(
        " Errors: {} [Esc]close [j/k]scroll ",
        app.error_history.len()
    );
    let inner = popup(f, area, (80, 70), title, theme::negative());

    if app.error_history.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("Nothing has failed yet.", theme::muted())),
            inner,
        );
        return;
    }

    let mut lines = Vec::new();
    for (i, record) in app.error_history.iter().enumerate().skip(app.error_scroll) {
        if lines.len() >= inner.height as usize {
            break;
        }
        let message_style = if i == app.error_scroll {
            theme::focused()
        } else {
            Style::default().fg(theme::Theme::default().text_primary)
        };
        lines.push(Line::from(vec![
            Span::styled(record.timestamp.format("%H:%M:%S ").to_string(), theme::muted()),
            Span::styled(
                format!("{:<5} ", record.category.label()),
                category_style(record.category),
            ),
            Span::styled(record.message.as_str(), message_style),
        ]));
        if !record.context.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("               {}", record.context),
                theme::muted(),
            )));
        }
    }
    f.render_widget(Paragraph::new(lines), inner);
}

/// Symbol selector: filter box over the catalog, display names shown.
pub fn render_symbol_picker(f: &mut Frame, area: Rect, app: &AppState) {
    let picker = &app.picker;
    let title = format!(
        " Symbol ({}/{}) [Enter]select [Esc]cancel ",
        picker.matches.len(),
        app.catalog.len()
    );
    let inner = popup(f, area, (60, 70), title, theme::accent());

    let mut lines = vec![prompt(&picker.query), Line::from("")];

    let rows = (inner.height as usize).saturating_sub(lines.len());
    if picker.matches.is_empty() {
        lines.push(Line::from(Span::styled("No matching symbols", theme::muted())));
    }
    // Keep the cursor on screen.
    let first = picker.cursor.saturating_sub(rows.saturating_sub(1));
    for (i, &pos) in picker.matches.iter().enumerate().skip(first).take(rows) {
        let Some(entry) = app.catalog.get(pos) else {
            continue;
        };
        let (marker, style) = if i == picker.cursor {
            ("▶ ", theme::focused())
        } else {
            ("  ", theme::muted())
        };
        lines.push(Line::from(vec![
            Span::styled(marker, theme::accent()),
            Span::styled(format!("{:<6}", entry.symbol), style),
            Span::raw("  "),
            Span::styled(entry.display_name.as_str(), theme::neutral()),
        ]));
    }

    f.render_widget(Paragraph::new(lines), inner);
}

/// Date editor for the start or end of the range.
pub fn render_date_edit(f: &mut Frame, area: Rect, field: DateField, input: &str) {
    let title = format!(" {} [Enter]apply [Esc]cancel ", field.label());
    let inner = popup(f, area, (40, 30), title, theme::accent());
    let text = vec![
        Line::from(Span::styled("YYYY-MM-DD", theme::muted())),
        Line::from(""),
        prompt(input),
    ];
    f.render_widget(Paragraph::new(text), inner);
}

fn prompt(text: &str) -> Line<'_> {
    Line::from(vec![
        Span::styled("> ", theme::accent()),
        Span::styled(text, theme::accent_bold()),
        Span::styled("_", theme::accent()),
    ])
}
