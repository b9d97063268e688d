//! Bottom status bar: panel hints and the last status message.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Panel, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    let hints: Vec<String> = Panel::ALL
        .iter()
        .map(|p| format!("{}:{}", p.index() + 1, p.label()))
        .collect();
    spans.push(Span::styled(format!(" {}", hints.join(" ")), theme::muted()));
    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::test_helpers::{app, buffer_text};

    #[test]
    fn shows_hints_and_message() {
        let (mut app, _rx) = app();
        app.set_warning("Start date is after end date");
        let mut terminal = Terminal::new(TestBackend::new(140, 1)).unwrap();
        terminal.draw(|f| render(f, f.area(), &app)).unwrap();
        let text = buffer_text(terminal.backend().buffer());
        assert!(text.contains("1:Overview"));
        assert!(text.contains("6:Help"));
        assert!(text.contains("Start date is after end date"));
    }
}
