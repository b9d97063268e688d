//! Controls bar: symbol selector, date range and horizon slider.

use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use stockcast_core::forecast::MAX_HORIZON_DAYS;

use crate::app::{AppState, Control, RunPhase};
use crate::theme;
use crate::ui::widgets::range_slider::track;

const HORIZON_TRACK_WIDTH: usize = 16;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let phase = match app.phase {
        RunPhase::Idle => "",
        RunPhase::Fetching => " · fetching",
        RunPhase::Fitting => " · fitting",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" Stockcast · {}{} ", app.active_panel.label(), phase))
        .title_style(theme::accent_bold());

    let inputs = &app.inputs;
    let mut spans: Vec<Span> = Vec::new();
    for control in Control::ALL {
        let style = if control == app.focus {
            theme::focused()
        } else {
            Style::default()
        };
        spans.push(Span::styled(format!(" {}: ", control.label()), theme::muted()));
        match control {
            Control::Symbol => {
                spans.push(Span::styled(format!(" {} ", inputs.symbol), style));
                spans.push(Span::styled(format!(" {}", app.display_name()), theme::neutral()));
            }
            Control::Start => spans.push(Span::styled(format!(" {} ", inputs.start), style)),
            Control::End => spans.push(Span::styled(format!(" {} ", inputs.end), style)),
            Control::Horizon => {
                let fill = f64::from(inputs.horizon_days) / f64::from(MAX_HORIZON_DAYS);
                spans.push(Span::styled(
                    track(HORIZON_TRACK_WIDTH, 0.0, fill),
                    theme::accent(),
                ));
                spans.push(Span::styled(format!(" {}d ", inputs.horizon_days), style));
            }
        }
        spans.push(Span::raw("  "));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use crate::test_helpers::{app, buffer_text};

    fn draw(app: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 3)).unwrap();
        terminal.draw(|f| render(f, f.area(), app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn shows_symbol_name_dates_and_horizon() {
        let (app, _rx) = app();
        let text = draw(&app);
        assert!(text.contains("AAPL"));
        assert!(text.contains("Apple Inc."));
        assert!(text.contains("2023-01-01"));
        assert!(text.contains("2024-03-01"));
        assert!(text.contains("60d"));
    }

    #[test]
    fn phase_in_title() {
        let (mut app, _rx) = app();
        app.request_run();
        assert!(draw(&app).contains("fetching"));
    }
}
