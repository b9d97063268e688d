//! Top-level UI layout: controls bar, active panel, status bar.

pub mod candle_chart;
pub mod controls;
pub mod data_table;
pub mod forecast_chart;
pub mod help_panel;
pub mod overlays;
pub mod price_chart;
pub mod status_bar;
pub mod widgets;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::app::{AppState, Overlay, Panel};
use crate::theme;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let controls_area = chunks[0];
    let main_area = chunks[1];
    let status_area = chunks[2];

    controls::render(f, controls_area, app);
    draw_panel(f, main_area, app);
    status_bar::render(f, status_area, app);

    match app.overlay {
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::SymbolPicker => overlays::render_symbol_picker(f, main_area, app),
        Overlay::DateEdit(field) => {
            overlays::render_date_edit(f, main_area, field, &app.date_input)
        }
        Overlay::None => {}
    }
}

/// Draw the active panel: all four panes in the overview, otherwise one pane zoomed.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    match app.active_panel {
        Panel::Overview => draw_overview(f, area, app),
        Panel::Price => price_chart::render(f, area, app),
        Panel::Candles => candle_chart::render(f, area, app),
        Panel::Forecast => forecast_chart::render(f, area, app),
        Panel::Data => data_table::render(f, area, app),
        Panel::Help => help_panel::render(f, area, app),
    }
}

fn draw_overview(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    price_chart::render(f, top[0], app);
    candle_chart::render(f, top[1], app);
    forecast_chart::render(f, bottom[0], app);
    data_table::render(f, bottom[1], app);
}

/// Bordered block for one pane, titled " Label [n] · extra ".
pub fn pane_block(panel: Panel, extra: &str) -> Block<'static> {
    let title = if extra.is_empty() {
        format!(" {} [{}] ", panel.label(), panel.index() + 1)
    } else {
        format!(" {} [{}] · {} ", panel.label(), panel.index() + 1, extra)
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(title)
        .title_style(theme::accent_bold())
}

/// Empty-state body: a "No Data" heading and an optional reason.
pub fn render_no_data(f: &mut Frame, area: Rect, reason: Option<&str>) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("No Data", theme::muted())),
    ];
    if let Some(reason) = reason {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(reason.to_string(), theme::muted())));
    }
    let para = Paragraph::new(lines)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(para, area);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use stockcast_core::ForecastStage;

    use crate::app::DateField;
    use crate::test_helpers::{app, buffer_text, forecast, history, load};

    fn draw_text(app: &AppState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn every_panel_draws_before_any_data() {
        let (mut app, _rx) = app();
        for panel in Panel::ALL {
            app.active_panel = panel;
            let text = draw_text(&app, 120, 40);
            assert!(text.contains(panel.label()), "{panel:?} title missing");
        }
    }

    #[test]
    fn overview_shows_no_data_in_every_pane() {
        let (app, _rx) = app();
        let text = draw_text(&app, 160, 48);
        assert!(text.matches("No Data").count() >= 4);
    }

    #[test]
    fn overview_with_results() {
        let (mut app, _rx) = app();
        let history = history(60);
        let forecast = forecast(&history, 10);
        load(&mut app, history, ForecastStage::Ready(forecast));
        let text = draw_text(&app, 160, 48);
        assert!(!text.contains("No Data"));
        assert!(text.contains("Apple Inc."));
    }

    #[test]
    fn overlays_draw_on_tiny_terminals() {
        let (mut app, _rx) = app();
        for overlay in [
            Overlay::ErrorHistory,
            Overlay::SymbolPicker,
            Overlay::DateEdit(DateField::End),
        ] {
            app.overlay = overlay;
            draw_text(&app, 20, 8);
        }
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
    }
}
