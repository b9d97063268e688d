//! Panel 6: Help: keyboard shortcuts.

use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{AppState, Panel};
use crate::theme;
use crate::ui::pane_block;

pub fn render(f: &mut Frame, area: Rect, _app: &AppState) {
    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global Navigation");
    key(&mut lines, "1-6", "Switch panel (1 = overview of all panes)");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "r", "Reload with the current controls");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Controls Bar");
    key(&mut lines, "h / l", "Focus previous / next control");
    key(&mut lines, "k / j", "Step focused control up / down");
    key(&mut lines, "", "symbol: next / previous in catalog, dates: one month, horizon: 5 days");
    key(&mut lines, "Enter", "Edit focused control (symbol list or date entry)");
    key(&mut lines, "s or /", "Search symbols by ticker or company name");
    key(&mut lines, "+ / -", "Horizon one day longer / shorter (0-365)");
    lines.push(Line::from(""));

    section(&mut lines, "Range Slider (Overview, Price, Candles)");
    key(&mut lines, "[ / ]", "Zoom in / out");
    key(&mut lines, ", / .", "Pan to older / newer bars");
    key(&mut lines, "< / >", "Pan ten steps");
    key(&mut lines, "0", "Show the full range");
    lines.push(Line::from(""));

    section(&mut lines, "Forecast");
    key(&mut lines, "", "Cyan: predicted, orange: band edges, purple: actual closes");

    let para = Paragraph::new(lines).block(pane_block(Panel::Help, ""));
    f.render_widget(para, area);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
