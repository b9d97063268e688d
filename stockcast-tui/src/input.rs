//! Keyboard input dispatch: overlays → global keys → panel-specific handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{AppState, DateField, Overlay, Panel};

/// Handle a key event.
pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. Overlays consume input first.
    match app.overlay {
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::SymbolPicker => {
            handle_picker_overlay(app, key);
            return;
        }
        Overlay::DateEdit(field) => {
            handle_date_overlay(app, key, field);
            return;
        }
        Overlay::None => {}
    }

    // 2. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='6') => {
            if let Some(panel) = Panel::from_index(c as usize - '1' as usize) {
                app.active_panel = panel;
            }
            return;
        }
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel = app.active_panel.prev();
            } else {
                app.active_panel = app.active_panel.next();
            }
            return;
        }
        KeyCode::BackTab => {
            app.active_panel = app.active_panel.prev();
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        KeyCode::Char('r') => {
            app.request_run();
            return;
        }
        KeyCode::Char('/') | KeyCode::Char('s') => {
            app.open_symbol_picker();
            return;
        }
        KeyCode::Char('h') | KeyCode::Left => {
            app.focus = app.focus.prev();
            return;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.focus = app.focus.next();
            return;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.adjust_focused(1);
            return;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.adjust_focused(-1);
            return;
        }
        KeyCode::Enter => {
            app.edit_focused();
            return;
        }
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.adjust_horizon(1);
            return;
        }
        KeyCode::Char('-') => {
            app.adjust_horizon(-1);
            return;
        }
        _ => {}
    }

    // 3. Panel-specific keys.
    match app.active_panel {
        Panel::Overview | Panel::Price | Panel::Candles => handle_range_key(app, key),
        Panel::Forecast | Panel::Data | Panel::Help => {}
    }
}

/// Range slider: zoom, pan, reset.
fn handle_range_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('[') => app.view.zoom_in(),
        KeyCode::Char(']') => app.view.zoom_out(),
        KeyCode::Char(',') => app.view.pan(-1),
        KeyCode::Char('.') => app.view.pan(1),
        KeyCode::Char('<') => app.view.pan(-10),
        KeyCode::Char('>') => app.view.pan(10),
        KeyCode::Char('0') => app.view.reset(),
        _ => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

fn handle_picker_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.overlay = Overlay::None,
        KeyCode::Enter => app.picker_accept(),
        KeyCode::Up => app.picker_move(-1),
        KeyCode::Down => app.picker_move(1),
        KeyCode::PageUp => app.picker_move(-10),
        KeyCode::PageDown => app.picker_move(10),
        KeyCode::Backspace => app.picker_pop(),
        KeyCode::Char(c) => app.picker_push(c),
        _ => {}
    }
}

fn handle_date_overlay(app: &mut AppState, key: KeyEvent, field: DateField) {
    match key.code {
        KeyCode::Esc => {
            app.overlay = Overlay::None;
            app.date_input.clear();
        }
        KeyCode::Enter => app.date_edit_accept(field),
        KeyCode::Backspace => {
            app.date_input.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || c == '-' => {
            if app.date_input.len() < 10 {
                app.date_input.push(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossterm::event::KeyEventState;
    use stockcast_core::domain::PriceHistory;
    use stockcast_core::ForecastStage;

    use crate::app::{Control, ErrorCategory};
    use crate::test_helpers::{app, bars, d, load};

    fn press(app: &mut AppState, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn loaded(app: &mut AppState, n: usize) {
        let history = PriceHistory::new("AAPL", bars(n)).unwrap();
        load(app, history, ForecastStage::Blocked);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _rx) = app();
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        handle_key(&mut app, key);
        assert!(app.running);
    }

    #[test]
    fn q_quits() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn number_keys_switch_panels() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.active_panel, Panel::Forecast);
        press(&mut app, KeyCode::Char('6'));
        assert_eq!(app.active_panel, Panel::Help);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active_panel, Panel::Overview);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.active_panel, Panel::Help);
    }

    #[test]
    fn focus_moves_and_horizon_adjusts() {
        let (mut app, rx) = app();
        press(&mut app, KeyCode::Char('h'));
        assert_eq!(app.focus, Control::Horizon);
        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.inputs.horizon_days, 70);
        press(&mut app, KeyCode::Char('-'));
        assert_eq!(app.inputs.horizon_days, 69);
        assert_eq!(rx.try_iter().count(), 3);
    }

    #[test]
    fn overlay_swallows_global_keys() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.overlay, Overlay::SymbolPicker);
        // 'q' is typed into the query, not treated as quit.
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);
        assert_eq!(app.picker.query, "q");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn picker_selects_by_typing() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('s'));
        type_str(&mut app, "micro");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.inputs.symbol, "MSFT");
        assert_eq!(app.overlay, Overlay::None);
    }

    #[test]
    fn date_edit_via_keys() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.focus, Control::Start);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.overlay, Overlay::DateEdit(DateField::Start));
        for _ in 0..10 {
            press(&mut app, KeyCode::Backspace);
        }
        type_str(&mut app, "2023-x07-03");
        assert_eq!(app.date_input, "2023-07-03");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.inputs.start, d(2023, 7, 3));
    }

    #[test]
    fn range_keys_zoom_and_reset() {
        let (mut app, _rx) = app();
        loaded(&mut app, 100);
        press(&mut app, KeyCode::Char('['));
        assert_eq!(app.view.len(), 75);
        press(&mut app, KeyCode::Char(','));
        assert!(app.view.start() < 12);
        press(&mut app, KeyCode::Char('0'));
        assert!(app.view.is_full());
    }

    #[test]
    fn range_keys_ignored_on_help() {
        let (mut app, _rx) = app();
        loaded(&mut app, 100);
        press(&mut app, KeyCode::Char('6'));
        press(&mut app, KeyCode::Char('['));
        assert!(app.view.is_full());
    }

    #[test]
    fn error_overlay_scrolls_within_bounds() {
        let (mut app, _rx) = app();
        for i in 0..3 {
            app.push_error(ErrorCategory::Data, format!("e{i}"), String::new());
        }
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.overlay, Overlay::ErrorHistory);
        for _ in 0..5 {
            press(&mut app, KeyCode::Char('j'));
        }
        assert_eq!(app.error_scroll, 2);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.overlay, Overlay::None);
    }
}
