//! Neon-on-charcoal colour palette for the dashboard.
//!
//! # Color Palette
//! - **Accent**: Electric cyan (focus, predicted line)
//! - **Positive**: Neon green (up candles, gains)
//! - **Negative**: Hot pink (down candles, errors)
//! - **Warning**: Neon orange (band edges, warnings)
//! - **Neutral**: Cool purple (actual closes on the forecast chart)
//! - **Muted**: Steel blue (labels, hints, empty states)

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub neutral: Color,
    pub muted: Color,
    pub text_primary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::neon()
    }
}

impl Theme {
    pub fn neon() -> Self {
        Self {
            background: BACKGROUND,
            accent: ACCENT,
            positive: POSITIVE,
            negative: NEGATIVE,
            warning: WARNING,
            neutral: NEUTRAL,
            muted: MUTED,
            text_primary: Color::White,
        }
    }

    /// Green for a gain, pink for a loss, muted for flat.
    pub fn change_color(&self, change: f64) -> Color {
        if change > 0.0 {
            self.positive
        } else if change < 0.0 {
            self.negative
        } else {
            self.muted
        }
    }
}

pub const BACKGROUND: Color = Color::Rgb(18, 18, 24);
pub const ACCENT: Color = Color::Rgb(0, 255, 255);
pub const POSITIVE: Color = Color::Rgb(0, 255, 128);
pub const NEGATIVE: Color = Color::Rgb(255, 20, 147);
pub const WARNING: Color = Color::Rgb(255, 140, 0);
pub const NEUTRAL: Color = Color::Rgb(147, 112, 219);
pub const MUTED: Color = Color::Rgb(100, 149, 237);

pub fn accent() -> Style {
    Style::default().fg(ACCENT)
}

pub fn accent_bold() -> Style {
    accent().add_modifier(Modifier::BOLD)
}

pub fn muted() -> Style {
    Style::default().fg(MUTED)
}

pub fn warning() -> Style {
    Style::default().fg(WARNING)
}

pub fn negative() -> Style {
    Style::default().fg(NEGATIVE)
}

pub fn neutral() -> Style {
    Style::default().fg(NEUTRAL)
}

pub fn panel_border(active: bool) -> Style {
    if active {
        accent()
    } else {
        muted()
    }
}

/// Focused control in the controls bar.
pub fn focused() -> Style {
    Style::default()
        .fg(BACKGROUND)
        .bg(ACCENT)
        .add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_color_by_sign() {
        let theme = Theme::default();
        assert_eq!(theme.change_color(1.5), theme.positive);
        assert_eq!(theme.change_color(-0.2), theme.negative);
        assert_eq!(theme.change_color(0.0), theme.muted);
    }

    #[test]
    fn accents_are_distinct() {
        let theme = Theme::neon();
        assert_ne!(theme.positive, theme.negative);
        assert_ne!(theme.accent, theme.muted);
    }
}
