//! Centralized theme module for TUI color constants and styles

use ratatui::prelude::*;

use crate::config::ThemeMode;
use crate::matrix::Choice;

/// Terminal backgrounds brighter than this get the light palette
const LIGHT_LUMA_THRESHOLD: f32 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

/// Pick a palette from the configured mode, probing the terminal background
/// when the mode is `auto`. Detection failures fall back to dark.
pub fn resolve_theme(mode: ThemeMode) -> Theme {
    match mode {
        ThemeMode::Dark => Theme::Dark,
        ThemeMode::Light => Theme::Light,
        ThemeMode::Auto => match terminal_light::luma() {
            Ok(luma) if luma > LIGHT_LUMA_THRESHOLD => Theme::Light,
            _ => Theme::Dark,
        },
    }
}

/// Complete color palette for the TUI
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // One color per option, indexed by Choice::index()
    pub options: [Color; 3],

    // Slider colors
    pub slider_filled: Color,
    pub slider_empty: Color,
    pub customized: Color,

    // Table colors
    pub row_alt_bg: Color,
    pub header_style: Style,
    pub row_selected: Style,
    pub top_factor: Color,

    // General colors
    pub muted: Color,
    pub title_color: Color,
    pub winner: Color,

    // Status bar colors
    pub status_bar_bg: Color,
    pub status_key_color: Color,
    pub flash_success: Color,
    pub flash_error: Color,

    // Popup overlay colors
    pub popup_border: Color,
    pub popup_title: Style,
}

impl ThemeColors {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    /// Dark theme palette
    pub fn dark() -> Self {
        Self {
            options: [Color::Cyan, Color::Yellow, Color::Magenta],
            slider_filled: Color::Cyan,
            slider_empty: Color::DarkGray,
            customized: Color::Yellow,
            row_alt_bg: Color::Indexed(235),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            top_factor: Color::Green,
            muted: Color::Gray,
            title_color: Color::Cyan,
            winner: Color::Green,
            status_bar_bg: Color::Indexed(236),
            status_key_color: Color::Cyan,
            flash_success: Color::Green,
            flash_error: Color::Red,
            popup_border: Color::Cyan,
            popup_title: Style::new().fg(Color::Cyan).bold(),
        }
    }

    /// Light theme palette, tuned for contrast on bright backgrounds
    pub fn light() -> Self {
        Self {
            options: [Color::Blue, Color::Rgb(170, 110, 0), Color::Magenta],
            slider_filled: Color::Blue,
            slider_empty: Color::Indexed(250),
            customized: Color::Rgb(170, 110, 0),
            row_alt_bg: Color::Indexed(254),
            header_style: Style::new().bold(),
            row_selected: Style::new().reversed(),
            top_factor: Color::Rgb(0, 120, 0),
            muted: Color::DarkGray,
            title_color: Color::Blue,
            winner: Color::Rgb(0, 120, 0),
            status_bar_bg: Color::Indexed(253),
            status_key_color: Color::Blue,
            flash_success: Color::Rgb(0, 120, 0),
            flash_error: Color::Red,
            popup_border: Color::Blue,
            popup_title: Style::new().fg(Color::Blue).bold(),
        }
    }

    pub fn option_color(&self, choice: Choice) -> Color {
        self.options[choice.index()]
    }
}
