//! Color themes for the terminal viewer

mod tokyo_night;

pub use tokyo_night::{TOKYO_NIGHT, TOKYO_NIGHT_DAY};

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// A color theme for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,

    // Background colors
    pub bg_primary: Color,
    pub bg_secondary: Color,
    pub bg_tertiary: Color,

    // Foreground colors
    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    // Accent colors
    pub accent_primary: Color,
    pub accent_secondary: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Lesson states
    pub lesson_locked: Color,
    pub lesson_available: Color,
    pub lesson_completed: Color,

    // Lesson content
    pub heading: Color,
    pub code: Color,
    pub quote: Color,

    // UI elements
    pub border: Color,
    pub border_focused: Color,
    pub selection: Color,
}

impl Theme {
    /// Built-in theme by name (case-insensitive)
    pub fn named(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "tokyo night" | "tokyo-night" => Some(Theme::tokyo_night()),
            "tokyo night day" | "tokyo-night-day" => Some(Theme::tokyo_night_day()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::tokyo_night()
    }
}
