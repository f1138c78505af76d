//! Shared UI colors.

use ratatui::style::Color;

pub const MUTED: Color = Color::DarkGray;
pub const ACCENT: Color = Color::Cyan;

// chart series
pub const SENT: Color = Color::Blue;
pub const RECV: Color = Color::Green;
pub const READ: Color = Color::Green;
pub const WRITE: Color = Color::Magenta;

// Scrollbar colors
pub const SB_ARROW: Color = Color::Rgb(170, 170, 180);
pub const SB_TRACK: Color = Color::Rgb(170, 170, 180);
pub const SB_THUMB: Color = Color::Rgb(170, 170, 180);

/// Green / yellow / red by load percentage.
pub fn load_color(pct: f64) -> Color {
    match pct {
        x if x < 25.0 => Color::Green,
        x if x < 60.0 => Color::Yellow,
        _ => Color::Red,
    }
}

/// Thresholds used for disk and memory fill levels.
pub fn fill_color(pct: f64) -> Color {
    if pct < 70.0 {
        Color::Green
    } else if pct < 90.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}
