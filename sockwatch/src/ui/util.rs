//! Small UI helpers: human-readable sizes and speeds, truncation, placeholders.

use chrono::{DateTime, Local};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
};

use crate::ui::theme::MUTED;

const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Scale a byte count into the largest unit that keeps the value under 1024.
pub fn format_bytes(b: u64) -> String {
    if b == 0 {
        return "0 Bytes".into();
    }
    let mut v = b as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    format!("{} {}", trim_fixed(v, 2), UNITS[unit])
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    let b = if bytes_per_sec.is_finite() && bytes_per_sec > 0.0 {
        bytes_per_sec.round() as u64
    } else {
        0
    };
    format!("{}/s", format_bytes(b))
}

/// Link speed reported in Mbps.
pub fn format_speed(mbps: u64) -> String {
    if mbps >= 1000 {
        format!("{:.2} Gbps", mbps as f64 / 1000.0)
    } else {
        format!("{mbps} Mbps")
    }
}

/// Fixed decimals with trailing zeros (and a dangling point) removed.
pub fn trim_fixed(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

pub fn format_create_time(unix_secs: f64) -> String {
    if !unix_secs.is_finite() || unix_secs <= 0.0 {
        return "-".into();
    }
    match DateTime::from_timestamp(unix_secs as i64, 0) {
        Some(t) => t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "-".into(),
    }
}

pub fn truncate_middle(s: &str, max: usize) -> String {
    let n = s.chars().count();
    if n <= max {
        return s.to_string();
    }
    if max <= 3 {
        return "...".into();
    }
    let keep = max - 3;
    let left: String = s.chars().take(keep / 2).collect();
    let right: String = s.chars().skip(n - (keep - keep / 2)).collect();
    format!("{left}...{right}")
}

/// Rendered in place of a panel whose event hasn't arrived yet.
pub fn draw_loading(f: &mut ratatui::Frame<'_>, area: Rect, what: &str) {
    let lines = vec![
        Line::styled(
            format!("Loading {what}..."),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled("waiting for the collector", Style::default().fg(MUTED)),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

pub fn inner(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

/// Gauge percent clamped into 0..=100.
pub fn pct_u16(v: f64) -> u16 {
    if v.is_finite() {
        v.clamp(0.0, 100.0).round() as u16
    } else {
        0
    }
}
