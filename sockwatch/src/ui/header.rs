//! Top header: tab strip and connection status.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
};

use crate::app::LinkStatus;
use crate::pages::Tab;
use crate::ui::theme::{ACCENT, MUTED};

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, tab: Tab, endpoint: &str, status: &LinkStatus) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let titles = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| format!("{} {}", i + 1, t.title()));
    let tabs = Tabs::new(titles)
        .select(tab.index())
        .style(Style::default().fg(MUTED))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("│");
    f.render_widget(tabs, rows[0]);

    let (label, color) = match status {
        LinkStatus::Connecting => ("connecting...".to_string(), Color::Yellow),
        LinkStatus::Live => ("live".to_string(), Color::Green),
        LinkStatus::Lost(why) => (format!("disconnected: {why} (r to reconnect)"), Color::Red),
    };
    let line = Line::from(vec![
        Span::styled("sockwatch ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("— {endpoint} "), Style::default().fg(MUTED)),
        Span::styled(format!("[{label}]"), Style::default().fg(color)),
        Span::styled("  (q to quit, 1-6/Tab to switch)", Style::default().fg(MUTED)),
    ]);
    f.render_widget(Paragraph::new(line), rows[1]);
}
