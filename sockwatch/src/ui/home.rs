//! Overview: CPU and RAM gauges, network throughput and process counts.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::derive::{self, NetCounters};
use crate::pages::HomePage;
use crate::subscription::Latest;
use crate::ui::theme::{fill_color, load_color, MUTED, RECV, SENT};
use crate::ui::util::{draw_loading, format_bytes, format_rate, pct_u16};

pub fn draw_home(f: &mut ratatui::Frame<'_>, area: Rect, page: &HomePage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let top = split_halves(rows[0]);
    let bottom = split_halves(rows[1]);

    page.cpu.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, top[0], "CPU data"),
        Latest::Available(c) => {
            draw_big_gauge(f, top[0], "CPU usage", c.cpu_percent, load_color(c.cpu_percent))
        }
    });

    page.memory.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, top[1], "memory data"),
        Latest::Available(m) => {
            let g = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title("RAM usage"))
                .gauge_style(Style::default().fg(fill_color(m.memory_percent)))
                .percent(pct_u16(m.memory_percent))
                .label(format!(
                    "{:.1}%  ({} / {})",
                    m.memory_percent,
                    format_bytes(m.memory_used),
                    format_bytes(m.memory_total)
                ));
            f.render_widget(g, top[1]);
        }
    });

    page.network.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, bottom[0], "network data"),
        Latest::Available(table) => {
            let active = derive::active_total(table, |c| c.network_sent);
            let up = derive::latest_rate(&page.net_totals, |c: &NetCounters| c.sent);
            let down = derive::latest_rate(&page.net_totals, |c: &NetCounters| c.recv);
            let lines = vec![
                Line::styled(format!("↑ {}", format_rate(up)), Style::default().fg(SENT)),
                Line::styled(format!("↓ {}", format_rate(down)), Style::default().fg(RECV)),
                Line::styled(
                    format!("{} of {} interfaces active", active.count, table.len()),
                    Style::default().fg(MUTED),
                ),
            ];
            let p = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Network"));
            f.render_widget(p, bottom[0]);
        }
    });

    page.processes.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, bottom[1], "process data"),
        Latest::Available(set) => {
            let lines = vec![
                Line::styled(
                    format!("{} processes", set.total()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Line::styled(
                    format!(
                        "{} foreground, {} background",
                        set.foreground.len(),
                        set.background.len()
                    ),
                    Style::default().fg(MUTED),
                ),
            ];
            let p = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Processes"));
            f.render_widget(p, bottom[1]);
        }
    });
}

fn split_halves(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area)
}

pub fn draw_big_gauge(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    pct: f64,
    color: ratatui::style::Color,
) {
    let g = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .gauge_style(Style::default().fg(color))
        .percent(pct_u16(pct))
        .label(format!("{pct:.1}%"));
    f.render_widget(g, area);
}
