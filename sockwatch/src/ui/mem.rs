//! Memory tab: usage gauge, rolling usage sparkline, used/available split and extra counters.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
};

use crate::derive;
use crate::pages::MemoryPage;
use crate::subscription::Latest;
use crate::types::MemorySnapshot;
use crate::ui::home::draw_big_gauge;
use crate::ui::theme::{fill_color, MUTED};
use crate::ui::util::{draw_loading, format_bytes, inner, pct_u16};

pub fn draw_mem(f: &mut ratatui::Frame<'_>, area: Rect, page: &MemoryPage) {
    page.memory.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, area, "memory data"),
        Latest::Available(m) => draw_snapshot(f, area, m, page),
    });
}

fn draw_snapshot(f: &mut ratatui::Frame<'_>, area: Rect, m: &MemorySnapshot, page: &MemoryPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(6)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_big_gauge(f, top[0], "RAM", m.memory_percent, fill_color(m.memory_percent));

    let hist = &page.history;
    let max_points = top[1].width.saturating_sub(2) as usize;
    let start = hist.len().saturating_sub(max_points);
    let data = derive::spark_points(hist.values().skip(start).copied(), 1.0);
    let spark = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("RAM over time (last {} samples)", hist.len())),
        )
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Magenta));
    f.render_widget(spark, top[1]);

    draw_distribution(f, bottom[0], m);
    draw_details(f, bottom[1], m);
}

fn draw_distribution(f: &mut ratatui::Frame<'_>, area: Rect, m: &MemorySnapshot) {
    f.render_widget(
        Block::default().borders(Borders::ALL).title(format!(
            "Distribution of {}",
            format_bytes(m.memory_total)
        )),
        area,
    );
    let body = inner(area);
    if body.height < 2 {
        return;
    }
    let dist = derive::memory_distribution(m);
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 2])
        .split(body);
    let used = Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .percent(pct_u16(dist.used_percent))
        .label(format!(
            "used {} ({:.1}%)",
            format_bytes(dist.used),
            dist.used_percent
        ));
    let avail = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(pct_u16(dist.available_percent))
        .label(format!(
            "available {} ({:.1}%)",
            format_bytes(dist.available),
            dist.available_percent
        ));
    f.render_widget(used, slots[0]);
    f.render_widget(avail, slots[1]);
}

fn draw_details(f: &mut ratatui::Frame<'_>, area: Rect, m: &MemorySnapshot) {
    let rows = [
        ("Total", m.memory_total),
        ("Used", m.memory_used),
        ("Available", m.memory_available),
        ("Buffers", m.memory_buffers),
        ("Cached", m.memory_cached),
        ("Shared", m.memory_shared),
    ];
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("{k:<10}"), Style::default().fg(MUTED)),
                Span::raw(format_bytes(v)),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Details")),
        area,
    );
}
