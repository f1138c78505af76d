//! Disk tab: usage card, read/write operation rates and raw counters.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::derive;
use crate::pages::DiskPage;
use crate::subscription::Latest;
use crate::types::DiskSnapshot;
use crate::ui::net::draw_net_spark;
use crate::ui::theme::{fill_color, MUTED, READ, WRITE};
use crate::ui::util::{draw_loading, format_bytes, inner, pct_u16};

pub fn draw_disk(f: &mut ratatui::Frame<'_>, area: Rect, page: &DiskPage) {
    page.disk.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, area, "disk data"),
        Latest::Available(d) => draw_snapshot(f, area, d, page),
    });
}

fn draw_snapshot(f: &mut ratatui::Frame<'_>, area: Rect, d: &DiskSnapshot, page: &DiskPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Percentage(50), Constraint::Min(6)])
        .split(area);
    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_usage(f, rows[0], d);

    let rates = derive::disk_op_rates(&page.ops);
    let now = rates.last().map(|s| s.value).unwrap_or_default();
    let reads = derive::spark_points(rates.iter().map(|s| s.value.read), 1.0);
    let writes = derive::spark_points(rates.iter().map(|s| s.value.write), 1.0);
    draw_net_spark(
        f,
        charts[0],
        &format!("Reads/s — now: {:.1}", now.read),
        &reads,
        READ,
    );
    draw_net_spark(
        f,
        charts[1],
        &format!("Writes/s — now: {:.1}", now.write),
        &writes,
        WRITE,
    );

    draw_details(f, rows[2], d);
}

fn draw_usage(f: &mut ratatui::Frame<'_>, area: Rect, d: &DiskSnapshot) {
    let title = format!(
        "Disk   {} / {}  ({} free)",
        format_bytes(d.disk_used),
        format_bytes(d.disk_total),
        format_bytes(d.disk_free)
    );
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);
    let body = inner(area);
    if body.height == 0 {
        return;
    }
    let g = Gauge::default()
        .percent(pct_u16(d.disk_usage))
        .label(format!("{:.1}%", d.disk_usage))
        .gauge_style(Style::default().fg(fill_color(d.disk_usage)));
    f.render_widget(g, Rect { height: 1, ..body });
}

fn draw_details(f: &mut ratatui::Frame<'_>, area: Rect, d: &DiskSnapshot) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let line = |k: &str, v: String| {
        Line::from(vec![
            Span::styled(format!("{k:<12}"), Style::default().fg(MUTED)),
            Span::raw(v),
        ])
    };
    let read = vec![
        line("Bytes", format_bytes(d.disk_read)),
        line("Operations", d.disk_read_count.to_string()),
        line("Time", format!("{} ms", d.disk_read_time)),
    ];
    let write = vec![
        line("Bytes", format_bytes(d.disk_write)),
        line("Operations", d.disk_write_count.to_string()),
        line("Time", format!("{} ms", d.disk_write_time)),
    ];
    f.render_widget(
        Paragraph::new(read).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled("Read", Style::default().fg(READ))),
        ),
        cols[0],
    );
    f.render_widget(
        Paragraph::new(write).block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled("Write", Style::default().fg(WRITE))),
        ),
        cols[1],
    );
}
