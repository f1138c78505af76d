//! Network tab: per-interface rate sparklines, packet rates, traffic share,
//! interface table and error summary.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Sparkline, Table},
};

use crate::derive::{self, DuplexRate};
use crate::history::Sample;
use crate::pages::NetworkPage;
use crate::subscription::Latest;
use crate::types::NetworkTable;
use crate::ui::theme::{ACCENT, MUTED, RECV, SENT};
use crate::ui::util::{draw_loading, format_bytes, format_rate, format_speed, inner, pct_u16};

pub fn draw_net(f: &mut ratatui::Frame<'_>, area: Rect, page: &NetworkPage) {
    page.network.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, area, "network data"),
        Latest::Available(table) => draw_table(f, area, table, page),
    });
}

fn draw_table(f: &mut ratatui::Frame<'_>, area: Rect, table: &NetworkTable, page: &NetworkPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Min(6)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    draw_rates(f, top[0], page);
    draw_distribution(f, top[1], table);
    draw_interfaces(f, bottom[0], table);
    draw_errors(f, bottom[1], table);
}

fn draw_rates(f: &mut ratatui::Frame<'_>, area: Rect, page: &NetworkPage) {
    let Some(name) = page.selected_interface() else {
        f.render_widget(
            Paragraph::new("no active interface reported yet")
                .block(Block::default().borders(Borders::ALL).title("Traffic")),
            area,
        );
        return;
    };
    let Some(series) = page.history.get(name) else {
        return;
    };
    let bytes = derive::throughput(series);
    let packets = derive::packet_rates(series);
    let avg_packets = derive::mean_duplex(&packets);
    let now = bytes.last().map(|s| s.value).unwrap_or_default();
    let now_packets = packets.last().map(|s| s.value).unwrap_or_default();

    let stack = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Min(3),
        ])
        .split(area);

    draw_net_spark(
        f,
        stack[0],
        &format!("{name} ↑ sent — now: {} (←/→ to switch)", format_rate(now.sent)),
        &rate_points(&bytes, |r| r.sent),
        SENT,
    );
    draw_net_spark(
        f,
        stack[1],
        &format!("{name} ↓ received — now: {}", format_rate(now.recv)),
        &rate_points(&bytes, |r| r.recv),
        RECV,
    );

    let lines = vec![
        Line::from(vec![
            Span::styled("packets/s  ", Style::default().fg(MUTED)),
            Span::styled(format!("sent {:.1}", now_packets.sent), Style::default().fg(SENT)),
            Span::raw("  "),
            Span::styled(format!("recv {:.1}", now_packets.recv), Style::default().fg(RECV)),
        ]),
        Line::from(vec![
            Span::styled("average    ", Style::default().fg(MUTED)),
            Span::raw(format!(
                "sent {:.1}  recv {:.1}",
                avg_packets.sent, avg_packets.recv
            )),
        ]),
    ];
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Packets")),
        stack[2],
    );
}

fn rate_points(points: &[Sample<DuplexRate>], pick: impl Fn(&DuplexRate) -> f64) -> Vec<u64> {
    derive::spark_points(points.iter().map(|p| pick(&p.value)), 1.0)
}

pub fn draw_net_spark(f: &mut ratatui::Frame<'_>, area: Rect, title: &str, data: &[u64], color: Color) {
    let max_points = area.width.saturating_sub(2) as usize;
    let start = data.len().saturating_sub(max_points);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .data(&data[start..])
        .style(Style::default().fg(color));
    f.render_widget(spark, area);
}

fn draw_distribution(f: &mut ratatui::Frame<'_>, area: Rect, table: &NetworkTable) {
    let shares = derive::traffic_distribution(table);
    let total = shares.iter().fold(0u64, |acc, s| acc.saturating_add(s.bytes));
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Traffic by interface ({})", format_bytes(total))),
        area,
    );
    let body = inner(area);
    let n = shares.len().min(body.height as usize);
    if n == 0 {
        return;
    }
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Length(1); n])
        .split(body);
    for (slot, share) in slots.iter().zip(shares.iter()) {
        let g = Gauge::default()
            .gauge_style(Style::default().fg(ACCENT))
            .percent(pct_u16(share.percent))
            .label(format!(
                "{} {} ({:.1}%)",
                share.name,
                format_bytes(share.bytes),
                share.percent
            ));
        f.render_widget(g, *slot);
    }
}

fn draw_interfaces(f: &mut ratatui::Frame<'_>, area: Rect, table: &NetworkTable) {
    let (active, inactive) = derive::partition_interfaces(table);
    let header = Row::new(vec!["Interface", "State", "IP", "MAC", "Speed", "Sent", "Recv"]).style(
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    );
    // active first, then inactive, matching the accordion order
    let rows = active.iter().chain(inactive.iter()).map(|(name, c)| {
        let (state, color) = if c.is_up {
            ("up", Color::Green)
        } else {
            ("down", Color::Red)
        };
        Row::new(vec![
            Cell::from(name.to_string()),
            Cell::from(state).style(Style::default().fg(color)),
            Cell::from(c.ip_address.clone().unwrap_or_else(|| "n/a".into())),
            Cell::from(c.mac_address.clone().unwrap_or_else(|| "n/a".into())),
            Cell::from(format_speed(c.speed)),
            Cell::from(format_bytes(c.network_sent)),
            Cell::from(format_bytes(c.network_recv)),
        ])
    });
    let widths = [
        Constraint::Length(12),
        Constraint::Length(5),
        Constraint::Length(16),
        Constraint::Length(18),
        Constraint::Length(11),
        Constraint::Length(11),
        Constraint::Length(11),
    ];
    let by_speed = derive::interfaces_by_speed(table);
    let fastest = by_speed
        .first()
        .map(|(n, s, _)| format!(" — fastest: {n} {}", format_speed(*s)))
        .unwrap_or_default();
    let t = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Interfaces ({} active / {} inactive){fastest}",
            active.len(),
            inactive.len()
        )));
    f.render_widget(t, area);
}

fn draw_errors(f: &mut ratatui::Frame<'_>, area: Rect, table: &NetworkTable) {
    let header = Row::new(vec!["Interface", "Err out", "Err in", "Drop in", "Drop out"])
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));
    let rows = derive::error_summary(table).into_iter().map(|e| {
        let style = if e.has_errors() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Row::new(vec![
            e.name,
            e.sent_errs.to_string(),
            e.recv_errs.to_string(),
            e.dropin.to_string(),
            e.dropout.to_string(),
        ])
        .style(style)
    });
    let widths = [
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let t = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().borders(Borders::ALL).title("Errors and drops"));
    f.render_widget(t, area);
}
