//! CPU tab: usage gauge, rolling usage sparkline, time split and static info.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Sparkline},
};

use crate::derive::{self, CpuTimeShare};
use crate::history::RollingSeries;
use crate::pages::CpuPage;
use crate::subscription::Latest;
use crate::types::CpuSnapshot;
use crate::ui::home::draw_big_gauge;
use crate::ui::theme::{load_color, MUTED};
use crate::ui::util::{draw_loading, inner, pct_u16, trim_fixed};

pub fn draw_cpu(f: &mut ratatui::Frame<'_>, area: Rect, page: &CpuPage) {
    page.cpu.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, area, "CPU data"),
        Latest::Available(c) => draw_snapshot(f, area, c, &page.history),
    });
}

fn draw_snapshot(f: &mut ratatui::Frame<'_>, area: Rect, c: &CpuSnapshot, hist: &RollingSeries<f64>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Min(8)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(25), Constraint::Percentage(75)])
        .split(rows[0]);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    draw_big_gauge(f, top[0], "CPU", c.cpu_percent, load_color(c.cpu_percent));
    draw_usage_spark(f, top[1], hist);
    draw_time_share(f, bottom[0], derive::cpu_time_share(c));
    draw_info(f, bottom[1], c);
}

pub fn draw_usage_spark(f: &mut ratatui::Frame<'_>, area: Rect, hist: &RollingSeries<f64>) {
    let now = hist.latest().map(|s| s.value).unwrap_or(0.0);
    let title = format!("Usage over time (now: {now:>5.1}%, last {} samples)", hist.len());
    let max_points = area.width.saturating_sub(2) as usize;
    let start = hist.len().saturating_sub(max_points);
    let data = derive::spark_points(hist.values().skip(start).copied(), 1.0);
    let spark = Sparkline::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .data(&data)
        .max(100)
        .style(Style::default().fg(Color::Cyan));
    f.render_widget(spark, area);
}

fn draw_time_share(f: &mut ratatui::Frame<'_>, area: Rect, share: CpuTimeShare) {
    f.render_widget(Block::default().borders(Borders::ALL).title("CPU time"), area);
    let body = inner(area);
    if body.height < 3 {
        return;
    }
    let slots = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1); 3])
        .split(body);
    let bars = [
        ("user", share.user, Color::Cyan),
        ("system", share.system, Color::Magenta),
        ("idle", share.idle, Color::DarkGray),
    ];
    for (slot, (name, pct, color)) in slots.iter().zip(bars) {
        let g = Gauge::default()
            .gauge_style(Style::default().fg(color))
            .percent(pct_u16(pct))
            .label(format!("{name} {pct:.1}%"));
        f.render_widget(g, *slot);
    }
}

fn draw_info(f: &mut ratatui::Frame<'_>, area: Rect, c: &CpuSnapshot) {
    let ghz = |v: f64| format!("{} GHz", trim_fixed(v, 2));
    let opt = |v: Option<f64>, unit: &str| match v {
        Some(x) => format!("{}{unit}", trim_fixed(x, 1)),
        None => "N/A".into(),
    };
    let rows = [
        ("Physical cores", c.cpu_count.to_string()),
        ("Logical cores", c.cpu_count_logical.to_string()),
        ("Min frequency", ghz(c.cpu_freq_min)),
        ("Max frequency", ghz(c.cpu_freq_max)),
        ("Current frequency", ghz(c.cpu_freq_current)),
        ("Temperature", opt(c.cpu_temp, "°C")),
        ("IRQ time", opt(c.cpu_irq, " s")),
        ("SoftIRQ time", opt(c.cpu_softirq, " s")),
    ];
    let lines: Vec<Line> = rows
        .into_iter()
        .map(|(k, v)| {
            Line::from(vec![
                Span::styled(format!("{k:<18}"), Style::default().fg(MUTED)),
                Span::raw(v),
            ])
        })
        .collect();
    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("CPU info")),
        area,
    );
}
