//! Processes tab: summary cards, top-N bar charts, and the searchable, sortable
//! table with a scrollbar.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::pages::{ProcList, ProcessesPage};
use crate::proclist::{self, ProcessField, ProcessSummary, SortDirection, TOP_N};
use crate::subscription::Latest;
use crate::types::{ProcessInfo, ProcessSet};
use crate::ui::theme::{load_color, ACCENT, MUTED, SB_ARROW, SB_THUMB, SB_TRACK};
use crate::ui::util::{draw_loading, format_bytes, format_create_time, inner, truncate_middle};

const COLS: [Constraint; 7] = [
    Constraint::Length(8),      // PID
    Constraint::Percentage(30), // Name
    Constraint::Length(10),     // Status
    Constraint::Length(8),      // CPU %
    Constraint::Length(11),     // RSS
    Constraint::Length(11),     // VMS
    Constraint::Length(19),     // Started
];

/// Sort key bound to each header, in column order.
pub const SORT_KEYS: [(char, ProcessField); 7] = [
    ('p', ProcessField::Pid),
    ('n', ProcessField::Name),
    ('s', ProcessField::Status),
    ('c', ProcessField::CpuPercent),
    ('m', ProcessField::MemoryRss),
    ('v', ProcessField::MemoryVms),
    ('t', ProcessField::CreateTime),
];

pub fn draw_processes(f: &mut ratatui::Frame<'_>, area: Rect, page: &ProcessesPage) {
    page.processes.with_latest(|l| match l {
        Latest::Unavailable => draw_loading(f, area, "process data"),
        Latest::Available(set) => draw_set(f, area, set, page),
    });
}

fn draw_set(f: &mut ratatui::Frame<'_>, area: Rect, set: &ProcessSet, page: &ProcessesPage) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Percentage(30),
            Constraint::Min(5),
        ])
        .split(area);

    let (fg, bg) = page.shaped(set);
    let shown = match page.list {
        ProcList::Foreground => &fg,
        ProcList::Background => &bg,
    };

    draw_search(f, rows[0], page, fg.len(), bg.len());
    draw_summary(f, rows[1], &page.summary(set));

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let matching = page.matching(set);
    let by_cpu = proclist::top_n(&matching, |p| p.cpu_percent, TOP_N);
    draw_top_chart(
        f,
        charts[0],
        "Top CPU %",
        by_cpu.iter().map(|p| (p.display_name(), p.cpu_percent.max(0.0).round() as u64)),
        Color::Cyan,
    );
    let by_mem = proclist::top_n(&matching, |p| p.memory_rss as f64, TOP_N);
    draw_top_chart(
        f,
        charts[1],
        "Top memory (MB)",
        by_mem.iter().map(|p| (p.display_name(), p.memory_rss / (1024 * 1024))),
        Color::Magenta,
    );

    draw_table(f, rows[3], page, shown);
}

fn draw_search(f: &mut ratatui::Frame<'_>, area: Rect, page: &ProcessesPage, fg: usize, bg: usize) {
    let list = |l: ProcList, label: &str, n: usize| {
        let style = if page.list == l {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(MUTED)
        };
        Span::styled(format!("{label} ({n})"), style)
    };
    let cursor = if page.searching { "_" } else { "" };
    let query_style = if page.searching {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let line = Line::from(vec![
        Span::styled("search: ", Style::default().fg(MUTED)),
        Span::styled(format!("{}{cursor}", page.query), query_style),
        Span::raw("   "),
        list(ProcList::Foreground, "foreground", fg),
        Span::raw(" | "),
        list(ProcList::Background, "background", bg),
        Span::styled("   (/ search, f switch list)", Style::default().fg(MUTED)),
    ]);
    f.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_summary(f: &mut ratatui::Frame<'_>, area: Rect, s: &ProcessSummary) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    let top_cpu = s
        .top_cpu
        .as_ref()
        .map(|(n, v)| format!("{} ({v:.1}%)", truncate_middle(n, 16)))
        .unwrap_or_else(|| "N/A".into());
    let top_mem = s
        .top_memory
        .as_ref()
        .map(|(n, v)| format!("{} ({})", truncate_middle(n, 16), format_bytes(*v)))
        .unwrap_or_else(|| "N/A".into());
    let statuses = s
        .by_status
        .iter()
        .map(|(k, v)| format!("{k} {v}"))
        .collect::<Vec<_>>()
        .join(", ");

    let card = |title: &str, body: String| {
        Paragraph::new(body).block(Block::default().borders(Borders::ALL).title(title.to_string()))
    };
    f.render_widget(card("Total", s.total.to_string()), cards[0]);
    f.render_widget(card("Top CPU", top_cpu), cards[1]);
    f.render_widget(card("Top memory", top_mem), cards[2]);
    f.render_widget(card("By status", statuses), cards[3]);
}

fn draw_top_chart(
    f: &mut ratatui::Frame<'_>,
    area: Rect,
    title: &str,
    points: impl Iterator<Item = (String, u64)>,
    color: Color,
) {
    let bars: Vec<Bar> = points
        .map(|(name, v)| {
            Bar::default()
                .value(v)
                .label(Line::from(truncate_middle(&name, 8)))
                .style(Style::default().fg(color))
        })
        .collect();
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .data(BarGroup::default().bars(&bars))
        .bar_width(8)
        .bar_gap(1);
    f.render_widget(chart, area);
}

fn draw_table(f: &mut ratatui::Frame<'_>, area: Rect, page: &ProcessesPage, rows: &[&ProcessInfo]) {
    let title = match page.list {
        ProcList::Foreground => "Foreground processes",
        ProcList::Background => "Background processes",
    };
    f.render_widget(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("{title} ({} shown)", rows.len())),
        area,
    );

    // reserve 2 columns for the scrollbar
    let inner = inner(area);
    if inner.height < 1 || inner.width < 3 {
        return;
    }
    let content = Rect {
        width: inner.width.saturating_sub(2),
        ..inner
    };

    let total_rows = rows.len();
    let viewport_rows = content.height.saturating_sub(1) as usize;
    let max_off = total_rows.saturating_sub(viewport_rows);
    let offset = page.scroll.min(max_off);

    let peak_cpu = rows.iter().map(|p| p.cpu_percent).fold(0.0_f64, f64::max);
    let body = rows.iter().skip(offset).take(viewport_rows).map(|p| {
        let emphasis = if peak_cpu > 0.0 && p.cpu_percent == peak_cpu {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(vec![
            Cell::from(p.pid.to_string()).style(Style::default().fg(MUTED)),
            Cell::from(p.display_name()),
            Cell::from(p.status.to_string()),
            Cell::from(format!("{:>5.1}", p.cpu_percent))
                .style(Style::default().fg(load_color(p.cpu_percent))),
            Cell::from(format_bytes(p.memory_rss)),
            Cell::from(format_bytes(p.memory_vms)),
            Cell::from(format_create_time(p.create_time)),
        ])
        .style(emphasis)
    });

    let arrow = match page.sort.direction {
        SortDirection::Asc => "▲",
        SortDirection::Desc => "▼",
    };
    let labels = ["PID", "Name", "Status", "CPU %", "RSS", "VMS", "Started"];
    let header_cells: Vec<String> = labels
        .iter()
        .zip(SORT_KEYS)
        .map(|(label, (key, field))| {
            if field == page.sort.field {
                format!("{label} {arrow}")
            } else {
                format!("{label} ({key})")
            }
        })
        .collect();
    let header = Row::new(header_cells)
        .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD));

    let table = Table::new(body, COLS.to_vec()).header(header).column_spacing(1);
    f.render_widget(table, content);

    let scroll_area = Rect {
        x: inner.x + inner.width.saturating_sub(1),
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    draw_scrollbar(f, scroll_area, total_rows, viewport_rows, offset);
}

fn draw_scrollbar(f: &mut ratatui::Frame<'_>, area: Rect, total: usize, view: usize, offset: usize) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total.max(1);
    let view = view.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset.min(max_off) + max_off / 2) / max_off
    };

    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

/// Keys for the processes tab. Returns false when the key was not consumed.
pub fn processes_handle_key(page: &mut ProcessesPage, key: KeyEvent, page_size: usize) -> bool {
    if page.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => page.searching = false,
            KeyCode::Backspace => page.pop_query(),
            KeyCode::Char(c) => page.push_query(c),
            _ => return false,
        }
        return true;
    }
    match key.code {
        KeyCode::Char('/') => page.searching = true,
        KeyCode::Char('f') => page.toggle_list(),
        KeyCode::Up => page.scroll = page.scroll.saturating_sub(1),
        KeyCode::Down => page.scroll = page.scroll.saturating_add(1),
        KeyCode::PageUp => page.scroll = page.scroll.saturating_sub(page_size.max(1)),
        KeyCode::PageDown => page.scroll = page.scroll.saturating_add(page_size.max(1)),
        KeyCode::Home => page.scroll = 0,
        KeyCode::Char(c) => match SORT_KEYS.iter().find(|(k, _)| *k == c) {
            Some((_, field)) => page.sort_by(*field),
            None => return false,
        },
        _ => return false,
    }
    true
}
