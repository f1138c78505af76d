//! Per-render shaping of process lists: search, sort, top-N and summary.
//!
//! All functions borrow the snapshot and return new vectors; the snapshot
//! itself is never reordered.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::types::ProcessInfo;

/// Bars shown in the top-process charts.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessField {
    Pid,
    Name,
    Status,
    CpuPercent,
    MemoryRss,
    MemoryVms,
    CreateTime,
}

impl ProcessField {
    pub const ALL: [ProcessField; 7] = [
        Self::Pid,
        Self::Name,
        Self::Status,
        Self::CpuPercent,
        Self::MemoryRss,
        Self::MemoryVms,
        Self::CreateTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pid => "pid",
            Self::Name => "name",
            Self::Status => "status",
            Self::CpuPercent => "cpu_percent",
            Self::MemoryRss => "memory_rss",
            Self::MemoryVms => "memory_vms",
            Self::CreateTime => "create_time",
        }
    }

    fn compare(self, a: &ProcessInfo, b: &ProcessInfo) -> Ordering {
        match self {
            Self::Pid => a.pid.cmp(&b.pid),
            Self::Name => a.name.cmp(&b.name),
            Self::Status => a.status.as_str().cmp(b.status.as_str()),
            Self::CpuPercent => a.cpu_percent.total_cmp(&b.cpu_percent),
            Self::MemoryRss => a.memory_rss.cmp(&b.memory_rss),
            Self::MemoryVms => a.memory_vms.cmp(&b.memory_vms),
            Self::CreateTime => a.create_time.total_cmp(&b.create_time),
        }
    }
}

impl fmt::Display for ProcessField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("unknown process field: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub field: ProcessField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: ProcessField::CpuPercent,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Same field while ascending flips to descending; anything else sorts ascending.
    pub fn toggle(self, field: ProcessField) -> Self {
        let direction = if self.field == field && self.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        Self { field, direction }
    }
}

/// Case-insensitive substring match on the process name; an empty query keeps everything.
pub fn filter_by_name<'a>(procs: &'a [ProcessInfo], query: &str) -> Vec<&'a ProcessInfo> {
    let needle = query.to_lowercase();
    procs
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Stable sort of already-borrowed rows.
pub fn sort_processes(rows: &mut [&ProcessInfo], sort: SortState) {
    rows.sort_by(|a, b| {
        let ord = sort.field.compare(a, b);
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
}

/// Filter then sort, the table pipeline.
pub fn visible_rows<'a>(procs: &'a [ProcessInfo], query: &str, sort: SortState) -> Vec<&'a ProcessInfo> {
    let mut rows = filter_by_name(procs, query);
    sort_processes(&mut rows, sort);
    rows
}

/// The `n` largest rows by `value`, ties in input order.
pub fn top_n<'a>(
    procs: &[&'a ProcessInfo],
    value: impl Fn(&ProcessInfo) -> f64,
    n: usize,
) -> Vec<&'a ProcessInfo> {
    let mut rows = procs.to_vec();
    rows.sort_by(|a, b| value(*b).total_cmp(&value(*a)));
    rows.truncate(n);
    rows
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessSummary {
    pub total: usize,
    pub top_cpu: Option<(String, f64)>,
    pub top_memory: Option<(String, u64)>,
    pub by_status: BTreeMap<String, usize>,
}

/// Summary cards over the given rows. The first row wins a tie, and a
/// maximum of zero is reported as no process at all.
pub fn summarize(rows: &[&ProcessInfo]) -> ProcessSummary {
    let mut s = ProcessSummary {
        total: rows.len(),
        ..Default::default()
    };
    let mut best_cpu: Option<&ProcessInfo> = None;
    let mut best_mem: Option<&ProcessInfo> = None;
    for p in rows {
        if p.cpu_percent > best_cpu.map_or(0.0, |b| b.cpu_percent) {
            best_cpu = Some(*p);
        }
        if p.memory_rss > best_mem.map_or(0, |b| b.memory_rss) {
            best_mem = Some(*p);
        }
        *s.by_status.entry(p.status.as_str().to_string()).or_insert(0) += 1;
    }
    s.top_cpu = best_cpu.map(|p| (p.display_name(), p.cpu_percent));
    s.top_memory = best_mem.map(|p| (p.display_name(), p.memory_rss));
    s
}
