//! Process search, sort toggling, top-N and summaries.

use sockwatch::proclist::{
    self, filter_by_name, summarize, top_n, visible_rows, ProcessField, SortDirection, SortState,
};
use sockwatch::types::{ProcessInfo, ProcessStatus};

fn proc(pid: u32, name: &str, cpu: f64, rss: u64) -> ProcessInfo {
    ProcessInfo {
        pid,
        name: name.into(),
        status: ProcessStatus::Running,
        cpu_percent: cpu,
        memory_rss: rss,
        ..Default::default()
    }
}

fn pids(rows: &[&ProcessInfo]) -> Vec<u32> {
    rows.iter().map(|p| p.pid).collect()
}

#[test]
fn default_sort_is_cpu_descending() {
    let s = SortState::default();
    assert_eq!(s.field, ProcessField::CpuPercent);
    assert_eq!(s.direction, SortDirection::Desc);
}

#[test]
fn toggle_same_field_flips_ascending_to_descending() {
    let s = SortState {
        field: ProcessField::CpuPercent,
        direction: SortDirection::Asc,
    }
    .toggle(ProcessField::CpuPercent);
    assert_eq!(s.direction, SortDirection::Desc);
}

#[test]
fn toggle_same_field_descending_goes_ascending() {
    let s = SortState::default().toggle(ProcessField::CpuPercent);
    assert_eq!(s.field, ProcessField::CpuPercent);
    assert_eq!(s.direction, SortDirection::Asc);
}

#[test]
fn toggle_new_field_starts_ascending() {
    let s = SortState::default().toggle(ProcessField::Name);
    assert_eq!(s.field, ProcessField::Name);
    assert_eq!(s.direction, SortDirection::Asc);
}

#[test]
fn search_is_case_insensitive_substring() {
    let procs = vec![
        proc(1, "Firefox", 1.0, 1),
        proc(2, "bash", 1.0, 1),
        proc(3, "firewalld", 1.0, 1),
    ];
    assert_eq!(pids(&filter_by_name(&procs, "FIRE")), vec![1, 3]);
    assert_eq!(pids(&filter_by_name(&procs, "")), vec![1, 2, 3]);
    assert!(filter_by_name(&procs, "zsh").is_empty());
}

#[test]
fn search_matches_prefix_family() {
    let procs = vec![
        proc(1, "chrome", 1.0, 1),
        proc(2, "Chromium-helper", 1.0, 1),
        proc(3, "bash", 1.0, 1),
    ];
    assert_eq!(pids(&filter_by_name(&procs, "chrom")), vec![1, 2]);
}

#[test]
fn visible_rows_filter_then_sort() {
    let procs = vec![
        proc(10, "worker-b", 5.0, 300),
        proc(11, "worker-a", 50.0, 100),
        proc(12, "other", 99.0, 900),
    ];
    let sort = SortState::default().toggle(ProcessField::Name);
    assert_eq!(pids(&visible_rows(&procs, "worker", sort)), vec![11, 10]);
    assert_eq!(
        pids(&visible_rows(&procs, "", SortState::default())),
        vec![12, 11, 10]
    );
}

#[test]
fn sorting_leaves_snapshot_untouched() {
    let procs = vec![proc(1, "b", 1.0, 1), proc(2, "a", 2.0, 2)];
    let before = procs.clone();
    let _ = visible_rows(&procs, "", SortState::default().toggle(ProcessField::Name));
    assert_eq!(procs, before);
}

#[test]
fn top_n_takes_largest_and_keeps_ties_in_order() {
    let procs: Vec<ProcessInfo> = (0..15).map(|i| proc(i, "p", (i % 5) as f64, 0)).collect();
    let rows: Vec<&ProcessInfo> = procs.iter().collect();
    let top = top_n(&rows, |p| p.cpu_percent, proclist::TOP_N);
    assert_eq!(top.len(), 10);
    assert_eq!(pids(&top[..3]), vec![4, 9, 14]);
}

#[test]
fn top_n_of_short_list_returns_everything() {
    let procs = vec![proc(1, "a", 1.0, 5), proc(2, "b", 2.0, 1)];
    let rows: Vec<&ProcessInfo> = procs.iter().collect();
    let top = top_n(&rows, |p| p.memory_rss as f64, 10);
    assert_eq!(pids(&top), vec![1, 2]);
}

#[test]
fn summary_counts_and_leaders() {
    let mut idle = proc(3, "", 0.0, 10);
    idle.status = ProcessStatus::Sleeping;
    let procs = vec![proc(1, "a", 10.0, 500), proc(2, "b", 10.0, 900), idle];
    let rows: Vec<&ProcessInfo> = procs.iter().collect();
    let s = summarize(&rows);
    assert_eq!(s.total, 3);
    assert_eq!(s.top_cpu, Some(("a".to_string(), 10.0)));
    assert_eq!(s.top_memory, Some(("b".to_string(), 900)));
    assert_eq!(s.by_status.get("running"), Some(&2));
    assert_eq!(s.by_status.get("sleeping"), Some(&1));
}

#[test]
fn summary_of_idle_rows_has_no_leader() {
    let procs = vec![proc(1, "a", 0.0, 0)];
    let rows: Vec<&ProcessInfo> = procs.iter().collect();
    let s = summarize(&rows);
    assert_eq!(s.top_cpu, None);
    assert_eq!(s.top_memory, None);
}

#[test]
fn unnamed_process_shows_pid() {
    assert_eq!(proc(42, "", 0.0, 0).display_name(), "PID 42");
}

#[test]
fn field_names_round_trip() {
    for f in ProcessField::ALL {
        assert_eq!(f.as_str().parse::<ProcessField>(), Ok(f));
    }
    assert!("bogus".parse::<ProcessField>().is_err());
}
