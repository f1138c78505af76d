//! Rates, aggregates and display formatting.

use chrono::{Duration, TimeZone, Utc};
use sockwatch::derive::{self, DiskOps, NetCounters};
use sockwatch::history::RollingSeries;
use sockwatch::types::{CpuSnapshot, MemorySnapshot, NetworkConnection, NetworkTable};
use sockwatch::ui::util::{format_bytes, format_rate, format_speed, truncate_middle};

fn iface(up: bool, sent: u64, recv: u64, speed: u64) -> NetworkConnection {
    NetworkConnection {
        is_up: up,
        network_sent: sent,
        network_recv: recv,
        speed,
        ..Default::default()
    }
}

fn table(rows: &[(&str, NetworkConnection)]) -> NetworkTable {
    rows.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
}

#[test]
fn rate_is_delta_over_seconds() {
    assert_eq!(derive::rate(3000, 1000, 2.0), 1000.0);
}

#[test]
fn rate_floors_counter_resets_at_zero() {
    assert_eq!(derive::rate(10, 5000, 1.0), 0.0);
    assert_eq!(derive::rate(120, 150, 5.0), 0.0);
    assert_eq!(derive::rate(150, 100, 5.0), 10.0);
}

#[test]
fn rate_with_no_elapsed_time_is_zero() {
    assert_eq!(derive::rate(5000, 10, 0.0), 0.0);
    assert_eq!(derive::rate(5000, 10, -1.0), 0.0);
    assert_eq!(derive::rate(5000, 10, f64::NAN), 0.0);
}

#[test]
fn rate_series_starts_at_zero_and_uses_timestamps() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut s = RollingSeries::new(20);
    s.push_at(1_000u64, t0);
    s.push_at(3_000u64, t0 + Duration::seconds(2));
    s.push_at(3_000u64, t0 + Duration::seconds(4));
    let r: Vec<f64> = derive::rate_series(&s, |v| *v)
        .into_iter()
        .map(|p| p.value)
        .collect();
    assert_eq!(r, vec![0.0, 1000.0, 0.0]);
    assert_eq!(derive::latest_rate(&s, |v| *v), 0.0);
}

#[test]
fn latest_rate_needs_two_samples() {
    let mut s = RollingSeries::new(20);
    s.push(10u64);
    assert_eq!(derive::latest_rate(&s, |v| *v), 0.0);
}

#[test]
fn mean_of_nothing_is_zero() {
    assert_eq!(derive::mean(&[]), 0.0);
    assert_eq!(derive::mean(&[1.0, 2.0, 3.0]), 2.0);
}

#[test]
fn throughput_and_packet_rates_per_interface() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut s = RollingSeries::new(20);
    s.push_at(
        NetCounters {
            sent: 0,
            recv: 0,
            sent_packets: 0,
            recv_packets: 0,
            ..Default::default()
        },
        t0,
    );
    s.push_at(
        NetCounters {
            sent: 2048,
            recv: 4096,
            sent_packets: 10,
            recv_packets: 20,
            ..Default::default()
        },
        t0 + Duration::seconds(2),
    );
    let bytes = derive::throughput(&s);
    assert_eq!(bytes.len(), 2);
    assert_eq!(bytes[1].value.sent, 1024.0);
    assert_eq!(bytes[1].value.recv, 2048.0);

    let packets = derive::packet_rates(&s);
    let avg = derive::mean_duplex(&packets);
    assert_eq!(avg.sent, 5.0);
    assert_eq!(avg.recv, 10.0);
}

#[test]
fn active_total_ignores_down_interfaces() {
    let t = table(&[
        ("eth0", iface(true, 100, 0, 1000)),
        ("eth1", iface(false, 900, 0, 1000)),
        ("wlan0", iface(true, 50, 0, 300)),
    ]);
    let total = derive::active_total(&t, |c| c.network_sent);
    assert_eq!(total.sum, 150);
    assert_eq!(total.count, 2);
}

#[test]
fn active_total_counts_only_up_interfaces() {
    let t = table(&[
        ("eth0", iface(true, 100, 0, 0)),
        ("wlan0", iface(false, 999, 0, 0)),
    ]);
    let total = derive::active_total(&t, |c| c.network_sent);
    assert_eq!((total.sum, total.count), (100, 1));
}

#[test]
fn active_total_of_empty_table_is_zero() {
    let total = derive::active_total(&NetworkTable::new(), |c| c.network_recv);
    assert_eq!(total.sum, 0);
    assert_eq!(total.count, 0);
}

#[test]
fn interfaces_split_by_state() {
    let t = table(&[
        ("eth0", iface(true, 0, 0, 0)),
        ("eth1", iface(false, 0, 0, 0)),
    ]);
    let (up, down) = derive::partition_interfaces(&t);
    assert_eq!(up.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["eth0"]);
    assert_eq!(down.iter().map(|(n, _)| *n).collect::<Vec<_>>(), vec!["eth1"]);
}

#[test]
fn traffic_distribution_sums_to_hundred() {
    let t = table(&[
        ("eth0", iface(true, 300, 100, 0)),
        ("lo", iface(true, 50, 50, 0)),
        ("eth1", iface(false, 1_000_000, 0, 0)),
    ]);
    let shares = derive::traffic_distribution(&t);
    assert_eq!(shares.len(), 2);
    let eth0 = shares.iter().find(|s| s.name == "eth0").map(|s| s.percent);
    assert_eq!(eth0, Some(80.0));
    let sum: f64 = shares.iter().map(|s| s.percent).sum();
    assert!((sum - 100.0).abs() < 1e-9);
}

#[test]
fn saturated_counters_do_not_overflow() {
    let mut hot = iface(true, u64::MAX, u64::MAX, 0);
    hot.network_sent_errs = u64::MAX;
    hot.network_dropout = u64::MAX;
    let t = table(&[("eth0", hot), ("eth1", iface(true, u64::MAX, 0, 0))]);

    let shares = derive::traffic_distribution(&t);
    assert_eq!(shares.len(), 2);
    assert!(shares.iter().all(|s| s.percent.is_finite()));

    let errs = derive::error_summary(&t);
    assert!(errs[0].has_errors());
    assert!(!errs[1].has_errors());
}

#[test]
fn interfaces_by_speed_fastest_first() {
    let t = table(&[
        ("a", iface(true, 0, 0, 100)),
        ("b", iface(false, 0, 0, 10_000)),
        ("c", iface(true, 0, 0, 1000)),
    ]);
    let names: Vec<&str> = derive::interfaces_by_speed(&t).into_iter().map(|r| r.0).collect();
    assert_eq!(names, vec!["b", "c", "a"]);
}

#[test]
fn memory_distribution_with_zero_total_is_zero() {
    let d = derive::memory_distribution(&MemorySnapshot::default());
    assert_eq!(d.used_percent, 0.0);
    assert_eq!(d.available_percent, 0.0);
}

#[test]
fn cpu_time_share_normalises() {
    let c = CpuSnapshot {
        cpu_user: 30.0,
        cpu_system: 10.0,
        cpu_idle: 60.0,
        ..Default::default()
    };
    let s = derive::cpu_time_share(&c);
    assert!((s.user - 30.0).abs() < 1e-9);
    assert!((s.idle - 60.0).abs() < 1e-9);
    assert_eq!(derive::cpu_time_share(&CpuSnapshot::default()).user, 0.0);
}

#[test]
fn disk_op_rates_from_counts() {
    let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let mut s = RollingSeries::new(20);
    s.push_at(DiskOps { read: 100, write: 10 }, t0);
    s.push_at(DiskOps { read: 150, write: 30 }, t0 + Duration::seconds(5));
    let r = derive::disk_op_rates(&s);
    assert_eq!(r[0].value.read, 0.0);
    assert_eq!(r[1].value.read, 10.0);
    assert_eq!(r[1].value.write, 4.0);
}

#[test]
fn spark_points_round_and_clamp() {
    assert_eq!(
        derive::spark_points([1.4, 1.6, -3.0, f64::NAN], 1.0),
        vec![1, 2, 0, 0]
    );
}

#[test]
fn format_bytes_units() {
    assert_eq!(format_bytes(0), "0 Bytes");
    assert_eq!(format_bytes(512), "512 Bytes");
    assert_eq!(format_bytes(1024), "1 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(1024 * 1024 * 1024), "1 GB");
    assert_eq!(format_bytes(5 * 1024u64.pow(4)), "5 TB");
}

#[test]
fn format_rate_and_speed() {
    assert_eq!(format_rate(2048.0), "2 KB/s");
    assert_eq!(format_rate(f64::NAN), "0 Bytes/s");
    assert_eq!(format_speed(100), "100 Mbps");
    assert_eq!(format_speed(2500), "2.50 Gbps");
}

#[test]
fn truncate_middle_is_char_safe() {
    assert_eq!(truncate_middle("short", 10), "short");
    assert_eq!(truncate_middle("abcdefghijkl", 8), "ab...jkl");
    assert_eq!(truncate_middle("ééééééééé", 5), "é...é");
}
