//! Pure transforms from snapshots and histories to render-ready numbers.
//!
//! Nothing here returns NaN or infinity: empty inputs, zero totals and zero
//! elapsed time all map to 0.

use chrono::{DateTime, Utc};

use crate::history::{RollingSeries, Sample};
use crate::types::{CpuSnapshot, DiskSnapshot, MemorySnapshot, NetworkConnection, NetworkTable};

/// Per-second rate between two cumulative counter readings.
/// Counter resets (current < previous) floor at zero.
pub fn rate(current: u64, previous: u64, elapsed_secs: f64) -> f64 {
    if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
        return 0.0;
    }
    current.saturating_sub(previous) as f64 / elapsed_secs
}

pub fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Rates of every consecutive pair in a counter series.
/// The first sample has no baseline and yields 0, so the output has one point per sample.
pub fn rate_series<T>(
    series: &RollingSeries<T>,
    counter: impl Fn(&T) -> u64,
) -> Vec<Sample<f64>> {
    let mut out = Vec::with_capacity(series.len());
    let mut prev: Option<&Sample<T>> = None;
    for s in series.iter() {
        let r = match prev {
            Some(p) => rate(counter(&s.value), counter(&p.value), elapsed_secs(p.at, s.at)),
            None => 0.0,
        };
        out.push(Sample::new(r, s.at));
        prev = Some(s);
    }
    out
}

/// Most recent rate of a counter series, 0 until two samples exist.
pub fn latest_rate<T>(series: &RollingSeries<T>, counter: impl Fn(&T) -> u64) -> f64 {
    let mut it = series.iter().rev();
    match (it.next(), it.next()) {
        (Some(cur), Some(prev)) => rate(
            counter(&cur.value),
            counter(&prev.value),
            elapsed_secs(prev.at, cur.at),
        ),
        _ => 0.0,
    }
}

/// Counter readings kept per interface for the network charts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetCounters {
    pub sent: u64,
    pub recv: u64,
    pub sent_packets: u64,
    pub recv_packets: u64,
    pub sent_errs: u64,
    pub recv_errs: u64,
    pub dropin: u64,
    pub dropout: u64,
}

impl From<&NetworkConnection> for NetCounters {
    fn from(c: &NetworkConnection) -> Self {
        Self {
            sent: c.network_sent,
            recv: c.network_recv,
            sent_packets: c.network_sent_packets,
            recv_packets: c.network_recv_packets,
            sent_errs: c.network_sent_errs,
            recv_errs: c.network_recv_errs,
            dropin: c.network_dropin,
            dropout: c.network_dropout,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DuplexRate {
    pub sent: f64,
    pub recv: f64,
}

/// Bytes/s sent and received, one point per recorded sample.
pub fn throughput(series: &RollingSeries<NetCounters>) -> Vec<Sample<DuplexRate>> {
    duplex(series, |c| c.sent, |c| c.recv)
}

/// Packets/s sent and received, one point per recorded sample.
pub fn packet_rates(series: &RollingSeries<NetCounters>) -> Vec<Sample<DuplexRate>> {
    duplex(series, |c| c.sent_packets, |c| c.recv_packets)
}

fn duplex(
    series: &RollingSeries<NetCounters>,
    sent: impl Fn(&NetCounters) -> u64,
    recv: impl Fn(&NetCounters) -> u64,
) -> Vec<Sample<DuplexRate>> {
    rate_series(series, &sent)
        .into_iter()
        .zip(rate_series(series, &recv))
        .map(|(s, r)| {
            Sample::new(
                DuplexRate {
                    sent: s.value,
                    recv: r.value,
                },
                s.at,
            )
        })
        .collect()
}

/// Averages over a duplex rate series, skipping the baseline point.
pub fn mean_duplex(points: &[Sample<DuplexRate>]) -> DuplexRate {
    let tail = points.get(1..).unwrap_or_default();
    let sent: Vec<f64> = tail.iter().map(|p| p.value.sent).collect();
    let recv: Vec<f64> = tail.iter().map(|p| p.value.recv).collect();
    DuplexRate {
        sent: mean(&sent),
        recv: mean(&recv),
    }
}

/// Sum of a field across active interfaces plus how many were active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveTotal {
    pub sum: u64,
    pub count: usize,
}

pub fn active_total(table: &NetworkTable, field: impl Fn(&NetworkConnection) -> u64) -> ActiveTotal {
    table
        .values()
        .filter(|c| c.is_up)
        .fold(ActiveTotal::default(), |acc, c| ActiveTotal {
            sum: acc.sum.saturating_add(field(c)),
            count: acc.count + 1,
        })
}

/// Interfaces split into (active, inactive), each in table order.
pub fn partition_interfaces(
    table: &NetworkTable,
) -> (Vec<(&str, &NetworkConnection)>, Vec<(&str, &NetworkConnection)>) {
    table
        .iter()
        .map(|(k, v)| (k.as_str(), v))
        .partition(|(_, c)| c.is_up)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrafficShare {
    pub name: String,
    pub bytes: u64,
    pub percent: f64,
}

/// Sent + received bytes per active interface and its share of the active total.
pub fn traffic_distribution(table: &NetworkTable) -> Vec<TrafficShare> {
    let rows: Vec<(String, u64)> = table
        .iter()
        .filter(|(_, c)| c.is_up)
        .map(|(k, c)| (k.clone(), c.network_sent.saturating_add(c.network_recv)))
        .collect();
    let total = rows.iter().fold(0u64, |acc, (_, b)| acc.saturating_add(*b));
    rows.into_iter()
        .map(|(name, bytes)| TrafficShare {
            name,
            bytes,
            percent: percent_of(bytes, total),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSummary {
    pub name: String,
    pub sent_errs: u64,
    pub recv_errs: u64,
    pub dropin: u64,
    pub dropout: u64,
}

impl ErrorSummary {
    pub fn has_errors(&self) -> bool {
        [self.sent_errs, self.recv_errs, self.dropin, self.dropout]
            .iter()
            .any(|&n| n > 0)
    }
}

pub fn error_summary(table: &NetworkTable) -> Vec<ErrorSummary> {
    table
        .iter()
        .map(|(k, c)| ErrorSummary {
            name: k.clone(),
            sent_errs: c.network_sent_errs,
            recv_errs: c.network_recv_errs,
            dropin: c.network_dropin,
            dropout: c.network_dropout,
        })
        .collect()
}

/// (name, speed in Mbps, is_up), fastest first; ties keep table order.
pub fn interfaces_by_speed(table: &NetworkTable) -> Vec<(&str, u64, bool)> {
    let mut rows: Vec<(&str, u64, bool)> = table
        .iter()
        .map(|(k, c)| (k.as_str(), c.speed, c.is_up))
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows
}

/// Share of `part` in `total` as a percentage; 0 when the total is 0.
pub fn percent_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MemoryDistribution {
    pub used: u64,
    pub available: u64,
    pub used_percent: f64,
    pub available_percent: f64,
}

pub fn memory_distribution(m: &MemorySnapshot) -> MemoryDistribution {
    MemoryDistribution {
        used: m.memory_used,
        available: m.memory_available,
        used_percent: percent_of(m.memory_used, m.memory_total),
        available_percent: percent_of(m.memory_available, m.memory_total),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuTimeShare {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
}

/// User / system / idle time as percentages of their sum.
pub fn cpu_time_share(c: &CpuSnapshot) -> CpuTimeShare {
    let user = c.cpu_user.max(0.0);
    let system = c.cpu_system.max(0.0);
    let idle = c.cpu_idle.max(0.0);
    let total = user + system + idle;
    if total <= 0.0 {
        return CpuTimeShare::default();
    }
    CpuTimeShare {
        user: user / total * 100.0,
        system: system / total * 100.0,
        idle: idle / total * 100.0,
    }
}

/// Cumulative disk operation counters kept for the I/O chart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskOps {
    pub read: u64,
    pub write: u64,
}

impl From<&DiskSnapshot> for DiskOps {
    fn from(d: &DiskSnapshot) -> Self {
        Self {
            read: d.disk_read_count,
            write: d.disk_write_count,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskOpRate {
    pub read: f64,
    pub write: f64,
}

/// Read/write operations per second, one point per recorded sample.
pub fn disk_op_rates(series: &RollingSeries<DiskOps>) -> Vec<Sample<DiskOpRate>> {
    rate_series(series, |o| o.read)
        .into_iter()
        .zip(rate_series(series, |o| o.write))
        .map(|(r, w)| {
            Sample::new(
                DiskOpRate {
                    read: r.value,
                    write: w.value,
                },
                r.at,
            )
        })
        .collect()
}

/// Scale a float series into integer sparkline points (`scale` multiplies first).
pub fn spark_points(values: impl IntoIterator<Item = f64>, scale: f64) -> Vec<u64> {
    values
        .into_iter()
        .map(|v| {
            let v = v * scale;
            if v.is_finite() && v > 0.0 {
                v.round() as u64
            } else {
                0
            }
        })
        .collect()
}
