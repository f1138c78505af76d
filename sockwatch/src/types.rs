//! Types that mirror the collector's event payloads.
//!
//! Every numeric field is decoded leniently: numbers sent as strings are parsed,
//! `null` or garbage falls back to the field default. A snapshot therefore only
//! fails to decode when its overall shape is wrong.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Deserializer};

/// Event names pushed by the collector.
pub mod events {
    pub const CPU: &str = "update_cpu";
    pub const MEMORY: &str = "update_memory";
    pub const NETWORK: &str = "update_network";
    pub const PROCESSES: &str = "update_processes";
    pub const DISK: &str = "update_disk";
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct CpuSnapshot {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_percent: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub cpu_count: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub cpu_count_logical: u64,
    // frequencies in GHz as reported by the collector
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_freq_min: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_freq_max: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_freq_current: f64,
    // cumulative seconds spent in each mode
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_user: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_system: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_idle: f64,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cpu_irq: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cpu_softirq: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub cpu_temp: Option<f64>,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct MemorySnapshot {
    #[serde(default, deserialize_with = "lenient::f64")]
    pub memory_percent: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_total: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_available: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_used: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_buffers: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_cached: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_shared: u64,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct NetworkConnection {
    #[serde(default, deserialize_with = "lenient::bool")]
    pub is_up: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ip_address: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub mac_address: Option<String>,
    // link speed in Mbps, 0 when unknown
    #[serde(default, deserialize_with = "lenient::u64")]
    pub speed: u64,
    // cumulative totals; the client diffs them to compute rates
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_sent: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_recv: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_sent_packets: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_recv_packets: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_sent_errs: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_recv_errs: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_dropin: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub network_dropout: u64,
}

/// Interface name -> connection record. Names are not known in advance.
pub type NetworkTable = BTreeMap<String, NetworkConnection>;

/// One `update_network` report. Interfaces whose record is not an object are
/// left out instead of failing the whole report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NetworkSnapshot {
    pub interfaces: NetworkTable,
}

impl<'de> Deserialize<'de> for NetworkSnapshot {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        lenient::map(d).map(|interfaces| Self { interfaces })
    }
}

impl Deref for NetworkSnapshot {
    type Target = NetworkTable;

    fn deref(&self) -> &NetworkTable {
        &self.interfaces
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    Running,
    Sleeping,
    DiskSleep,
    Stopped,
    TracingStop,
    Zombie,
    Dead,
    Idle,
    Waking,
    Locked,
    Waiting,
    Parked,
    #[default]
    Unknown,
    Other(String),
}

impl ProcessStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Sleeping => "sleeping",
            Self::DiskSleep => "disk-sleep",
            Self::Stopped => "stopped",
            Self::TracingStop => "tracing-stop",
            Self::Zombie => "zombie",
            Self::Dead => "dead",
            Self::Idle => "idle",
            Self::Waking => "waking",
            Self::Locked => "locked",
            Self::Waiting => "waiting",
            Self::Parked => "parked",
            Self::Unknown => "unknown",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for ProcessStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Self::Running,
            "sleeping" => Self::Sleeping,
            "disk-sleep" | "disk_sleep" => Self::DiskSleep,
            "stopped" => Self::Stopped,
            "tracing-stop" | "tracing_stop" => Self::TracingStop,
            "zombie" => Self::Zombie,
            "dead" => Self::Dead,
            "idle" => Self::Idle,
            "waking" => Self::Waking,
            "locked" => Self::Locked,
            "waiting" => Self::Waiting,
            "parked" => Self::Parked,
            "" | "unknown" => Self::Unknown,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProcessStatus {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        lenient::string(d).map(|s| ProcessStatus::from(s.as_str()))
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ProcessInfo {
    #[serde(default, deserialize_with = "lenient::u32")]
    pub pid: u32,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default)]
    pub status: ProcessStatus,
    #[serde(default, deserialize_with = "lenient::f64")]
    pub cpu_percent: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_rss: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub memory_vms: u64,
    // unix seconds
    #[serde(default, deserialize_with = "lenient::f64")]
    pub create_time: f64,
}

impl ProcessInfo {
    /// Name to show in charts; unnamed processes fall back to their pid.
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            format!("PID {}", self.pid)
        } else {
            self.name.clone()
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ProcessSet {
    #[serde(default, deserialize_with = "lenient::vec")]
    pub foreground: Vec<ProcessInfo>,
    #[serde(default, deserialize_with = "lenient::vec")]
    pub background: Vec<ProcessInfo>,
}

impl ProcessSet {
    pub fn total(&self) -> usize {
        self.foreground.len() + self.background.len()
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct DiskSnapshot {
    // percent used
    #[serde(default, deserialize_with = "lenient::f64")]
    pub disk_usage: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_total: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_used: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_free: u64,
    // cumulative bytes
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_read: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_write: u64,
    // cumulative operation counts
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_read_count: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_write_count: u64,
    // cumulative milliseconds
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_read_time: u64,
    #[serde(default, deserialize_with = "lenient::u64")]
    pub disk_write_time: u64,
}

mod lenient {
    use std::collections::BTreeMap;

    use serde::de::{DeserializeOwned, Error};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::debug;

    fn number(v: &Value) -> Option<f64> {
        match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|x| x.is_finite())
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        opt_f64(d).map(|v| v.unwrap_or(0.0))
    }

    pub fn opt_f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(number(&v))
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let v = Value::deserialize(d)?;
        if let Some(n) = v.as_u64() {
            return Ok(n);
        }
        Ok(number(&v).filter(|x| *x > 0.0).map(|x| x.round() as u64).unwrap_or(0))
    }

    pub fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        u64(d).map(|n| u32::try_from(n).unwrap_or(0))
    }

    pub fn bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
            Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "up" | "1"),
            _ => false,
        })
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        let v = Value::deserialize(d)?;
        Ok(match v {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        })
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        string(d).map(|s| if s.trim().is_empty() { None } else { Some(s) })
    }

    /// Null or a non-array is empty; entries that fail to decode are skipped.
    pub fn vec<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Array(items) = Value::deserialize(d)? else {
            return Ok(Vec::new());
        };
        Ok(items
            .into_iter()
            .filter_map(|v| match T::deserialize(v) {
                Ok(t) => Some(t),
                Err(e) => {
                    debug!(error = %e, "skipping unreadable list entry");
                    None
                }
            })
            .collect())
    }

    /// The report itself must be an object; values that fail to decode are skipped.
    pub fn map<'de, D, T>(d: D) -> Result<BTreeMap<String, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let Value::Object(entries) = Value::deserialize(d)? else {
            return Err(D::Error::custom("expected an object keyed by name"));
        };
        Ok(entries
            .into_iter()
            .filter_map(|(k, v)| match T::deserialize(v) {
                Ok(t) => Some((k, t)),
                Err(e) => {
                    debug!(key = %k, error = %e, "skipping unreadable entry");
                    None
                }
            })
            .collect())
    }
}
