//! Bounded history buffers that turn a stream of snapshots into chart series.

use std::collections::{btree_map, BTreeMap, VecDeque};

use chrono::{DateTime, Utc};

/// Samples kept per series when nothing else is configured.
pub const DEFAULT_HISTORY: usize = 20;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    while dq.len() >= cap.max(1) {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// One recorded value and the instant it arrived.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub value: T,
    pub at: DateTime<Utc>,
}

impl<T> Sample<T> {
    pub fn new(value: T, at: DateTime<Utc>) -> Self {
        Self { value, at }
    }
}

/// FIFO with a fixed capacity; the oldest sample is evicted first.
/// Identical consecutive values are kept, so length tracks the sampling rate.
#[derive(Debug, Clone)]
pub struct RollingSeries<T> {
    samples: VecDeque<Sample<T>>,
    cap: usize,
}

impl<T> RollingSeries<T> {
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            samples: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, value: T) {
        self.push_at(value, Utc::now());
    }

    pub fn push_at(&mut self, value: T, at: DateTime<Utc>) {
        push_capped(&mut self.samples, Sample::new(value, at), self.cap);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cap
    }

    pub fn latest(&self) -> Option<&Sample<T>> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample<T>> + ExactSizeIterator {
        self.samples.iter()
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.samples.iter().map(|s| &s.value)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl<T> Default for RollingSeries<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}

impl<T: Copy> RollingSeries<T> {
    /// Values in arrival order, the shape chart widgets want.
    pub fn to_vec(&self) -> Vec<T> {
        self.values().copied().collect()
    }
}

/// One rolling series per dynamically discovered key (e.g. interface name).
///
/// Keys are never removed: a key missing from a report cycle simply isn't
/// appended to, and its history resumes if it comes back.
#[derive(Debug, Clone)]
pub struct KeyedSeries<T> {
    series: BTreeMap<String, RollingSeries<T>>,
    cap: usize,
}

impl<T> KeyedSeries<T> {
    pub fn new(cap: usize) -> Self {
        Self {
            series: BTreeMap::new(),
            cap: cap.max(1),
        }
    }

    pub fn record(&mut self, key: &str, value: T) {
        self.record_at(key, value, Utc::now());
    }

    pub fn record_at(&mut self, key: &str, value: T, at: DateTime<Utc>) {
        let cap = self.cap;
        self.series
            .entry(key.to_string())
            .or_insert_with(|| RollingSeries::new(cap))
            .push_at(value, at);
    }

    pub fn get(&self, key: &str) -> Option<&RollingSeries<T>> {
        self.series.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, RollingSeries<T>> {
        self.series.iter()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl<T> Default for KeyedSeries<T> {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY)
    }
}
