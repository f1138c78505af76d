//! Typed "latest value" view over one named event.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::bus::{EventBus, HandlerId};

/// Latest payload for an event, or nothing before the first delivery.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Latest<T> {
    #[default]
    Unavailable,
    Available(T),
}

impl<T> Latest<T> {
    pub fn as_ref(&self) -> Latest<&T> {
        match self {
            Latest::Unavailable => Latest::Unavailable,
            Latest::Available(v) => Latest::Available(v),
        }
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Latest::Unavailable => None,
            Latest::Available(v) => Some(v),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Latest::Available(_))
    }
}

struct Slot<T> {
    latest: Latest<T>,
    // bumped on every accepted payload
    generation: u64,
}

/// Registered on creation, deregistered on drop.
///
/// Every payload that decodes as `T` replaces the previous one. Payloads that
/// don't decode at all are logged and dropped, leaving the last good value.
pub struct Subscription<T> {
    bus: EventBus,
    event: String,
    id: HandlerId,
    slot: Arc<Mutex<Slot<T>>>,
    seen: u64,
}

fn lock<T>(slot: &Mutex<Slot<T>>) -> MutexGuard<'_, Slot<T>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Subscription<T>
where
    T: DeserializeOwned + Send + 'static,
{
    pub fn new(bus: &EventBus, event: &str) -> Self {
        let slot = Arc::new(Mutex::new(Slot {
            latest: Latest::Unavailable,
            generation: 0,
        }));
        let sink = Arc::clone(&slot);
        let name = event.to_string();
        let id = bus.on(event, move |payload| match T::deserialize(payload) {
            Ok(v) => {
                let mut s = lock(&sink);
                s.latest = Latest::Available(v);
                s.generation += 1;
            }
            Err(e) => warn!(event = %name, error = %e, "dropping undecodable payload"),
        });
        Self {
            bus: bus.clone(),
            event: event.to_string(),
            id,
            slot,
            seen: 0,
        }
    }
}

impl<T> Subscription<T> {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn with_latest<R>(&self, f: impl FnOnce(Latest<&T>) -> R) -> R {
        let s = lock(&self.slot);
        f(s.latest.as_ref())
    }

    pub fn is_available(&self) -> bool {
        lock(&self.slot).latest.is_available()
    }

    /// Number of payloads accepted so far.
    pub fn deliveries(&self) -> u64 {
        lock(&self.slot).generation
    }
}

impl<T: Clone> Subscription<T> {
    pub fn latest(&self) -> Latest<T> {
        lock(&self.slot).latest.clone()
    }

    /// The current value if it arrived since the last call, once per delivery.
    /// Several deliveries between calls collapse into the newest one.
    pub fn take_update(&mut self) -> Option<T> {
        let s = lock(&self.slot);
        if s.generation == self.seen {
            return None;
        }
        self.seen = s.generation;
        s.latest.available().cloned()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.bus.off(&self.event, self.id);
    }
}
