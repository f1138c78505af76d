//! Handler registry keyed by event name.
//!
//! The transport owns one bus and dispatches every decoded event into it on
//! the UI task. Handlers run to completion one at a time, in registration
//! order. A handler must not call back into the bus.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

type Handler = Box<dyn FnMut(&Value) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<String, Vec<(HandlerId, Handler)>>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<Registry>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on<F>(&self, event: &str, handler: F) -> HandlerId
    where
        F: FnMut(&Value) + Send + 'static,
    {
        let mut reg = self.registry();
        let id = HandlerId(reg.next_id);
        reg.next_id += 1;
        reg.handlers
            .entry(event.to_string())
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Removes one handler. Takes effect before the next dispatch.
    pub fn off(&self, event: &str, id: HandlerId) -> bool {
        let mut reg = self.registry();
        let Some(list) = reg.handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(h, _)| *h != id);
        let removed = list.len() != before;
        if list.is_empty() {
            reg.handlers.remove(event);
        }
        removed
    }

    /// Invokes every handler registered for `event`; returns how many ran.
    pub fn dispatch(&self, event: &str, payload: &Value) -> usize {
        let mut reg = self.registry();
        match reg.handlers.get_mut(event) {
            Some(list) => {
                for (_, handler) in list.iter_mut() {
                    handler(payload);
                }
                list.len()
            }
            None => 0,
        }
    }

    pub fn handler_count(&self, event: &str) -> usize {
        self.registry().handlers.get(event).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = self.registry();
        let mut events: Vec<(&String, usize)> =
            reg.handlers.iter().map(|(k, v)| (k, v.len())).collect();
        events.sort();
        f.debug_struct("EventBus").field("handlers", &events).finish()
    }
}
