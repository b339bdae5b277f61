//! Listener registry for change notifications.
//!
//! The bus only stores listeners. Dispatch is driven by the owner (the quote
//! model), which takes a snapshot of the listeners for an event and invokes
//! them with mutable access to itself. Because of the snapshot, a listener
//! registered while an event is being dispatched first fires on the next
//! emission of that event. The snapshot carries listener ids so the owner
//! can skip a listener removed partway through a dispatch.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelResult;
use crate::event::{Change, EventName};

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// Create a new random listener id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Callback invoked with the owner and the change payload.
pub type Callback<M> = Rc<dyn Fn(&mut M, &Change) -> ModelResult<()>>;

struct Registration<M> {
    id: ListenerId,
    callback: Callback<M>,
}

/// Ordered listener registry keyed by event name.
pub struct ChangeBus<M> {
    listeners: HashMap<EventName, Vec<Registration<M>>>,
}

impl<M> ChangeBus<M> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
        }
    }

    /// Registers a callback; the same callback may be registered repeatedly.
    pub fn subscribe(&mut self, event: EventName, callback: Callback<M>) -> ListenerId {
        let id = ListenerId::new();
        tracing::trace!(event = %event, listener = %id, "listener registered");
        self.listeners
            .entry(event)
            .or_default()
            .push(Registration { id, callback });
        id
    }

    /// Removes a listener. Returns true if it was registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let mut removed = false;
        self.listeners.retain(|_, registrations| {
            let before = registrations.len();
            registrations.retain(|r| r.id != id);
            removed |= registrations.len() != before;
            !registrations.is_empty()
        });
        removed
    }

    /// Snapshot of the listeners for an event, in registration order.
    #[must_use]
    pub fn snapshot(&self, event: &EventName) -> Vec<(ListenerId, Callback<M>)> {
        self.listeners
            .get(event)
            .map(|registrations| {
                registrations
                    .iter()
                    .map(|r| (r.id, Rc::clone(&r.callback)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if `id` is still registered.
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners
            .values()
            .any(|registrations| registrations.iter().any(|r| r.id == id))
    }

    /// Number of listeners for an event.
    #[must_use]
    pub fn listener_count(&self, event: &EventName) -> usize {
        self.listeners.get(event).map_or(0, Vec::len)
    }

    /// Total number of listeners across all events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.values().map(Vec::len).sum()
    }

    /// Returns true if no listeners are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<M> Default for ChangeBus<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for ChangeBus<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<(String, usize)> = self
            .listeners
            .iter()
            .map(|(event, registrations)| (event.to_string(), registrations.len()))
            .collect();
        counts.sort();
        f.debug_struct("ChangeBus").field("listeners", &counts).finish()
    }
}
