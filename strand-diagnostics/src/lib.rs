#![deny(missing_docs)]
//! Listener registry for wiring events.
//!
//! A [`Diagnostics`] registry collects [`WiringListener`]s and broadcasts
//! every [`WiringEvent`] to them in subscription order. It is owned by a
//! wiring session rather than being process-wide, so each test (or each
//! assembly) sees only its own events. With no listeners, events are
//! dropped.
//!
//! Listeners observe; they never steer. A listener that panics is isolated:
//! the panic is caught and logged, the remaining listeners still run, and
//! the wiring that produced the event still succeeds.

mod tracing_listener;

pub use tracing_listener::TracingListener;

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, PoisonError, RwLock};
use strand_core::event::{WiringEvent, WiringListener};

/// Returned by [`Diagnostics::subscribe`]; pass to
/// [`Diagnostics::unsubscribe`] to detach the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    listener: Arc<dyn WiringListener>,
}

struct Registry {
    next_id: u64,
    entries: Vec<Entry>,
}

/// An ordered set of wiring listeners.
pub struct Diagnostics {
    registry: RwLock<Registry>,
}

impl Diagnostics {
    /// Create a registry with no listeners.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            }),
        }
    }

    /// Attach a listener at the end of the dispatch order.
    pub fn subscribe(&self, listener: Arc<dyn WiringListener>) -> ListenerId {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.entries.push(Entry { id, listener });
        id
    }

    /// Attach a closure as a listener.
    pub fn subscribe_fn<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&WiringEvent) + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(f))
    }

    /// Detach a listener. Returns false if it was not attached.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        let before = registry.entries.len();
        registry.entries.retain(|entry| entry.id != id);
        registry.entries.len() != before
    }

    /// Detach every listener.
    pub fn clear(&self) {
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .clear();
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Broadcast an event to every listener, in subscription order.
    ///
    /// The listener list is snapshotted first, so a listener may subscribe
    /// or unsubscribe others without deadlocking; changes apply from the
    /// next event on.
    pub fn emit(&self, event: &WiringEvent) {
        let listeners: Vec<Arc<dyn WiringListener>> = self
            .registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|entry| Arc::clone(&entry.listener))
            .collect();

        for listener in listeners {
            if catch_unwind(AssertUnwindSafe(|| listener.on_wired(event))).is_err() {
                tracing::error!(event = %event, "strand.diagnostics.listener_panicked");
            }
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("listeners", &self.len())
            .finish()
    }
}
