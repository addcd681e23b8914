//! Insert-only registry mapping (repository, event kind) to handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::github::models::{EventKind, EventRecord};

/// Callback invoked for each newly observed event.
///
/// Handlers receive the event record together with its kind tag; the return
/// value is ignored. A panicking handler is caught and reported by the poll
/// session without disturbing delivery to sibling handlers.
pub trait EventHandler: Send + Sync {
    /// Handles one dispatched event.
    fn handle(&self, event: &EventRecord, kind: EventKind);
}

impl<F> EventHandler for F
where
    F: Fn(&EventRecord, EventKind) + Send + Sync,
{
    fn handle(&self, event: &EventRecord, kind: EventKind) {
        self(event, kind);
    }
}

type HandlerList = Vec<Arc<dyn EventHandler>>;

/// Ordered handler registrations keyed by repository and event kind.
///
/// Registrations are insert-only: there is no unsubscribe, and registering
/// the same handler twice yields two invocations per event. Lookups snapshot
/// the list, so a registration landing while a dispatch walk is in flight
/// takes effect from the next cycle rather than retroactively.
#[derive(Default)]
pub struct HandlerRegistry {
    inner: Mutex<HashMap<String, HashMap<EventKind, HandlerList>>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler to the ordered list for `(repo_key, kind)`.
    ///
    /// `repo_key` is the canonical `owner/repo` form. Maps are created
    /// lazily on first registration.
    pub fn register(&self, repo_key: &str, kind: EventKind, handler: Arc<dyn EventHandler>) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .entry(repo_key.to_owned())
            .or_default()
            .entry(kind)
            .or_default()
            .push(handler);
    }

    /// Returns the handlers registered for `(repo_key, kind)`, in
    /// registration order.
    ///
    /// An unregistered pair yields an empty list, never an error.
    #[must_use]
    pub fn handlers_for(&self, repo_key: &str, kind: EventKind) -> HandlerList {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner
            .get(repo_key)
            .and_then(|by_kind| by_kind.get(&kind))
            .cloned()
            .unwrap_or_default()
    }
}
