//! Listener fan-out for lifecycle events.
//!
//! Whoever raises an event owns the control flow. Listeners only observe:
//! they cannot fail the caller, and a listener that panics is skipped.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Something that happened to a backing service or to the connector
/// reaching it.
pub trait LifecycleEvent: Send + Sync + fmt::Debug {
    /// Short stable name, e.g. `"attempt"` or `"closed"`.
    fn kind(&self) -> &'static str;

    /// Service or connector the event is about.
    fn service(&self) -> &str;

    /// When the event was raised.
    fn raised_at(&self) -> Instant;
}

/// Observer of one event type.
pub trait EventListener<E: LifecycleEvent>: Send + Sync {
    fn on_event(&self, event: &E);
}

/// Ordered, cheaply cloneable set of listeners.
#[derive(Clone)]
pub struct EventListeners<E: LifecycleEvent> {
    listeners: Vec<Arc<dyn EventListener<E>>>,
}

impl<E: LifecycleEvent> EventListeners<E> {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Appends a listener. Listeners run in registration order.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with<L>(mut self, listener: L) -> Self
    where
        L: EventListener<E> + 'static,
    {
        self.add(listener);
        self
    }

    /// Delivers `event` to every listener.
    ///
    /// Returns how many listeners panicked. The others still ran.
    pub fn emit(&self, event: &E) -> usize {
        self.listeners
            .iter()
            .filter(|listener| {
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    listener.on_event(event)
                }))
                .is_err()
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: LifecycleEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: LifecycleEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// Adapts a closure into an [`EventListener`].
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _event: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            _event: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: LifecycleEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}
