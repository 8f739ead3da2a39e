//! Core infrastructure for triad.
//!
//! - [`events`]: the listener fan-out. `triad-connect` reports connect
//!   attempts through it.
//! - [`service`]: backing-service lifecycle events. `triad-server` raises
//!   these for MongoDB, Redis and Kafka.

pub mod events;
pub mod service;

pub use events::{EventListener, EventListeners, FnListener, LifecycleEvent};
pub use service::{ServiceChange, ServiceEvent};
