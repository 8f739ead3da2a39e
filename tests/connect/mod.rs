//! Tests for the startup connector.
//!
//! Test organization:
//! - policy.rs: Policy validation and defaults
//! - sequence.rs: Attempt counting, delays and outcomes
//! - events.rs: Event emission and listener callbacks
//! - state.rs: Observable state across sequences
//! - service.rs: Driving a tower `Service` as the connection maker

mod events;
mod policy;
mod service;
mod state;
