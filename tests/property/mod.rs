//! Property-based tests for the startup connector.
//!
//! Run with: cargo test --test property_tests

pub mod connect;
