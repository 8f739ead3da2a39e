//! HTTP service backed by MongoDB, Redis and Kafka.
//!
//! MongoDB and Redis are required at startup. Kafka only receives the
//! service's own log records, so it is reached through a
//! [`triad_connect::RetryConnector`]: when every attempt fails the service
//! still starts and [`logger::LogShipper`] writes records to the console.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod health;
pub mod logger;
pub mod migrations;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod telemetry;
pub mod viewer;
