//! Startup connection establishment with bounded retries and graceful fallback.
//!
//! A [`RetryConnector`] calls an establishing operation up to a fixed number
//! of times with a flat delay between attempts. It never fails the caller:
//! the sequence ends with either a live handle ([`Connection::Connected`]) or
//! the [`Connection::Fallback`] marker, so a process can keep running when an
//! optional backing service is unreachable.
//!
//! # Features
//!
//! - **Flat delay**: every gap between attempts is the same [`RetryPolicy::delay`]
//! - **Upfront validation**: a bad policy is a [`ConfigurationError`] before any attempt
//! - **Observable state**: [`StateHandle`] can be cloned into a health check
//! - **Event system**: attempt, retry, connected and fallback callbacks
//! - **MakeService integration**: [`RetryConnector::connect_service`] drives any tower `Service`
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use triad_connect::{Connection, RetryConnector, RetryPolicy};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), triad_connect::ConfigurationError> {
//! let policy = RetryPolicy::builder()
//!     .max_retries(3)
//!     .delay(Duration::from_millis(10))
//!     .build()?;
//!
//! let mut connector = RetryConnector::builder()
//!     .name("kafka")
//!     .policy(policy)
//!     .on_fallback(|attempts| eprintln!("gave up after {} attempts", attempts))
//!     .build();
//!
//! let outcome = connector
//!     .connect(|| async { Err::<(), _>("connection refused") })
//!     .await;
//!
//! assert_eq!(outcome, Connection::Fallback);
//! assert_eq!(connector.state().attempts(), 3);
//! # Ok(())
//! # }
//! ```

mod connection;
mod connector;
mod error;
mod events;
mod policy;
mod state;

pub use connection::Connection;
pub use connector::{RetryConnector, RetryConnectorBuilder};
pub use error::ConfigurationError;
pub use events::{AttemptOutcome, ConnectEvent};
pub use policy::{RetryPolicy, RetryPolicyBuilder};
pub use state::{ConnectionState, StateHandle};
