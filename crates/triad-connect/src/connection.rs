//! The outcome of a connect sequence.

use crate::state::ConnectionState;

/// Either a live connection or the marker that none is available.
///
/// Dependents match on this once, at a single dispatch point, instead of
/// checking for a missing handle at every call site.
///
/// # Examples
///
/// ```
/// use triad_connect::Connection;
///
/// fn route(sink: &Connection<Vec<String>>) -> &'static str {
///     match sink {
///         Connection::Connected(_) => "broker",
///         Connection::Fallback => "console",
///     }
/// }
///
/// assert_eq!(route(&Connection::Fallback), "console");
/// assert_eq!(route(&Connection::Connected(Vec::new())), "broker");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a Fallback outcome must be routed to a fallback sink"]
pub enum Connection<C> {
    /// A live handle produced by a successful attempt.
    Connected(C),

    /// All attempts failed; no handle exists.
    Fallback,
}

impl<C> Connection<C> {
    /// Returns true when a live handle is present.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected(_))
    }

    /// Returns true when running in fallback mode.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    /// Returns the connector state this outcome corresponds to.
    pub fn state(&self) -> ConnectionState {
        match self {
            Self::Connected(_) => ConnectionState::Connected,
            Self::Fallback => ConnectionState::DegradedFallback,
        }
    }

    /// Borrows the live handle, if any.
    pub fn live(&self) -> Option<&C> {
        match self {
            Self::Connected(conn) => Some(conn),
            Self::Fallback => None,
        }
    }

    /// Consumes the outcome, returning the live handle if any.
    pub fn into_live(self) -> Option<C> {
        match self {
            Self::Connected(conn) => Some(conn),
            Self::Fallback => None,
        }
    }

    /// Converts `&Connection<C>` into `Connection<&C>`.
    pub fn as_ref(&self) -> Connection<&C> {
        match self {
            Self::Connected(conn) => Connection::Connected(conn),
            Self::Fallback => Connection::Fallback,
        }
    }

    /// Maps the live handle, keeping `Fallback` as is.
    pub fn map<D, F>(self, f: F) -> Connection<D>
    where
        F: FnOnce(C) -> D,
    {
        match self {
            Self::Connected(conn) => Connection::Connected(f(conn)),
            Self::Fallback => Connection::Fallback,
        }
    }
}

impl<C> From<Option<C>> for Connection<C> {
    fn from(value: Option<C>) -> Self {
        match value {
            Some(conn) => Self::Connected(conn),
            None => Self::Fallback,
        }
    }
}
