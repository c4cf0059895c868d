//! Identifier types for sessions and in-flight generation calls.
//!
//! Sessions get a monotonically increasing numeric id so that archived
//! entries keep a stable identity even if the history list is reordered
//! or trimmed later. Generation calls get a random UUID.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a conversation session.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// The first id handed out on an empty store.
    pub const FIRST: Self = Self(1);

    /// Wrap a raw value.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Borrow the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The id following this one.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = core::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(Self)
    }
}

/// Identifier of one in-flight `send_message` round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CallId(pub Uuid);

impl Default for CallId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl CallId {
    /// Create a new random call id.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CallId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_increase() {
        let first = SessionId::FIRST;
        assert_eq!(first.next(), SessionId(2));
        assert!(first < first.next());
        assert_eq!(SessionId(u64::MAX).next(), SessionId(u64::MAX));
    }

    #[test]
    fn session_id_parses_and_displays() {
        let id: SessionId = " 42 ".parse().unwrap();
        assert_eq!(id.as_u64(), 42);
        assert_eq!(id.to_string(), "42");
        assert!("abc".parse::<SessionId>().is_err());
    }

    #[test]
    fn call_ids_are_unique() {
        let a = CallId::new();
        let b = CallId::new();
        assert_ne!(a, b);
        let parsed: CallId = a.to_string().parse().unwrap();
        assert_eq!(parsed, a);
    }

    #[test]
    fn session_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&SessionId(7)).unwrap();
        assert_eq!(json, "7");
    }
}
