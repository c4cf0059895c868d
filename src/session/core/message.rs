//! Message and session model for the conversation log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::session::core::ids::SessionId;

/// Author of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Text typed by the user.
    User,
    /// Generated reply or locally authored narrative.
    System,
}

impl Role {
    /// Stable string form for storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "system" => Ok(Self::System),
            _ => Err(value.to_string()),
        }
    }
}

/// A single immutable entry of a conversation.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Message body (markdown allowed).
    pub text: String,
    /// Creation instant, serialized as RFC 3339.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Build a user message stamped now.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a system message stamped now.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One ordered conversation.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identity of the session.
    #[serde(default)]
    pub id: SessionId,
    /// Messages in chronological (insertion) order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Session {
    /// Create an empty session with the given id.
    #[must_use]
    pub const fn empty(id: SessionId) -> Self {
        Self {
            id,
            messages: Vec::new(),
        }
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the session holds no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Last message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Append a message at the end of the log.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Short preview of the first user message, for history listings.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        self.messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.text.chars().take(max_chars).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn role_round_trips_through_str() {
        for role in [Role::User, Role::System] {
            assert_eq!(Role::from_str(role.as_str()), Ok(role));
        }
        assert!(Role::from_str("assistant").is_err());
    }

    #[test]
    fn session_serialization_keeps_order_and_timestamps() {
        let mut session = Session::empty(SessionId(3));
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 15).unwrap();
        session.push(Message {
            role: Role::User,
            text: "explain osmosis".to_string(),
            timestamp: t0,
        });
        session.push(Message {
            role: Role::System,
            text: "Osmosis is...".to_string(),
            timestamp: t0 + chrono::Duration::seconds(2),
        });

        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, session);
        assert_eq!(restored.messages[0].timestamp.timestamp(), t0.timestamp());
        assert_eq!(restored.messages[1].role, Role::System);
    }

    #[test]
    fn timestamp_is_stored_as_iso_text_and_parsed_back() {
        let message = Message::user("hi");
        let value = serde_json::to_value(&message).unwrap();
        let raw = value["timestamp"].as_str().unwrap().to_string();
        assert!(DateTime::parse_from_rfc3339(&raw).is_ok());

        let restored: Message = serde_json::from_value(value).unwrap();
        assert_eq!(restored.timestamp, message.timestamp);
    }

    #[test]
    fn preview_uses_first_user_message() {
        let mut session = Session::empty(SessionId(1));
        session.push(Message::system("Study timer started."));
        session.push(Message::user("photosynthesis basics"));
        assert_eq!(session.preview(5).as_deref(), Some("photo"));
        assert_eq!(Session::default().preview(5), None);
    }
}
