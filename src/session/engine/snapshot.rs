//! Observable engine state published to subscribers.

use serde::{Deserialize, Serialize};

use crate::session::core::ids::CallId;
use crate::session::core::message::{Message, Session};
use crate::session::timer::TimerState;

/// Point-in-time view of everything the UI shell renders.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Active session.
    pub session: Session,
    /// Number of archived sessions.
    pub history_len: usize,
    /// True while at least one send is awaiting its reply.
    pub busy: bool,
    /// Number of sends awaiting their reply.
    pub pending_calls: usize,
    /// Study timer state.
    pub timer: TimerState,
    /// Seconds left in the current pomodoro phase.
    pub timer_remaining_seconds: Option<u64>,
    /// Presentation flag only.
    pub full_screen: bool,
    /// Whether the widget is shown.
    pub open: bool,
}

/// Result of one `send_message` call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SendOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// The reply was appended to the session the call was issued against.
    Replied {
        /// Identifier of the round trip.
        call_id: CallId,
        /// Appended system message.
        reply: Message,
    },
    /// The active session changed before the reply arrived; the reply was dropped.
    Superseded {
        /// Identifier of the round trip.
        call_id: CallId,
    },
}
