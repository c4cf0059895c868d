//! Short-term study goal announcements.
//!
//! A goal has no lifetime of its own: setting it produces a narrative
//! message and nothing is kept afterwards.

use crate::session::core::message::Message;

/// Narrative for a freshly set goal.
#[must_use]
pub fn goal_set_text(goal: &str) -> String {
    format!("New study goal set: \"{goal}\". Let's work towards it together!")
}

/// Narrative message announcing `text` as the current goal.
///
/// Returns `None` for blank input.
#[must_use]
pub fn announce_goal(text: &str) -> Option<Message> {
    let goal = text.trim();
    if goal.is_empty() {
        return None;
    }
    Some(Message::system(goal_set_text(goal)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::core::message::Role;

    #[test]
    fn blank_goal_is_ignored() {
        assert!(announce_goal("").is_none());
        assert!(announce_goal(" \t\n").is_none());
    }

    #[test]
    fn goal_is_trimmed_and_announced() {
        let message = announce_goal("  finish chapter 4 ").unwrap();
        assert_eq!(message.role, Role::System);
        assert_eq!(
            message.text,
            "New study goal set: \"finish chapter 4\". Let's work towards it together!"
        );
    }
}
