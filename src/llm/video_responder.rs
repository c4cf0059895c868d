//! Local answers for learning-video requests.
//!
//! Inputs containing one of the configured trigger phrases (case-insensitive)
//! are answered from a fixed markdown list without contacting the endpoint.

use regex::RegexSet;

use crate::session::core::errors::SessionResult;

/// Canned list of learning-video channels.
pub const VIDEO_RECOMMENDATIONS: &str = "Here are some great learning video channels to explore:

1. [Khan Academy](https://www.youtube.com/@khanacademy) - free lessons in math, science and more
2. [CrashCourse](https://www.youtube.com/@crashcourse) - fast, engaging overviews of many subjects
3. [MIT OpenCourseWare](https://www.youtube.com/@mitocw) - full university lectures
4. [freeCodeCamp.org](https://www.youtube.com/@freecodecamp) - in-depth programming courses";

/// Trigger-phrase matcher.
#[derive(Clone, Debug)]
pub struct VideoResponder {
    triggers: RegexSet,
}

impl VideoResponder {
    /// Compile the trigger phrases. Phrases are matched literally.
    ///
    /// # Errors
    /// Returns an error if the combined pattern set cannot be built.
    pub fn new<S: AsRef<str>>(triggers: &[S]) -> SessionResult<Self> {
        let patterns = triggers
            .iter()
            .map(|t| format!("(?i){}", regex::escape(t.as_ref().trim())));
        Ok(Self {
            triggers: RegexSet::new(patterns)?,
        })
    }

    /// Whether `input` contains any trigger phrase.
    #[must_use]
    pub fn matches(&self, input: &str) -> bool {
        self.triggers.is_match(input)
    }

    /// Canned reply for `input`, if it is a video request.
    #[must_use]
    pub fn respond(&self, input: &str) -> Option<&'static str> {
        self.matches(input).then_some(VIDEO_RECOMMENDATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::core::config::ResponderConfig;

    fn default_responder() -> VideoResponder {
        VideoResponder::new(&ResponderConfig::default().video_triggers).unwrap()
    }

    #[test]
    fn test_matches_case_insensitively() {
        let responder = default_responder();
        assert!(responder.matches("can you suggest a video"));
        assert!(responder.matches("Could you RECOMMEND A VIDEO on algebra?"));
        assert!(!responder.matches("explain the krebs cycle"));
    }

    #[test]
    fn test_list_has_four_links() {
        let responder = default_responder();
        let reply = responder.respond("suggest a video please").unwrap();
        assert_eq!(reply.matches("](https://").count(), 4);
        assert!(responder.respond("hello").is_none());
    }

    #[test]
    fn test_phrases_are_literal() {
        let responder = VideoResponder::new(&["c++ video"]).unwrap();
        assert!(responder.matches("any C++ VIDEO?"));
        assert!(!responder.matches("cc video"));
    }

    #[test]
    fn test_empty_trigger_list_matches_nothing() {
        let responder = VideoResponder::new::<&str>(&[]).unwrap();
        assert!(!responder.matches("suggest a video"));
    }
}
