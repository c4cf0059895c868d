//! Configuration for the study assistant.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::session::core::errors::{SessionError, SessionResult};

/// Prefix shared by every environment variable read by [`AssistantConfig::from_env`].
pub const ENV_PREFIX: &str = "STUDYDESK_";

/// Top-level configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Generation endpoint settings.
    pub llm: GenerationConfig,
    /// Local canned-answer settings.
    pub responder: ResponderConfig,
    /// Durable store settings.
    pub storage: StorageConfig,
    /// Study timer settings.
    pub timer: TimerConfig,
    /// HTTP surface settings.
    pub server: ServerConfig,
}

impl AssistantConfig {
    /// Build a configuration from the process environment on top of defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn from_env() -> SessionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup on top of defaults.
    ///
    /// Keys are the full variable names, e.g. `STUDYDESK_PORT`.
    ///
    /// # Errors
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> SessionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(url) = get("LLM_URL") {
            config.llm.endpoint = url;
        }
        if let Some(key) = get("HF_API_KEY") {
            config.llm.api_key = Some(key).filter(|k| !k.trim().is_empty());
        }
        if let Some(raw) = get("MAX_NEW_TOKENS") {
            config.llm.max_new_tokens = parse_number(&raw, "MAX_NEW_TOKENS")?;
        }
        if let Some(prompt) = get("SYSTEM_PROMPT") {
            config.llm.system_prompt = prompt;
        }
        if let Some(path) = get("DB_PATH") {
            config.storage.sqlite_path = PathBuf::from(path);
        }
        if let Some(mode) = get("TIMER_MODE") {
            config.timer.mode = match mode.trim().to_ascii_lowercase().as_str() {
                "stopwatch" => TimerMode::Stopwatch,
                "pomodoro" => TimerMode::Pomodoro,
                other => {
                    return Err(SessionError::InvalidConfig(format!(
                        "unknown timer mode: {other}"
                    )));
                }
            };
        }
        if let Some(raw) = get("PORT") {
            config.server.port = parse_number(&raw, "PORT")?;
        }

        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> SessionResult<()> {
        Url::parse(&self.llm.endpoint)?;

        if self.llm.max_new_tokens == 0 {
            return Err(SessionError::InvalidConfig(
                "llm.max_new_tokens must be > 0".to_string(),
            ));
        }

        if self.llm.request_timeout_secs == 0 {
            return Err(SessionError::InvalidConfig(
                "llm.request_timeout_secs must be > 0".to_string(),
            ));
        }

        if self
            .responder
            .video_triggers
            .iter()
            .any(|t| t.trim().is_empty())
        {
            return Err(SessionError::InvalidConfig(
                "responder.video_triggers must not contain blank entries".to_string(),
            ));
        }

        if self.storage.current_session_key == self.storage.session_history_key {
            return Err(SessionError::InvalidConfig(
                "storage keys for current session and history must differ".to_string(),
            ));
        }

        if self.timer.focus_seconds == 0 || self.timer.break_seconds == 0 {
            return Err(SessionError::InvalidConfig(
                "timer phase lengths must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> SessionResult<T> {
    raw.trim().parse().map_err(|_| {
        SessionError::InvalidConfig(format!("{ENV_PREFIX}{name} is not a valid number: {raw}"))
    })
}

/// Default instruction prepended to every prompt.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly study assistant. \
Answer clearly and concisely, explain concepts step by step, and encourage good study habits.";

/// Generation endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Full URL of the text-generation endpoint.
    pub endpoint: String,
    /// Optional bearer token.
    pub api_key: Option<String>,
    /// Upper bound on generated tokens.
    pub max_new_tokens: u32,
    /// Instruction composed in front of every user input.
    pub system_prompt: String,
    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models/mistralai/Mixtral-8x7B-v0.1"
                .to_string(),
            api_key: None,
            max_new_tokens: 250,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
        }
    }
}

/// Settings for the local rule-based responder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponderConfig {
    /// Case-insensitive substrings that trigger the canned video list.
    pub video_triggers: Vec<String>,
}

impl Default for ResponderConfig {
    fn default() -> Self {
        Self {
            video_triggers: [
                "suggest a video",
                "suggest some videos",
                "recommend a video",
                "recommend some videos",
                "video recommendation",
                "learning video",
                "educational video",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

/// Durable store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// `SQLite` database path.
    pub sqlite_path: PathBuf,
    /// Key-value table name.
    pub table: String,
    /// Key holding the active session.
    pub current_session_key: String,
    /// Key holding the archived sessions.
    pub session_history_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: PathBuf::from("studydesk.sqlite"),
            table: "studydesk_kv".to_string(),
            current_session_key: "current_session".to_string(),
            session_history_key: "session_history".to_string(),
        }
    }
}

/// Timer flavour.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    /// Counts up from zero until reset.
    #[default]
    Stopwatch,
    /// Alternates focus and break countdowns.
    Pomodoro,
}

/// Study timer settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Which timer flavour to run.
    pub mode: TimerMode,
    /// Length of a focus block in seconds (pomodoro only).
    pub focus_seconds: u64,
    /// Length of a break in seconds (pomodoro only).
    pub break_seconds: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            mode: TimerMode::Stopwatch,
            focus_seconds: 25 * 60,
            break_seconds: 5 * 60,
        }
    }
}

/// HTTP surface settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listening port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: crate::server::DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AssistantConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timer.focus_seconds, 1500);
        assert_eq!(config.timer.break_seconds, 300);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_env_overrides() {
        let config = AssistantConfig::from_lookup(lookup_from(&[
            ("STUDYDESK_LLM_URL", "http://127.0.0.1:8080/generate"),
            ("STUDYDESK_HF_API_KEY", "hf_test"),
            ("STUDYDESK_MAX_NEW_TOKENS", "64"),
            ("STUDYDESK_TIMER_MODE", "Pomodoro"),
            ("STUDYDESK_PORT", "4100"),
        ]))
        .unwrap();

        assert_eq!(config.llm.endpoint, "http://127.0.0.1:8080/generate");
        assert_eq!(config.llm.api_key.as_deref(), Some("hf_test"));
        assert_eq!(config.llm.max_new_tokens, 64);
        assert_eq!(config.timer.mode, TimerMode::Pomodoro);
        assert_eq!(config.server.port, 4100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config =
            AssistantConfig::from_lookup(lookup_from(&[("STUDYDESK_HF_API_KEY", "  ")])).unwrap();
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(
            AssistantConfig::from_lookup(lookup_from(&[("STUDYDESK_PORT", "eighty")])).is_err()
        );
        assert!(
            AssistantConfig::from_lookup(lookup_from(&[("STUDYDESK_TIMER_MODE", "hourglass")]))
                .is_err()
        );

        let mut config = AssistantConfig::default();
        config.llm.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = AssistantConfig::default();
        config.llm.max_new_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = AssistantConfig::default();
        config.responder.video_triggers.push("   ".to_string());
        assert!(config.validate().is_err());

        let mut config = AssistantConfig::default();
        config.storage.session_history_key = config.storage.current_session_key.clone();
        assert!(config.validate().is_err());
    }
}
