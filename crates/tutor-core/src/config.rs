use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_GREETING: &str = "Hello! How can I help you with Python today?";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Root configuration loaded from `config.toml`.
///
/// Every field has a default so that a missing or partial file still yields
/// a usable client.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the chatbot API, without a trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Standing greeting shown for a conversation with no messages.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Log filter used when `TUTOR_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional client-side request timeout. Absent means the HTTP client default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            greeting: default_greeting(),
            log_level: default_log_level(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Replaces the base URL. `validate` normalizes it.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Checks the configuration and normalizes the base URL in place.
    pub fn validate(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        let host = trimmed
            .strip_prefix("http://")
            .or_else(|| trimmed.strip_prefix("https://"))
            .ok_or_else(|| {
                TutorError::config(format!(
                    "base_url must start with http:// or https:// (got '{}')",
                    self.base_url
                ))
            })?;
        if host.is_empty() {
            return Err(TutorError::config("base_url has no host"));
        }
        self.base_url = trimmed.to_string();

        if self.greeting.trim().is_empty() {
            self.greeting = default_greeting();
        }
        if self.request_timeout_secs == Some(0) {
            return Err(TutorError::config("request_timeout_secs must be greater than zero"));
        }
        Ok(())
    }
}
