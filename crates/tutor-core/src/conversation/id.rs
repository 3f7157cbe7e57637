//! Conversation identifiers.
//!
//! Identifiers are generated on the client at first-message time as
//! `chat_<epoch millis>` and parsed back into a timestamp for display.

use std::fmt;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};

pub const ID_PREFIX: &str = "chat_";

/// Display format for conversation titles (day/month hour:minute).
pub const TITLE_FORMAT: &str = "%d/%m %H:%M";

/// Identifier of a server-persisted conversation.
///
/// Ids received from the server are kept verbatim even when they do not
/// follow the `chat_<millis>` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Builds the id for a conversation created at `millis`.
    pub fn from_millis(millis: i64) -> Self {
        Self(format!("{ID_PREFIX}{millis}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id carries no characters; such ids are never sent.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// The creation timestamp embedded after the first `_`, if it parses.
    pub fn timestamp_millis(&self) -> Option<i64> {
        let (_, digits) = self.0.split_once('_')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    /// Human-readable title in local time, or the raw id when it does not parse.
    pub fn title(&self) -> String {
        self.title_in(&Local)
    }

    /// Same as [`title`](Self::title) for an explicit time zone.
    pub fn title_in<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.timestamp_millis()
            .and_then(|millis| tz.timestamp_millis_opt(millis).single())
            .map(|at| at.format(TITLE_FORMAT).to_string())
            .unwrap_or_else(|| self.0.clone())
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConversationId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for ConversationId {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// The system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Issues conversation ids that strictly increase for the generator's lifetime.
///
/// If the clock has not moved past the last issued millisecond (or went
/// backwards), the last value plus one is used instead.
pub struct IdGenerator {
    clock: Arc<dyn Clock>,
    last_issued: Option<i64>,
}

impl IdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            last_issued: None,
        }
    }

    pub fn next_id(&mut self) -> ConversationId {
        let now = self.clock.now_millis();
        let millis = match self.last_issued {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last_issued = Some(millis);
        ConversationId::from_millis(millis)
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}
