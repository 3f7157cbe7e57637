//! Conversation message types and the displayed message log.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TutorError};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single message. `content` is Markdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Where the log stands with respect to its optimistic exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangePhase {
    /// No exchange has happened since the log was last replaced
    Idle,
    /// A user message is displayed but not yet confirmed
    Pending,
    /// The last exchange received its reply
    Committed,
    /// The last exchange failed and its user message was removed
    RolledBack,
}

/// Proof that an optimistic append is outstanding.
///
/// Consumed by exactly one of [`MessageLog::commit`] or [`MessageLog::rollback`].
#[derive(Debug)]
#[must_use = "a pending exchange must be committed or rolled back"]
pub struct PendingExchange {
    base_len: usize,
    generation: u64,
}

/// The ordered, append-only sequence of messages currently displayed.
#[derive(Debug, Clone)]
pub struct MessageLog {
    messages: Vec<Message>,
    phase: ExchangePhase,
    /// Bumped on every `replace`, invalidating exchanges begun before it.
    generation: u64,
}

impl MessageLog {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            phase: ExchangePhase::Idle,
            generation: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// Replaces the whole sequence, abandoning any pending exchange.
    pub fn replace(&mut self, messages: Vec<Message>) {
        self.messages = messages;
        self.phase = ExchangePhase::Idle;
        self.generation += 1;
    }

    /// Appends `message` optimistically (Pending).
    pub fn begin(&mut self, message: Message) -> Result<PendingExchange> {
        if self.phase == ExchangePhase::Pending {
            return Err(TutorError::Send(
                "Another message is still being sent.".to_string(),
            ));
        }
        let pending = PendingExchange {
            base_len: self.messages.len(),
            generation: self.generation,
        };
        self.messages.push(message);
        self.phase = ExchangePhase::Pending;
        Ok(pending)
    }

    /// Confirms the exchange and appends the reply (Committed).
    ///
    /// A stale exchange (the log was replaced meanwhile) is dropped silently.
    pub fn commit(&mut self, pending: PendingExchange, reply: Message) {
        if pending.generation != self.generation {
            return;
        }
        self.messages.push(reply);
        self.phase = ExchangePhase::Committed;
    }

    /// Removes the optimistic message (RolledBack), restoring the exact
    /// sequence that preceded [`begin`](Self::begin).
    pub fn rollback(&mut self, pending: PendingExchange) {
        if pending.generation != self.generation {
            return;
        }
        self.messages.truncate(pending.base_len);
        self.phase = ExchangePhase::RolledBack;
    }
}
