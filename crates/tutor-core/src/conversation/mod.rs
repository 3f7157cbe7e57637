//! Conversation domain module.
//!
//! - `id`: conversation identifiers and their generation (`ConversationId`, `Clock`)
//! - `message`: messages and the two-phase message log (`Message`, `MessageLog`)
//! - `controller`: the active conversation lifecycle (`ConversationController`)
//! - `list`: the sidebar list with its contextual menu (`ConversationList`)

mod controller;
mod id;
mod list;
mod message;

pub use controller::{
    ConversationController, DELETE_FAILED, LOAD_HISTORY_FAILED, SEND_FAILED, SendOutcome,
};
pub use id::{Clock, ConversationId, ID_PREFIX, IdGenerator, SystemClock, TITLE_FORMAT};
pub use list::{ConversationEntry, ConversationList, DeletionRequest, LOAD_LIST_FAILED};
pub use message::{ExchangePhase, Message, MessageLog, MessageRole, PendingExchange};
