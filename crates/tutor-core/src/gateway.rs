//! Gateway trait for the remote chatbot service.

use async_trait::async_trait;

use crate::conversation::{ConversationId, Message};
use crate::error::Result;
use crate::session::{AccessGrant, Session};

/// Outbound calls to the remote chatbot service.
///
/// Every call is a single request/response with no retry. Calls other than
/// `login` and `signup` take the [`Session`] whose token is attached as a
/// bearer credential, so a token-bearing call cannot be made while
/// signed out.
///
/// Failures are reported as [`TutorError::Remote`](crate::TutorError::Remote)
/// carrying the server's `detail` string when one was supplied.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Exchanges credentials for a fresh token. Never sends a stale token.
    async fn login(&self, identity: &str, secret: &str) -> Result<AccessGrant>;

    /// Registers a new account and returns its token.
    async fn signup(&self, identity: &str, secret: &str) -> Result<AccessGrant>;

    /// Lists the ids of every conversation owned by the session's user.
    async fn list_conversation_ids(&self, session: &Session) -> Result<Vec<ConversationId>>;

    /// Fetches the stored history of a conversation.
    ///
    /// Returns an empty history without a request when `id` is absent or blank.
    async fn get_conversation_history(
        &self,
        session: &Session,
        id: Option<&ConversationId>,
    ) -> Result<Vec<Message>>;

    /// Sends `question` to the conversation and returns the assistant's reply.
    async fn ask(&self, session: &Session, id: &ConversationId, question: &str) -> Result<String>;

    /// Deletes a conversation. Does nothing when `id` is absent or blank.
    async fn delete_conversation(&self, session: &Session, id: Option<&ConversationId>)
    -> Result<()>;
}
