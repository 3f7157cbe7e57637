//! Conversation session lifecycle.
//!
//! The controller owns the active conversation id and the displayed
//! messages. All mutation goes through `&mut self`, so one controller can
//! only have a single operation in flight; callers sharing it across tasks
//! wrap it in a mutex.

use std::sync::Arc;

use super::id::{Clock, ConversationId, IdGenerator};
use super::message::{ExchangePhase, Message, MessageLog};
use crate::error::{Result, TutorError};
use crate::gateway::ChatGateway;
use crate::session::Session;

pub const LOAD_HISTORY_FAILED: &str = "Could not load the conversation history.";
pub const SEND_FAILED: &str = "Could not send the message.";
pub const DELETE_FAILED: &str = "Could not delete the conversation.";

/// Result of a successful [`ConversationController::send_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub conversation_id: ConversationId,
    /// True when this exchange is the first one stored for a conversation
    /// created on this client, i.e. the id just became visible server-side
    pub created: bool,
    pub reply: Message,
}

pub struct ConversationController {
    gateway: Arc<dyn ChatGateway>,
    ids: IdGenerator,
    greeting: Message,
    active_id: Option<ConversationId>,
    /// The active id was generated here and no exchange has succeeded yet.
    unconfirmed: bool,
    log: MessageLog,
    error: Option<String>,
    /// Incremented whenever the server-side id set may have changed.
    refresh_epoch: u64,
}

impl ConversationController {
    /// Creates a controller showing the standing greeting.
    pub fn new(gateway: Arc<dyn ChatGateway>, greeting: impl Into<String>) -> Self {
        let greeting = Message::assistant(greeting);
        Self {
            gateway,
            ids: IdGenerator::default(),
            log: MessageLog::new(vec![greeting.clone()]),
            greeting,
            active_id: None,
            unconfirmed: false,
            error: None,
            refresh_epoch: 0,
        }
    }

    /// Uses `clock` for new conversation ids.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.ids = IdGenerator::new(clock);
        self
    }

    pub fn active_id(&self) -> Option<&ConversationId> {
        self.active_id.as_ref()
    }

    pub fn messages(&self) -> &[Message] {
        self.log.messages()
    }

    pub fn phase(&self) -> ExchangePhase {
        self.log.phase()
    }

    /// The inline error left by the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True when only the standing greeting is displayed.
    pub fn is_greeting_only(&self) -> bool {
        self.log.messages() == std::slice::from_ref(&self.greeting)
    }

    /// Signal for [`ConversationList::sync`](super::ConversationList::sync).
    pub fn refresh_epoch(&self) -> u64 {
        self.refresh_epoch
    }

    /// Opens `id` and loads its history.
    ///
    /// An empty history shows the greeting. A failed load also shows the
    /// greeting, records the inline error and returns it as a `Load` error.
    pub async fn select_conversation(&mut self, session: &Session, id: ConversationId) -> Result<()> {
        tracing::debug!(conversation = %id, "Selecting conversation");
        self.error = None;
        self.active_id = Some(id.clone());
        self.unconfirmed = false;

        match self.gateway.get_conversation_history(session, Some(&id)).await {
            Ok(history) if history.is_empty() => {
                self.show_greeting();
                Ok(())
            }
            Ok(history) => {
                self.log.replace(history);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(conversation = %id, error = %err, "Failed to load history");
                self.show_greeting();
                Err(self.fail(TutorError::Load(err.user_message(LOAD_HISTORY_FAILED))))
            }
        }
    }

    /// Clears the active conversation and shows the greeting. No request is made.
    pub fn start_new_conversation(&mut self) {
        self.active_id = None;
        self.unconfirmed = false;
        self.error = None;
        self.show_greeting();
    }

    /// Sends `text` in the active conversation, creating one if needed.
    ///
    /// The user message is displayed before the request resolves. On
    /// failure it is removed again and a `Send` error is returned; an id
    /// adopted by this call stays adopted. The refresh epoch advances on the
    /// first successful exchange of a conversation created here.
    pub async fn send_message(&mut self, session: &Session, text: &str) -> Result<SendOutcome> {
        if text.trim().is_empty() {
            return Err(TutorError::validation("Message is empty."));
        }
        self.error = None;

        let conversation_id = match self.active_id.clone() {
            Some(id) => id,
            None => {
                let id = self.ids.next_id();
                tracing::info!(conversation = %id, "Creating conversation");
                self.active_id = Some(id.clone());
                self.unconfirmed = true;
                self.log.replace(Vec::new());
                id
            }
        };

        let pending = self.log.begin(Message::user(text))?;
        match self.gateway.ask(session, &conversation_id, text).await {
            Ok(answer) => {
                let reply = Message::assistant(answer);
                self.log.commit(pending, reply.clone());
                let created = std::mem::take(&mut self.unconfirmed);
                if created {
                    self.refresh_epoch += 1;
                }
                Ok(SendOutcome {
                    conversation_id,
                    created,
                    reply,
                })
            }
            Err(err) => {
                tracing::warn!(conversation = %conversation_id, error = %err, "Ask failed");
                self.log.rollback(pending);
                Err(self.fail(TutorError::Send(err.user_message(SEND_FAILED))))
            }
        }
    }

    /// Deletes `id` on the server.
    ///
    /// Nothing changes locally until the server confirms. Deleting the
    /// active conversation then behaves like
    /// [`start_new_conversation`](Self::start_new_conversation).
    pub async fn delete_conversation(&mut self, session: &Session, id: &ConversationId) -> Result<()> {
        self.error = None;
        if let Err(err) = self.gateway.delete_conversation(session, Some(id)).await {
            tracing::warn!(conversation = %id, error = %err, "Delete failed");
            return Err(self.fail(TutorError::Delete(err.user_message(DELETE_FAILED))));
        }

        tracing::info!(conversation = %id, "Deleted conversation");
        self.refresh_epoch += 1;
        if self.active_id.as_ref() == Some(id) {
            self.start_new_conversation();
        }
        Ok(())
    }

    fn show_greeting(&mut self) {
        self.log.replace(vec![self.greeting.clone()]);
    }

    fn fail(&mut self, err: TutorError) -> TutorError {
        self.error = err.inline_message().map(str::to_string);
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, ScriptedGateway, session};
    use std::sync::atomic::{AtomicI64, Ordering};

    const GREETING: &str = "Hello! How can I help you with Python today?";

    struct StepClock(AtomicI64);

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            self.0.fetch_add(10, Ordering::SeqCst)
        }
    }

    fn controller(gateway: &Arc<ScriptedGateway>) -> ConversationController {
        ConversationController::new(gateway.clone(), GREETING)
            .with_clock(Arc::new(StepClock(AtomicI64::new(1_700_000_000_000))))
    }

    #[test]
    fn test_starts_on_greeting() {
        let gateway = Arc::new(ScriptedGateway::new());
        let controller = controller(&gateway);
        assert!(controller.is_greeting_only());
        assert_eq!(controller.active_id(), None);
        assert_eq!(controller.messages(), &[Message::assistant(GREETING)]);
    }

    #[tokio::test]
    async fn test_first_send_creates_conversation() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply(Ok("Hi! Ask me anything.".to_string()));
        let mut controller = controller(&gateway);

        let outcome = controller.send_message(&session(), "hello").await.unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.conversation_id.as_str(), "chat_1700000000000");
        assert_eq!(controller.active_id(), Some(&outcome.conversation_id));
        assert_eq!(
            controller.messages(),
            &[Message::user("hello"), Message::assistant("Hi! Ask me anything.")]
        );
        assert_eq!(controller.refresh_epoch(), 1);
        assert_eq!(controller.phase(), ExchangePhase::Committed);
        assert_eq!(
            gateway.calls(),
            vec![Call::Ask {
                token: "tok-123".to_string(),
                id: "chat_1700000000000".to_string(),
                question: "hello".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_follow_up_send_reuses_id_without_refresh() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);

        let first = controller.send_message(&session(), "one").await.unwrap();
        let second = controller.send_message(&session(), "two").await.unwrap();

        assert!(!second.created);
        assert_eq!(first.conversation_id, second.conversation_id);
        assert_eq!(controller.messages().len(), 4);
        assert_eq!(controller.refresh_epoch(), 1);
    }

    #[tokio::test]
    async fn test_new_conversation_ids_increase() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);

        let mut stamps = Vec::new();
        for _ in 0..3 {
            let outcome = controller.send_message(&session(), "hi").await.unwrap();
            stamps.push(outcome.conversation_id.timestamp_millis().unwrap());
            controller.start_new_conversation();
        }
        assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back_exactly() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);
        controller.send_message(&session(), "first").await.unwrap();
        let before = controller.messages().to_vec();
        let id_before = controller.active_id().cloned();

        gateway.push_reply(Err(TutorError::remote(Some(500), None)));
        let err = controller.send_message(&session(), "second").await.unwrap_err();

        assert_eq!(err, TutorError::Send(SEND_FAILED.to_string()));
        assert_eq!(controller.messages(), before.as_slice());
        assert_eq!(controller.active_id().cloned(), id_before);
        assert_eq!(controller.error(), Some(SEND_FAILED));
        assert_eq!(controller.phase(), ExchangePhase::RolledBack);
    }

    #[tokio::test]
    async fn test_failed_first_send_keeps_id_and_skips_refresh() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.push_reply(Err(TutorError::remote(Some(422), Some("Question too long".into()))));
        let mut controller = controller(&gateway);

        let err = controller.send_message(&session(), "hello").await.unwrap_err();

        assert_eq!(err, TutorError::Send("Question too long".to_string()));
        assert!(controller.active_id().is_some());
        assert!(controller.messages().is_empty());
        assert_eq!(controller.refresh_epoch(), 0);

        // The retry lands in the adopted conversation and, being its first
        // stored exchange, is what signals the list.
        let id = controller.active_id().cloned();
        let outcome = controller.send_message(&session(), "hello").await.unwrap();
        assert!(outcome.created);
        assert_eq!(Some(outcome.conversation_id), id);
        assert_eq!(controller.refresh_epoch(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_locally() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);

        let err = controller.send_message(&session(), "   ").await.unwrap_err();
        assert!(err.is_validation());
        assert!(controller.is_greeting_only());
        assert!(controller.active_id().is_none());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_select_loads_history() {
        let gateway = Arc::new(ScriptedGateway::new());
        let history = vec![Message::user("What is a list?"), Message::assistant("A sequence.")];
        gateway.set_history("chat_1", history.clone());
        let mut controller = controller(&gateway);

        controller.select_conversation(&session(), "chat_1".into()).await.unwrap();

        assert_eq!(controller.active_id().map(|id| id.as_str()), Some("chat_1"));
        assert_eq!(controller.messages(), history.as_slice());
    }

    #[tokio::test]
    async fn test_select_empty_history_shows_greeting() {
        let gateway = Arc::new(ScriptedGateway::new());
        gateway.set_history("chat_2", Vec::new());
        let mut controller = controller(&gateway);

        controller.select_conversation(&session(), "chat_2".into()).await.unwrap();

        assert!(controller.is_greeting_only());
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_select_failure_falls_back_to_greeting() {
        let gateway = Arc::new(ScriptedGateway::new());
        *gateway.history_error.lock().unwrap() = Some(TutorError::remote(Some(500), None));
        let mut controller = controller(&gateway);
        controller.send_message(&session(), "hello").await.unwrap();

        let err = controller
            .select_conversation(&session(), "chat_3".into())
            .await
            .unwrap_err();

        assert_eq!(err, TutorError::Load(LOAD_HISTORY_FAILED.to_string()));
        assert!(controller.is_greeting_only());
        assert_eq!(controller.active_id().map(|id| id.as_str()), Some("chat_3"));
        assert_eq!(controller.error(), Some(LOAD_HISTORY_FAILED));
    }

    #[tokio::test]
    async fn test_start_new_makes_no_request() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);
        controller.send_message(&session(), "hello").await.unwrap();
        let calls = gateway.calls().len();

        controller.start_new_conversation();

        assert!(controller.active_id().is_none());
        assert!(controller.is_greeting_only());
        assert_eq!(gateway.calls().len(), calls);
    }

    #[tokio::test]
    async fn test_delete_active_behaves_like_new_conversation() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);
        let outcome = controller.send_message(&session(), "hello").await.unwrap();

        controller
            .delete_conversation(&session(), &outcome.conversation_id)
            .await
            .unwrap();

        assert!(controller.active_id().is_none());
        assert!(controller.is_greeting_only());
        assert_eq!(controller.refresh_epoch(), 2);
    }

    #[tokio::test]
    async fn test_delete_other_keeps_view() {
        let gateway = Arc::new(ScriptedGateway::new());
        let mut controller = controller(&gateway);
        controller.send_message(&session(), "hello").await.unwrap();
        let active = controller.active_id().cloned();
        let messages = controller.messages().to_vec();

        controller.delete_conversation(&session(), &"chat_42".into()).await.unwrap();

        assert_eq!(controller.active_id().cloned(), active);
        assert_eq!(controller.messages(), messages.as_slice());
        assert_eq!(controller.refresh_epoch(), 2);
    }

    #[tokio::test]
    async fn test_failed_delete_changes_nothing() {
        let gateway = Arc::new(ScriptedGateway::new());
        *gateway.delete_error.lock().unwrap() = Some(TutorError::remote(Some(404), None));
        let mut controller = controller(&gateway);
        let outcome = controller.send_message(&session(), "hello").await.unwrap();
        let messages = controller.messages().to_vec();

        let err = controller
            .delete_conversation(&session(), &outcome.conversation_id)
            .await
            .unwrap_err();

        assert_eq!(err, TutorError::Delete(DELETE_FAILED.to_string()));
        assert_eq!(controller.active_id(), Some(&outcome.conversation_id));
        assert_eq!(controller.messages(), messages.as_slice());
        assert_eq!(controller.refresh_epoch(), 1);
    }
}
