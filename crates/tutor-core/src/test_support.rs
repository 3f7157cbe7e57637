//! In-memory gateway double for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::conversation::{ConversationId, Message};
use crate::error::{Result, TutorError};
use crate::gateway::ChatGateway;
use crate::session::{AccessGrant, Session};

/// A recorded gateway call, with the token it carried when authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Login(String),
    Signup(String),
    ListIds { token: String },
    History { token: String, id: String },
    Ask { token: String, id: String, question: String },
    Delete { token: String, id: String },
}

#[derive(Default)]
pub(crate) struct ScriptedGateway {
    pub calls: Mutex<Vec<Call>>,
    pub auth_error: Mutex<Option<TutorError>>,
    pub ids: Mutex<Vec<ConversationId>>,
    pub list_error: Mutex<Option<TutorError>>,
    pub histories: Mutex<HashMap<String, Vec<Message>>>,
    pub history_error: Mutex<Option<TutorError>>,
    pub replies: Mutex<VecDeque<Result<String>>>,
    pub delete_error: Mutex<Option<TutorError>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn push_reply(&self, reply: Result<String>) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn set_ids(&self, ids: &[&str]) {
        *self.ids.lock().unwrap() = ids.iter().map(|id| ConversationId::new(*id)).collect();
    }

    pub fn set_history(&self, id: &str, messages: Vec<Message>) {
        self.histories.lock().unwrap().insert(id.to_string(), messages);
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn grant(&self, identity: &str) -> Result<AccessGrant> {
        match self.auth_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(AccessGrant {
                access_token: format!("token-for-{identity}"),
                token_type: "bearer".to_string(),
            }),
        }
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn login(&self, identity: &str, _secret: &str) -> Result<AccessGrant> {
        self.record(Call::Login(identity.to_string()));
        self.grant(identity)
    }

    async fn signup(&self, identity: &str, _secret: &str) -> Result<AccessGrant> {
        self.record(Call::Signup(identity.to_string()));
        self.grant(identity)
    }

    async fn list_conversation_ids(&self, session: &Session) -> Result<Vec<ConversationId>> {
        self.record(Call::ListIds {
            token: session.token.clone(),
        });
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.ids.lock().unwrap().clone())
    }

    async fn get_conversation_history(
        &self,
        session: &Session,
        id: Option<&ConversationId>,
    ) -> Result<Vec<Message>> {
        let Some(id) = id.filter(|id| !id.is_blank()) else {
            return Ok(Vec::new());
        };
        self.record(Call::History {
            token: session.token.clone(),
            id: id.to_string(),
        });
        if let Some(err) = self.history_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self
            .histories
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn ask(&self, session: &Session, id: &ConversationId, question: &str) -> Result<String> {
        self.record(Call::Ask {
            token: session.token.clone(),
            id: id.to_string(),
            question: question.to_string(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("echo: {question}")))
    }

    async fn delete_conversation(
        &self,
        session: &Session,
        id: Option<&ConversationId>,
    ) -> Result<()> {
        let Some(id) = id.filter(|id| !id.is_blank()) else {
            return Ok(());
        };
        self.record(Call::Delete {
            token: session.token.clone(),
            id: id.to_string(),
        });
        match self.delete_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub(crate) fn session() -> Session {
    Session::new("tok-123", "a@b.com")
}
