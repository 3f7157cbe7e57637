//! HttpChatGateway - REST implementation of `ChatGateway`.
//!
//! Endpoints (relative to the configured base URL):
//!
//! | Call | Request |
//! |---|---|
//! | login | `POST /users/login` (form: username, password) |
//! | signup | `POST /users/signup` (JSON: username, password) |
//! | list ids | `GET /history/ids` |
//! | history | `GET /history/{chat_id}` |
//! | ask | `POST /ask` (JSON: chat_id, question) |
//! | delete | `DELETE /history/{chat_id}` |
//!
//! Every call but login and signup carries `Authorization: Bearer <token>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tutor_core::config::ClientConfig;
use tutor_core::conversation::{ConversationId, Message};
use tutor_core::gateway::ChatGateway;
use tutor_core::session::{AccessGrant, Session};
use tutor_core::{Result, TutorError};

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    chat_id: &'a str,
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatIdsResponse {
    #[serde(default)]
    chat_ids: Vec<ConversationId>,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<Message>,
}

/// The service spells this field `reponse`.
#[derive(Debug, Deserialize)]
struct AskResponse {
    #[serde(alias = "response")]
    reponse: String,
}

/// Gateway talking to the chatbot API over HTTP.
#[derive(Clone)]
pub struct HttpChatGateway {
    client: Client,
    base_url: Url,
}

impl HttpChatGateway {
    /// Creates a gateway for `base_url` with the HTTP client's default timeouts.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    /// Creates a gateway from the client configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::build(
            &config.base_url,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| TutorError::config(format!("Invalid base_url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(TutorError::config(format!("Invalid base_url '{}'", base_url)));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TutorError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        request.bearer_auth(&session.token)
    }

    /// Sends the request and turns a failure status into `TutorError::Remote`.
    async fn execute(&self, request: RequestBuilder, operation: &str) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(operation, error = %e, "Request failed");
            TutorError::remote(e.status().map(|s| s.as_u16()), None)
        })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(operation, status = status.as_u16(), "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);
        tracing::warn!(operation, status = status.as_u16(), detail = ?detail, "Service returned an error");
        Err(TutorError::remote(Some(status.as_u16()), detail))
    }

    async fn decode<T: DeserializeOwned>(response: Response, operation: &str) -> Result<T> {
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|e| {
            tracing::warn!(operation, error = %e, "Failed to parse response");
            TutorError::remote(Some(status), None)
        })
    }
}

/// Pulls the human-readable `detail` out of an error body.
///
/// `detail` is either a string or a list of validation entries carrying `msg`.
fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Array(entries) => {
            let messages: Vec<&str> = entries
                .iter()
                .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        _ => None,
    }
}

fn usable(id: Option<&ConversationId>) -> Option<&ConversationId> {
    id.filter(|id| !id.is_blank())
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn login(&self, identity: &str, secret: &str) -> Result<AccessGrant> {
        let request = self
            .client
            .post(self.endpoint(&["users", "login"]))
            .form(&[("username", identity), ("password", secret)]);
        let response = self.execute(request, "login").await?;
        Self::decode(response, "login").await
    }

    async fn signup(&self, identity: &str, secret: &str) -> Result<AccessGrant> {
        let request = self
            .client
            .post(self.endpoint(&["users", "signup"]))
            .json(&SignupRequest {
                username: identity,
                password: secret,
            });
        let response = self.execute(request, "signup").await?;
        Self::decode(response, "signup").await
    }

    async fn list_conversation_ids(&self, session: &Session) -> Result<Vec<ConversationId>> {
        let request = self.authorized(self.client.get(self.endpoint(&["history", "ids"])), session);
        let response = self.execute(request, "list_ids").await?;
        let body: ChatIdsResponse = Self::decode(response, "list_ids").await?;
        Ok(body.chat_ids)
    }

    async fn get_conversation_history(
        &self,
        session: &Session,
        id: Option<&ConversationId>,
    ) -> Result<Vec<Message>> {
        let Some(id) = usable(id) else {
            return Ok(Vec::new());
        };
        let request = self.authorized(
            self.client.get(self.endpoint(&["history", id.as_str()])),
            session,
        );
        let response = self.execute(request, "history").await?;
        let body: HistoryResponse = Self::decode(response, "history").await?;
        Ok(body.history)
    }

    async fn ask(&self, session: &Session, id: &ConversationId, question: &str) -> Result<String> {
        let request = self.authorized(
            self.client.post(self.endpoint(&["ask"])).json(&AskRequest {
                chat_id: id.as_str(),
                question,
            }),
            session,
        );
        let response = self.execute(request, "ask").await?;
        let body: AskResponse = Self::decode(response, "ask").await?;
        Ok(body.reponse)
    }

    async fn delete_conversation(
        &self,
        session: &Session,
        id: Option<&ConversationId>,
    ) -> Result<()> {
        let Some(id) = usable(id) else {
            return Ok(());
        };
        let request = self.authorized(
            self.client.delete(self.endpoint(&["history", id.as_str()])),
            session,
        );
        self.execute(request, "delete").await?;
        Ok(())
    }
}
