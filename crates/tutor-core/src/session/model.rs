//! Session domain model.

use serde::{Deserialize, Serialize};

/// The authenticated identity context for the current client run.
///
/// Holding a `Session` is what allows token-bearing calls to be made; the
/// gateway takes one by reference for every call except login and signup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token issued by the remote service
    pub token: String,
    /// Identity the user signed in with (an email address)
    pub user_identity: String,
}

impl Session {
    pub fn new(token: impl Into<String>, user_identity: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_identity: user_identity.into(),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user_identity", &self.user_identity)
            .finish()
    }
}

/// Token payload returned by the login and signup endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl std::fmt::Debug for AccessGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessGrant")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}
