//! The session state machine.

use std::sync::Arc;

use super::model::Session;
use super::provider::SessionProvider;
use crate::auth::{Credentials, SignupForm};
use crate::error::{Result, TutorError};
use crate::gateway::ChatGateway;

pub const LOGIN_FAILED: &str = "Could not sign in.";
pub const SIGNUP_FAILED: &str = "Could not create the account.";

/// Whether a session is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(Session),
}

/// Holds the session for the lifetime of the client and mirrors it into
/// the injected [`SessionProvider`].
///
/// Transitions:
/// - `Anonymous -> Authenticated` on a successful [`login`](Self::login) or
///   [`signup`](Self::signup)
/// - `Authenticated -> Anonymous` on [`logout`](Self::logout)
///
/// A token the server has revoked is not detected here. The failing call
/// reports the error and the store stays `Authenticated`.
pub struct SessionStore {
    provider: Arc<dyn SessionProvider>,
    state: AuthState,
}

impl SessionStore {
    /// Creates an Anonymous store without reading the provider.
    pub fn new(provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            provider,
            state: AuthState::Anonymous,
        }
    }

    /// Creates a store from whatever the provider has persisted.
    ///
    /// The token is trusted as-is; it is not checked against the server.
    pub fn restore(provider: Arc<dyn SessionProvider>) -> Result<Self> {
        let state = match provider.read()? {
            Some(session) => {
                tracing::info!(user = %session.user_identity, "Restored persisted session");
                AuthState::Authenticated(session)
            }
            None => AuthState::Anonymous,
        };
        Ok(Self { provider, state })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.state {
            AuthState::Authenticated(session) => Some(session),
            AuthState::Anonymous => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    /// The session, or [`TutorError::Unauthenticated`] when signed out.
    pub fn require(&self) -> Result<&Session> {
        self.session().ok_or(TutorError::Unauthenticated)
    }

    /// Signs in with `credentials`.
    ///
    /// Validation failures are returned before any request is made. A
    /// rejected login leaves the state unchanged.
    pub async fn login(
        &mut self,
        gateway: &dyn ChatGateway,
        credentials: Credentials,
    ) -> Result<&Session> {
        let credentials = credentials.validate_login()?;
        let grant = gateway
            .login(&credentials.identity, &credentials.secret)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Login rejected");
                TutorError::Auth(err.user_message(LOGIN_FAILED))
            })?;
        self.authenticate(Session::new(grant.access_token, credentials.identity));
        self.require()
    }

    /// Registers a new account and signs in with it.
    ///
    /// A mismatched confirmation or a short secret is rejected without a request.
    pub async fn signup(&mut self, gateway: &dyn ChatGateway, form: SignupForm) -> Result<&Session> {
        let credentials = form.validate()?;
        let grant = gateway
            .signup(&credentials.identity, &credentials.secret)
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "Signup rejected");
                TutorError::Auth(err.user_message(SIGNUP_FAILED))
            })?;
        self.authenticate(Session::new(grant.access_token, credentials.identity));
        self.require()
    }

    /// Clears the session both in memory and in the provider.
    ///
    /// The in-memory state is cleared even if the provider fails; the
    /// provider error is still returned.
    pub fn logout(&mut self) -> Result<()> {
        self.state = AuthState::Anonymous;
        tracing::info!("Signed out");
        self.provider.clear()
    }

    fn authenticate(&mut self, session: Session) {
        // Persistence is best-effort: the session still lives for this run.
        if let Err(err) = self.provider.write(&session) {
            tracing::warn!(error = %err, "Failed to persist session");
        }
        tracing::info!(user = %session.user_identity, "Signed in");
        self.state = AuthState::Authenticated(session);
    }
}
