//! Client-side checks applied to login and signup forms.
//!
//! Everything here runs before a request is built, so a rejected form never
//! reaches the network.

use crate::error::{Result, TutorError};

/// Minimum secret length accepted at signup, counted in characters.
pub const MIN_SECRET_LENGTH: usize = 8;

pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match.";
pub const SECRET_TOO_SHORT: &str = "Password must be at least 8 characters long.";
pub const IDENTITY_REQUIRED: &str = "Email is required.";
pub const SECRET_REQUIRED: &str = "Password is required.";

/// An identity/secret pair ready to be sent to the login or signup endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identity: String,
    pub secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn new(identity: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
        }
    }

    /// Checks a login form. Identity is trimmed; the secret is sent as typed.
    pub fn validate_login(mut self) -> Result<Self> {
        self.identity = self.identity.trim().to_string();
        if self.identity.is_empty() {
            return Err(TutorError::validation(IDENTITY_REQUIRED));
        }
        if self.secret.is_empty() {
            return Err(TutorError::validation(SECRET_REQUIRED));
        }
        Ok(self)
    }
}

/// The signup form: credentials plus the secret typed a second time.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub identity: String,
    pub secret: String,
    pub confirmation: String,
}

impl std::fmt::Debug for SignupForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupForm")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl SignupForm {
    pub fn new(
        identity: impl Into<String>,
        secret: impl Into<String>,
        confirmation: impl Into<String>,
    ) -> Self {
        Self {
            identity: identity.into(),
            secret: secret.into(),
            confirmation: confirmation.into(),
        }
    }

    /// Validates the form and yields the credentials to register.
    ///
    /// The confirmation check runs before the length check.
    pub fn validate(self) -> Result<Credentials> {
        let identity = self.identity.trim().to_string();
        if identity.is_empty() {
            return Err(TutorError::validation(IDENTITY_REQUIRED));
        }
        if self.secret != self.confirmation {
            return Err(TutorError::validation(PASSWORDS_DO_NOT_MATCH));
        }
        if self.secret.chars().count() < MIN_SECRET_LENGTH {
            return Err(TutorError::validation(SECRET_TOO_SHORT));
        }
        Ok(Credentials {
            identity,
            secret: self.secret,
        })
    }
}
