//! File-backed session persistence.
//!
//! The session is kept in `session.toml` under two fixed keys:
//!
//! ```toml
//! auth_token = "..."
//! user_email = "a@b.com"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tutor_core::Result;
use tutor_core::session::{Session, SessionProvider};

use crate::paths::TutorPaths;
use crate::storage::AtomicTomlFile;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_email: Option<String>,
}

/// [`SessionProvider`] persisting to a private TOML file.
pub struct FileSessionProvider {
    file: AtomicTomlFile<StoredSession>,
}

impl FileSessionProvider {
    /// Uses the default `session.toml` location.
    pub fn new(paths: &TutorPaths) -> Result<Self> {
        Ok(Self::with_path(paths.session_file()?))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path).private(),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl SessionProvider for FileSessionProvider {
    fn read(&self) -> Result<Option<Session>> {
        let Some(stored) = self.file.load()? else {
            return Ok(None);
        };
        // Both keys are needed; a half-written session counts as signed out.
        match (stored.auth_token, stored.user_email) {
            (Some(token), Some(email)) if !token.is_empty() && !email.is_empty() => {
                Ok(Some(Session::new(token, email)))
            }
            _ => {
                tracing::debug!(path = %self.path().display(), "Ignoring incomplete session file");
                Ok(None)
            }
        }
    }

    fn write(&self, session: &Session) -> Result<()> {
        self.file.save(&StoredSession {
            auth_token: Some(session.token.clone()),
            user_email: Some(session.user_identity.clone()),
        })?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        Ok(())
    }
}
