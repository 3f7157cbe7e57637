//! Session persistence interface.

use std::sync::{Arc, Mutex};

use super::model::Session;
use crate::error::{Result, TutorError};

/// Storage for the session across client runs.
///
/// Injected into [`SessionStore`](super::SessionStore) so that nothing else
/// reads or writes persisted credentials.
///
/// # Security Note
///
/// Implementations should never log the token.
pub trait SessionProvider: Send + Sync {
    /// Reads the persisted session.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: both token and identity are present
    /// - `Ok(None)`: nothing (or only part of a session) is stored
    /// - `Err(_)`: storage could not be read
    fn read(&self) -> Result<Option<Session>>;

    /// Persists the session, replacing any previous one.
    fn write(&self, session: &Session) -> Result<()>;

    /// Removes the persisted session. Clearing an empty store is not an error.
    fn clear(&self) -> Result<()>;
}

/// In-process provider. Nothing survives the process.
#[derive(Debug, Default, Clone)]
pub struct MemorySessionProvider {
    slot: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider that already holds `session`.
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(session))),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<Session>>> {
        self.slot
            .lock()
            .map_err(|_| TutorError::io("session slot poisoned"))
    }
}

impl SessionProvider for MemorySessionProvider {
    fn read(&self) -> Result<Option<Session>> {
        Ok(self.lock()?.clone())
    }

    fn write(&self, session: &Session) -> Result<()> {
        *self.lock()? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.lock()? = None;
        Ok(())
    }
}
