pub mod auth;
pub mod conversation;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tutor_core::ChatGateway;
use tutor_core::config::ClientConfig;
use tutor_core::session::{Session, SessionStore};
use tutor_infrastructure::logging::{WorkerGuard, init_logging};
use tutor_infrastructure::{ConfigService, FileSessionProvider, TutorPaths};
use tutor_interaction::HttpChatGateway;

/// Everything a command needs: configuration, the gateway and the
/// restored session.
pub struct ClientContext {
    pub config: ClientConfig,
    pub gateway: Arc<dyn ChatGateway>,
    pub store: SessionStore,
    _log_guard: Option<WorkerGuard>,
}

impl ClientContext {
    pub fn load(config_path: Option<PathBuf>, base_url: Option<String>) -> Result<Self> {
        let paths = TutorPaths::new(None);
        let config = match config_path {
            Some(path) => ConfigService::with_path(path),
            None => ConfigService::new(&paths)?,
        }
        .with_base_url_override(base_url)
        .get_config()?;

        // A CLI run still works without a log file.
        let log_guard = init_logging(&paths, &config.log_level).ok();

        let provider = Arc::new(FileSessionProvider::new(&paths)?);
        let store = SessionStore::restore(provider)?;
        let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::from_config(&config)?);

        Ok(Self {
            config,
            gateway,
            store,
            _log_guard: log_guard,
        })
    }

    /// The session, or an error telling the user to sign in.
    pub fn session(&self) -> Result<Session> {
        self.store
            .require()
            .cloned()
            .context("Run `tutor login <email> --password <password>` first")
    }
}
