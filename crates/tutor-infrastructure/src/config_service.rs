//! Configuration service implementation.
//!
//! Loads [`ClientConfig`] from `config.toml`, applies environment and
//! command-line overrides, and caches the result.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tutor_core::Result;
use tutor_core::config::ClientConfig;

use crate::paths::TutorPaths;
use crate::storage::AtomicTomlFile;

pub const CONFIG_PATH_ENV: &str = "TUTOR_CONFIG";
pub const BASE_URL_ENV: &str = "TUTOR_BASE_URL";

/// Configuration service that loads and caches the client configuration.
///
/// Precedence for the base URL: explicit override, then `TUTOR_BASE_URL`,
/// then the file, then the built-in default. A missing file is not created.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    base_url_override: Option<String>,
    /// Cached configuration, filled on first access.
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Resolves the config file from `TUTOR_CONFIG` or the default location.
    pub fn new(paths: &TutorPaths) -> Result<Self> {
        let path = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => paths.config_file()?,
        };
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            base_url_override: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Sets a base URL that wins over both the environment and the file.
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        self.base_url_override = base_url;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading it from file if not cached.
    pub fn get_config(&self) -> Result<ClientConfig> {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let loaded = self.load_config(env::var(BASE_URL_ENV).ok())?;

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(loaded.clone());
        Ok(loaded)
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_config(&self, env_base_url: Option<String>) -> Result<ClientConfig> {
        let mut config = AtomicTomlFile::<ClientConfig>::new(self.path.clone())
            .load()?
            .unwrap_or_default();

        if let Some(base_url) = self
            .base_url_override
            .clone()
            .or(env_base_url)
            .filter(|url| !url.trim().is_empty())
        {
            config = config.with_base_url(base_url);
        }

        config.validate()?;
        tracing::debug!(path = %self.path.display(), base_url = %config.base_url, "Configuration loaded");
        Ok(config)
    }
}
