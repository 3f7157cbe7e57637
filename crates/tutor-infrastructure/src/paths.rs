//! Unified path management for tutor configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/tutor/             # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! ├── session.toml             # Persisted session (auth_token, user_email)
//! └── logs/                    # Application logs
//!     └── tutor.log.YYYY-MM-DD
//! ```

use std::path::{Path, PathBuf};

use tutor_core::TutorError;

const APP_DIR: &str = "tutor";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find configuration directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for TutorError {
    fn from(err: PathError) -> Self {
        TutorError::config(err.to_string())
    }
}

/// Resolves every file the client reads or writes.
///
/// A base directory can be supplied to relocate everything (tests, portable
/// installs); otherwise the platform config directory is used.
#[derive(Debug, Clone, Default)]
pub struct TutorPaths {
    base: Option<PathBuf>,
}

impl TutorPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the tutor configuration directory (e.g. `~/.config/tutor/`).
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the persisted session.
    ///
    /// # Security Note
    ///
    /// The file holds a bearer token and is written with 600 permissions on Unix.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }
}
