//! Filesystem-backed services for the Tutor client: paths, configuration,
//! session persistence and logging.

pub mod config_service;
pub mod logging;
pub mod paths;
pub mod session_provider;
pub mod storage;

pub use config_service::ConfigService;
pub use paths::TutorPaths;
pub use session_provider::FileSessionProvider;
