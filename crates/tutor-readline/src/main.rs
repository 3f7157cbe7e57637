use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use tutor_core::ChatGateway;
use tutor_core::session::{MemorySessionProvider, SessionProvider, SessionStore};
use tutor_infrastructure::logging::init_logging;
use tutor_infrastructure::{ConfigService, FileSessionProvider, TutorPaths};
use tutor_interaction::HttpChatGateway;

mod app;
mod command;
mod helper;
mod render;

use app::App;

#[derive(Parser)]
#[command(name = "tutor-repl")]
#[command(about = "Interactive chat with the Python tutor", long_about = None)]
struct Args {
    /// Base URL of the chatbot API (overrides TUTOR_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    /// Path to an alternate config.toml (overrides TUTOR_CONFIG)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep the session in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,
}

/// Entry point for the interactive REPL.
///
/// 1. Resolves configuration and starts file logging
/// 2. Restores any persisted session
/// 3. Hands over to [`App`], which prompts for sign-in when needed
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let paths = TutorPaths::new(None);
    let config_service = match args.config {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new(&paths)?,
    }
    .with_base_url_override(args.base_url);
    let config = config_service.get_config()?;

    let _guard = match init_logging(&paths, &config.log_level) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("{}", format!("Logging disabled: {}", err).yellow());
            None
        }
    };
    tracing::info!(base_url = %config.base_url, ephemeral = args.ephemeral, "Starting REPL");

    let provider: Arc<dyn SessionProvider> = if args.ephemeral {
        Arc::new(MemorySessionProvider::new())
    } else {
        Arc::new(FileSessionProvider::new(&paths)?)
    };
    let store = SessionStore::restore(provider)?;
    let gateway: Arc<dyn ChatGateway> = Arc::new(HttpChatGateway::from_config(&config)?);

    let mut app = App::new(gateway, store, &config.greeting)?;
    app.run().await
}
