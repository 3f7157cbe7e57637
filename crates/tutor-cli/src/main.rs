use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::ClientContext;

#[derive(Parser)]
#[command(name = "tutor")]
#[command(about = "Tutor CLI - one-shot access to the Python tutoring chatbot", long_about = None)]
struct Cli {
    /// Base URL of the chatbot API
    #[arg(long, global = true, env = "TUTOR_BASE_URL")]
    base_url: Option<String>,

    /// Path to an alternate config.toml
    #[arg(long, global = true, env = "TUTOR_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        /// Account email
        identity: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and sign in with it
    Signup {
        /// Account email
        identity: String,
        #[arg(long)]
        password: String,
        /// The password again
        #[arg(long)]
        confirm: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List your conversations, newest first
    List,
    /// Print a conversation's history
    Show {
        chat_id: String,
    },
    /// Ask a question, in a new conversation unless --chat is given
    Ask {
        /// Continue this conversation
        #[arg(long)]
        chat: Option<String>,
        question: String,
    },
    /// Delete a conversation
    Delete {
        chat_id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut context = ClientContext::load(cli.config, cli.base_url)?;

    match cli.command {
        Commands::Login { identity, password } => {
            commands::auth::login(&mut context, identity, password).await?
        }
        Commands::Signup {
            identity,
            password,
            confirm,
        } => commands::auth::signup(&mut context, identity, password, confirm).await?,
        Commands::Logout => commands::auth::logout(&mut context)?,
        Commands::Whoami => commands::auth::whoami(&context),
        Commands::List => commands::conversation::list(&context).await?,
        Commands::Show { chat_id } => commands::conversation::show(&context, chat_id).await?,
        Commands::Ask { chat, question } => {
            commands::conversation::ask(&context, chat, &question).await?
        }
        Commands::Delete { chat_id, yes } => {
            commands::conversation::delete(&context, chat_id, yes).await?
        }
    }

    Ok(())
}
