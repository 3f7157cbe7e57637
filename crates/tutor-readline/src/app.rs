//! The interactive session: sign-in prompts, the conversation view and
//! the slash commands that drive the list.

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use tutor_core::auth::{Credentials, SignupForm};
use tutor_core::conversation::{ConversationController, ConversationList, Message, MessageRole};
use tutor_core::session::{Session, SessionStore};
use tutor_core::{ChatGateway, TutorError};

use crate::command::{COMMANDS, Command, Target};
use crate::helper::CliHelper;
use crate::render::render_markdown;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// What the sign-in prompt produced.
enum SignIn {
    Done,
    Quit,
}

/// What a command asks the main loop to do next.
enum Flow {
    Continue,
    SignedOut,
    Quit,
}

pub struct App {
    editor: Editor<CliHelper, DefaultHistory>,
    gateway: Arc<dyn ChatGateway>,
    store: SessionStore,
    controller: ConversationController,
    list: ConversationList,
}

impl App {
    pub fn new(gateway: Arc<dyn ChatGateway>, store: SessionStore, greeting: &str) -> Result<Self> {
        let mut editor: Editor<CliHelper, DefaultHistory> = Editor::new()?;
        editor.set_helper(Some(CliHelper::new()));

        Ok(Self {
            editor,
            controller: ConversationController::new(gateway.clone(), greeting),
            list: ConversationList::new(gateway.clone()),
            gateway,
            store,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("{}", "=== Tutor ===".bright_magenta().bold());

        loop {
            if !self.store.is_authenticated() {
                match self.sign_in().await? {
                    SignIn::Done => {}
                    SignIn::Quit => break,
                }
            }

            self.on_signed_in().await;

            match self.conversation_loop().await? {
                Flow::SignedOut => continue,
                Flow::Quit | Flow::Continue => break,
            }
        }

        println!("{}", "Goodbye!".bright_green());
        Ok(())
    }

    // ============================================================================
    // Sign-in
    // ============================================================================

    async fn sign_in(&mut self) -> Result<SignIn> {
        println!(
            "{}",
            "Sign in to continue. Type /signup to create an account, /quit to exit.".bright_black()
        );
        let mut signup = false;

        loop {
            let label = if signup { "signup" } else { "login" };
            let Some(identity) = self.prompt(&format!("[{}] email: ", label))? else {
                return Ok(SignIn::Quit);
            };
            match identity.trim() {
                "/quit" | "/exit" => return Ok(SignIn::Quit),
                "/signup" | "/login" => {
                    signup = !signup;
                    let mode = if signup { "Creating a new account." } else { "Signing in." };
                    println!("{}", mode.bright_black());
                    continue;
                }
                _ => {}
            }

            let Some(secret) = self.prompt(&format!("[{}] password: ", label))? else {
                return Ok(SignIn::Quit);
            };

            let result = if signup {
                let Some(confirmation) = self.prompt("[signup] confirm password: ")? else {
                    return Ok(SignIn::Quit);
                };
                let form = SignupForm::new(identity, secret, confirmation);
                with_busy("Creating account", self.store.signup(self.gateway.as_ref(), form))
                    .await
                    .map(|session| session.user_identity.clone())
            } else {
                let credentials = Credentials::new(identity, secret);
                with_busy("Signing in", self.store.login(self.gateway.as_ref(), credentials))
                    .await
                    .map(|session| session.user_identity.clone())
            };

            match result {
                Ok(user) => {
                    println!("{}", format!("Signed in as {}", user).bright_green());
                    return Ok(SignIn::Done);
                }
                Err(err) => report(&err),
            }
        }
    }

    async fn on_signed_in(&mut self) {
        self.controller.start_new_conversation();
        self.list = ConversationList::new(self.gateway.clone());
        self.sync_list().await;
        if let Some(user) = self.store.session().map(|s| s.user_identity.clone()) {
            tracing::info!(user = %user, "REPL session started");
        }
        println!("{}", "Type a question, or /help for commands.".bright_black());
        println!();
        self.print_messages();
    }

    // ============================================================================
    // Conversation
    // ============================================================================

    async fn conversation_loop(&mut self) -> Result<Flow> {
        loop {
            let Some(line) = self.prompt(">> ")? else {
                return Ok(Flow::Quit);
            };
            if line.trim().is_empty() {
                continue;
            }
            let _ = self.editor.add_history_entry(line.as_str());

            match self.dispatch(Command::parse(&line)).await? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }
    }

    async fn dispatch(&mut self, command: Command) -> Result<Flow> {
        let session = match self.store.require() {
            Ok(session) => session.clone(),
            Err(_) => return Ok(Flow::SignedOut),
        };

        match command {
            Command::Message(text) => self.send(&session, &text).await,
            Command::New => {
                self.list.close_menu();
                self.controller.start_new_conversation();
                self.print_messages();
            }
            Command::List => {
                self.sync_list().await;
                self.print_list();
            }
            Command::Open(target) => self.open(&session, target).await,
            Command::Menu(position) => self.toggle_menu(position),
            Command::Delete => self.delete(&session).await?,
            Command::Logout => {
                if let Err(err) = self.store.logout() {
                    report(&err);
                }
                self.controller.start_new_conversation();
                self.list = ConversationList::new(self.gateway.clone());
                println!("{}", "Signed out.".bright_green());
                return Ok(Flow::SignedOut);
            }
            Command::Whoami => {
                println!("{}", format!("Signed in as {}", session.user_identity).bright_black());
            }
            Command::Help => print_help(),
            Command::Quit => return Ok(Flow::Quit),
            Command::Invalid(message) => println!("{}", message.yellow()),
        }
        Ok(Flow::Continue)
    }

    async fn send(&mut self, session: &Session, text: &str) {
        println!("{}", format!("> {}", text).green());
        let result = with_busy("Thinking", self.controller.send_message(session, text)).await;
        match result {
            Ok(outcome) => {
                print_message(&outcome.reply);
                if outcome.created {
                    tracing::debug!(conversation = %outcome.conversation_id, "New conversation stored");
                    self.sync_list().await;
                }
            }
            Err(err) => report(&err),
        }
    }

    async fn open(&mut self, session: &Session, target: Target) {
        let id = match target {
            Target::Id(id) => id,
            Target::Position(position) => match self.list.get(position - 1) {
                Some(entry) => entry.id.clone(),
                None => {
                    println!("{}", format!("No conversation #{}. Try /list.", position).yellow());
                    return;
                }
            },
        };

        let result = with_busy(
            "Loading",
            self.list.select(&mut self.controller, session, id),
        )
        .await;
        if let Err(err) = result {
            report(&err);
        }
        self.print_messages();
    }

    fn toggle_menu(&mut self, position: usize) {
        let Some(entry) = self.list.get(position - 1) else {
            println!("{}", format!("No conversation #{}. Try /list.", position).yellow());
            return;
        };
        let id = entry.id.clone();
        let title = entry.title.clone();
        if self.list.toggle_menu(&id) {
            println!("{}", format!("Menu for {}: /delete", title).bright_black());
        } else {
            println!("{}", "Menu closed.".bright_black());
        }
    }

    async fn delete(&mut self, session: &Session) -> Result<()> {
        let Some(request) = self.list.request_delete() else {
            println!("{}", "Open a conversation's menu first with /menu <n>.".yellow());
            return Ok(());
        };

        let answer = self.prompt(&format!("{} [y/N] ", request.prompt()))?;
        let confirmed = answer
            .map(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false);
        if !confirmed {
            self.list.close_menu();
            println!("{}", "Cancelled.".bright_black());
            return Ok(());
        }

        let was_active = self.controller.active_id() == Some(request.id());
        let result = with_busy(
            "Deleting",
            self.list.confirm_delete(request, &mut self.controller, session),
        )
        .await;
        match result {
            Ok(()) => {
                println!("{}", "Deleted.".bright_green());
                if let Some(error) = self.list.error() {
                    eprintln!("{}", error.red());
                }
                if was_active {
                    self.print_messages();
                }
            }
            Err(err) => report(&err),
        }
        Ok(())
    }

    async fn sync_list(&mut self) {
        let Some(session) = self.store.session().cloned() else {
            return;
        };
        let epoch = self.controller.refresh_epoch();
        if let Err(err) = with_busy("Loading conversations", self.list.sync(&session, epoch)).await {
            report(&err);
        }
    }

    // ============================================================================
    // Output
    // ============================================================================

    fn print_list(&self) {
        if let Some(error) = self.list.error() {
            println!("{}", error.red());
            return;
        }
        if self.list.is_empty() {
            println!("{}", "No conversations yet.".bright_black());
            return;
        }

        let active = self.controller.active_id();
        let open_menu = self.list.open_menu();
        for (index, entry) in self.list.entries().iter().enumerate() {
            let marker = if active == Some(&entry.id) { "*" } else { " " };
            let mut line = format!("{} {:>2}. {}", marker, index + 1, entry.title);
            if open_menu == Some(&entry.id) {
                line.push_str(&format!("  {}", "[menu: /delete]".bright_black()));
            }
            if active == Some(&entry.id) {
                println!("{}", line.bright_cyan());
            } else {
                println!("{}", line);
            }
        }
    }

    fn print_messages(&self) {
        for message in self.controller.messages() {
            print_message(message);
        }
    }

    /// Reads one line. `None` means end of input.
    fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        loop {
            match self.editor.readline(prompt) {
                Ok(line) => return Ok(Some(line)),
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "CTRL-C detected. Type /quit to exit.".yellow());
                }
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err.into()),
            }
        }
    }
}

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{} {}", "you ›".green().bold(), message.content),
        MessageRole::Assistant => {
            println!("{}", "tutor ›".bright_blue().bold());
            println!("{}", render_markdown(&message.content));
        }
    }
    println!();
}

fn print_help() {
    for (name, description) in COMMANDS {
        println!("  {:<10} {}", name.bright_cyan(), description.bright_black());
    }
    println!("{}", "  Anything else is sent as a message.".bright_black());
}

fn report(err: &TutorError) {
    let message = err
        .inline_message()
        .map(str::to_string)
        .unwrap_or_else(|| err.to_string());
    eprintln!("{}", message.red());
}

/// Awaits `future` while a spinner runs on the current line. Input is
/// not read until it resolves.
async fn with_busy<F: Future>(label: &str, future: F) -> F::Output {
    let label = label.to_string();
    let spinner = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(120));
        let mut frame = 0;
        loop {
            interval.tick().await;
            print!("\r{} {}", SPINNER[frame % SPINNER.len()], label.bright_black());
            let _ = std::io::stdout().flush();
            frame += 1;
        }
    });

    let output = future.await;
    spinner.abort();
    let _ = spinner.await;
    print!("\r\x1b[2K");
    let _ = std::io::stdout().flush();
    output
}
