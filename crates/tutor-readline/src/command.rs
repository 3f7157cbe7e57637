//! Slash command parsing.

use tutor_core::conversation::ConversationId;

/// Every slash command, in the order `/help` lists them.
pub const COMMANDS: &[(&str, &str)] = &[
    ("/new", "start a new conversation"),
    ("/list", "show your conversations"),
    ("/open", "<n|id> open a conversation"),
    ("/menu", "<n> toggle the menu of conversation n"),
    ("/delete", "delete the conversation whose menu is open"),
    ("/logout", "sign out"),
    ("/whoami", "show the signed-in account"),
    ("/help", "show this help"),
    ("/quit", "exit"),
];

/// Which conversation `/open` refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// One-based position in the last printed list
    Position(usize),
    Id(ConversationId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    New,
    List,
    Open(Target),
    Menu(usize),
    Delete,
    Logout,
    Whoami,
    Help,
    Quit,
    /// Anything not starting with `/`
    Message(String),
    /// A malformed command, with the text to show
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let Some(rest) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let argument = parts.next();

        match (name, argument) {
            ("new", None) => Self::New,
            ("list", None) => Self::List,
            ("open", Some(arg)) => Self::Open(match arg.parse::<usize>() {
                Ok(position) if position > 0 => Target::Position(position),
                _ => Target::Id(ConversationId::new(arg)),
            }),
            ("open", None) => Self::Invalid("Usage: /open <n|id>".to_string()),
            ("menu", Some(arg)) => match arg.parse::<usize>() {
                Ok(position) if position > 0 => Self::Menu(position),
                _ => Self::Invalid("Usage: /menu <n>".to_string()),
            },
            ("menu", None) => Self::Invalid("Usage: /menu <n>".to_string()),
            ("delete", None) => Self::Delete,
            ("logout", None) => Self::Logout,
            ("whoami", None) => Self::Whoami,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => Self::Invalid(format!("Unknown command: /{}. Type /help for the list.", rest)),
        }
    }
}
