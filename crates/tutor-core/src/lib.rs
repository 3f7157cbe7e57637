//! Domain core of the Tutor chat client.
//!
//! Holds the session state machine, the conversation lifecycle and the
//! traits the outer crates implement (`ChatGateway`, `SessionProvider`).
//! Nothing in this crate performs I/O on its own.

pub mod auth;
pub mod config;
pub mod conversation;
pub mod error;
pub mod gateway;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{Result, TutorError};
pub use gateway::ChatGateway;
