//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the authenticated identity context (`Session`)
//! - `provider`: persistence interface for the session (`SessionProvider`)
//! - `store`: the Anonymous/Authenticated state machine (`SessionStore`)

mod model;
mod provider;
mod store;

pub use model::{AccessGrant, Session};
pub use provider::{MemorySessionProvider, SessionProvider};
pub use store::{AuthState, SessionStore};
