//! Conversation list provider (the sidebar).

use std::cmp::Reverse;
use std::sync::Arc;

use super::controller::ConversationController;
use super::id::ConversationId;
use crate::error::{Result, TutorError};
use crate::gateway::ChatGateway;
use crate::session::Session;

pub const LOAD_LIST_FAILED: &str = "Could not load conversations.";

/// A conversation as shown in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationEntry {
    pub id: ConversationId,
    pub title: String,
}

impl ConversationEntry {
    pub fn new(id: ConversationId) -> Self {
        let title = id.title();
        Self { id, title }
    }
}

/// A delete the user asked for but has not confirmed yet.
///
/// Only [`ConversationList::request_delete`] creates one, and only
/// [`ConversationList::confirm_delete`] acts on it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a deletion request does nothing until confirmed"]
pub struct DeletionRequest {
    id: ConversationId,
    title: String,
}

impl DeletionRequest {
    pub fn id(&self) -> &ConversationId {
        &self.id
    }

    /// Question to put to the user before deleting.
    pub fn prompt(&self) -> String {
        format!("Really delete this conversation ({})?", self.title)
    }
}

/// The set of conversation ids known for the signed-in user.
///
/// Fetched on first [`sync`](Self::sync) and again whenever the
/// controller's refresh epoch moves. At most one contextual menu is open.
pub struct ConversationList {
    gateway: Arc<dyn ChatGateway>,
    entries: Vec<ConversationEntry>,
    error: Option<String>,
    open_menu: Option<ConversationId>,
    synced_epoch: Option<u64>,
}

impl ConversationList {
    pub fn new(gateway: Arc<dyn ChatGateway>) -> Self {
        Self {
            gateway,
            entries: Vec::new(),
            error: None,
            open_menu: None,
            synced_epoch: None,
        }
    }

    /// Entries, newest first. Ids without a timestamp come last in server order.
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a zero-based position.
    pub fn get(&self, index: usize) -> Option<&ConversationEntry> {
        self.entries.get(index)
    }

    pub fn position(&self, id: &ConversationId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.id == id)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_menu(&self) -> Option<&ConversationId> {
        self.open_menu.as_ref()
    }

    /// Fetches the id set. On failure the list is emptied and a `Load`
    /// error is recorded and returned.
    pub async fn refresh(&mut self, session: &Session) -> Result<()> {
        self.error = None;
        match self.gateway.list_conversation_ids(session).await {
            Ok(ids) => {
                let mut entries: Vec<ConversationEntry> =
                    ids.into_iter().map(ConversationEntry::new).collect();
                entries.sort_by_key(|entry| Reverse(entry.id.timestamp_millis()));
                tracing::debug!(count = entries.len(), "Conversation list refreshed");
                if let Some(open) = &self.open_menu
                    && !entries.iter().any(|entry| &entry.id == open)
                {
                    self.open_menu = None;
                }
                self.entries = entries;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load conversation list");
                self.entries.clear();
                self.open_menu = None;
                let err = TutorError::Load(err.user_message(LOAD_LIST_FAILED));
                self.error = err.inline_message().map(str::to_string);
                Err(err)
            }
        }
    }

    /// Refreshes when `epoch` differs from the last successfully synced one
    /// (or on first use). A failed fetch is retried on the next call.
    ///
    /// Returns whether a fetch happened.
    pub async fn sync(&mut self, session: &Session, epoch: u64) -> Result<bool> {
        if self.synced_epoch == Some(epoch) {
            return Ok(false);
        }
        self.refresh(session).await?;
        self.synced_epoch = Some(epoch);
        Ok(true)
    }

    /// Opens the menu for `id`, closing any other; toggles it closed if
    /// it was already open. Returns whether a menu is now open for `id`.
    pub fn toggle_menu(&mut self, id: &ConversationId) -> bool {
        if self.open_menu.as_ref() == Some(id) {
            self.open_menu = None;
            false
        } else {
            self.open_menu = Some(id.clone());
            true
        }
    }

    pub fn close_menu(&mut self) {
        self.open_menu = None;
    }

    /// Selects `id` for display. Closes any open menu and loads the
    /// conversation into `controller`.
    pub async fn select(
        &mut self,
        controller: &mut ConversationController,
        session: &Session,
        id: ConversationId,
    ) -> Result<()> {
        self.close_menu();
        controller.select_conversation(session, id).await
    }

    /// Starts the delete action for the item whose menu is open.
    pub fn request_delete(&self) -> Option<DeletionRequest> {
        let id = self.open_menu.as_ref()?;
        let title = self
            .entries
            .iter()
            .find(|entry| &entry.id == id)
            .map(|entry| entry.title.clone())
            .unwrap_or_else(|| id.title());
        Some(DeletionRequest {
            id: id.clone(),
            title,
        })
    }

    /// Performs a confirmed delete through the controller and closes the menu.
    ///
    /// Only a failed delete is an error. Once the server has confirmed it,
    /// the list is resynced; a failed resync is left in [`error`](Self::error)
    /// and retried on the next [`sync`](Self::sync).
    pub async fn confirm_delete(
        &mut self,
        request: DeletionRequest,
        controller: &mut ConversationController,
        session: &Session,
    ) -> Result<()> {
        self.close_menu();
        controller.delete_conversation(session, &request.id).await?;
        if let Err(err) = self.sync(session, controller.refresh_epoch()).await {
            tracing::warn!(conversation = %request.id, error = %err, "List not refreshed after delete");
        }
        Ok(())
    }
}
