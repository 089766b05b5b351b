//! Session lifecycle and ownership-scoped authorization.

use crate::events::{ConversationEvent, ConversationEvents};
use crate::sessions::store::{ConversationStore, MessageStore};
use crate::sessions::types::{Conversation, SessionError, StoredMessage};
use std::sync::Arc;
use uuid::Uuid;

/// Creates, lists, authorizes, and deletes conversation records.
///
/// Every operation except [`SessionService::create`] fails closed: a missing
/// caller identity or an ownership mismatch yields an empty result or a
/// forbidden error before any data is read or mutated.
pub struct SessionService {
    conversations: Arc<dyn ConversationStore>,
    messages: Arc<dyn MessageStore>,
    events: ConversationEvents,
}

impl SessionService {
    /// Wire the service to its persistence collaborators and the event bus.
    pub fn new(
        conversations: Arc<dyn ConversationStore>,
        messages: Arc<dyn MessageStore>,
        events: ConversationEvents,
    ) -> Self {
        Self {
            conversations,
            messages,
            events,
        }
    }

    /// Create a new conversation stamped with the resolved owner.
    ///
    /// Always succeeds; anonymous deployments leave the owner unset.
    pub async fn create(&self, owner: Option<String>) -> Uuid {
        let conversation = Conversation::new(owner);
        let id = conversation.id;
        self.conversations.save(conversation).await;
        tracing::info!(conversation = %id, "Created conversation");
        id
    }

    /// List the caller's conversations, most recently active first.
    ///
    /// Anonymous callers see an empty list.
    pub async fn list(&self, owner: Option<&str>) -> Vec<Conversation> {
        match owner {
            Some(owner) => self.conversations.find_by_owner(owner).await,
            None => Vec::new(),
        }
    }

    /// Fetch a conversation's stored messages.
    ///
    /// Any authorization failure (missing identity, unknown id, or ownership
    /// mismatch) yields an empty list rather than an error.
    pub async fn messages(&self, id: Uuid, owner: Option<&str>) -> Vec<StoredMessage> {
        let Some(conversation) = self.conversations.find_by_id(id).await else {
            return Vec::new();
        };
        if !is_owner(&conversation, owner) {
            return Vec::new();
        }
        self.messages.find_by_conversation_id(id).await
    }

    /// Delete a conversation after verifying ownership.
    ///
    /// Publishes [`ConversationEvent::Deleted`] only after a successful
    /// removal.
    pub async fn delete(&self, id: Uuid, owner: Option<&str>) -> Result<(), SessionError> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await
            .ok_or(SessionError::NotFound)?;
        if !is_owner(&conversation, owner) {
            return Err(SessionError::Forbidden);
        }

        self.conversations.delete_by_id(id).await;
        self.events.publish(ConversationEvent::Deleted {
            conversation_id: id,
        });
        tracing::info!(conversation = %id, "Deleted conversation");
        Ok(())
    }

    /// Load a conversation the caller owns.
    pub async fn authorized(
        &self,
        id: Uuid,
        owner: Option<&str>,
    ) -> Result<Conversation, SessionError> {
        let conversation = self
            .conversations
            .find_by_id(id)
            .await
            .ok_or(SessionError::NotFound)?;
        if !is_owner(&conversation, owner) {
            return Err(SessionError::Forbidden);
        }
        Ok(conversation)
    }
}

/// Ownership check shared by all scoped operations.
fn is_owner(conversation: &Conversation, owner: Option<&str>) -> bool {
    match (conversation.owner.as_deref(), owner) {
        (Some(stored), Some(caller)) => stored == caller,
        _ => false,
    }
}
