//! Narrow persistence contracts for conversations and chat messages.
//!
//! The relational store behind these traits is an external collaborator;
//! the bundled in-memory implementations back the default binary and the
//! test suites.

use crate::sessions::types::{Conversation, StoredMessage};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Persistence contract for conversation records.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Insert or replace a conversation record.
    async fn save(&self, conversation: Conversation);

    /// Look up a conversation by id.
    async fn find_by_id(&self, id: Uuid) -> Option<Conversation>;

    /// List an owner's conversations, most recently active first.
    async fn find_by_owner(&self, owner: &str) -> Vec<Conversation>;

    /// Remove a conversation by id.
    async fn delete_by_id(&self, id: Uuid);
}

/// Persistence contract for stored chat messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Return a conversation's messages in insertion order.
    async fn find_by_conversation_id(&self, id: Uuid) -> Vec<StoredMessage>;
}

/// In-memory conversation store.
#[derive(Default)]
pub struct InMemoryConversationStore {
    records: Arc<RwLock<HashMap<Uuid, Conversation>>>,
}

impl InMemoryConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn save(&self, conversation: Conversation) {
        self.records
            .write()
            .await
            .insert(conversation.id, conversation);
    }

    async fn find_by_id(&self, id: Uuid) -> Option<Conversation> {
        self.records.read().await.get(&id).cloned()
    }

    async fn find_by_owner(&self, owner: &str) -> Vec<Conversation> {
        let mut matching: Vec<Conversation> = self
            .records
            .read()
            .await
            .values()
            .filter(|conversation| conversation.owner.as_deref() == Some(owner))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        matching
    }

    async fn delete_by_id(&self, id: Uuid) {
        self.records.write().await.remove(&id);
    }
}

/// In-memory message store.
#[derive(Default)]
pub struct InMemoryMessageStore {
    messages: Arc<RwLock<HashMap<Uuid, Vec<StoredMessage>>>>,
}

impl InMemoryMessageStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to a conversation's history.
    pub async fn append(&self, id: Uuid, message: StoredMessage) {
        self.messages.write().await.entry(id).or_default().push(message);
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn find_by_conversation_id(&self, id: Uuid) -> Vec<StoredMessage> {
        self.messages
            .read()
            .await
            .get(&id)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_by_owner_sorts_most_recent_first() {
        let store = InMemoryConversationStore::new();

        let mut older = Conversation::new(Some("user@example.org".into()));
        older.last_active = time::OffsetDateTime::now_utc() - time::Duration::hours(2);
        let newer = Conversation::new(Some("user@example.org".into()));
        let foreign = Conversation::new(Some("other@example.org".into()));

        let older_id = older.id;
        let newer_id = newer.id;
        store.save(older).await;
        store.save(newer).await;
        store.save(foreign).await;

        let listed = store.find_by_owner("user@example.org").await;
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer_id);
        assert_eq!(listed[1].id, older_id);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryConversationStore::new();
        let conversation = Conversation::new(None);
        let id = conversation.id;
        store.save(conversation).await;

        store.delete_by_id(id).await;
        assert!(store.find_by_id(id).await.is_none());
    }
}
