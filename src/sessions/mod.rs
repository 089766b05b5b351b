//! Conversation session lifecycle and persistence contracts.

mod service;
mod store;
mod types;

pub use service::SessionService;
pub use store::{
    ConversationStore, InMemoryConversationStore, InMemoryMessageStore, MessageStore,
};
pub use types::{Conversation, SessionError, StoredMessage, TITLE_SENTINEL};
