//! In-process multicast of conversation lifecycle events.
//!
//! The bus wraps a bounded `tokio::sync::broadcast` channel: publishing
//! never blocks, every subscriber opened before a publish receives it, and
//! a subscriber that falls behind the channel capacity skips the missed
//! events instead of stalling producers. There is no replay for late
//! subscribers.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Lifecycle events broadcast to connected clients.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ConversationEvent {
    /// A conversation received its generated title.
    #[serde(rename = "conversationTitleUpdated", rename_all = "camelCase")]
    TitleUpdated {
        /// Identifier of the retitled conversation.
        conversation_id: Uuid,
        /// Final persisted title.
        title: String,
    },
    /// A conversation was deleted by its owner.
    #[serde(rename = "conversationDeleted", rename_all = "camelCase")]
    Deleted {
        /// Identifier of the removed conversation.
        conversation_id: Uuid,
    },
}

impl ConversationEvent {
    /// Wire tag used as the SSE event name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::TitleUpdated { .. } => "conversationTitleUpdated",
            Self::Deleted { .. } => "conversationDeleted",
        }
    }
}

/// Handle to the process-wide conversation event channel.
#[derive(Clone)]
pub struct ConversationEvents {
    sender: broadcast::Sender<ConversationEvent>,
}

impl ConversationEvents {
    /// Create a bus with the given per-subscriber buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// Delivery is best-effort; publishing with no subscribers is not an
    /// error.
    pub fn publish(&self, event: ConversationEvent) {
        let delivered = self.sender.send(event.clone()).unwrap_or(0);
        tracing::debug!(event = event.tag(), subscribers = delivered, "Published event");
    }

    /// Open a new subscription receiving every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.sender.subscribe()
    }
}
