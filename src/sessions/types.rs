//! Conversation records and session errors.

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

/// Placeholder title stamped on a freshly created conversation.
pub const TITLE_SENTINEL: &str = "...";

/// One conversational session owned by a caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Opaque unique identifier.
    pub id: Uuid,
    /// Display title; starts as [`TITLE_SENTINEL`] until generated.
    pub title: String,
    /// Creation instant.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Most recent activity instant, drives list ordering.
    #[serde(with = "time::serde::rfc3339")]
    pub last_active: OffsetDateTime,
    /// Resolved owner identity; `None` for anonymous deployments.
    pub owner: Option<String>,
}

impl Conversation {
    /// Build a new conversation with the sentinel title.
    pub fn new(owner: Option<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: Uuid::new_v4(),
            title: TITLE_SENTINEL.to_string(),
            created_at: now,
            last_active: now,
            owner,
        }
    }
}

/// One stored chat message inside a conversation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    /// Message author role (`user`/`assistant`).
    pub role: String,
    /// Message body.
    pub content: String,
    /// Instant the message was recorded.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Errors surfaced by session operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// No conversation exists with the requested id.
    #[error("conversation not found")]
    NotFound,
    /// Caller identity is missing or does not match the stored owner.
    #[error("caller is not the conversation owner")]
    Forbidden,
}
