//! Types and errors for the vector sink collaborator.

use crate::extract::ScriptTag;
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors raised while talking to the vector indexing service.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The configured base URL could not be parsed.
    #[error("Invalid sink URL: {0}")]
    InvalidUrl(String),
    /// Transport-level failure reaching the sink.
    #[error("Sink request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The sink answered with a non-success status.
    #[error("Sink returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the sink.
        status: reqwest::StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
}

/// One tagged text fragment handed to the vector store.
///
/// Created per non-blank page or paragraph; immutable once built.
#[derive(Debug, Clone, Serialize)]
pub struct ContentUnit {
    /// Cleaned page or paragraph text.
    pub text: String,
    /// Declared filename of the source document.
    pub filename: String,
    /// Dominant-script label (`he`/`en`) detected for the document.
    pub language: ScriptTag,
    /// Resolved owner identity, when the caller is authenticated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Distinct indexed document as reported by the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct DocumentInfo {
    /// Source filename stored with the vectors.
    pub filename: String,
    /// Dominant-script label stored with the vectors.
    pub language: String,
}

/// Narrow contract of the external vector indexing service.
#[async_trait]
pub trait VectorSink: Send + Sync {
    /// Hand one document's content units to the sink in a single call.
    async fn accept(&self, units: Vec<ContentUnit>) -> Result<(), SinkError>;

    /// Enumerate distinct documents indexed for the given owner.
    async fn list_documents(&self, owner: &str) -> Result<Vec<DocumentInfo>, SinkError>;

    /// Delete every vector stored for the given owner, returning the count.
    async fn clear_for_owner(&self, owner: &str) -> Result<usize, SinkError>;
}
