//! Wire events and inputs for the ingestion pipeline.

use crate::extract::ScriptTag;
use bytes::Bytes;
use serde::Serialize;

/// One uploaded document awaiting ingestion.
///
/// Ephemeral: owned by the ingestion call that consumes it and discarded
/// after extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Filename declared by the uploader; drives format dispatch.
    pub filename: String,
    /// Raw document bytes.
    pub bytes: Bytes,
}

/// Progress events emitted over one ingestion stream.
///
/// Ordering is only guaranteed within a single ingestion run: `FileDone`
/// and `Error` follow file input order and `JobComplete` is always the last
/// non-heartbeat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum IngestionEvent {
    /// One file was extracted and indexed.
    #[serde(rename_all = "camelCase")]
    FileDone {
        /// Declared filename.
        file: String,
        /// Detected dominant script of the file.
        language: ScriptTag,
        /// Cumulative progress across the batch, 0-100.
        progress_percent: u8,
        /// Content units produced for this file.
        chunks: usize,
    },
    /// One file failed; the rest of the batch continues.
    #[serde(rename_all = "camelCase")]
    Error {
        /// Declared filename.
        file: String,
        /// Human-readable failure description.
        message: String,
    },
    /// Terminal summary for the whole batch.
    #[serde(rename_all = "camelCase")]
    JobComplete {
        /// Outcome label (`success`).
        status: String,
        /// Sum of chunk counts over the successful files.
        total_chunks: usize,
        /// Wall-clock seconds since the ingestion call began.
        elapsed: u64,
    },
    /// Periodic liveness signal, mapped to a comment-only frame on the wire.
    Heartbeat,
}

impl IngestionEvent {
    /// Wire tag used as the SSE event name.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::FileDone { .. } => "fileDone",
            Self::Error { .. } => "error",
            Self::JobComplete { .. } => "jobComplete",
            Self::Heartbeat => "heartbeat",
        }
    }

    /// True for the terminal event of a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::JobComplete { .. })
    }
}
