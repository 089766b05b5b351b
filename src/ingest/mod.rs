//! Streaming ingestion orchestration.

mod service;
mod types;

pub use service::{IngestApi, IngestService};
pub use types::{IngestionEvent, RawDocument};
