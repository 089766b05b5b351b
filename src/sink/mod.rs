//! Vector indexing sink integration.

mod client;
mod types;

pub use client::HttpVectorSink;
pub use types::{ContentUnit, DocumentInfo, SinkError, VectorSink};
