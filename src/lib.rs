#![deny(missing_docs)]

//! Core library for the docstream document ingestion and session server.

/// HTTP routing, SSE streaming, and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// In-process conversation lifecycle event bus.
pub mod events;
/// Per-page document extraction and script handling.
pub mod extract;
/// Caller identity resolution from trusted headers.
pub mod identity;
/// Streaming ingestion orchestration.
pub mod ingest;
/// Language-model client abstraction and adapters.
pub mod llm;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion metrics helpers.
pub mod metrics;
/// Conversation session management.
pub mod sessions;
/// Vector indexing sink integration.
pub mod sink;
/// Background conversation title generation.
pub mod titles;
