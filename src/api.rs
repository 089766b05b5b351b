//! HTTP surface for docstream.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /documents/analyze` – Multipart upload; streams per-file ingestion
//!   progress as Server-Sent Events with an interleaved heartbeat.
//! - `GET /documents` – Distinct indexed documents for the caller.
//! - `POST /documents/clear` – Delete the caller's vectors from the sink.
//! - `POST /conversations` / `GET /conversations` – Create and list sessions.
//! - `GET /conversations/{id}/messages` – Stored messages, owner-scoped.
//! - `DELETE /conversations/{id}` – Owner-scoped deletion.
//! - `POST /conversations/{id}/title` – Trigger background title generation.
//! - `GET /events` – SSE subscription to conversation lifecycle events.
//! - `GET /metrics` – Ingestion counters for observability dashboards.
//!
//! The caller's identity arrives pre-resolved in a trusted header (see
//! [`crate::identity`]); every conversation operation except creation is
//! scoped to it.

use crate::events::ConversationEvents;
use crate::identity::IdentityResolver;
use crate::ingest::{IngestApi, IngestionEvent, RawDocument};
use crate::metrics::{IngestMetrics, MetricsSnapshot};
use crate::sessions::{SessionError, SessionService};
use crate::sink::VectorSink;
use crate::titles::{TitleWorkflow, needs_title};
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, KeepAlive, Sse},
    },
    routing::{delete, get, post},
};
use futures_core::Stream;
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::{Value, json};
use std::convert::Infallible;
use std::sync::Arc;
use uuid::Uuid;

/// Shared handler state: one instance of every long-lived service.
#[derive(Clone)]
pub struct AppState {
    /// Ingestion orchestrator.
    pub ingest: Arc<dyn IngestApi>,
    /// Conversation session manager.
    pub sessions: Arc<SessionService>,
    /// Background title generator.
    pub titles: TitleWorkflow,
    /// Conversation lifecycle event bus.
    pub events: ConversationEvents,
    /// Vector sink, used directly for document listing and clearing.
    pub sink: Arc<dyn VectorSink>,
    /// Caller identity resolver.
    pub identity: Arc<dyn IdentityResolver>,
    /// Process-wide ingestion counters.
    pub metrics: Arc<IngestMetrics>,
}

/// Build the HTTP router exposing the full API surface.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/documents/analyze", post(analyze))
        .route("/documents", get(list_documents))
        .route("/documents/clear", post(clear_documents))
        .route(
            "/conversations",
            post(create_conversation).get(list_conversations),
        )
        .route("/conversations/:id", delete(delete_conversation))
        .route("/conversations/:id/messages", get(conversation_messages))
        .route("/conversations/:id/title", post(trigger_title))
        .route("/events", get(conversation_events))
        .route("/metrics", get(get_metrics))
        .with_state(state)
}

/// Ingest uploaded files and stream progress events back to the caller.
///
/// The response is a live SSE stream consumed by exactly one subscriber;
/// heartbeats map to comment-only frames so intermediaries keep the
/// connection open.
async fn analyze(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    let owner = state.identity.resolve(&headers);

    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| ApiError::BadRequest(error.to_string()))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|error| ApiError::BadRequest(error.to_string()))?;
        files.push(RawDocument { filename, bytes });
    }

    if files.is_empty() {
        return Err(ApiError::BadRequest("no files provided".to_string()));
    }

    tracing::info!(files = files.len(), owner = ?owner, "Starting ingestion");
    let stream = state
        .ingest
        .ingest(files, owner)
        .map(|event| Ok::<_, Infallible>(ingestion_frame(event)));
    Ok(Sse::new(stream))
}

/// Map one ingestion event onto its SSE frame.
fn ingestion_frame(event: IngestionEvent) -> SseEvent {
    if matches!(event, IngestionEvent::Heartbeat) {
        return SseEvent::default().comment("heartbeat");
    }

    let name = event.tag();
    let data = match serde_json::to_value(&event) {
        Ok(Value::Object(mut map)) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    };
    SseEvent::default().event(name).data(data.to_string())
}

/// List distinct indexed documents for the caller; anonymous callers see
/// an empty list.
async fn list_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<crate::sink::DocumentInfo>>, ApiError> {
    let Some(owner) = state.identity.resolve(&headers) else {
        return Ok(Json(Vec::new()));
    };
    let documents = state.sink.list_documents(&owner).await?;
    Ok(Json(documents))
}

/// Delete every vector stored for the caller.
async fn clear_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let Some(owner) = state.identity.resolve(&headers) else {
        return Ok((StatusCode::UNAUTHORIZED, Json(json!({ "deleted": 0 }))).into_response());
    };
    tracing::info!(owner = %owner, "Clearing vector store for owner");
    let deleted = state.sink.clear_for_owner(&owner).await?;
    tracing::info!(owner = %owner, deleted, "Cleared vector store");
    Ok(Json(json!({ "deleted": deleted })).into_response())
}

/// Create a conversation, returning its id as plain text.
async fn create_conversation(State(state): State<AppState>, headers: HeaderMap) -> String {
    let owner = state.identity.resolve(&headers);
    state.sessions.create(owner).await.to_string()
}

/// List the caller's conversations, most recently active first.
async fn list_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Vec<crate::sessions::Conversation>> {
    let owner = state.identity.resolve(&headers);
    Json(state.sessions.list(owner.as_deref()).await)
}

/// Fetch a conversation's stored messages; empty on any authorization
/// failure.
async fn conversation_messages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Json<Vec<crate::sessions::StoredMessage>> {
    let owner = state.identity.resolve(&headers);
    Json(state.sessions.messages(id, owner.as_deref()).await)
}

/// Delete a conversation the caller owns.
async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let Ok(id) = Uuid::parse_str(&id) else {
        return Err(ApiError::BadRequest("invalid conversation id".to_string()));
    };
    let owner = state.identity.resolve(&headers);
    state.sessions.delete(id, owner.as_deref()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for the title-generation trigger.
#[derive(Deserialize)]
struct TitleRequest {
    /// The conversation's first user message.
    message: String,
    /// Requested title language (`en`/`he`).
    #[serde(default = "default_language")]
    language: String,
}

fn default_language() -> String {
    "en".to_string()
}

/// Kick off background title generation for a conversation.
///
/// Fires only while the stored title is still a placeholder; the request
/// never waits for the model call.
async fn trigger_title(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
    Json(request): Json<TitleRequest>,
) -> Result<StatusCode, ApiError> {
    let owner = state.identity.resolve(&headers);
    let conversation = state.sessions.authorized(id, owner.as_deref()).await?;

    if needs_title(&conversation.title) {
        state.titles.spawn(id, request.message, request.language);
    }
    Ok(StatusCode::ACCEPTED)
}

/// Long-lived SSE subscription to conversation lifecycle events.
async fn conversation_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let mut subscription = state.events.subscribe();
    let stream = async_stream::stream! {
        loop {
            match subscription.recv().await {
                Ok(event) => {
                    let payload = serde_json::to_value(&event).unwrap_or(Value::Null);
                    yield Ok::<_, Infallible>(
                        SseEvent::default().event(event.tag()).data(payload.to_string()),
                    );
                }
                Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagging; dropped events");
                    continue;
                }
                Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Return ingestion counters for observability dashboards.
async fn get_metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Error envelope translating service failures into HTTP statuses.
enum ApiError {
    BadRequest(String),
    Forbidden,
    NotFound,
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
            Self::NotFound => StatusCode::NOT_FOUND.into_response(),
            Self::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotFound => Self::NotFound,
            SessionError::Forbidden => Self::Forbidden,
        }
    }
}

impl From<crate::sink::SinkError> for ApiError {
    fn from(error: crate::sink::SinkError) -> Self {
        Self::Internal(error.to_string())
    }
}
