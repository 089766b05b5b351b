use docstream::api::{self, AppState};
use docstream::events::ConversationEvents;
use docstream::extract::DocumentExtractor;
use docstream::identity::HeaderIdentity;
use docstream::ingest::IngestService;
use docstream::llm::get_llm_client;
use docstream::metrics::IngestMetrics;
use docstream::sessions::{InMemoryConversationStore, InMemoryMessageStore, SessionService};
use docstream::sink::HttpVectorSink;
use docstream::titles::TitleWorkflow;
use docstream::{config, logging};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    config::init_config();
    logging::init_tracing();

    let config = config::get_config();
    let events = ConversationEvents::new(config.event_bus_capacity);
    let conversations = Arc::new(InMemoryConversationStore::new());
    let messages = Arc::new(InMemoryMessageStore::new());
    let sink = Arc::new(HttpVectorSink::new().expect("Failed to initialize vector sink client"));
    let metrics = Arc::new(IngestMetrics::new());

    let sessions = Arc::new(SessionService::new(
        conversations.clone(),
        messages,
        events.clone(),
    ));
    let titles = TitleWorkflow::new(
        get_llm_client().map(Arc::from),
        conversations,
        events.clone(),
        Duration::from_secs(config.title_timeout_secs),
    );
    let ingest = Arc::new(IngestService::new(
        Arc::new(DocumentExtractor::new()),
        sink.clone(),
        metrics.clone(),
        Duration::from_secs(config.heartbeat_secs),
    ));

    let app = api::create_router(AppState {
        ingest,
        sessions,
        titles,
        events,
        sink,
        identity: Arc::new(HeaderIdentity::new(config.identity_header.clone())),
        metrics,
    });

    let (listener, port) = bind_listener().await.expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener() -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    let config = config::get_config();
    if let Some(port) = config.server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 4200..=4299;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 4200-4299",
    ))
}
