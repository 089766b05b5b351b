//! End-to-end tests exercising the router with a real extractor and a
//! mocked vector sink.

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use docstream::api::{AppState, create_router};
use docstream::events::ConversationEvents;
use docstream::extract::DocumentExtractor;
use docstream::identity::HeaderIdentity;
use docstream::ingest::IngestService;
use docstream::metrics::IngestMetrics;
use docstream::sessions::{InMemoryConversationStore, InMemoryMessageStore, SessionService};
use docstream::sink::HttpVectorSink;
use docstream::titles::TitleWorkflow;
use httpmock::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app(server: &MockServer) -> axum::Router {
    let events = ConversationEvents::new(16);
    let conversations = Arc::new(InMemoryConversationStore::new());
    let sink = Arc::new(HttpVectorSink::with_base_url(server.base_url()).expect("sink client"));
    let metrics = Arc::new(IngestMetrics::new());
    let sessions = Arc::new(SessionService::new(
        conversations.clone(),
        Arc::new(InMemoryMessageStore::new()),
        events.clone(),
    ));
    let titles = TitleWorkflow::new(
        None,
        conversations,
        events.clone(),
        Duration::from_secs(5),
    );
    let ingest = Arc::new(IngestService::new(
        Arc::new(DocumentExtractor::new()),
        sink.clone(),
        metrics.clone(),
        Duration::from_secs(60),
    ));

    create_router(AppState {
        ingest,
        sessions,
        titles,
        events,
        sink,
        identity: Arc::new(HeaderIdentity::new("x-user-email")),
        metrics,
    })
}

fn minimal_pdf() -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal("Header")]),
            Operation::new("Td", vec![0.into(), (-40).into()]),
            Operation::new("Tj", vec![Object::string_literal("quarterly revenue summary")]),
            Operation::new("Td", vec![0.into(), (-40).into()]),
            Operation::new("Tj", vec![Object::string_literal("Page 1 of 1")]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content stream"),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("serialize pdf");
    bytes
}

fn multipart_upload(uri: &str, filename: &str, payload: &[u8]) -> Request<Body> {
    let boundary = "X-DOCSTREAM-IT";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\ncontent-disposition: form-data; name=\"files\"; filename=\"{filename}\"\r\ncontent-type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("x-user-email", "alice@example.org")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

#[tokio::test]
async fn pdf_upload_streams_events_and_reaches_the_sink() {
    let server = MockServer::start();
    let index_mock = server.mock(|when, then| {
        when.method(POST).path("/index");
        then.status(200).json_body(serde_json::json!({"status": "ok"}));
    });

    let app = app(&server);
    let response = app
        .oneshot(multipart_upload("/documents/analyze", "report.pdf", &minimal_pdf()))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("event: fileDone"), "missing fileDone in: {text}");
    assert!(text.contains("\"file\":\"report.pdf\""));
    assert!(text.contains("\"language\":\"en\""));
    assert!(text.contains("\"progressPercent\":100"));
    assert!(text.contains("event: jobComplete"));

    index_mock.assert();
}

#[tokio::test]
async fn broken_upload_reports_error_then_completes() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/index");
        then.status(200).json_body(serde_json::json!({"status": "ok"}));
    });

    let app = app(&server);
    let response = app
        .oneshot(multipart_upload(
            "/documents/analyze",
            "broken.pdf",
            b"this is not a pdf",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let text = body_string(response).await;
    assert!(text.contains("event: error"));
    assert!(text.contains("Failed to process broken.pdf"));
    assert!(text.contains("event: jobComplete"));
}

#[tokio::test]
async fn conversation_lifecycle_round_trip() {
    let server = MockServer::start();
    let app = app(&server);

    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/conversations")
                .header("x-user-email", "alice@example.org")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(created.status(), StatusCode::OK);
    let id = body_string(created).await;

    let messages = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::GET)
                .uri(format!("/conversations/{id}/messages"))
                .header("x-user-email", "alice@example.org")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(messages.status(), StatusCode::OK);
    assert_eq!(body_string(messages).await, "[]");

    let deleted = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/conversations/{id}"))
                .header("x-user-email", "alice@example.org")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

    let missing = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/conversations/{id}"))
                .header("x-user-email", "alice@example.org")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
