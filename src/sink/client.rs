//! HTTP client for the external vector indexing service.

use crate::config::get_config;
use crate::sink::types::{ContentUnit, DocumentInfo, SinkError, VectorSink};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;

/// Lightweight HTTP adapter in front of the indexing service.
pub struct HttpVectorSink {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct DocumentsResponse {
    documents: Vec<DocumentInfo>,
}

#[derive(Deserialize)]
struct ClearResponse {
    deleted: usize,
}

impl HttpVectorSink {
    /// Construct a client from the process configuration.
    pub fn new() -> Result<Self, SinkError> {
        let config = get_config();
        let client = Client::builder()
            .user_agent("docstream/0.2")
            .build()?;
        let base_url = normalize_base_url(&config.sink_url).map_err(SinkError::InvalidUrl)?;
        tracing::debug!(url = %base_url, "Initialized vector sink client");

        Ok(Self {
            client,
            base_url,
            api_key: config.sink_api_key.clone(),
        })
    }

    /// Construct a client against an explicit base URL.
    pub fn with_base_url(base_url: String) -> Result<Self, SinkError> {
        let client = Client::builder().user_agent("docstream/0.2").build()?;
        let base_url = normalize_base_url(&base_url).map_err(SinkError::InvalidUrl)?;
        Ok(Self {
            client,
            base_url,
            api_key: None,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        let mut builder = self.client.request(method, url);
        if let Some(key) = &self.api_key {
            builder = builder.header("api-key", key);
        }
        builder
    }

    async fn ensure_success(response: Response) -> Result<Response, SinkError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(SinkError::UnexpectedStatus { status, body })
        }
    }
}

#[async_trait]
impl VectorSink for HttpVectorSink {
    async fn accept(&self, units: Vec<ContentUnit>) -> Result<(), SinkError> {
        let response = self
            .request(Method::POST, "index")
            .json(&json!({ "units": units }))
            .send()
            .await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    async fn list_documents(&self, owner: &str) -> Result<Vec<DocumentInfo>, SinkError> {
        let response = self
            .request(Method::GET, "documents")
            .query(&[("owner", owner)])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let payload: DocumentsResponse = response.json().await?;
        Ok(payload.documents)
    }

    async fn clear_for_owner(&self, owner: &str) -> Result<usize, SinkError> {
        let response = self
            .request(Method::DELETE, "documents")
            .query(&[("owner", owner)])
            .send()
            .await?;
        let response = Self::ensure_success(response).await?;
        let payload: ClearResponse = response.json().await?;
        Ok(payload.deleted)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err("sink URL must not be empty".to_string());
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(format!("sink URL must be http(s): {trimmed}"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ScriptTag;
    use httpmock::{Method::DELETE, Method::GET, Method::POST, MockServer};

    #[tokio::test]
    async fn accept_posts_units_to_index_endpoint() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/index")
                    .json_body_partial(r#"{"units": [{"text": "page one", "language": "en"}]}"#);
                then.status(200);
            })
            .await;

        let sink = HttpVectorSink::with_base_url(server.base_url()).expect("sink");
        sink.accept(vec![ContentUnit {
            text: "page one".into(),
            filename: "report.pdf".into(),
            language: ScriptTag::LtrDominant,
            owner: Some("user@example.org".into()),
        }])
        .await
        .expect("accept");

        mock.assert();
    }

    #[tokio::test]
    async fn accept_surfaces_unexpected_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/index");
                then.status(503).body("overloaded");
            })
            .await;

        let sink = HttpVectorSink::with_base_url(server.base_url()).expect("sink");
        let error = sink
            .accept(vec![ContentUnit {
                text: "page".into(),
                filename: "f.pdf".into(),
                language: ScriptTag::RtlDominant,
                owner: None,
            }])
            .await
            .expect_err("sink error");

        assert!(matches!(
            error,
            SinkError::UnexpectedStatus { status, .. } if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn list_documents_decodes_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/documents")
                    .query_param("owner", "user@example.org");
                then.status(200).json_body(serde_json::json!({
                    "documents": [
                        { "filename": "guide.pdf", "language": "he" },
                        { "filename": "spec.docx", "language": "en" }
                    ]
                }));
            })
            .await;

        let sink = HttpVectorSink::with_base_url(server.base_url()).expect("sink");
        let documents = sink.list_documents("user@example.org").await.expect("list");
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].filename, "guide.pdf");
        assert_eq!(documents[0].language, "he");
    }

    #[tokio::test]
    async fn clear_for_owner_returns_deleted_count() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/documents")
                    .query_param("owner", "user@example.org");
                then.status(200).json_body(serde_json::json!({ "deleted": 7 }));
            })
            .await;

        let sink = HttpVectorSink::with_base_url(server.base_url()).expect("sink");
        let deleted = sink
            .clear_for_owner("user@example.org")
            .await
            .expect("clear");
        assert_eq!(deleted, 7);
    }

    #[test]
    fn base_url_normalization_rejects_bad_schemes() {
        assert!(normalize_base_url("http://sink.local/").is_ok());
        assert!(normalize_base_url("ftp://sink.local").is_err());
        assert!(normalize_base_url("   ").is_err());
    }
}
