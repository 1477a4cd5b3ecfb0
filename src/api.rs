//! HTTP surface for Docsum.
//!
//! This module exposes a compact Axum router with a handful of endpoints:
//!
//! - `POST /summarize` – Upload a document (multipart `file` field, optional
//!   `max_words` field), extract its text, and run the chunked summarization
//!   pipeline. Returns the merged summary plus one entry per segment so callers can
//!   render "section N failed: reason" without re-deriving anything.
//! - `POST /summarize/text` – Summarize already-extracted text supplied as JSON.
//! - `GET /metrics` – Observe summarization counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by
//!   tools/hosts.
//!
//! Both summarize endpoints share the same pipeline, so behavior is identical across
//! interfaces.

use crate::extraction::{self, DocumentKind, ExtractionError};
use crate::pipeline::{DocumentSummary, PipelineError, SegmentOutcome, SummarizeApi};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Upper bound on uploaded document size.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Build the HTTP router exposing the summarization API surface.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: SummarizeApi + 'static,
{
    Router::new()
        .route("/summarize", post(summarize_document::<S>))
        .route("/summarize/text", post(summarize_text::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(service)
}

/// Request body for the `POST /summarize/text` endpoint.
#[derive(Deserialize)]
struct SummarizeTextRequest {
    /// Already-extracted document text to summarize.
    text: String,
    /// Optional per-segment word budget override for this request.
    #[serde(default)]
    max_words: Option<usize>,
}

/// Success response shared by both summarize endpoints.
#[derive(Serialize)]
struct SummarizeResponse {
    /// Merged document summary.
    summary: String,
    /// Number of segments the document was split into.
    segment_count: usize,
    /// Number of segments whose completion call failed.
    failed_segments: usize,
    /// Per-segment outcomes in document order.
    segments: Vec<SegmentReport>,
}

/// One segment's outcome as rendered to API consumers.
#[derive(Serialize)]
struct SegmentReport {
    /// Zero-based position of the segment in the document.
    index: usize,
    /// `"summarized"` or `"failed"`.
    status: &'static str,
    /// Summary text for a summarized segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<String>,
    /// Diagnostic for a failed segment.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn to_response(summary: DocumentSummary) -> SummarizeResponse {
    let DocumentSummary { text, segments } = summary;
    let segment_count = segments.len();
    let failed_segments = segments
        .iter()
        .filter(|segment| segment.outcome.is_failed())
        .count();
    let segments = segments
        .into_iter()
        .map(|segment| match segment.outcome {
            SegmentOutcome::Summarized(text) => SegmentReport {
                index: segment.index,
                status: "summarized",
                summary: Some(text),
                error: None,
            },
            SegmentOutcome::Failed(reason) => SegmentReport {
                index: segment.index,
                status: "failed",
                summary: None,
                error: Some(reason),
            },
        })
        .collect();

    SummarizeResponse {
        summary: text,
        segment_count,
        failed_segments,
        segments,
    }
}

fn parse_max_words(raw: &str) -> Result<usize, AppError> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|words| *words > 0)
        .ok_or_else(|| AppError::BadRequest("max_words must be a positive integer".to_string()))
}

/// Summarize an uploaded document.
///
/// Accepts a multipart form with a `file` field (PDF or plain text) and an optional
/// `max_words` field overriding the per-segment word budget. The upload is rejected
/// before any completion call when its type is unsupported or its body cannot be
/// decoded.
async fn summarize_document<S>(
    State(service): State<Arc<S>>,
    mut multipart: Multipart,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizeApi,
{
    let mut upload: Option<(Option<String>, Option<String>, Vec<u8>)> = None;
    let mut max_words = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| AppError::BadRequest(format!("Invalid multipart body: {error}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(|error| {
                    AppError::BadRequest(format!("Failed to read uploaded file: {error}"))
                })?;
                upload = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("max_words") => {
                let raw = field.text().await.map_err(|error| {
                    AppError::BadRequest(format!("Failed to read max_words field: {error}"))
                })?;
                max_words = Some(parse_max_words(&raw)?);
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let kind = DocumentKind::detect(content_type.as_deref(), file_name.as_deref())?;
    tracing::info!(
        file = file_name.as_deref().unwrap_or("<unnamed upload>"),
        bytes = bytes.len(),
        kind = ?kind,
        "Received document"
    );
    let text = extraction::extract_text(kind, &bytes)?;

    let outcome = service.summarize(text, max_words).await?;
    Ok(Json(to_response(outcome)))
}

/// Summarize already-extracted text.
async fn summarize_text<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<SummarizeTextRequest>,
) -> Result<Json<SummarizeResponse>, AppError>
where
    S: SummarizeApi,
{
    let SummarizeTextRequest { text, max_words } = request;
    if let Some(0) = max_words {
        return Err(AppError::BadRequest(
            "max_words must be a positive integer".to_string(),
        ));
    }

    let outcome = service.summarize(text, max_words).await?;
    Ok(Json(to_response(outcome)))
}

/// Return a concise metrics snapshot with document/segment counters.
async fn get_metrics<S>(
    State(service): State<Arc<S>>,
) -> Json<crate::metrics::MetricsSnapshot>
where
    S: SummarizeApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summarize",
                description: "Upload a PDF or plain-text document (multipart `file` field, optional `max_words` field), extract its text, and return a merged summary with per-segment outcomes.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize_text",
                method: "POST",
                path: "/summarize/text",
                description: "Summarize already-extracted text. Response returns { \"summary\": string, \"segment_count\": number, \"failed_segments\": number, \"segments\": [...] }.",
                request_example: Some(json!({
                    "text": "Document contents",
                    "max_words": 2000
                })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return summarization counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    /// Malformed request (missing file, bad multipart body, invalid max_words).
    BadRequest(String),
    /// Upload could not be turned into text.
    Extraction(ExtractionError),
    /// The pipeline failed terminally (reduction fault).
    Pipeline(PipelineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Extraction(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            Self::Pipeline(error) => (StatusCode::INTERNAL_SERVER_ERROR, error.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<ExtractionError> for AppError {
    fn from(inner: ExtractionError) -> Self {
        Self::Extraction(inner)
    }
}

impl From<PipelineError> for AppError {
    fn from(inner: PipelineError) -> Self {
        Self::Pipeline(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::completion::CompletionClientError;
    use crate::metrics::MetricsSnapshot;
    use crate::pipeline::{
        DocumentSummary, PipelineError, SegmentOutcome, SegmentSummary, SummarizeApi,
    };
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_summarize_endpoints() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let summarize = commands
            .iter()
            .find(|cmd| cmd.name == "summarize")
            .expect("summarize command present");

        assert_eq!(summarize.method, "POST");
        assert_eq!(summarize.path, "/summarize");
        assert!(summarize.description.to_lowercase().contains("summary"));

        assert!(commands.len() >= 3);
    }

    #[tokio::test]
    async fn text_route_returns_summary_and_segment_outcomes() {
        let summary = DocumentSummary {
            text: "Merged.".into(),
            segments: vec![
                SegmentSummary {
                    index: 0,
                    outcome: SegmentOutcome::Summarized("First.".into()),
                },
                SegmentSummary {
                    index: 1,
                    outcome: SegmentOutcome::Failed("provider timeout".into()),
                },
            ],
        };
        let service = Arc::new(StubSummarizeService::ok(summary));
        let app = create_router(service.clone());

        let payload = json!({ "text": "Document body", "max_words": 3 });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize/text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["summary"], "Merged.");
        assert_eq!(json["segment_count"], 2);
        assert_eq!(json["failed_segments"], 1);
        assert_eq!(json["segments"][0]["status"], "summarized");
        assert_eq!(json["segments"][0]["summary"], "First.");
        assert_eq!(json["segments"][1]["status"], "failed");
        assert_eq!(json["segments"][1]["error"], "provider timeout");

        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("Document body".to_string(), Some(3)));
    }

    #[tokio::test]
    async fn text_route_rejects_zero_max_words() {
        let service = Arc::new(StubSummarizeService::ok(empty_summary()));
        let app = create_router(service.clone());

        let payload = json!({ "text": "Document body", "max_words": 0 });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize/text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn upload_route_extracts_text_before_summarizing() {
        let service = Arc::new(StubSummarizeService::ok(empty_summary()));
        let app = create_router(service.clone());

        let boundary = "docsum-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             Hello from an upload\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"max_words\"\r\n\r\n\
             5\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = service.recorded_calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], ("Hello from an upload".to_string(), Some(5)));
    }

    #[tokio::test]
    async fn upload_route_rejects_unsupported_document_types() {
        let service = Arc::new(StubSummarizeService::ok(empty_summary()));
        let app = create_router(service.clone());

        let boundary = "docsum-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"legacy.doc\"\r\n\
             Content-Type: application/msword\r\n\r\n\
             binary\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert!(
            json["error"]
                .as_str()
                .expect("error string")
                .contains("Unsupported document type")
        );
        assert!(service.recorded_calls().await.is_empty());
    }

    #[tokio::test]
    async fn upload_route_requires_a_file_field() {
        let service = Arc::new(StubSummarizeService::ok(empty_summary()));
        let app = create_router(service);

        let boundary = "docsum-test-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"max_words\"\r\n\r\n\
             5\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn terminal_pipeline_failure_maps_to_server_error() {
        let service = Arc::new(StubSummarizeService::failing());
        let app = create_router(service);

        let payload = json!({ "text": "Document body" });
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/summarize/text")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert!(
            json["error"]
                .as_str()
                .expect("error string")
                .contains("Failed to merge segment summaries")
        );
    }

    #[tokio::test]
    async fn metrics_route_serializes_snapshot() {
        let service = Arc::new(StubSummarizeService::ok(empty_summary()));
        let app = create_router(service);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/metrics")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["documents_summarized"], 7);
        assert_eq!(json["segments_failed"], 2);
        assert_eq!(json["last_segment_count"], 4);
    }

    fn empty_summary() -> DocumentSummary {
        DocumentSummary {
            text: String::new(),
            segments: Vec::new(),
        }
    }

    struct StubSummarizeService {
        calls: Mutex<Vec<(String, Option<usize>)>>,
        summary: Option<DocumentSummary>,
    }

    impl StubSummarizeService {
        fn ok(summary: DocumentSummary) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                summary: Some(summary),
            }
        }

        fn failing() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                summary: None,
            }
        }

        async fn recorded_calls(&self) -> Vec<(String, Option<usize>)> {
            self.calls.lock().await.clone()
        }
    }

    #[async_trait]
    impl SummarizeApi for StubSummarizeService {
        async fn summarize(
            &self,
            text: String,
            segment_words_override: Option<usize>,
        ) -> Result<DocumentSummary, PipelineError> {
            self.calls
                .lock()
                .await
                .push((text, segment_words_override));
            match &self.summary {
                Some(summary) => Ok(summary.clone()),
                None => Err(PipelineError::Reduction {
                    segment_count: 3,
                    failed_segments: 1,
                    source: CompletionClientError::GenerationFailed("merge unavailable".into()),
                }),
            }
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            MetricsSnapshot {
                documents_summarized: 7,
                segments_summarized: 21,
                segments_failed: 2,
                last_segment_count: Some(4),
            }
        }
    }
}
