//! HTTP API server.
//!
//! Exposes the query, report and history operations as JSON endpoints.

use super::build_orchestrator;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    /// Bounds how many queries and reports run at once.
    workers: Semaphore,
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let max_workers = settings.server.max_workers.max(1);

    let state = Arc::new(AppState {
        orchestrator: build_orchestrator(settings)?,
        workers: Semaphore::new(max_workers),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Serving on {} with {} workers", addr, max_workers);

    Output::header("Clipwise API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Query", "POST /query");
    Output::kv("Report", "POST /report");
    Output::kv("History", "GET  /history?session_id=...");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/query", post(query))
        .route("/report", post(report))
        .route("/history", get(history))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct QueryRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    query: String,
    #[serde(default)]
    video_path: String,
}

#[derive(Deserialize)]
struct ReportRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    format: String,
}

#[derive(Deserialize)]
struct HistoryParams {
    #[serde(default)]
    session_id: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn query(State(state): State<Arc<AppState>>, Json(req): Json<QueryRequest>) -> Response {
    let _permit = match state.workers.acquire().await {
        Ok(permit) => permit,
        Err(e) => return error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    };

    match state
        .orchestrator
        .process_query(&req.session_id, &req.query, &req.video_path)
        .await
    {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            error!("Query failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn report(State(state): State<Arc<AppState>>, Json(req): Json<ReportRequest>) -> Response {
    let _permit = match state.workers.acquire().await {
        Ok(permit) => permit,
        Err(e) => return error_response(StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
    };

    match state
        .orchestrator
        .generate_report(&req.session_id, &req.format)
        .await
    {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Report failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn history(State(state): State<Arc<AppState>>, Query(params): Query<HistoryParams>) -> Response {
    match state.orchestrator.history_json(&params.session_id).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClipwiseError, Result};
    use crate::preflight::{fake_tool, Preflight};
    use crate::report::LocalReportGenerator;
    use crate::session::MemorySessionStore;
    use crate::transcription::{Transcriber, Transcription};
    use crate::vision::{Detection, VisionDetector};
    use async_trait::async_trait;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct EchoTranscriber;

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(&self, _video_path: &Path) -> Result<Transcription> {
            Ok(Transcription {
                transcript: "hello world".to_string(),
                subtitle_path: None,
            })
        }
    }

    struct OfflineVision;

    #[async_trait]
    impl VisionDetector for OfflineVision {
        async fn detect(&self, _video_path: &Path) -> Result<Detection> {
            Err(ClipwiseError::Vision("offline".to_string()))
        }
    }

    fn state(dir: &TempDir) -> Arc<AppState> {
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        fake_tool(&bin, "ffmpeg");

        let orchestrator = Orchestrator::with_components(
            Arc::new(MemorySessionStore::new()),
            Arc::new(EchoTranscriber),
            Arc::new(OfflineVision),
            Arc::new(LocalReportGenerator::default()),
            Preflight::new("ffmpeg").with_search_path(&bin),
            dir.path().join("outputs"),
        );

        Arc::new(AppState {
            orchestrator,
            workers: Semaphore::new(2),
        })
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_query_then_history() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"video").unwrap();

        let response = query(
            State(state.clone()),
            Json(QueryRequest {
                session_id: "s1".to_string(),
                query: "Transcribe the video".to_string(),
                video_path: video.display().to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply = body_json(response).await;
        assert_eq!(reply["answer"], "hello world");
        assert_eq!(reply["needs_clarification"], false);

        let response = history(
            State(state),
            Query(HistoryParams {
                session_id: "s1".to_string(),
            }),
        )
        .await;
        let body = body_json(response).await;
        assert_eq!(body["session_id"], "s1");
        let turns: serde_json::Value =
            serde_json::from_str(body["history_json"].as_str().unwrap()).unwrap();
        assert_eq!(turns[0]["role"], "user");
        assert_eq!(turns[1]["content"], "hello world");
    }

    #[tokio::test]
    async fn test_query_missing_video_is_clarification() {
        let dir = tempfile::tempdir().unwrap();

        let response = query(
            State(state(&dir)),
            Json(QueryRequest {
                session_id: String::new(),
                query: "what objects are shown".to_string(),
                video_path: String::new(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply = body_json(response).await;
        assert_eq!(reply["session_id"], "default");
        assert_eq!(reply["needs_clarification"], true);
    }

    #[tokio::test]
    async fn test_report_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let response = report(
            State(state.clone()),
            Json(ReportRequest {
                session_id: "r".to_string(),
                format: "PDF".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["session_id"], "r");
        assert!(body["path"].as_str().unwrap().ends_with("summary.pdf"));

        let response = report(
            State(state),
            Json(ReportRequest {
                session_id: "r".to_string(),
                format: "docx".to_string(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("docx"));
    }

    #[tokio::test]
    async fn test_health() {
        let response = health().await.into_response();
        assert_eq!(body_json(response).await, serde_json::json!({ "status": "ok" }));
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> Response {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap();
        app.oneshot(request).await.unwrap().into_response()
    }

    #[tokio::test]
    async fn test_query_without_query_field_gets_clarification() {
        let dir = tempfile::tempdir().unwrap();

        let response = post_json(
            router(state(&dir)),
            "/query",
            r#"{"session_id":"x","video_path":""}"#,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply = body_json(response).await;
        assert_eq!(reply["session_id"], "x");
        assert_eq!(reply["needs_clarification"], true);
        assert_eq!(
            reply["clarification_prompt"],
            "Please provide the absolute path to a local .mp4 file."
        );
    }

    #[tokio::test]
    async fn test_empty_body_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(&dir);

        let response = post_json(router(state.clone()), "/query", "{}").await;
        assert_eq!(response.status(), StatusCode::OK);
        let reply = body_json(response).await;
        assert_eq!(reply["session_id"], "default");
        assert_eq!(reply["needs_clarification"], true);

        // A missing format reaches the report module and is rejected there
        let response = post_json(router(state), "/report", "{}").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_json(response).await["error"].is_string());
    }
}
