//! HTTP surface: health, feature catalog and multipart analysis.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::pipeline::{AnalyzeError, VoiceAnalyzer};

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state for the analysis server.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<VoiceAnalyzer>,
}

/// Build the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_endpoint))
        .route("/features", get(features_endpoint))
        .route("/analyze", post(analyze_endpoint))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(state);
    info!("Analysis server starting on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_endpoint(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "voicescreen",
        "model_loaded": state.analyzer.model_loaded(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn features_endpoint() -> Json<Value> {
    Json(json!({
        "feature_count": crate::features::FEATURE_COUNT,
        "features": crate::features::FEATURE_NAMES,
    }))
}

/// Accept a multipart upload with an `audio` field and return the report.
async fn analyze_endpoint(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let mut audio: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        bad_request(format!("Invalid multipart payload: {e}"))
    })? {
        if field.name() == Some("audio") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| bad_request(format!("Failed to read audio field: {e}")))?;
            audio = Some(bytes.to_vec());
        }
    }

    let Some(audio) = audio else {
        return Err(bad_request("Missing 'audio' field in multipart upload".into()));
    };

    // Extraction is CPU-bound; keep it off the async worker threads.
    let analyzer = state.analyzer.clone();
    let result = tokio::task::spawn_blocking(move || analyzer.analyze(&audio))
        .await
        .map_err(|e| {
            error!("Analysis task panicked: {}", e);
            internal_error("Analysis task failed".into())
        })?;

    match result {
        Ok(report) => Ok(Json(serde_json::to_value(report).unwrap_or_else(|e| {
            error!("Failed to serialize report: {}", e);
            json!({"error": "serialization failure"})
        }))),
        Err(AnalyzeError::Ingest(err)) => {
            warn!("Rejected upload: {}", err);
            Err(bad_request(err.to_string()))
        }
        Err(AnalyzeError::Classify(err)) => {
            error!("Classifier contract violation: {}", err);
            Err(internal_error(err.to_string()))
        }
    }
}

fn bad_request(message: String) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn internal_error(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}
