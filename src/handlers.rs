use crate::apify_client::ApifyClient;
use crate::config::Config;
use crate::errors::AppError;
use crate::models::{BatchResponse, WebsiteAnalysisRequest};
use crate::orchestrator::{AnalyzeOptions, Orchestrator};
use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Batch orchestrator; its provider is `None` when no Apify token is set.
    pub orchestrator: Orchestrator<ApifyClient>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, AppError> {
        let orchestrator = Orchestrator::from_config(&config)?;
        Ok(Self {
            config,
            orchestrator,
        })
    }
}

/// Health check endpoint.
///
/// # Returns
///
/// * `(StatusCode, Json<serde_json::Value>)` - HTTP 200 OK with health status JSON.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /
///
/// Short usage description for humans poking at the service.
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "message": "SimilarWeb Analysis API",
        "usage": "POST /api/analyze with { 'websites': ['domain1.com', 'domain2.com'] }"
    }))
}

/// OPTIONS /api/analyze
pub async fn options_analyze() -> Json<serde_json::Value> {
    Json(json!({ "message": "OK" }))
}

/// POST /api/analyze
///
/// Analyzes a batch of websites. Degraded batches still answer 200 with a
/// `note`; only an empty request (400) or a batch with no usable data and
/// fallback disabled (503) fail.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - JSON body with `websites` and an optional `userId`.
///
/// # Returns
///
/// * `Result<(StatusCode, Json<BatchResponse>), AppError>` - The batch response or an error.
pub async fn analyze_websites(
    State(state): State<Arc<AppState>>,
    Json(request): Json<WebsiteAnalysisRequest>,
) -> Result<(StatusCode, Json<BatchResponse>), AppError> {
    tracing::info!(
        "POST /api/analyze - {} website(s), user: {:?}",
        request.websites.len(),
        request.user_id
    );

    let options = AnalyzeOptions {
        user_id: request.user_id,
        fallback: None,
    };
    let response = state
        .orchestrator
        .analyze(&request.websites, &options)
        .await?;

    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    tracing::info!(
        "Analysis finished: success={}, count={}, degraded={}",
        response.success,
        response.count,
        response.note.is_some()
    );

    Ok((status, Json(response)))
}
