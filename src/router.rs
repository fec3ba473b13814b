use crate::handlers::{self, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Routes that sit behind the server's body-limit and rate-limit layers.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(handlers::root)).route(
        "/api/analyze",
        post(handlers::analyze_websites).options(handlers::options_analyze),
    )
}

/// Final app: health check (outside rate limiting) merged with `api`.
pub fn build_router(state: Arc<AppState>, api: Router<Arc<AppState>>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(api)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// CORS for the dashboard origin; `*` allows any origin.
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    if origin.trim() == "*" {
        return Ok(CorsLayer::permissive());
    }
    let origin: HeaderValue = origin
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("CORS_ALLOWED_ORIGIN is not a valid origin: {}", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}
