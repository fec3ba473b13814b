use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Batch-level error types surfaced to the HTTP caller.
///
/// A total provider outage is not an error here: it is a `BatchResponse` with
/// `success: false`, answered with 503 by the handler.
#[derive(Debug, Clone)]
pub enum AppError {
    /// Bad request error (invalid input).
    BadRequest(String),
    /// Error interacting with an external API.
    ExternalApiError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::ExternalApiError(msg) => write!(f, "External API error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for AppError {
    /// JSON `{ "error": ... }` body. Input errors are echoed verbatim;
    /// upstream failures are logged and hidden.
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match self {
            AppError::BadRequest(msg) => msg,
            AppError::ExternalApiError(msg) => {
                tracing::error!("External API error: {}", msg);
                "External service error".to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Per-domain failure of a live provider lookup.
///
/// Every variant takes the synthesizer fallback path; none of them fail a batch
/// on their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The bounded wait elapsed.
    Timeout,
    /// The provider throttled the request.
    RateLimited,
    /// The provider has no data for this domain.
    NotFound,
    /// The payload could not be interpreted.
    Malformed(String),
    /// Any other non-success status.
    Upstream { status: u16, body: String },
    /// Connection-level failure.
    Transport(String),
    /// The circuit breaker is open and rejected the call.
    CircuitOpen,
}

impl ProviderError {
    /// Short tag used in degradation notes and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::Timeout => "timeout",
            ProviderError::RateLimited => "rate limited",
            ProviderError::NotFound => "not found",
            ProviderError::Malformed(_) => "malformed response",
            ProviderError::Upstream { .. } => "upstream error",
            ProviderError::Transport(_) => "transport error",
            ProviderError::CircuitOpen => "circuit open",
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Malformed(msg) => write!(f, "malformed response: {}", msg),
            ProviderError::Upstream { status, body } => {
                write!(f, "provider returned {}: {}", status, body)
            }
            ProviderError::Transport(msg) => write!(f, "transport error: {}", msg),
            other => f.write_str(other.kind()),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_decode() {
            ProviderError::Malformed(err.to_string())
        } else {
            ProviderError::Transport(err.to_string())
        }
    }
}
