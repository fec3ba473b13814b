use crate::errors::ProviderError;
use serde_json::Value;
use std::future::Future;

/// The external traffic-data source, reached through one call.
///
/// Implementations return the provider's native payload for a single domain;
/// mapping it into an [`crate::models::AnalysisRecord`] is the caller's job.
pub trait TrafficProvider: Send + Sync {
    /// Fetches the raw analysis for one absolute URL (`https://www.example.com`).
    ///
    /// `user_id` is an opaque attribution id passed through untouched.
    fn fetch_raw(
        &self,
        url: &str,
        user_id: Option<&str>,
    ) -> impl Future<Output = Result<Value, ProviderError>> + Send;
}
