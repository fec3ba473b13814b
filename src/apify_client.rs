use crate::config::Config;
use crate::errors::{AppError, ProviderError};
use crate::provider::TrafficProvider;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Similarweb scraper actor on Apify.
///
/// Each lookup is one synchronous actor run whose dataset items come back in
/// the response body.
#[derive(Clone)]
pub struct ApifyClient {
    client: reqwest::Client,
    base_url: String,
    actor_id: String,
    token: String,
}

impl ApifyClient {
    /// Creates a new `ApifyClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The Apify API root, e.g. `https://api.apify.com`.
    /// * `actor_id` - The scraper actor to run.
    /// * `token` - The API token for authentication.
    /// * `timeout` - Upper bound on a single request.
    pub fn new(
        base_url: String,
        actor_id: String,
        token: String,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create Apify client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            actor_id,
            token,
        })
    }

    /// Builds a client from configuration, or `None` when no token is set.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AppError> {
        let Some(token) = config.apify_api_token.clone() else {
            return Ok(None);
        };
        Self::new(
            config.apify_base_url.clone(),
            config.apify_actor_id.clone(),
            token,
            Duration::from_secs(config.provider_timeout_secs),
        )
        .map(Some)
    }

    fn run_url(&self) -> String {
        format!(
            "{}/v2/acts/{}/run-sync-get-dataset-items",
            self.base_url, self.actor_id
        )
    }

    /// Runs the actor for one website and returns its first dataset item.
    ///
    /// # Returns
    ///
    /// * `Result<Value, ProviderError>` - The raw Similarweb item.
    pub async fn run_for_website(
        &self,
        website: &str,
        user_id: Option<&str>,
    ) -> Result<Value, ProviderError> {
        let mut input = json!({
            "websites": [website],
            "maxPages": 1,
        });
        if let Some(user_id) = user_id {
            input["userId"] = json!(user_id);
        }

        tracing::info!("Running Apify actor {} for {}", self.actor_id, website);

        let response = self
            .client
            .post(self.run_url())
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&input)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("Apify returned {} for {}: {}", status, website, error_text);
            return Err(match status {
                StatusCode::NOT_FOUND => ProviderError::NotFound,
                StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    ProviderError::Timeout
                }
                _ => ProviderError::Upstream {
                    status: status.as_u16(),
                    body: error_text,
                },
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::Malformed(format!("Failed to parse Apify response: {}", e))
        })?;

        first_item(body)
    }
}

/// Dataset responses are arrays; a bare object is accepted as a single item.
fn first_item(body: Value) -> Result<Value, ProviderError> {
    match body {
        Value::Array(items) => items.into_iter().next().ok_or(ProviderError::NotFound),
        item @ Value::Object(_) => Ok(item),
        _ => Err(ProviderError::Malformed(
            "Apify response is neither an array nor an object".to_string(),
        )),
    }
}

impl TrafficProvider for ApifyClient {
    async fn fetch_raw(&self, url: &str, user_id: Option<&str>) -> Result<Value, ProviderError> {
        self.run_for_website(url, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = ApifyClient::new(
            "https://api.apify.com/".to_string(),
            "actor".to_string(),
            "token".to_string(),
            Duration::from_secs(5),
        );
        assert!(client.is_ok());
        assert_eq!(
            client.unwrap().run_url(),
            "https://api.apify.com/v2/acts/actor/run-sync-get-dataset-items"
        );
    }

    #[test]
    fn test_first_item() {
        assert_eq!(
            first_item(json!([{"name": "a.com"}, {"name": "b.com"}])).unwrap(),
            json!({"name": "a.com"})
        );
        assert_eq!(first_item(json!([])).unwrap_err(), ProviderError::NotFound);
        assert_eq!(
            first_item(json!({"name": "a.com"})).unwrap(),
            json!({"name": "a.com"})
        );
        assert!(matches!(
            first_item(json!("oops")),
            Err(ProviderError::Malformed(_))
        ));
    }
}
