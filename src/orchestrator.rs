//! Batch analysis: live lookups with per-domain fallback to synthesized data.
//!
//! 1. Canonicalise every requested domain
//! 2. Fan out live lookups, bounded and in request order
//! 3. Normalize live payloads into records
//! 4. Substitute synthesized records for domains whose lookup failed
//! 5. Assemble the batch response and its degradation note

use crate::apify_client::ApifyClient;
use crate::circuit_breaker::{create_provider_circuit_breaker, is_provider_fault, ProviderBreaker};
use crate::config::Config;
use crate::domain::DomainTarget;
use crate::errors::{AppError, ProviderError};
use crate::models::{AnalysisRecord, BatchResponse};
use crate::normalize::normalize_payload;
use crate::provider::TrafficProvider;
use crate::synthesizer::synthesize;
use failsafe::futures::CircuitBreaker;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::Instrument;
use uuid::Uuid;

pub const EMPTY_BATCH_MESSAGE: &str = "Please provide an array of websites to analyze";
pub const NOT_CONFIGURED_NOTE: &str = "Using mock data - APIFY_API_TOKEN not configured";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_MAX_CONCURRENCY: usize = 4;

/// Per-request knobs.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Forwarded to the provider for attribution.
    pub user_id: Option<String>,
    /// Overrides the orchestrator's fallback setting for this batch.
    pub fallback: Option<bool>,
}

/// Runs analysis batches against an optional live provider.
///
/// Whether a provider is configured is fixed at construction, so every domain
/// of a batch sees the same decision.
pub struct Orchestrator<P> {
    provider: Option<P>,
    breaker: ProviderBreaker,
    timeout: Duration,
    max_concurrency: usize,
    fallback_enabled: bool,
}

impl Orchestrator<ApifyClient> {
    /// Wires the Apify client from configuration; no token means no provider.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let provider = ApifyClient::from_config(config)?;
        Ok(Self::new(provider)
            .with_timeout(Duration::from_secs(config.provider_timeout_secs))
            .with_max_concurrency(config.max_concurrent_lookups)
            .with_fallback(config.mock_fallback_enabled))
    }
}

impl<P: TrafficProvider> Orchestrator<P> {
    pub fn new(provider: Option<P>) -> Self {
        Self {
            provider,
            breaker: create_provider_circuit_breaker(),
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            fallback_enabled: true,
        }
    }

    /// Bounded wait for a single live lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.fallback_enabled = enabled;
        self
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Analyzes every domain in `domains`, in order.
    ///
    /// Only an empty batch is an error. Provider failures are absorbed per
    /// domain; with fallback enabled `data` always has one record per
    /// requested domain. Dropping the returned future abandons in-flight
    /// lookups.
    pub async fn analyze(
        &self,
        domains: &[String],
        options: &AnalyzeOptions,
    ) -> Result<BatchResponse, AppError> {
        if domains.is_empty() {
            return Err(AppError::BadRequest(EMPTY_BATCH_MESSAGE.to_string()));
        }

        let batch_id = Uuid::new_v4();
        let span = tracing::info_span!("analyze_batch", %batch_id, domains = domains.len());
        self.run_batch(domains, options).instrument(span).await
    }

    async fn run_batch(
        &self,
        domains: &[String],
        options: &AnalyzeOptions,
    ) -> Result<BatchResponse, AppError> {
        let fallback = options.fallback.unwrap_or(self.fallback_enabled);
        let targets: Vec<DomainTarget> = domains.iter().map(|d| DomainTarget::parse(d)).collect();

        let Some(provider) = self.provider.as_ref() else {
            if !fallback {
                tracing::error!("No provider configured and mock fallback disabled");
                return Ok(BatchResponse::failed(
                    "APIFY_API_TOKEN not configured and mock data fallback is disabled",
                ));
            }
            tracing::info!("No API token found, using mock data for {} domain(s)", targets.len());
            let data = targets.iter().map(|t| synthesize(&t.host)).collect();
            return Ok(BatchResponse::new(data, Some(NOT_CONFIGURED_NOTE.to_string())));
        };

        let user_id = options.user_id.as_deref();
        let lookups: Vec<_> = targets
            .iter()
            .map(|target| self.lookup(provider, target, user_id))
            .collect();
        let outcomes: Vec<Result<AnalysisRecord, ProviderError>> = stream::iter(lookups)
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let mut data = Vec::with_capacity(targets.len());
        let mut failures: Vec<(&DomainTarget, ProviderError)> = Vec::new();

        for (target, outcome) in targets.iter().zip(outcomes) {
            match outcome {
                Ok(record) => {
                    tracing::info!("✓ Live data for {}", target.host);
                    data.push(record);
                }
                Err(e) => {
                    tracing::warn!(
                        "Live lookup failed for '{}' ({}): {}",
                        target.requested,
                        target.url,
                        e
                    );
                    if fallback {
                        data.push(synthesize(&target.host));
                    }
                    failures.push((target, e));
                }
            }
        }

        if failures.is_empty() {
            return Ok(BatchResponse::new(data, None));
        }

        let failed_list = describe_failures(&failures);
        tracing::info!(
            "Batch complete: {} live, {} failed, fallback {}",
            targets.len() - failures.len(),
            failures.len(),
            if fallback { "on" } else { "off" }
        );

        if fallback {
            let note = format!(
                "API failed for {} of {} domains, using mock data for: {}",
                failures.len(),
                targets.len(),
                failed_list
            );
            return Ok(BatchResponse::new(data, Some(note)));
        }

        if data.is_empty() {
            tracing::error!("Live provider failed for every domain in the batch");
            return Ok(BatchResponse::failed(format!(
                "Live provider failed for all {} domains and mock data fallback is disabled: {}",
                targets.len(),
                failed_list
            )));
        }

        let note = format!(
            "Live provider failed for {} of {} domains, omitted: {}",
            failures.len(),
            targets.len(),
            failed_list
        );
        Ok(BatchResponse::new(data, Some(note)))
    }

    /// One bounded, breaker-guarded live lookup, normalized.
    async fn lookup(
        &self,
        provider: &P,
        target: &DomainTarget,
        user_id: Option<&str>,
    ) -> Result<AnalysisRecord, ProviderError> {
        let fetch = async {
            tokio::time::timeout(self.timeout, provider.fetch_raw(&target.url, user_id))
                .await
                .unwrap_or(Err(ProviderError::Timeout))
        };

        let payload = match self.breaker.call_with(is_provider_fault, fetch).await {
            Ok(payload) => payload,
            Err(failsafe::Error::Inner(e)) => return Err(e),
            Err(failsafe::Error::Rejected) => return Err(ProviderError::CircuitOpen),
        };

        normalize_payload(&target.host, &payload)
    }
}

fn describe_failures(failures: &[(&DomainTarget, ProviderError)]) -> String {
    failures
        .iter()
        .map(|(target, err)| format!("{} ({})", target.host, err.kind()))
        .collect::<Vec<_>>()
        .join(", ")
}
