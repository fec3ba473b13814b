use crate::errors::ProviderError;
use failsafe::backoff::{self, Exponential};
use failsafe::failure_policy::{self, ConsecutiveFailures};
use failsafe::{Config, StateMachine};
use std::time::Duration;

/// Breaker guarding the live provider.
pub type ProviderBreaker = StateMachine<ConsecutiveFailures<Exponential>, ()>;

/// Creates a circuit breaker for live provider calls.
///
/// # Configuration
///
/// - **Failure threshold**: 5 consecutive failures triggers OPEN state.
/// - **Backoff**: Exponential backoff from 10s to 60s before attempting recovery.
///
/// While OPEN, calls are rejected immediately and the orchestrator serves
/// synthesized data for those domains.
pub fn create_provider_circuit_breaker() -> ProviderBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}

/// Whether an error says something about provider health.
///
/// A domain the provider simply has no data for does not count.
pub fn is_provider_fault(err: &ProviderError) -> bool {
    match err {
        ProviderError::Timeout
        | ProviderError::RateLimited
        | ProviderError::Transport(_) => true,
        ProviderError::Upstream { status, .. } => *status >= 500,
        ProviderError::NotFound
        | ProviderError::Malformed(_)
        | ProviderError::CircuitOpen => false,
    }
}
