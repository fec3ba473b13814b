//! SimilarWeb Analysis API Library
//!
//! This library provides the analysis orchestration layer behind the traffic
//! dashboard: it takes a batch of domains, queries the Similarweb scraper on
//! Apify (or synthesizes substitute data), normalizes everything into one
//! record shape and returns a uniform, partially degradable batch response.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Core business logic.
//! - `integrations`: External service integrations.
//! - `apify_client`: Apify actor client.
//! - `circuit_breaker`: Circuit breaker guarding the live provider.
//! - `config`: Configuration management.
//! - `domain`: Domain canonicalisation.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Canonical record and request/response models.
//! - `normalize`: Provider payload normalisation and defaulting.
//! - `orchestrator`: Batch fan-out with per-domain fallback.
//! - `provider`: The provider trait.
//! - `router`: Router and CORS assembly.
//! - `synthesizer`: Deterministic substitute data.

pub mod api;
pub mod core;
pub mod integrations;

// Re-export primary modules for shared use in tests and other binaries
pub mod apify_client;
pub mod circuit_breaker;
pub mod config;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod router;
pub mod synthesizer;
