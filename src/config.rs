use serde::Deserialize;

pub const DEFAULT_APIFY_BASE_URL: &str = "https://api.apify.com";
/// Similarweb scraper actor on Apify.
pub const DEFAULT_APIFY_ACTOR_ID: &str = "heLi1j7hzjC2gFlIx";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub apify_api_token: Option<String>, // None routes every batch to the synthesizer
    pub apify_base_url: String,
    pub apify_actor_id: String,
    pub provider_timeout_secs: u64,
    pub max_concurrent_lookups: usize,
    pub mock_fallback_enabled: bool,
    pub cors_allowed_origin: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            apify_api_token: std::env::var("APIFY_API_TOKEN")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            apify_base_url: std::env::var("APIFY_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_APIFY_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            apify_actor_id: std::env::var("APIFY_ACTOR_ID")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_APIFY_ACTOR_ID.to_string()),
            provider_timeout_secs: parse_positive(
                "PROVIDER_TIMEOUT_SECS",
                std::env::var("PROVIDER_TIMEOUT_SECS").ok(),
                120,
            )?,
            max_concurrent_lookups: parse_positive(
                "MAX_CONCURRENT_LOOKUPS",
                std::env::var("MAX_CONCURRENT_LOOKUPS").ok(),
                4,
            )? as usize,
            mock_fallback_enabled: match std::env::var("MOCK_FALLBACK_ENABLED") {
                Ok(raw) => parse_bool(&raw).ok_or_else(|| {
                    anyhow::anyhow!("MOCK_FALLBACK_ENABLED must be true or false, got '{}'", raw)
                })?,
                Err(_) => true,
            },
            cors_allowed_origin: std::env::var("CORS_ALLOWED_ORIGIN")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "http://localhost:3000".to_string()),
        };

        if !config.apify_base_url.starts_with("http://")
            && !config.apify_base_url.starts_with("https://")
        {
            anyhow::bail!("APIFY_BASE_URL must start with http:// or https://");
        }

        // Log without sensitive values
        tracing::info!("Configuration loaded successfully");
        tracing::info!("Apify token configured: {}", config.provider_configured());
        tracing::debug!("Apify base URL: {}", config.apify_base_url);
        tracing::debug!("Apify actor: {}", config.apify_actor_id);
        tracing::debug!(
            "Provider timeout: {}s, max concurrent lookups: {}, mock fallback: {}",
            config.provider_timeout_secs,
            config.max_concurrent_lookups,
            config.mock_fallback_enabled
        );
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }

    /// Whether live-provider credentials are present.
    pub fn provider_configured(&self) -> bool {
        self.apify_api_token.is_some()
    }
}

fn parse_positive(name: &str, raw: Option<String>, default: u64) -> anyhow::Result<u64> {
    let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => anyhow::bail!("{} must be a positive integer, got '{}'", name, raw),
        Ok(value) => Ok(value),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
