/// Integration tests with a mocked Apify API
/// Exercises the HTTP client and the full router without hitting real external services
use axum::body::Body;
use axum::http::{Request, StatusCode};
use rust_similarweb_api::apify_client::ApifyClient;
use rust_similarweb_api::config::Config;
use rust_similarweb_api::errors::ProviderError;
use rust_similarweb_api::handlers::AppState;
use rust_similarweb_api::models::{BatchResponse, Rank};
use rust_similarweb_api::orchestrator::Orchestrator;
use rust_similarweb_api::provider::TrafficProvider;
use rust_similarweb_api::router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACTOR: &str = "test-actor";
const RUN_PATH: &str = "/v2/acts/test-actor/run-sync-get-dataset-items";

/// Helper function to create test config
fn create_test_config(apify_base_url: String, token: Option<&str>) -> Config {
    Config {
        port: 8080,
        apify_api_token: token.map(str::to_string),
        apify_base_url,
        apify_actor_id: ACTOR.to_string(),
        provider_timeout_secs: 2,
        max_concurrent_lookups: 4,
        mock_fallback_enabled: true,
        cors_allowed_origin: "http://localhost:3000".to_string(),
    }
}

fn test_client(base_url: String, timeout: Duration) -> ApifyClient {
    ApifyClient::new(base_url, ACTOR.to_string(), "test_token".to_string(), timeout).unwrap()
}

fn linkedin_item() -> Value {
    json!({
        "name": "linkedin.com",
        "globalRank": 27,
        "countryRank": 15,
        "categoryRank": 1,
        "companyName": "LinkedIn Corporation",
        "companyYearFounded": 2003,
        "companyEmployeesMin": 10000,
        "totalVisits": 2500000000u64,
        "avgVisitDuration": "00:08:45",
        "pagesPerVisit": 4.2,
        "bounceRate": 0.35,
        "trafficSources": {
            "directVisitsShare": 0.45,
            "organicSearchVisitsShare": 0.35,
            "referralVisitsShare": 0.10,
            "socialNetworksVisitsShare": 0.05,
            "mailVisitsShare": 0.03,
            "paidSearchVisitsShare": 0.02,
            "adsVisitsShare": 0.0
        },
        "topCountries": [
            {"countryAlpha2Code": "US", "visitsShare": 0.42, "visitsShareChange": 0.02},
            {"countryAlpha2Code": "IN", "visitsShare": 0.15, "visitsShareChange": 0.05}
        ],
        "topSimilarityCompetitors": [
            {"domain": "indeed.com", "visitsTotalCount": 1800000000u64, "affinity": 0.85, "categoryRank": null}
        ]
    })
}

async fn app_with(orchestrator: Orchestrator<ApifyClient>, config: Config) -> axum::Router {
    let state = Arc::new(AppState {
        config,
        orchestrator,
    });
    router::build_router(state, router::api_routes(), CorsLayer::permissive())
}

async fn post_analyze(app: axum::Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/analyze")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_apify_successful_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(header("Authorization", "Bearer test_token"))
        .and(body_partial_json(json!({
            "websites": ["https://www.linkedin.com"],
            "userId": "user-1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([linkedin_item()])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri(), Duration::from_secs(5));
    let item = client
        .fetch_raw("https://www.linkedin.com", Some("user-1"))
        .await
        .unwrap();

    assert_eq!(item["name"], "linkedin.com");
}

#[tokio::test]
async fn test_apify_status_mapping() {
    let mock_server = MockServer::start().await;

    for (site, status) in [("https://www.gone.com", 404u16), ("https://www.busy.com", 429), ("https://www.boom.com", 500)] {
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .and(body_partial_json(json!({ "websites": [site] })))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;
    }

    let client = test_client(mock_server.uri(), Duration::from_secs(5));

    assert_eq!(
        client.fetch_raw("https://www.gone.com", None).await.unwrap_err(),
        ProviderError::NotFound
    );
    assert_eq!(
        client.fetch_raw("https://www.busy.com", None).await.unwrap_err(),
        ProviderError::RateLimited
    );
    assert_eq!(
        client.fetch_raw("https://www.boom.com", None).await.unwrap_err(),
        ProviderError::Upstream {
            status: 500,
            body: "nope".to_string()
        }
    );
}

#[tokio::test]
async fn test_apify_empty_dataset_and_garbage() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(body_partial_json(json!({ "websites": ["https://www.empty.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(body_partial_json(json!({ "websites": ["https://www.garbage.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri(), Duration::from_secs(5));

    assert_eq!(
        client.fetch_raw("https://www.empty.com", None).await.unwrap_err(),
        ProviderError::NotFound
    );
    assert!(matches!(
        client.fetch_raw("https://www.garbage.com", None).await,
        Err(ProviderError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_apify_client_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([linkedin_item()]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let client = test_client(mock_server.uri(), Duration::from_millis(200));
    let result = client.fetch_raw("https://www.linkedin.com", None).await;

    assert_eq!(result.unwrap_err(), ProviderError::Timeout);
}

#[tokio::test]
async fn test_health_endpoint() {
    let config = create_test_config("https://api.apify.com".to_string(), None);
    let app = app_with(Orchestrator::from_config(&config).unwrap(), config).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_analyze_without_token_uses_mock_data() {
    let config = create_test_config("https://api.apify.com".to_string(), None);
    let orchestrator = Orchestrator::from_config(&config).unwrap();
    assert!(!orchestrator.provider_configured());
    let app = app_with(orchestrator, config).await;

    let (status, body) = post_analyze(
        app,
        json!({"websites": ["example.com"], "userId": "test-user-123"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "example.com");
    assert!(body["note"].as_str().is_some_and(|n| !n.is_empty()));

    let parsed: BatchResponse = serde_json::from_value(body).unwrap();
    assert!(parsed.data[0].validate_ranges().is_ok());
}

#[tokio::test]
async fn test_analyze_empty_websites_is_client_error() {
    let config = create_test_config("https://api.apify.com".to_string(), None);
    let app = app_with(Orchestrator::from_config(&config).unwrap(), config).await;

    let (status, body) = post_analyze(app, json!({"websites": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please provide an array of websites to analyze");
}

#[tokio::test]
async fn test_analyze_mixed_live_and_failed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(body_partial_json(json!({ "websites": ["https://www.linkedin.com"] })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([linkedin_item()])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .and(body_partial_json(json!({ "websites": ["https://www.medium.com"] })))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri(), Some("test_token"));
    let app = app_with(Orchestrator::from_config(&config).unwrap(), config).await;

    let (status, body) = post_analyze(
        app,
        json!({"websites": ["https://www.linkedin.com", "medium.com"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);

    let parsed: BatchResponse = serde_json::from_value(body).unwrap();
    let live = &parsed.data[0];
    assert_eq!(live.name, "linkedin.com");
    assert_eq!(live.global_rank, Rank::Position(27));
    assert_eq!(live.company_employees_max, 0);
    assert_eq!(live.organic_traffic, 875_000_000);
    assert_eq!(live.paid_traffic, 50_000_000);
    assert_eq!(live.top_similarity_competitors[0].category_rank, Rank::Unknown);
    assert!(live.top_keywords.is_empty());

    assert_eq!(parsed.data[1].name, "medium.com");
    assert!(parsed.note.unwrap().contains("medium.com (rate limited)"));
}

#[tokio::test]
async fn test_analyze_total_outage_without_fallback_is_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(RUN_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(mock_server.uri(), Some("test_token"));
    config.mock_fallback_enabled = false;
    let app = app_with(Orchestrator::from_config(&config).unwrap(), config).await;

    let (status, body) = post_analyze(app, json!({"websites": ["a.com", "b.com"]})).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], json!([]));
    assert!(body["note"].as_str().unwrap().contains("a.com (upstream error)"));
}

#[tokio::test]
async fn test_root_and_options() {
    let config = create_test_config("https://api.apify.com".to_string(), None);
    let app = app_with(Orchestrator::from_config(&config).unwrap(), config).await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/analyze")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
