//! OpenAlex client tests against a mock server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use research_shelf::client::OpenAlexClient;
use research_shelf::config::Config;
use research_shelf::error::ClientError;
use research_shelf::models::UNKNOWN_JOURNAL;

fn client_for(mock_server: &MockServer) -> OpenAlexClient {
    OpenAlexClient::new(&Config::for_testing(&mock_server.uri())).unwrap()
}

fn sample_work() -> serde_json::Value {
    json!({
        "id": "https://openalex.org/W2741809807",
        "display_name": "Attention Is All You Need",
        "publication_year": 2017,
        "doi": "https://doi.org/10.48550/arxiv.1706.03762",
        "authorships": [
            { "author": { "display_name": "Ashish Vaswani" } },
            { "author": { "display_name": "Noam Shazeer" } }
        ],
        "abstract_inverted_index": { "models": [1], "Sequence": [0], "dominate": [2] },
        "primary_location": { "source": { "display_name": "Advances in Neural Information Processing Systems" } },
        "biblio": { "volume": "30", "issue": null, "first_page": "5998", "last_page": "6008" }
    })
}

// =============================================================================
// Config and construction
// =============================================================================

#[test]
fn test_client_reports_mailto_status() {
    let client = OpenAlexClient::new(&Config::new(Some("me@example.org".into()))).unwrap();
    assert!(client.has_mailto());

    let client = OpenAlexClient::new(&Config::default()).unwrap();
    assert!(!client.has_mailto());
}

#[test]
fn test_client_debug_output() {
    let client = OpenAlexClient::new(&Config::for_testing("http://127.0.0.1:1/")).unwrap();
    let debug = format!("{client:?}");
    assert!(debug.contains("http://127.0.0.1:1"));
    assert!(debug.contains("has_mailto"));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_maps_works_to_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("search", "transformers"))
        .and(query_param("filter", "has_abstract:true,type:article"))
        .and(query_param("per_page", "5"))
        .and(query_param("sort", "relevance_score:desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [sample_work()] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let results = client_for(&mock_server).search_works("transformers", 5).await.unwrap();

    assert_eq!(results.len(), 1);
    let hit = &results[0];
    assert_eq!(hit.id, "https://openalex.org/W2741809807");
    assert_eq!(hit.title, "Attention Is All You Need");
    assert_eq!(hit.authors, vec!["Ashish Vaswani", "Noam Shazeer"]);
    assert_eq!(hit.year, Some(2017));
    assert_eq!(hit.r#abstract.as_deref(), Some("Sequence models dominate"));
    assert_eq!(hit.url, "https://doi.org/10.48550/arxiv.1706.03762");
    assert_eq!(hit.journal, "Advances in Neural Information Processing Systems");
    assert_eq!(hit.volume, "30");
    assert_eq!(hit.issue, "");
    assert_eq!(hit.pages, "5998-6008");
}

#[tokio::test]
async fn test_search_fills_missing_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "https://openalex.org/W1", "primary_location": null }]
        })))
        .mount(&mock_server)
        .await;

    let results = client_for(&mock_server).search_works("anything", 10).await.unwrap();

    let hit = &results[0];
    assert_eq!(hit.url, "https://openalex.org/W1");
    assert_eq!(hit.journal, UNKNOWN_JOURNAL);
    assert_eq!(hit.pages, "-");
    assert!(hit.authors.is_empty());
    assert!(hit.r#abstract.is_none());
}

#[tokio::test]
async fn test_search_sends_mailto_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .and(query_param("mailto", "me@example.org"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.mailto = Some("me@example.org".into());
    let client = OpenAlexClient::new(&config).unwrap();

    assert!(client.search_works("q", 1).await.unwrap().is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_search_bad_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid filter"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).search_works("q", 10).await.unwrap_err();
    assert!(matches!(err, ClientError::BadRequest { ref message } if message == "Invalid filter"));
}

#[tokio::test]
async fn test_search_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such endpoint"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).search_works("q", 10).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_search_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": "nope" })))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server).search_works("q", 10).await.unwrap_err();
    assert!(matches!(err, ClientError::Parse(_)));
}

#[tokio::test]
async fn test_search_rejects_bad_input_without_calling_api() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(matches!(client.search_works("   ", 10).await, Err(ClientError::BadRequest { .. })));
    assert!(matches!(client.search_works("q", 0).await, Err(ClientError::BadRequest { .. })));
    assert!(matches!(client.search_works("q", 201).await, Err(ClientError::BadRequest { .. })));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/works"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = Config::for_testing(&mock_server.uri());
    config.request_timeout = Duration::from_millis(100);
    config.max_retries = 0;
    let client = OpenAlexClient::new(&config).unwrap();

    let err = client.search_works("slow", 5).await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(timeout) if timeout == Duration::from_millis(100)));
    assert!(err.is_retryable());
}
