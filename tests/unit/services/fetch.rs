//! Unit tests for the retrying fetch client

use cyclewatch::errors::FetchError;
use cyclewatch::services::fetch::{FetchClient, FetchRequest, Fetcher, RetryPolicy, USER_AGENT};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(attempts: usize) -> FetchClient {
    FetchClient::new(
        Duration::from_secs(5),
        RetryPolicy::new(attempts, Duration::from_millis(1)),
    )
}

#[tokio::test]
async fn test_sends_user_agent_query_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .and(header("user-agent", USER_AGENT))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"bitcoin": {"usd": 1.0}})))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::get(format!("{}/simple/price", server.uri()))
        .query("ids", "bitcoin")
        .header("x-api-key", "secret");
    let body = client(3).fetch(&request).await.unwrap();

    assert_eq!(body["bitcoin"]["usd"], 1.0);
}

#[tokio::test]
async fn test_retries_server_errors_until_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::get(format!("{}/flaky", server.uri()));
    let body = client(3).fetch(&request).await.unwrap();

    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::get(format!("{}/missing", server.uri()));
    let err = client(3).fetch(&request).await.unwrap_err();

    assert_eq!(err, FetchError::http(404, "not found"));
}

#[tokio::test]
async fn test_rate_limit_exhausts_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/limited"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .expect(3)
        .mount(&server)
        .await;

    let request = FetchRequest::get(format!("{}/limited", server.uri()));
    let err = client(3).fetch(&request).await.unwrap_err();

    assert!(matches!(err, FetchError::Http { status: 429, .. }));
}

#[tokio::test]
async fn test_invalid_json_is_a_parse_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let request = FetchRequest::get(format!("{}/html", server.uri()));
    let err = client(3).fetch(&request).await.unwrap_err();

    assert_eq!(err.kind(), "parse_error");
}

#[tokio::test]
async fn test_unreachable_host_is_a_transport_error() {
    let request = FetchRequest::get("http://127.0.0.1:1/nothing");
    let err = client(1).fetch(&request).await.unwrap_err();

    assert!(matches!(err, FetchError::Transport { .. }));
}

#[tokio::test]
async fn test_timeout_is_reported_as_transport_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let fetcher = FetchClient::new(
        Duration::from_millis(50),
        RetryPolicy::new(1, Duration::from_millis(1)),
    );
    let request = FetchRequest::get(format!("{}/slow", server.uri()));
    let err = fetcher.fetch(&request).await.unwrap_err();

    assert_eq!(err, FetchError::transport("timeout"));
}
