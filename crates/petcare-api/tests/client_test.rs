#![allow(clippy::unwrap_used)]
// Integration tests for `PetcareClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use petcare_api::{
    Credentials, Error, Method, PetcareClient, RateLimits, RetryPolicy, TlsMode, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn credentials() -> Credentials {
    Credentials {
        email: "owner@example.com".into(),
        password: SecretString::from("hunter2".to_string()),
    }
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        budget: 3,
        backoff: Duration::from_millis(10),
    }
}

async fn setup() -> (MockServer, PetcareClient) {
    let server = MockServer::start().await;
    let client = PetcareClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        credentials(),
        fast_retry(),
        RateLimits::default(),
    );
    (server, client)
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": token }
        })))
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_success_sends_credentials_and_device_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_partial_json(json!({
            "email_address": "owner@example.com",
            "password": "hunter2",
            "device_id": client.session().device_id(),
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "tok-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.login(false).await.unwrap());
    assert!(client.session().has_token());
}

#[tokio::test]
async fn test_login_within_window_skips_network() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "tok-1" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.login(false).await.unwrap());
    assert!(client.login(false).await.unwrap());
}

#[tokio::test]
async fn test_forced_login_bypasses_window() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "tok-1" }
        })))
        .expect(2)
        .mount(&server)
        .await;

    assert!(client.login(false).await.unwrap());
    assert!(client.login(true).await.unwrap());
}

#[tokio::test]
async fn test_concurrent_logins_issue_one_request() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": { "token": "tok-1" } }))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (a, b, c) = tokio::join!(client.login(false), client.login(false), client.login(false));
    assert!(a.unwrap() && b.unwrap() && c.unwrap());
}

#[tokio::test]
async fn test_login_failure_clears_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    assert!(!client.login(true).await.unwrap());
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn test_login_without_token_is_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .mount(&server)
        .await;

    assert!(!client.login(false).await.unwrap());
    assert!(!client.session().has_token());
}

// ── Fetch ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_sends_identity_headers() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-1").await;

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("x-device-id", client.session().device_id()))
        .and(header_exists("x-requested-with"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": {} })))
        .expect(1)
        .mount(&server)
        .await;

    client.login(false).await.unwrap();
    let url = client.me_start_url().unwrap();
    let body = client.fetch(Method::GET, &url, None).await.unwrap();
    assert_eq!(body, Some(json!({ "data": {} })));
}

#[tokio::test]
async fn test_etag_is_sent_and_replaced_per_resource() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(json!({ "data": 1 })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .and(header("etag", "v1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v2\"")
                .set_body_json(json!({ "data": 2 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/timeline/household/9/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"other\"")
                .set_body_json(json!({ "data": [] })),
        )
        .mount(&server)
        .await;

    let me = client.me_start_url().unwrap();
    let timeline = client.timeline_url(9).unwrap();

    client.fetch(Method::GET, &me, None).await.unwrap();
    client.fetch(Method::GET, &timeline, None).await.unwrap();
    assert_eq!(client.session().etag(me.as_str()).as_deref(), Some("v1"));

    let second = client.fetch(Method::GET, &me, None).await.unwrap();
    assert_eq!(second, Some(json!({ "data": 2 })));
    assert_eq!(client.session().etag(me.as_str()).as_deref(), Some("v2"));
    assert_eq!(
        client.session().etag(timeline.as_str()).as_deref(),
        Some("other")
    );

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("etag").is_none());
}

#[tokio::test]
async fn test_unauthorized_triggers_single_relogin_then_succeeds() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "fresh" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let body = client.fetch(Method::GET, &url, None).await.unwrap();
    assert_eq!(body, Some(json!({ "data": "ok" })));
}

#[tokio::test]
async fn test_persistent_unauthorized_exhausts_budget() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "useless" }
        })))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(401))
        .expect(4)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let body = client.fetch(Method::GET, &url, None).await.unwrap();
    assert!(body.is_none());
    assert!(!client.session().has_token());
}

#[tokio::test]
async fn test_unauthorized_with_failed_relogin_returns_none() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    assert!(client.fetch(Method::GET, &url, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_undecodable_relogin_response_returns_none() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    assert!(client.fetch(Method::GET, &url, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_concurrent_unauthorized_fetches_share_one_relogin() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "token": "new" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "ok" })))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let (a, b) = tokio::join!(
        client.fetch(Method::GET, &url, None),
        client.fetch(Method::GET, &url, None),
    );
    assert_eq!(a.unwrap(), Some(json!({ "data": "ok" })));
    assert_eq!(b.unwrap(), Some(json!({ "data": "ok" })));

    let requests = server.received_requests().await.unwrap();
    let logins = requests
        .iter()
        .filter(|r| r.url.path() == "/auth/login")
        .count();
    assert_eq!(logins, 1);
    assert!(client.session().has_token());
}

#[tokio::test]
async fn test_fetches_are_serialized_client_wide() {
    let (server, client) = setup().await;
    let delay = Duration::from_millis(150);

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": "slow" }))
                .set_delay(delay),
        )
        .expect(3)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let started = std::time::Instant::now();
    let (a, b, c) = tokio::join!(
        client.fetch(Method::GET, &url, None),
        client.fetch(Method::GET, &url, None),
        client.fetch(Method::GET, &url, None),
    );
    let elapsed = started.elapsed();

    assert!(a.unwrap().is_some() && b.unwrap().is_some() && c.unwrap().is_some());
    assert!(
        elapsed >= delay * 3,
        "three fetches overlapped: finished in {elapsed:?}"
    );
}

#[tokio::test]
async fn test_other_status_is_no_result_without_retry() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    assert!(client.fetch(Method::GET, &url, None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_sends_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/device/5/control"))
        .and(body_partial_json(json!({ "locking": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "locking": 1 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client.control_url(5).unwrap();
    let body = client
        .fetch(Method::PUT, &url, Some(&json!({ "locking": 1 })))
        .await
        .unwrap();
    assert_eq!(body, Some(json!({ "data": { "locking": 1 } })));
}

#[tokio::test]
async fn test_non_json_success_body_is_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let result = client.fetch(Method::GET, &url, None).await;
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Timeouts ────────────────────────────────────────────────────────

fn timeout_client(server: &MockServer, budget: u32) -> PetcareClient {
    let transport = TransportConfig {
        tls: TlsMode::System,
        timeout: Duration::from_millis(100),
        retry: RetryPolicy {
            budget,
            backoff: Duration::from_millis(10),
        },
    };
    PetcareClient::new(
        Url::parse(&server.uri()).unwrap(),
        credentials(),
        &transport,
        RateLimits::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn test_timeout_retries_then_succeeds() {
    let server = MockServer::start().await;
    let client = timeout_client(&server, 3);

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": "late" }))
                .set_delay(Duration::from_millis(500)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "on time" })))
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let body = client.fetch(Method::GET, &url, None).await.unwrap();
    assert_eq!(body, Some(json!({ "data": "on time" })));
}

#[tokio::test]
async fn test_timeout_exhausts_budget_and_propagates() {
    let server = MockServer::start().await;
    let client = timeout_client(&server, 2);

    Mock::given(method("GET"))
        .and(path("/me/start"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .expect(3)
        .mount(&server)
        .await;

    let url = client.me_start_url().unwrap();
    let result = client.fetch(Method::GET, &url, None).await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout error, got: {result:?}"
    );
}
