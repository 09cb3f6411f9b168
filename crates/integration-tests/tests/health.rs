//! Liveness and readiness probes.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use oba_integration_tests::TestContext;
use reqwest::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_health_is_ok_without_backend_calls() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
    assert!(ctx.backend.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_readiness_follows_backend_health() {
    let ctx = TestContext::new().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .up_to_n_times(1)
        .mount(&ctx.backend)
        .await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.backend)
        .await;

    assert_eq!(ctx.get("/health/ready").await.status(), StatusCode::OK);
    assert_eq!(
        ctx.get("/health/ready").await.status(),
        StatusCode::SERVICE_UNAVAILABLE
    );
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    let headers = response.headers();

    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}
