//! HTTP-level tests for the per-key verification protocol.
//!
//! A wiremock server stands in for the remote endpoint so every branch of
//! the classification and retry policy can be exercised: terminal 200/400,
//! 429 up to the attempt ceiling, timeouts, and unexpected statuses.

use std::time::Duration;

use keysweep_core::{KeyVerifier, Verdict, VerifierConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer, max_attempts: u32) -> VerifierConfig {
    VerifierConfig {
        endpoint: format!("{}/check", server.uri()),
        timeout_secs: 1,
        max_attempts,
        ..VerifierConfig::default()
    }
    .without_pacing()
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .len()
}

#[tokio::test]
async fn test_200_yields_valid_with_one_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaTestKey").await;

    assert_eq!(verdict, Verdict::Valid);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_429_every_attempt_yields_rate_limited_at_ceiling() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaThrottled").await;

    // Hitting the ceiling on 429 must stay distinguishable from Invalid
    assert_eq!(verdict, Verdict::RateLimited);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_429_then_200_yields_valid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaRecovers").await;

    assert_eq!(verdict, Verdict::Valid);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_400_yields_invalid_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaBadKey").await;

    assert_eq!(verdict, Verdict::Invalid);
    // Permanent rejection is never retried
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_403_yields_invalid_immediately() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaForbidden").await;

    assert_eq!(verdict, Verdict::Invalid);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_unexpected_status_yields_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIzaWhoKnows").await;

    assert_eq!(verdict, Verdict::Invalid);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_timeout_every_attempt_yields_invalid_after_ceiling() {
    let server = MockServer::start().await;

    // Response delay well past the 1s request timeout
    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 2)).unwrap();
    let verdict = verifier.verify("AIzaSlowpoke").await;

    assert_eq!(verdict, Verdict::Invalid);
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_credential_sent_as_query_parameter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .and(query_param("key", "AIza/needs+encoding"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    let verdict = verifier.verify("AIza/needs+encoding").await;

    assert_eq!(verdict, Verdict::Valid);
}

#[tokio::test]
async fn test_request_body_is_trivial_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/check"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let verifier = KeyVerifier::new(test_config(&server, 3)).unwrap();
    verifier.verify("AIzaBodyCheck").await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
}
