// Integration tests for the request core: retry, budget, verbs and headers

use crate::common::{ScriptedTransport, header, scripted_client, test_config};
use iplicit_client::prelude::*;
use std::time::Duration;

const BASE: &str = "https://tenant.example.test/api";

fn within(actual: Duration, expected: Duration) -> bool {
    actual >= expected && actual < expected + Duration::from_millis(50)
}

#[tokio::test(start_paused = true)]
async fn test_three_timeouts_exhaust_attempts() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    for _ in 0..3 {
        transport.push_api(Err(TransportError::Timeout("deadline elapsed".to_string())));
    }
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let err = client.get("document/1", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Connection(ref msg) if msg.contains("3 attempts")));
    assert_eq!(err.category(), ErrorCategory::ConnectionFailure);

    let instants = transport.api_instants();
    assert_eq!(instants.len(), 3);
    assert!(within(instants[1] - instants[0], Duration::from_secs(1)));
    assert!(within(instants[2] - instants[1], Duration::from_secs(2)));
    assert_eq!(client.budget().count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_success_after_transient_failures() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_api(Err(TransportError::Timeout("slow".to_string())));
    transport.push_api(Err(TransportError::Network("connection reset".to_string())));
    transport.push_ok(200, r#"{"id":"d-1","status":"Draft"}"#);
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let document = client.get("document/d-1", &[]).await.unwrap();
    assert_eq!(document["status"], "Draft");
    assert_eq!(transport.api_requests().len(), 3);
    assert_eq!(transport.auth_calls(), 1);
    assert_eq!(client.budget().count(), 1);
}

#[tokio::test]
async fn test_invalid_request_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_api(Err(TransportError::Request("bad header value".to_string())));
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let err = client.get("document/1", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Connection(_)));
    assert_eq!(transport.api_requests().len(), 1);
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(503, "maintenance");
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let err = client.get("document/1", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::Server { status: 503, .. }));
    assert_eq!(transport.api_requests().len(), 1);
}

#[tokio::test]
async fn test_unsupported_verb_never_reaches_the_network() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let err = client
        .request(ApiRequest::new(Method::HEAD, "document/1"))
        .await
        .unwrap_err();

    match err {
        AppError::UnsupportedMethod {
            method,
            url,
            status,
        } => {
            assert_eq!(method, "HEAD");
            assert_eq!(status, None);
            assert_eq!(url, format!("{BASE}/document/1"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(transport.auth_calls(), 0);
    assert!(transport.api_requests().is_empty());
}

#[tokio::test]
async fn test_rejected_token_is_refreshed_on_next_call() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(401, "");
    transport.push_ok(200, r#"{"id":"d-1"}"#);
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let err = client.get("document/d-1", &[]).await.unwrap_err();
    assert!(matches!(err, AppError::AuthExpired));
    assert!(err.is_retryable_with_refresh());
    assert!(client.session().current_token().await.is_none());

    client.get("document/d-1", &[]).await.unwrap();
    assert_eq!(transport.auth_calls(), 2);
}

#[tokio::test]
async fn test_default_headers_and_overrides() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(200, "{}");
    transport.push_ok(200, "{}");
    let client = scripted_client(transport.clone(), &test_config(BASE));

    client
        .get("contactaccount", &[("maxRecordCount", "100".to_string())])
        .await
        .unwrap();
    client
        .request(
            ApiRequest::new(Method::POST, "/upload")
                .with_body(json!({"name": "a.pdf"}))
                .with_header("content-type", "application/pdf"),
        )
        .await
        .unwrap();

    let requests = transport.api_requests();
    let first = &requests[0];
    assert_eq!(first.url, format!("{BASE}/contactaccount"));
    assert_eq!(first.query, vec![("maxRecordCount".to_string(), "100".to_string())]);
    assert_eq!(header(first, "Domain"), Some("acme"));
    assert_eq!(header(first, "Authorization"), Some("Bearer tok-1"));
    assert_eq!(header(first, "Content-Type"), Some("application/json"));

    let second = &requests[1];
    assert_eq!(second.url, format!("{BASE}/upload"));
    assert_eq!(header(second, "Content-Type"), Some("application/pdf"));
    assert_eq!(
        second
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("content-type"))
            .count(),
        1
    );
    assert_eq!(second.body, Some(json!({"name": "a.pdf"})));
}

#[tokio::test]
async fn test_non_json_success_is_wrapped() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(200, "OK, queued");
    transport.push_ok(204, "");
    let client = scripted_client(transport, &test_config(BASE));

    let wrapped = client.post("batch", json!({})).await.unwrap();
    assert_eq!(wrapped[RAW_RESPONSE_KEY], "OK, queued");

    let empty = client.delete("batch/1").await.unwrap();
    assert_eq!(empty, json!({}));
}

#[tokio::test(start_paused = true)]
async fn test_budget_pauses_until_window_rolls_over() {
    let mut config = test_config(BASE);
    config.rate_limiter.threshold = 2;
    config.rate_limiter.period_seconds = 300;

    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    for _ in 0..3 {
        transport.push_ok(200, "{}");
    }
    let client = scripted_client(transport.clone(), &config);

    client.get("document/1", &[]).await.unwrap();
    client.get("document/2", &[]).await.unwrap();
    assert_eq!(client.budget().count(), 2);

    client.get("document/3", &[]).await.unwrap();

    let instants = transport.api_instants();
    assert!(instants[2] - instants[1] >= Duration::from_secs(299));
    assert_eq!(client.budget().count(), 1);
}

#[tokio::test]
async fn test_failed_calls_do_not_consume_budget() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(404, "");
    transport.push_ok(400, r#"{"message":"bad"}"#);
    transport.push_ok(200, "{}");
    let client = scripted_client(transport, &test_config(BASE));

    assert!(client.get("missing", &[]).await.is_err());
    assert!(client.post("document", json!({})).await.is_err());
    client.get("document/1", &[]).await.unwrap();

    assert_eq!(client.budget().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_calls_never_overshoot_the_budget() {
    let mut config = test_config(BASE);
    config.rate_limiter.max_requests = 2;
    config.rate_limiter.threshold = 2;
    config.rate_limiter.period_seconds = 300;

    let transport = Arc::new(
        ScriptedTransport::with_token("tok-1").with_auth_latency(Duration::from_millis(100)),
    );
    for _ in 0..6 {
        transport.push_ok(200, "{}");
    }
    let client = Arc::new(scripted_client(transport.clone(), &config));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.get("document/1", &[]).await })
        })
        .collect();
    for handle in handles {
        handle.await.expect("task panicked").expect("request");
    }

    let mut instants = transport.api_instants();
    instants.sort();
    assert_eq!(instants.len(), 6);
    // Any three consecutive calls span more than one window
    for pair in instants.windows(3) {
        assert!(pair[2] - pair[0] >= Duration::from_secs(299));
    }
    assert!(client.budget().count() <= 2);
    assert_eq!(client.budget().in_flight(), 0);
    assert_eq!(transport.auth_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_call_dropped_mid_flight_releases_its_slot() {
    let transport =
        Arc::new(ScriptedTransport::with_token("tok-1").with_auth_latency(Duration::from_secs(1)));
    transport.push_ok(200, "{}");
    let client = scripted_client(transport.clone(), &test_config(BASE));

    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), client.get("document/1", &[])).await;
    assert!(abandoned.is_err());
    assert_eq!(client.budget().count(), 0);
    assert_eq!(client.budget().in_flight(), 0);
    assert!(client.session().current_token().await.is_none());

    client.get("document/1", &[]).await.unwrap();
    assert_eq!(client.budget().count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_call_dropped_during_budget_pause_is_not_counted() {
    let mut config = test_config(BASE);
    config.rate_limiter.threshold = 1;

    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    transport.push_ok(200, "{}");
    transport.push_ok(200, "{}");
    let client = scripted_client(transport.clone(), &config);

    client.get("document/1", &[]).await.unwrap();
    let paused =
        tokio::time::timeout(Duration::from_secs(60), client.get("document/2", &[])).await;
    assert!(paused.is_err());
    assert_eq!(client.budget().count(), 1);
    assert_eq!(client.budget().in_flight(), 0);
    assert_eq!(transport.api_requests().len(), 1);

    client.get("document/3", &[]).await.unwrap();
    let requests = transport.api_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].url, format!("{BASE}/document/3"));
}
