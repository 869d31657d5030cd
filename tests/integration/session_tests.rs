// Integration tests for session token lifecycle

use crate::common::{SESSION_SUFFIX, ScriptedTransport, session_body, test_config};
use iplicit_client::prelude::*;
use std::time::Duration;

fn manager(transport: Arc<ScriptedTransport>) -> Arc<SessionManager> {
    let config = test_config("https://tenant.example.test/api");
    let transport: Arc<dyn HttpTransport> = transport;
    Arc::new(SessionManager::new(&config, transport))
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_callers_share_a_single_refresh() {
    let transport =
        Arc::new(ScriptedTransport::with_token("tok-1").with_auth_latency(Duration::from_millis(200)));
    let session = manager(transport.clone());

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.get_valid_token().await })
        })
        .collect();

    for handle in handles {
        let token = handle.await.expect("task panicked").expect("token");
        assert_eq!(token, "tok-1");
    }
    assert_eq!(transport.auth_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_token_inside_margin_is_refreshed_once() {
    // First session expires within the safety margin, the second is long lived
    let transport = Arc::new(
        ScriptedTransport::new(vec![
            TransportResponse::new(200, SESSION_SUFFIX, session_body("tok-short", 4)),
            TransportResponse::new(200, SESSION_SUFFIX, session_body("tok-long", 60)),
        ])
        .with_auth_latency(Duration::from_millis(50)),
    );
    let session = manager(transport.clone());

    assert_eq!(session.get_valid_token().await.unwrap(), "tok-short");

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let session = session.clone();
            tokio::spawn(async move { session.get_valid_token().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "tok-long");
    }

    assert_eq!(transport.auth_calls(), 2);
    let held = session.current_token().await.expect("token held");
    assert!(held.is_valid());
}

#[tokio::test]
async fn test_valid_token_is_reused() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    let session = manager(transport.clone());

    for _ in 0..3 {
        assert_eq!(session.get_valid_token().await.unwrap(), "tok-1");
    }
    assert_eq!(transport.auth_calls(), 1);
}

#[tokio::test]
async fn test_failed_refresh_leaves_no_token() {
    let transport = Arc::new(ScriptedTransport::new(vec![
        TransportResponse::new(500, SESSION_SUFFIX, "upstream down"),
        TransportResponse::new(200, SESSION_SUFFIX, session_body("tok-2", 60)),
    ]));
    let session = manager(transport.clone());

    let err = session.get_valid_token().await.unwrap_err();
    assert!(matches!(err, AppError::Connection(ref msg) if msg.contains("500")));
    assert!(session.current_token().await.is_none());

    assert_eq!(session.get_valid_token().await.unwrap(), "tok-2");
    assert_eq!(transport.auth_calls(), 2);
}

#[tokio::test]
async fn test_response_without_token_is_a_connection_error() {
    let transport = Arc::new(ScriptedTransport::new(vec![TransportResponse::new(
        200,
        SESSION_SUFFIX,
        r#"{"tokenDue":"2030-01-01T00:00:00Z"}"#,
    )]));
    let session = manager(transport);

    let err = session.get_valid_token().await.unwrap_err();
    assert!(matches!(err, AppError::Connection(_)));
}

#[tokio::test]
async fn test_invalidate_ignores_a_replaced_token() {
    let transport = Arc::new(ScriptedTransport::with_token("tok-1"));
    let session = manager(transport.clone());
    session.get_valid_token().await.unwrap();

    session.invalidate("some-older-token").await;
    assert!(session.current_token().await.is_some());

    session.invalidate("tok-1").await;
    assert!(session.current_token().await.is_none());

    session.get_valid_token().await.unwrap();
    assert_eq!(transport.auth_calls(), 2);
}

#[tokio::test]
async fn test_session_request_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", SESSION_SUFFIX)
        .match_header("domain", "acme")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(json!({
            "username": "jane",
            "userApiKey": "key-1"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(session_body("tok-live", 30))
        .expect(1)
        .create_async()
        .await;

    let config = test_config(&server.url());
    let transport: Arc<dyn HttpTransport> =
        Arc::new(ReqwestTransport::new(config.rest_api.timeout()).unwrap());
    let session = SessionManager::new(&config, transport);

    assert_eq!(session.get_valid_token().await.unwrap(), "tok-live");
    assert_eq!(session.get_domain(), "acme");
    mock.assert_async().await;
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_refresh_keeps_the_held_token() {
    let transport = Arc::new(
        ScriptedTransport::new(vec![
            TransportResponse::new(200, SESSION_SUFFIX, session_body("tok-short", 4)),
            TransportResponse::new(200, SESSION_SUFFIX, session_body("tok-long", 60)),
        ])
        .with_auth_latency(Duration::from_secs(1)),
    );
    let session = manager(transport.clone());
    assert_eq!(session.get_valid_token().await.unwrap(), "tok-short");

    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), session.get_valid_token()).await;
    assert!(abandoned.is_err());
    let held = session.current_token().await.expect("token held");
    assert_eq!(held.token(), "tok-short");

    assert_eq!(session.get_valid_token().await.unwrap(), "tok-long");
    assert_eq!(session.get_valid_token().await.unwrap(), "tok-long");
    assert_eq!(transport.auth_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_first_session_leaves_no_token() {
    let transport =
        Arc::new(ScriptedTransport::with_token("tok-1").with_auth_latency(Duration::from_secs(1)));
    let session = manager(transport.clone());

    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), session.get_valid_token()).await;
    assert!(abandoned.is_err());
    assert!(session.current_token().await.is_none());

    assert_eq!(session.get_valid_token().await.unwrap(), "tok-1");
    assert_eq!(transport.auth_calls(), 2);
}
