// Common utilities for integration tests

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use iplicit_client::prelude::*;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;

pub const SESSION_SUFFIX: &str = "/session/create/api";

/// Creates a test config pointing at `base_url`
pub fn test_config(base_url: &str) -> Config {
    let credentials = Credentials::new("key-1", "jane", "acme").expect("valid credentials");
    let mut config = Config::new(credentials);
    config.rest_api.base_url = base_url.to_string();
    config.rest_api.timeout = 5;
    config
}

/// Session endpoint body for a token valid for `minutes`
pub fn session_body(token: &str, minutes: i64) -> String {
    json!({
        "sessionToken": token,
        "tokenDue": (Utc::now() + ChronoDuration::minutes(minutes)).to_rfc3339(),
    })
    .to_string()
}

/// Transport answering from scripts instead of the network
///
/// Session requests are answered from `auth`, repeating the last entry once
/// only one is left. Every other request pops the next entry of `api`.
pub struct ScriptedTransport {
    auth: Mutex<VecDeque<TransportResponse>>,
    auth_latency: Duration,
    auth_calls: AtomicUsize,
    api: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    api_calls: Mutex<Vec<(TransportRequest, Instant)>>,
}

impl ScriptedTransport {
    pub fn new(auth: Vec<TransportResponse>) -> Self {
        Self {
            auth: Mutex::new(auth.into()),
            auth_latency: Duration::ZERO,
            auth_calls: AtomicUsize::new(0),
            api: Mutex::new(VecDeque::new()),
            api_calls: Mutex::new(Vec::new()),
        }
    }

    /// Transport whose session endpoint always returns `token`, valid for an hour
    pub fn with_token(token: &str) -> Self {
        Self::new(vec![TransportResponse::new(
            200,
            SESSION_SUFFIX,
            session_body(token, 60),
        )])
    }

    pub fn with_auth_latency(mut self, latency: Duration) -> Self {
        self.auth_latency = latency;
        self
    }

    pub fn push_api(&self, outcome: Result<TransportResponse, TransportError>) {
        self.api.lock().unwrap().push_back(outcome);
    }

    pub fn push_ok(&self, status: u16, body: &str) {
        self.push_api(Ok(TransportResponse::new(status, "scripted", body)));
    }

    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub fn api_requests(&self) -> Vec<TransportRequest> {
        self.api_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(request, _)| request.clone())
            .collect()
    }

    pub fn api_instants(&self) -> Vec<Instant> {
        self.api_calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, at)| *at)
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        if request.url.ends_with(SESSION_SUFFIX) {
            self.auth_calls.fetch_add(1, Ordering::SeqCst);
            if !self.auth_latency.is_zero() {
                tokio::time::sleep(self.auth_latency).await;
            }
            let mut auth = self.auth.lock().unwrap();
            let response = if auth.len() > 1 {
                auth.pop_front()
            } else {
                auth.front().cloned()
            };
            return response.ok_or_else(|| TransportError::Network("no auth script".to_string()));
        }

        self.api_calls
            .lock()
            .unwrap()
            .push((request.clone(), Instant::now()));
        self.api
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Network("no api script".to_string())))
    }
}

/// Builds a client over a scripted transport
pub fn scripted_client(transport: Arc<ScriptedTransport>, config: &Config) -> HttpClient {
    let transport: Arc<dyn HttpTransport> = transport;
    let session = Arc::new(SessionManager::new(config, transport.clone()));
    HttpClient::new(config, session, transport)
}

/// Header value of `name` on a recorded request
pub fn header<'a>(request: &'a TransportRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
