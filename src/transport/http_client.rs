/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! One HTTP exchange, without retry, throttling or classification.
//!
//! The request core talks to the network only through [`HttpTransport`], so
//! the session manager and the request client share one connection pool and
//! tests can substitute a scripted transport.

use crate::constants::USER_AGENT;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// A fully resolved request
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL without query string
    pub url: String,
    /// Header name/value pairs
    pub headers: Vec<(String, String)>,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body, if any
    pub body: Option<Value>,
}

/// A received response, whatever its status
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Final URL of the request, including the query string
    pub url: String,
    /// Raw body text
    pub body: String,
}

impl TransportResponse {
    /// Creates a response, mostly useful in tests
    pub fn new(status: u16, url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            url: url.into(),
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure to obtain any response
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The exchange did not complete within the configured timeout
    #[error("request timed out: {0}")]
    Timeout(String),
    /// Connection refused, reset, DNS failure and similar
    #[error("network error: {0}")]
    Network(String),
    /// The request could not be built; repeating it cannot help
    #[error("invalid request: {0}")]
    Request(String),
}

impl TransportError {
    /// Whether the failure is transient and the exchange may be attempted again
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, TransportError::Timeout(_) | TransportError::Network(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_builder() {
            TransportError::Request(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// Sends a single request and returns the raw response
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Performs one exchange. Any received response, including 4xx and 5xx,
    /// is `Ok`; only the absence of a response is an error.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`HttpTransport`] backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport whose exchanges time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Connection(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self.client.request(request.method, &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response.text().await?;

        Ok(TransportResponse { status, url, body })
    }
}
