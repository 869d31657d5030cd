/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

use crate::application::auth::SessionManager;
use crate::application::config::Config;
use crate::application::rate_limiter::RequestBudget;
use crate::constants::{BODY_EXCERPT_CHARS, FORBIDDEN_EXCERPT_CHARS};
use crate::error::AppError;
use crate::model::responses::{field_errors, raw_response};
use crate::model::retry::RetryConfig;
use crate::model::utils::excerpt;
use crate::transport::{
    HttpTransport, ReqwestTransport, TransportError, TransportRequest, TransportResponse,
};
use crate::utils::id::request_id;
use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info_span, warn};

/// One logical API operation: verb, path, query, body and extra headers
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP verb
    pub method: Method,
    /// Path relative to the base URL (e.g. `document/42`), or an absolute URL
    pub path: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// JSON body
    pub body: Option<Value>,
    /// Headers merged over the defaults
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    /// Creates a request without query, body or extra headers
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: vec![],
            body: None,
            headers: vec![],
        }
    }

    /// Adds a query parameter
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((name.into(), value.to_string()));
        self
    }

    /// Sets the JSON body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a header, replacing a default of the same name
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Request core for the iplicit API
///
/// Every call goes through the same sequence:
/// 1. verb check (no network for an unsupported verb)
/// 2. request budget check, which may pause until the window rolls over
/// 3. token acquisition from the [`SessionManager`]
/// 4. dispatch with retry on timeouts and network errors
/// 5. response classification into a payload or an [`AppError`]
pub struct HttpClient {
    session: Arc<SessionManager>,
    transport: Arc<dyn HttpTransport>,
    budget: RequestBudget,
    retry: RetryConfig,
    base_url: String,
}

impl HttpClient {
    /// Creates a client around an existing session manager and transport
    pub fn new(
        config: &Config,
        session: Arc<SessionManager>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            session,
            transport,
            budget: RequestBudget::new(&config.rate_limiter),
            retry: config.retry.clone(),
            base_url: config.rest_api.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Wires a reqwest transport and a session manager from the configuration
    ///
    /// # Errors
    /// * `AppError::Connection` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(config.rest_api.timeout())?);
        let session = Arc::new(SessionManager::new(config, transport.clone()));
        Ok(Self::new(config, session, transport))
    }

    /// Session manager used by this client
    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Request budget of this client
    #[must_use]
    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    /// Makes a GET request
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, AppError> {
        let mut request = ApiRequest::new(Method::GET, path);
        for (name, value) in query {
            request = request.with_query(*name, value);
        }
        self.request(request).await
    }

    /// Makes a POST request
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, AppError> {
        self.request(ApiRequest::new(Method::POST, path).with_body(body))
            .await
    }

    /// Makes a PUT request
    pub async fn put(&self, path: &str, body: Value) -> Result<Value, AppError> {
        self.request(ApiRequest::new(Method::PUT, path).with_body(body))
            .await
    }

    /// Makes a PATCH request
    pub async fn patch(&self, path: &str, body: Value) -> Result<Value, AppError> {
        self.request(ApiRequest::new(Method::PATCH, path).with_body(body))
            .await
    }

    /// Makes a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value, AppError> {
        self.request(ApiRequest::new(Method::DELETE, path)).await
    }

    /// Executes one logical operation and returns its payload
    ///
    /// # Returns
    /// * `Ok(Value)` - parsed body, `{}` for an empty body, or
    ///   `{"raw_response": text}` when the body is not JSON
    /// * `Err(AppError)` - see [`classify_response`]; `AppError::Connection`
    ///   once all attempts failed without a response
    pub async fn request(&self, request: ApiRequest) -> Result<Value, AppError> {
        let url = self.url_for(&request.path);

        if !is_supported_method(&request.method) {
            error!("Unsupported HTTP method: {}", request.method);
            return Err(AppError::UnsupportedMethod {
                method: request.method.to_string(),
                url,
                status: None,
            });
        }

        let span = info_span!(
            "iplicit_request",
            id = %request_id(),
            method = %request.method,
            path = %request.path
        );

        async move {
            let permit = self.budget.acquire().await;

            let token = self.session.get_valid_token().await?;
            let transport_request = TransportRequest {
                method: request.method,
                url,
                headers: build_headers(self.session.get_domain(), &token, request.headers),
                query: request.query,
                body: request.body,
            };

            let response = self.dispatch(&transport_request).await?;
            let result = classify_response(&transport_request.method, &response);

            match &result {
                Ok(_) => permit.commit(),
                Err(AppError::AuthExpired) => {
                    warn!("Session token rejected, it will be refreshed on the next call");
                    self.session.invalidate(&token).await;
                }
                Err(e) => debug!("Request failed: {e}"),
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Sends the request, retrying timeouts and network errors with exponential backoff
    async fn dispatch(&self, request: &TransportRequest) -> Result<TransportResponse, AppError> {
        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            debug!("{} {} (attempt {}/{})", request.method, request.url, attempt, max_attempts);

            let err = match self.transport.send(request.clone()).await {
                Ok(response) => {
                    debug!("Response status: {}", response.status);
                    return Ok(response);
                }
                Err(err) => err,
            };

            if !err.is_transient() {
                error!("Request to {} could not be sent: {}", request.url, err);
                return Err(AppError::Connection(err.to_string()));
            }

            if attempt >= max_attempts {
                error!(
                    "Request to {} failed after {} attempts: {}",
                    request.url, attempt, err
                );
                return Err(exhausted(&err, attempt));
            }

            let delay = self.retry.delay_after(attempt);
            warn!(
                "{} (attempt {}/{}). Waiting {:?} before retry...",
                err, attempt, max_attempts, delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }
}

fn is_supported_method(method: &Method) -> bool {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
    ]
    .contains(method)
}

fn build_headers(
    domain: &str,
    token: &str,
    extra: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Domain".to_string(), domain.to_string()),
        ("Authorization".to_string(), format!("Bearer {token}")),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    for (name, value) in extra {
        headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
    headers
}

fn exhausted(err: &TransportError, attempts: u32) -> AppError {
    match err {
        TransportError::Timeout(_) => AppError::Connection(format!(
            "request to iplicit API timed out after {attempts} attempts; the server may be slow or unavailable"
        )),
        _ => AppError::Connection(format!(
            "{err} after {attempts} attempts; check your internet connection"
        )),
    }
}

/// Classifies a received response into a payload or a typed error
///
/// | Status | Result |
/// |---|---|
/// | 2xx | payload (`{}` for 204 or an empty body, raw text wrapped if not JSON) |
/// | 401 | `AuthExpired` |
/// | 403 | `PermissionDenied` with a body excerpt |
/// | 404 | `NotFound` with the resolved URL |
/// | 405 | `UnsupportedMethod` |
/// | 400 | `Validation`, with per-field messages when the body has an `errors` map |
/// | 429 | `RateLimited` |
/// | 5xx | `Server` |
/// | other | `Unexpected` |
pub fn classify_response(
    method: &Method,
    response: &TransportResponse,
) -> Result<Value, AppError> {
    let status = response.status;

    if response.is_success() {
        if status == 204 || response.body.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        return Ok(serde_json::from_str(&response.body)
            .unwrap_or_else(|_| raw_response(&response.body)));
    }

    match status {
        401 => Err(AppError::AuthExpired),
        403 => Err(AppError::PermissionDenied {
            body: excerpt(&response.body, FORBIDDEN_EXCERPT_CHARS),
        }),
        404 => Err(AppError::NotFound {
            url: response.url.clone(),
        }),
        405 => Err(AppError::UnsupportedMethod {
            method: method.to_string(),
            url: response.url.clone(),
            status: Some(405),
        }),
        400 => Err(validation_error(&response.body)),
        429 => Err(AppError::RateLimited {
            body: excerpt(&response.body, BODY_EXCERPT_CHARS),
        }),
        s if s >= 500 => Err(AppError::Server {
            status: s,
            body: excerpt(&response.body, BODY_EXCERPT_CHARS),
        }),
        s => Err(AppError::Unexpected {
            status: s,
            body: excerpt(&response.body, BODY_EXCERPT_CHARS),
        }),
    }
}

fn validation_error(body: &str) -> AppError {
    let fields = serde_json::from_str::<Value>(body)
        .ok()
        .as_ref()
        .and_then(field_errors)
        .filter(|fields| !fields.is_empty());

    match fields {
        Some(fields) => {
            let message = fields
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                .collect::<Vec<_>>()
                .join("; ");
            AppError::Validation {
                message: format!("invalid request to iplicit API: {message}"),
                fields,
                status: Some(400),
            }
        }
        None => AppError::Validation {
            message: format!(
                "invalid request to iplicit API: {}",
                excerpt(body, BODY_EXCERPT_CHARS)
            ),
            fields: BTreeMap::new(),
            status: Some(400),
        },
    }
}
