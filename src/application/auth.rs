/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Session management for the iplicit API
//!
//! [`SessionManager`] owns the only session token of the process:
//! - created lazily on first access
//! - refreshed in place once it is within the safety margin of its expiry
//! - refreshed at most once at a time, whatever the number of waiting callers

use crate::application::config::{Config, Credentials};
use crate::constants::{BODY_EXCERPT_CHARS, TOKEN_SAFETY_MARGIN_SECS};
use crate::error::AppError;
use crate::model::auth::{SessionRequest, SessionResponse};
use crate::model::utils::excerpt;
use crate::transport::{HttpTransport, TransportRequest};
use chrono::{DateTime, Duration, Utc};
use reqwest::Method;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Short-lived bearer credential
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Creates a token expiring at `expires_at`
    pub fn new(token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Bearer token value
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Instant at which the upstream stops accepting the token
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Checks if the token is still usable now
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// A token is valid only while `now < expires_at - 5 minutes`
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(TOKEN_SAFETY_MARGIN_SECS)
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Owner of the process-wide session token
///
/// The token sits behind a single async mutex held across the
/// check-and-refresh section only. Callers that arrive while a refresh is in
/// flight wait on the mutex and then observe the refreshed token.
pub struct SessionManager {
    credentials: Credentials,
    session_url: String,
    transport: Arc<dyn HttpTransport>,
    token: Mutex<Option<SessionToken>>,
}

impl SessionManager {
    /// Creates a manager with no token; the first access creates the session
    pub fn new(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            credentials: config.credentials.clone(),
            session_url: config.session_url(),
            transport,
            token: Mutex::new(None),
        }
    }

    /// Returns a token valid at the instant of return, refreshing it if needed
    ///
    /// # Errors
    /// * `AppError::Connection` if the session endpoint cannot be reached,
    ///   answers with a non-2xx status or omits the token. Not retried here.
    pub async fn get_valid_token(&self) -> Result<String, AppError> {
        let mut guard = self.token.lock().await;

        if let Some(current) = guard.as_ref().filter(|t| t.is_valid()) {
            return Ok(current.token.clone());
        }

        debug!("Session token absent or about to expire, creating a new session");
        // Assigned only once the refresh completed, so a dropped caller leaves the state untouched
        let fresh = self.create_session().await?;
        let value = fresh.token.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    /// Marks `rejected` as stale so the next access refreshes it
    ///
    /// Does nothing if the held token has already been replaced by another caller.
    pub async fn invalidate(&self, rejected: &str) {
        let mut guard = self.token.lock().await;
        if guard.as_ref().is_some_and(|t| t.token == rejected) {
            debug!("Discarding session token rejected by the API");
            *guard = None;
        }
    }

    /// Snapshot of the held token, if any
    pub async fn current_token(&self) -> Option<SessionToken> {
        self.token.lock().await.clone()
    }

    /// Tenant domain sent with every request
    #[must_use]
    pub fn get_domain(&self) -> &str {
        &self.credentials.domain
    }

    async fn create_session(&self) -> Result<SessionToken, AppError> {
        let body = SessionRequest {
            username: &self.credentials.username,
            user_api_key: &self.credentials.api_key,
        };

        let request = TransportRequest {
            method: Method::POST,
            url: self.session_url.clone(),
            headers: vec![
                ("Domain".to_string(), self.credentials.domain.clone()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            query: vec![],
            body: Some(serde_json::to_value(body)?),
        };

        debug!("Sending session request to: {}", self.session_url);

        let response = self.transport.send(request).await.map_err(|e| {
            error!("Failed to create iplicit session: {e}");
            AppError::Connection(format!("failed to create iplicit session: {e}"))
        })?;

        if !response.is_success() {
            error!("Session request rejected with status {}", response.status);
            return Err(AppError::Connection(format!(
                "failed to authenticate with iplicit API: {} - {}",
                response.status,
                excerpt(&response.body, BODY_EXCERPT_CHARS)
            )));
        }

        let parsed: SessionResponse = serde_json::from_str(&response.body).map_err(|e| {
            AppError::Connection(format!("invalid session response from iplicit API: {e}"))
        })?;
        let token = parsed.into_token(Utc::now())?;

        info!("✓ Session created, token valid until {}", token.expires_at);
        Ok(token)
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("credentials", &self.credentials)
            .field("session_url", &self.session_url)
            .finish()
    }
}
