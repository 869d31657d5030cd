/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::application::auth::SessionToken;
use crate::constants::DEFAULT_TOKEN_LIFETIME_SECS;
use crate::error::AppError;
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Body of the session creation request
#[derive(Debug, Clone, Serialize)]
pub struct SessionRequest<'a> {
    /// iplicit user name
    pub username: &'a str,
    /// API key issued to that user
    #[serde(rename = "userApiKey")]
    pub user_api_key: &'a str,
}

/// Response from the session creation endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Bearer token
    pub session_token: Option<String>,
    /// ISO-8601 instant at which the token expires
    pub token_due: Option<String>,
}

impl SessionResponse {
    /// Converts the response into a token, relative to `now` when no expiry is given
    ///
    /// # Errors
    /// * `AppError::Connection` if the token is missing or the expiry cannot be parsed
    pub fn into_token(self, now: DateTime<Utc>) -> Result<SessionToken, AppError> {
        let token = self
            .session_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Connection("no session token received from API".to_string()))?;

        let expires_at = match self.token_due.as_deref() {
            Some(due) => parse_token_due(due)?,
            None => {
                warn!(
                    "Session response carries no tokenDue, assuming {} minutes",
                    DEFAULT_TOKEN_LIFETIME_SECS / 60
                );
                now + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS)
            }
        };

        Ok(SessionToken::new(token, expires_at))
    }
}

/// Parses `tokenDue`: RFC 3339 (`2025-11-04T16:45:13.183Z`), or a naive timestamp read as UTC
fn parse_token_due(due: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(due) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(due, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| AppError::Connection(format!("invalid tokenDue '{due}': {e}")))
}
