use crate::constants::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_THRESHOLD,
    RATE_LIMIT_WINDOW_SECS,
};
use crate::error::AppError;
use crate::model::retry::RetryConfig;
use crate::utils::config::{non_blank, parse_or_default, parse_or_none};
use dotenv::dotenv;
use pretty_simple_display::{DebugPretty, DisplaySimple};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Environment variable holding the API key
pub const ENV_API_KEY: &str = "IPLICIT_API_KEY";
/// Environment variable holding the user name
pub const ENV_USERNAME: &str = "IPLICIT_USERNAME";
/// Environment variable holding the tenant domain
pub const ENV_DOMAIN: &str = "IPLICIT_DOMAIN";

#[derive(Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Static credential of the process. Immutable once built.
pub struct Credentials {
    /// API key issued to the user; never serialized or logged
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// iplicit user name
    pub username: String,
    /// Tenant domain sent with every request
    pub domain: String,
}

impl Credentials {
    /// Builds credentials, failing if any value is blank
    ///
    /// # Errors
    /// * `AppError::Config` naming every blank value
    pub fn new(
        api_key: impl Into<String>,
        username: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self, AppError> {
        let api_key = api_key.into().trim().to_string();
        let username = username.into().trim().to_string();
        let domain = domain.into().trim().to_string();

        let missing: Vec<&str> = [
            (ENV_API_KEY, &api_key),
            (ENV_USERNAME, &username),
            (ENV_DOMAIN, &domain),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(missing_settings(&missing));
        }

        Ok(Self {
            api_key,
            username,
            domain,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .finish()
    }
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, PartialEq)]
/// Main configuration for the iplicit client
pub struct Config {
    /// Authentication credentials
    pub credentials: Credentials,
    /// REST API configuration
    pub rest_api: RestApiConfig,
    /// Request budget configuration
    pub rate_limiter: RateLimiterConfig,
    /// Retry behaviour for transient network failures
    pub retry: RetryConfig,
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Configuration for the REST API
pub struct RestApiConfig {
    /// Base URL of the iplicit REST API
    pub base_url: String,
    /// Timeout in seconds for a single HTTP exchange
    pub timeout: u64,
}

impl RestApiConfig {
    /// Timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

#[derive(DebugPretty, DisplaySimple, Serialize, Deserialize, Clone, PartialEq, Eq)]
/// Configuration of the rolling request budget
pub struct RateLimiterConfig {
    /// Upstream ceiling of requests per window
    pub max_requests: u32,
    /// Count at which the client pauses until the window rolls over
    pub threshold: u32,
    /// Window length in seconds
    pub period_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_requests: RATE_LIMIT_MAX_REQUESTS,
            threshold: RATE_LIMIT_THRESHOLD,
            period_seconds: RATE_LIMIT_WINDOW_SECS,
        }
    }
}

impl Config {
    /// Creates a configuration with default endpoints and limits
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            rest_api: RestApiConfig {
                base_url: DEFAULT_BASE_URL.to_string(),
                timeout: DEFAULT_TIMEOUT_SECS,
            },
            rate_limiter: RateLimiterConfig::default(),
            retry: RetryConfig::standard(),
        }
    }

    /// Loads the configuration from the process environment (and a `.env` file)
    ///
    /// # Errors
    /// * `AppError::Config` if `IPLICIT_API_KEY`, `IPLICIT_USERNAME` or
    ///   `IPLICIT_DOMAIN` is missing. No network activity happens before this check.
    pub fn from_env() -> Result<Self, AppError> {
        match dotenv() {
            Ok(_) => debug!("Successfully loaded .env file"),
            Err(e) => debug!("Failed to load .env file: {e}"),
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key/value source
    ///
    /// # Errors
    /// * `AppError::Config` naming every missing required setting
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(lookup(ENV_API_KEY));
        let username = non_blank(lookup(ENV_USERNAME));
        let domain = non_blank(lookup(ENV_DOMAIN));

        let (api_key, username, domain) = match (api_key, username, domain) {
            (Some(api_key), Some(username), Some(domain)) => (api_key, username, domain),
            (api_key, username, domain) => {
                let missing: Vec<&str> = [
                    (ENV_API_KEY, api_key.is_none()),
                    (ENV_USERNAME, username.is_none()),
                    (ENV_DOMAIN, domain.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();
                return Err(missing_settings(&missing));
            }
        };

        Ok(Config {
            credentials: Credentials::new(api_key, username, domain)?,
            rest_api: RestApiConfig {
                base_url: non_blank(lookup("IPLICIT_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                timeout: parse_or_default(
                    "IPLICIT_TIMEOUT_SECS",
                    lookup("IPLICIT_TIMEOUT_SECS"),
                    DEFAULT_TIMEOUT_SECS,
                ),
            },
            rate_limiter: RateLimiterConfig {
                max_requests: parse_or_default(
                    "IPLICIT_RATE_LIMIT_MAX_REQUESTS",
                    lookup("IPLICIT_RATE_LIMIT_MAX_REQUESTS"),
                    RATE_LIMIT_MAX_REQUESTS,
                ),
                threshold: parse_or_default(
                    "IPLICIT_RATE_LIMIT_THRESHOLD",
                    lookup("IPLICIT_RATE_LIMIT_THRESHOLD"),
                    RATE_LIMIT_THRESHOLD,
                ),
                period_seconds: parse_or_default(
                    "IPLICIT_RATE_LIMIT_WINDOW_SECS",
                    lookup("IPLICIT_RATE_LIMIT_WINDOW_SECS"),
                    RATE_LIMIT_WINDOW_SECS,
                ),
            },
            retry: RetryConfig {
                max_attempts: parse_or_none("IPLICIT_MAX_ATTEMPTS", lookup("IPLICIT_MAX_ATTEMPTS")),
                base_delay_ms: parse_or_none(
                    "IPLICIT_RETRY_BASE_DELAY_MS",
                    lookup("IPLICIT_RETRY_BASE_DELAY_MS"),
                ),
            },
        })
    }

    /// URL of the session creation endpoint
    #[must_use]
    pub fn session_url(&self) -> String {
        format!(
            "{}/{}",
            self.rest_api.base_url.trim_end_matches('/'),
            crate::constants::SESSION_PATH
        )
    }
}

fn missing_settings(names: &[&str]) -> AppError {
    AppError::Config(format!(
        "missing required environment variables: {}",
        names.join(", ")
    ))
}
