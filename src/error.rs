/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Error taxonomy for the iplicit client
//!
//! Response-derived variants are produced by
//! [`classify_response`](crate::model::http::classify_response). Consumers
//! branch on the variant, never on raw status codes.

use crate::constants::{RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW_SECS};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Every failure an operation of this crate can report
#[derive(Debug, Error)]
pub enum AppError {
    /// Required configuration is missing or malformed
    #[error("configuration error: {0}")]
    Config(String),

    /// Network failure or timeout after all attempts, or the session could not be created
    #[error("connection failure: {0}")]
    Connection(String),

    /// The bearer token was rejected (401). Retrying forces a token refresh.
    #[error("session token expired or invalid")]
    AuthExpired,

    /// The account lacks permission for the resource (403)
    #[error("permission denied: {body}")]
    PermissionDenied {
        /// Excerpt of the upstream body
        body: String,
    },

    /// The endpoint or resource does not exist (404)
    #[error("resource not found: {url}")]
    NotFound {
        /// Resolved URL of the failed request
        url: String,
    },

    /// The verb is not accepted, either locally or by the endpoint (405)
    #[error("method {method} not supported for {url}")]
    UnsupportedMethod {
        /// HTTP verb that was rejected
        method: String,
        /// Resolved URL of the request
        url: String,
        /// 405 when the endpoint rejected it, `None` when rejected locally
        status: Option<u16>,
    },

    /// The request payload was rejected (400) or could not be completed locally
    #[error("validation failed: {message}")]
    Validation {
        /// Human readable summary
        message: String,
        /// Per-field messages, when the upstream body carried them
        fields: BTreeMap<String, Vec<String>>,
        /// 400 when the upstream rejected it, `None` for local checks
        status: Option<u16>,
    },

    /// The upstream limit was hit despite local throttling (429)
    #[error(
        "upstream rate limit exceeded ({} requests per {} seconds): {body}",
        RATE_LIMIT_MAX_REQUESTS,
        RATE_LIMIT_WINDOW_SECS
    )]
    RateLimited {
        /// Excerpt of the upstream body
        body: String,
    },

    /// Upstream fault (5xx)
    #[error("server error ({status}): {body}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Excerpt of the upstream body
        body: String,
    },

    /// Any other non-success status
    #[error("unexpected response ({status}): {body}")]
    Unexpected {
        /// HTTP status code
        status: u16,
        /// Excerpt of the upstream body
        body: String,
    },

    /// A payload could not be (de)serialized
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Closed set of error kinds consumers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    ConnectionFailure,
    AuthExpired,
    PermissionDenied,
    NotFound,
    UnsupportedMethod,
    ValidationFailed,
    RateLimited,
    ServerError,
    Unexpected,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::ConnectionFailure => "connection-failure",
            ErrorCategory::AuthExpired => "auth-expired",
            ErrorCategory::PermissionDenied => "permission-denied",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::UnsupportedMethod => "unsupported-method",
            ErrorCategory::ValidationFailed => "validation-failed",
            ErrorCategory::RateLimited => "rate-limited",
            ErrorCategory::ServerError => "server-error",
            ErrorCategory::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

impl AppError {
    /// Builds a validation error without per-field details
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: BTreeMap::new(),
            status: None,
        }
    }

    /// Upstream status code behind this error, if it came from a response
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::AuthExpired => Some(401),
            AppError::PermissionDenied { .. } => Some(403),
            AppError::NotFound { .. } => Some(404),
            AppError::RateLimited { .. } => Some(429),
            AppError::Server { status, .. } | AppError::Unexpected { status, .. } => {
                Some(*status)
            }
            AppError::Validation { status, .. } | AppError::UnsupportedMethod { status, .. } => {
                *status
            }
            _ => None,
        }
    }

    /// Category of this error
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Config(_) => ErrorCategory::Configuration,
            AppError::Connection(_) => ErrorCategory::ConnectionFailure,
            AppError::AuthExpired => ErrorCategory::AuthExpired,
            AppError::PermissionDenied { .. } => ErrorCategory::PermissionDenied,
            AppError::NotFound { .. } => ErrorCategory::NotFound,
            AppError::UnsupportedMethod { .. } => ErrorCategory::UnsupportedMethod,
            AppError::Validation { .. } => ErrorCategory::ValidationFailed,
            AppError::RateLimited { .. } => ErrorCategory::RateLimited,
            AppError::Server { .. } => ErrorCategory::ServerError,
            AppError::Unexpected { .. } | AppError::Json(_) => ErrorCategory::Unexpected,
        }
    }

    /// Whether repeating the call after a token refresh can succeed
    #[must_use]
    pub fn is_retryable_with_refresh(&self) -> bool {
        matches!(self, AppError::AuthExpired)
    }
}
