/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/
use crate::constants::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_BASE_DELAY_MS};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retrying requests that failed without a response
///
/// Only timeouts and network-layer errors are retried. Any received response
/// is final.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts, including the first (None = default 3)
    pub max_attempts: Option<u32>,
    /// Delay before the second attempt in milliseconds, doubled afterwards (None = default 1000)
    pub base_delay_ms: Option<u64>,
}

impl RetryConfig {
    /// Creates a retry configuration with the built-in defaults
    #[must_use]
    pub fn standard() -> Self {
        Self::default()
    }

    /// Creates a retry configuration with a maximum number of attempts
    #[must_use]
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            base_delay_ms: None,
        }
    }

    /// Creates a retry configuration with both attempt count and base delay
    #[must_use]
    pub fn with_max_attempts_and_delay(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            base_delay_ms: Some(base_delay_ms),
        }
    }

    /// Gets the total number of attempts (at least 1)
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1)
    }

    /// Gets the base delay (default: 1 second)
    #[must_use]
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms.unwrap_or(DEFAULT_RETRY_BASE_DELAY_MS))
    }

    /// Delay to wait after the given failed attempt (1-based): base, 2x base, 4x base...
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay().saturating_mul(1u32 << exponent)
    }
}
