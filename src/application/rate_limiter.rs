/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 14/10/26
******************************************************************************/

//! Rolling request budget
//!
//! iplicit allows 1500 requests per 5 minute window. The client counts its
//! successful calls in a fixed window and, once the count reaches a threshold
//! below the ceiling, pauses the next call until the window rolls over.

use crate::application::config::RateLimiterConfig;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug)]
struct Window {
    /// Successful calls completed in this window
    count: u32,
    /// Reserved calls whose outcome is not known yet
    in_flight: u32,
    started: Instant,
}

/// Fixed-window request counter shared by every caller of one client
///
/// A call reserves its slot in [`acquire`](Self::acquire) under the same lock
/// that checks the threshold, so concurrent callers can never overshoot it.
/// Reservations count against the threshold until they settle.
#[derive(Debug)]
pub struct RequestBudget {
    threshold: u32,
    period: Duration,
    window: Mutex<Window>,
    settled: Notify,
}

impl RequestBudget {
    /// Creates a budget whose first window starts now
    ///
    /// The threshold is clamped to `1..=max_requests`.
    #[must_use]
    pub fn new(config: &RateLimiterConfig) -> Self {
        let threshold = config.threshold.min(config.max_requests).max(1);
        Self {
            threshold,
            period: Duration::from_secs(config.period_seconds),
            window: Mutex::new(Window {
                count: 0,
                in_flight: 0,
                started: Instant::now(),
            }),
            settled: Notify::new(),
        }
    }

    /// Pre-call check: reserves one slot in the current window
    ///
    /// Resets an elapsed window first. While completed and reserved calls
    /// together reach the threshold, waits until either a reservation settles
    /// or the window rolls over.
    pub async fn acquire(&self) -> BudgetPermit<'_> {
        loop {
            let (settled, deadline) = {
                let mut window = self.lock();

                if window.started.elapsed() >= self.period {
                    debug!("Request window elapsed, resetting budget");
                    window.count = 0;
                    window.started = Instant::now();
                }

                if window.count + window.in_flight < self.threshold {
                    window.in_flight += 1;
                    return BudgetPermit {
                        budget: self,
                        settled: false,
                    };
                }

                let deadline = window.started + self.period;
                if window.count >= self.threshold {
                    warn!(
                        "Request budget reached ({} in window), pausing {:.1}s until the window rolls over",
                        window.count,
                        deadline
                            .saturating_duration_since(Instant::now())
                            .as_secs_f64()
                    );
                } else {
                    debug!(
                        "Request budget fully reserved ({} in flight), waiting",
                        window.in_flight
                    );
                }
                // Registered before the lock is released so no settlement is missed
                (self.settled.notified(), deadline)
            };

            tokio::select! {
                _ = settled => {}
                _ = tokio::time::sleep_until(deadline) => {}
            }
        }
    }

    /// Successful calls counted in the current window
    #[must_use]
    pub fn count(&self) -> u32 {
        self.lock().count
    }

    /// Reserved calls not settled yet
    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.lock().in_flight
    }

    /// Threshold at which calls start to pause
    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    fn settle(&self, success: bool) {
        {
            let mut window = self.lock();
            window.in_flight = window.in_flight.saturating_sub(1);
            if success {
                window.count = window.count.saturating_add(1);
            }
        }
        self.settled.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One reserved slot of a [`RequestBudget`]
///
/// [`commit`](Self::commit) counts the call as a success. Dropping the permit
/// without committing, on failure or cancellation, frees the slot uncounted.
#[derive(Debug)]
#[must_use = "dropping the permit releases the reserved slot"]
pub struct BudgetPermit<'a> {
    budget: &'a RequestBudget,
    settled: bool,
}

impl BudgetPermit<'_> {
    /// Counts the reserved call as a success in the current window
    pub fn commit(mut self) {
        self.settled = true;
        self.budget.settle(true);
    }
}

impl Drop for BudgetPermit<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.budget.settle(false);
        }
    }
}
