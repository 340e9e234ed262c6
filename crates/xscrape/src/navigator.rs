//! Page navigation with bounded retries.

use std::time::Duration;

use crate::error::ScrapeError;
use crate::page::{NavigateOptions, Page, WaitCondition};

/// Retry policy for page navigation.
///
/// Backoff is fixed so the worst case is bounded by
/// `max_attempts * attempt_timeout + (max_attempts - 1) * backoff_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Timeout for each attempt.
    pub attempt_timeout: Duration,
    /// Wait between attempts.
    pub backoff_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            attempt_timeout: Duration::from_secs(30),
            backoff_delay: Duration::from_millis(3000),
        }
    }
}

/// Navigate `page` to `url`, retrying transient failures.
///
/// Success only means the load completed; callers still wait for the content
/// they expect.
pub async fn navigate<P: Page + ?Sized>(
    page: &P,
    url: &str,
    policy: &RetryPolicy,
) -> Result<(), ScrapeError> {
    let attempts = policy.max_attempts.max(1);
    let options = NavigateOptions {
        wait: WaitCondition::NetworkIdle,
        timeout: policy.attempt_timeout,
    };

    let mut attempt = 1;
    loop {
        tracing::debug!(url, attempt, "Navigating");
        match page.goto(url, &options).await {
            Ok(()) => {
                tracing::debug!(url, attempt, "Navigation complete");
                return Ok(());
            }
            Err(e) if attempt >= attempts => {
                tracing::error!(url, attempts, error = %e, "Navigation failed");
                return Err(ScrapeError::NavigationFailed {
                    url: url.to_string(),
                    attempts,
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(
                    url,
                    attempt,
                    retries_left = attempts - attempt,
                    error = %e,
                    "Navigation attempt failed"
                );
                tokio::time::sleep(policy.backoff_delay).await;
                attempt += 1;
            }
        }
    }
}
