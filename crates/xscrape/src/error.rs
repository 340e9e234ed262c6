//! Error types for page automation and scraping.

use std::time::Duration;

use thiserror::Error;

/// Errors raised by a rendered-page implementation.
#[derive(Debug, Error)]
pub enum PageError {
    /// An operation did not finish before its deadline.
    #[error("{operation} timed out after {}ms", timeout.as_millis())]
    Timeout {
        operation: String,
        timeout: Duration,
    },

    /// Navigation was rejected or the load failed.
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// A script failed inside the page or returned an unusable value.
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Browser protocol failure.
    #[error("Browser protocol error: {0}")]
    Protocol(String),

    /// The page has already been closed.
    #[error("Page is closed")]
    Closed,
}

impl PageError {
    /// Build a timeout error for the named operation.
    pub fn timeout(operation: impl Into<String>, timeout: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            timeout,
        }
    }

    /// Whether this error is a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<chromiumoxide::error::CdpError> for PageError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        PageError::Protocol(err.to_string())
    }
}

/// Terminal failures of a scrape request.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The username is empty or contains characters the site never allows.
    #[error("Invalid username: {0:?}")]
    InvalidUsername(String),

    /// Every navigation attempt failed.
    #[error("Navigation to {url} failed after {attempts} attempt(s): {reason}")]
    NavigationFailed {
        url: String,
        attempts: u32,
        reason: String,
    },

    /// The site reports the account as missing or suspended.
    #[error("User account not found or suspended: {0}")]
    UserNotFound(String),

    /// Expected content never rendered and no not-found marker was present.
    #[error("Unable to load tweets for {0} - page may have changed structure")]
    StructureChanged(String),

    /// The profile header never rendered.
    #[error("Profile unavailable for {0}")]
    ProfileUnavailable(String),

    /// Page capability failure outside the classified states.
    #[error(transparent)]
    Page(#[from] PageError),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = PageError::timeout("wait for article", Duration::from_millis(1500));
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "wait for article timed out after 1500ms");
    }

    #[test]
    fn test_navigation_failed_message() {
        let err = ScrapeError::NavigationFailed {
            url: "https://x.com/jack".to_string(),
            attempts: 3,
            reason: "net::ERR_TIMED_OUT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Navigation to https://x.com/jack failed after 3 attempt(s): net::ERR_TIMED_OUT"
        );
    }

    #[test]
    fn test_page_error_is_transparent() {
        let err: ScrapeError = PageError::Closed.into();
        assert_eq!(err.to_string(), "Page is closed");
    }
}
