//! Rendered-page capability consumed by the scraping engine.
//!
//! The engine never talks to a browser directly. It drives a [`Page`]: navigate,
//! wait for an element, run a script in the document, read the HTML. Pages are
//! handed out by a [`PageSource`], one per scrape operation.

pub mod chromium;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::PageError;

pub use chromium::{ChromiumBrowser, ChromiumPage};

/// When a navigation counts as finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaitCondition {
    /// The load event fired.
    Load,
    /// The load event fired and network activity settled.
    #[default]
    NetworkIdle,
}

/// Options for a single navigation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateOptions {
    pub wait: WaitCondition,
    pub timeout: Duration,
}

impl Default for NavigateOptions {
    fn default() -> Self {
        Self {
            wait: WaitCondition::NetworkIdle,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A navigable, rendered document.
///
/// A page is owned by one scrape operation at a time. Reads and writes are
/// issued strictly in sequence by the owner.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to `url`, failing with [`PageError::Timeout`] past `options.timeout`.
    async fn goto(&self, url: &str, options: &NavigateOptions) -> Result<(), PageError>;

    /// Resolve once `selector` matches an element, or time out.
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), PageError>;

    /// Evaluate a script expression in the document and return its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError>;

    /// Serialized HTML of the current document.
    async fn content(&self) -> Result<String, PageError>;

    /// Release the page.
    async fn close(&self) -> Result<(), PageError> {
        Ok(())
    }
}

/// Hands out independent pages.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Page: Page + 'static;

    /// Open a fresh page.
    async fn open_page(&self) -> Result<Self::Page, PageError>;
}
