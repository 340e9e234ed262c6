//! Structured scraping of public X (Twitter) timelines and profiles.
//!
//! This crate provides:
//! - A [`Page`](page::Page) capability with a Chromium implementation
//! - Field extraction of posts and profiles from rendered HTML
//! - Scroll-driven pagination with identity-based deduplication
//! - Navigation with bounded retries
//! - A [`Scraper`] facade for tweets, profile and combined requests

pub mod config;
pub mod dedup;
pub mod error;
pub mod navigator;
pub mod numbers;
pub mod page;
pub mod pagination;
pub mod scraper;
pub mod twitter;

// Re-export main types
pub use config::BrowserSettings;
pub use dedup::DedupAccumulator;
pub use error::{PageError, ScrapeError};
pub use navigator::RetryPolicy;
pub use numbers::parse_abbreviated_number;
pub use page::{ChromiumBrowser, Page, PageSource};
pub use pagination::{ContentWait, PaginationOutcome, StopReason, TweetScrapeOptions};
pub use scraper::{normalize_username, CompleteScrape, Scraper};
pub use twitter::{PostRecord, ProfileRecord};
