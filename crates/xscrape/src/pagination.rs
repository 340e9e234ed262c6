//! Scroll-driven timeline pagination.
//!
//! One run owns its page for its whole lifetime and cycles
//! extract → merge → decide → scroll → settle until a stopping condition
//! holds:
//!
//! - `max_tweets` records accepted
//! - `max_scrolls` scrolls performed
//! - [`MAX_STALL_CYCLES`] consecutive cycles without a new record
//! - the caller's cancellation token fired
//!
//! Cancellation also cuts the initial content wait short, in which case the
//! run ends with no records.
//!
//! Records come back in first-seen order, which is the feed's order and not
//! necessarily chronological.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use url::Url;

use crate::dedup::DedupAccumulator;
use crate::error::ScrapeError;
use crate::navigator::RetryPolicy;
use crate::page::Page;
use crate::twitter::selectors::{self, has_not_found_marker};
use crate::twitter::{PostParser, PostRecord};

/// Scrolls by two viewport heights so the feed renders the next batch.
pub const SCROLL_SCRIPT: &str = "window.scrollBy(0, window.innerHeight * 2)";

/// Consecutive cycles without growth before the feed counts as exhausted.
pub const MAX_STALL_CYCLES: u32 = 3;

/// How long to wait for the first posts to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentWait {
    /// Wait for the primary post selector.
    pub primary: Duration,
    /// Wait for the fallback selector after the primary timed out.
    pub fallback: Duration,
}

impl Default for ContentWait {
    fn default() -> Self {
        Self {
            primary: Duration::from_secs(20),
            fallback: Duration::from_secs(10),
        }
    }
}

/// Options for a timeline scrape.
#[derive(Debug, Clone)]
pub struct TweetScrapeOptions {
    /// Upper bound on returned records.
    pub max_tweets: usize,
    /// Scrape the "with replies" timeline instead of the default one.
    pub include_replies: bool,
    /// Keep reposts of other accounts' tweets.
    pub include_retweets: bool,
    /// Settle time after each scroll.
    pub scroll_delay: Duration,
    /// Upper bound on scrolls.
    pub max_scrolls: u32,
    /// Navigation retry policy.
    pub retry: RetryPolicy,
    /// Initial content wait.
    pub content_wait: ContentWait,
    /// Stops the loop early; whatever was accumulated is returned.
    pub cancel: CancellationToken,
}

impl Default for TweetScrapeOptions {
    fn default() -> Self {
        Self {
            max_tweets: 100,
            include_replies: false,
            include_retweets: true,
            scroll_delay: Duration::from_millis(1000),
            max_scrolls: 100,
            retry: RetryPolicy::default(),
            content_wait: ContentWait::default(),
            cancel: CancellationToken::new(),
        }
    }
}

/// Why the pagination loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    MaxTweets,
    MaxScrolls,
    Stalled,
    Cancelled,
}

/// Result of one pagination run.
#[derive(Debug)]
pub struct PaginationOutcome {
    /// Accepted records, first-seen order, at most `max_tweets`.
    pub posts: Vec<PostRecord>,
    /// Scrolls performed.
    pub scrolls: u32,
    /// Extraction cycles performed.
    pub cycles: u32,
    pub stop_reason: StopReason,
}

/// Drives one page through the pagination loop.
pub struct PaginationEngine<'a, P: Page + ?Sized> {
    page: &'a P,
    base_url: &'a Url,
    options: &'a TweetScrapeOptions,
}

impl<'a, P: Page + ?Sized> PaginationEngine<'a, P> {
    #[must_use]
    pub fn new(page: &'a P, base_url: &'a Url, options: &'a TweetScrapeOptions) -> Self {
        Self {
            page,
            base_url,
            options,
        }
    }

    /// Wait for posts to render, then paginate until a stopping condition holds.
    ///
    /// `username` is only used for error messages and logs.
    pub async fn run(&self, username: &str) -> Result<PaginationOutcome, ScrapeError> {
        // Content already on the page is read even if the token has fired.
        tokio::select! {
            biased;
            result = self.await_content(username) => result?,
            () = self.options.cancel.cancelled() => {
                tracing::info!(username, "Cancelled before tweets rendered");
                return Ok(PaginationOutcome {
                    posts: Vec::new(),
                    scrolls: 0,
                    cycles: 0,
                    stop_reason: StopReason::Cancelled,
                });
            }
        }

        let mut session = DedupAccumulator::new();
        let mut scrolls = 0;
        let mut stalls = 0;
        let mut cycles = 0;

        let stop_reason = loop {
            let html = self.page.content().await?;
            let candidates = PostParser::new(
                self.base_url,
                self.options.include_retweets,
                session.known_keys(),
            )
            .parse(&html);
            cycles += 1;

            let accepted = session.extend(candidates);
            if accepted == 0 {
                stalls += 1;
            } else {
                stalls = 0;
            }

            tracing::info!(
                username,
                cycle = cycles,
                accepted,
                total = session.len(),
                scrolls,
                stalls,
                "Scraped tweets so far"
            );

            if let Some(reason) = self.should_stop(session.len(), scrolls, stalls) {
                break reason;
            }

            if let Err(e) = self.page.evaluate(SCROLL_SCRIPT).await {
                tracing::warn!(username, error = %e, "Scroll script failed");
            }
            scrolls += 1;

            if self.settle().await {
                break StopReason::Cancelled;
            }
        };

        let mut posts = session.into_records();
        posts.truncate(self.options.max_tweets);

        tracing::info!(
            username,
            total = posts.len(),
            scrolls,
            cycles,
            reason = ?stop_reason,
            "Finished scraping"
        );

        Ok(PaginationOutcome {
            posts,
            scrolls,
            cycles,
            stop_reason,
        })
    }

    /// Wait for the first post element, classifying the failure when none renders.
    async fn await_content(&self, username: &str) -> Result<(), ScrapeError> {
        let wait = self.options.content_wait;

        match self.page.wait_for_selector(selectors::POST, wait.primary).await {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!(username, error = %e, "Primary post selector missing"),
        }

        match self
            .page
            .wait_for_selector(selectors::POST_FALLBACK, wait.fallback)
            .await
        {
            Ok(()) => return Ok(()),
            Err(e) => tracing::debug!(username, error = %e, "Fallback post selector missing"),
        }

        tracing::warn!(username, "No tweets found, checking if profile exists");
        let html = self.page.content().await?;
        if has_not_found_marker(&html) {
            Err(ScrapeError::UserNotFound(username.to_string()))
        } else {
            Err(ScrapeError::StructureChanged(username.to_string()))
        }
    }

    fn should_stop(&self, accepted: usize, scrolls: u32, stalls: u32) -> Option<StopReason> {
        if self.options.cancel.is_cancelled() {
            Some(StopReason::Cancelled)
        } else if accepted >= self.options.max_tweets {
            Some(StopReason::MaxTweets)
        } else if stalls >= MAX_STALL_CYCLES {
            Some(StopReason::Stalled)
        } else if scrolls >= self.options.max_scrolls {
            Some(StopReason::MaxScrolls)
        } else {
            None
        }
    }

    /// Let lazy content render. Returns true if cancelled while waiting.
    async fn settle(&self) -> bool {
        tokio::select! {
            () = tokio::time::sleep(self.options.scroll_delay) => false,
            () = self.options.cancel.cancelled() => true,
        }
    }
}
