//! Request-level scraping operations.
//!
//! Each operation acquires its own page from the [`PageSource`], runs to
//! completion and releases the page whether it succeeded or not.

use std::ops::Deref;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::error::{Result, ScrapeError};
use crate::navigator::{navigate, RetryPolicy};
use crate::page::{Page, PageSource};
use crate::pagination::{PaginationEngine, TweetScrapeOptions};
use crate::twitter::selectors::{self, has_not_found_marker};
use crate::twitter::{PostRecord, ProfileParser, ProfileRecord};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{1,50}$").unwrap());

/// Wait for the profile heading.
const PROFILE_HEADING_TIMEOUT: Duration = Duration::from_secs(15);
/// Wait for the fallback heading after the primary timed out.
const PROFILE_HEADING_FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Profile and timeline captured together.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteScrape {
    pub profile: ProfileRecord,
    pub tweets: Vec<PostRecord>,
    pub scraped_at: DateTime<Utc>,
}

/// Strip a leading `@` and check the handle against the site's rules.
pub fn normalize_username(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);
    if USERNAME_RE.is_match(handle) {
        Ok(handle.to_string())
    } else {
        Err(ScrapeError::InvalidUsername(raw.to_string()))
    }
}

/// Scrapes timelines and profiles from pages handed out by `S`.
pub struct Scraper<S: PageSource> {
    source: S,
    base_url: Url,
    retry: RetryPolicy,
}

impl<S: PageSource> Scraper<S> {
    pub fn new(source: S, base_url: Url) -> Self {
        Self {
            source,
            base_url,
            retry: RetryPolicy::default(),
        }
    }

    /// Navigation policy for profile scrapes. Timeline scrapes carry their own.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give back the page source, e.g. to shut the browser down.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Timeline URL for a normalised username.
    pub fn timeline_url(&self, username: &str, include_replies: bool) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        if include_replies {
            format!("{base}/{username}/with_replies")
        } else {
            format!("{base}/{username}")
        }
    }

    /// Profile URL for a normalised username.
    pub fn profile_url(&self, username: &str) -> String {
        self.timeline_url(username, false)
    }

    /// Scrape up to `options.max_tweets` posts from a user's timeline.
    pub async fn scrape_user_tweets(
        &self,
        username: &str,
        options: &TweetScrapeOptions,
    ) -> Result<Vec<PostRecord>> {
        let username = normalize_username(username)?;
        tracing::info!(
            username = %username,
            max_tweets = options.max_tweets,
            include_replies = options.include_replies,
            include_retweets = options.include_retweets,
            "Scraping tweets"
        );

        let page = PageLease::new(self.source.open_page().await?, &username);
        let result = self.tweets_on(&page, &username, options).await;
        page.release().await;
        result
    }

    /// Scrape the profile header of a user.
    pub async fn scrape_user_profile(&self, username: &str) -> Result<ProfileRecord> {
        let username = normalize_username(username)?;
        tracing::info!(username = %username, "Scraping profile");

        let page = PageLease::new(self.source.open_page().await?, &username);
        let result = self.profile_on(&page, &username).await;
        page.release().await;
        result
    }

    /// Scrape the profile and the timeline concurrently on separate pages.
    ///
    /// Fails as soon as either half fails.
    pub async fn scrape_user_complete(
        &self,
        username: &str,
        options: &TweetScrapeOptions,
    ) -> Result<CompleteScrape> {
        let username = normalize_username(username)?;
        tracing::info!(username = %username, "Scraping complete user data");

        let (profile, tweets) = tokio::try_join!(
            self.scrape_user_profile(&username),
            self.scrape_user_tweets(&username, options),
        )?;

        Ok(CompleteScrape {
            profile,
            tweets,
            scraped_at: Utc::now(),
        })
    }

    async fn tweets_on(
        &self,
        page: &S::Page,
        username: &str,
        options: &TweetScrapeOptions,
    ) -> Result<Vec<PostRecord>> {
        let url = self.timeline_url(username, options.include_replies);
        tokio::select! {
            biased;
            result = navigate(page, &url, &options.retry) => result?,
            () = options.cancel.cancelled() => {
                tracing::info!(username, "Cancelled before the timeline loaded");
                return Ok(Vec::new());
            }
        }

        let outcome = PaginationEngine::new(page, &self.base_url, options)
            .run(username)
            .await?;
        Ok(outcome.posts)
    }

    async fn profile_on(&self, page: &S::Page, username: &str) -> Result<ProfileRecord> {
        let url = self.profile_url(username);
        navigate(page, &url, &self.retry).await?;

        if !wait_for_heading(page, username).await {
            tracing::warn!(username, "Profile header missing, checking if profile exists");
            let html = page.content().await?;
            return Err(if has_not_found_marker(&html) {
                ScrapeError::UserNotFound(username.to_string())
            } else {
                ScrapeError::ProfileUnavailable(username.to_string())
            });
        }

        let html = page.content().await?;
        let profile = ProfileParser::parse(&html);
        tracing::info!(
            username,
            followers = profile.followers,
            following = profile.following,
            verified = profile.is_verified,
            "Scraped profile"
        );
        Ok(profile)
    }
}

async fn wait_for_heading<P: Page + ?Sized>(page: &P, username: &str) -> bool {
    if let Err(e) = page
        .wait_for_selector(selectors::PROFILE_HEADING, PROFILE_HEADING_TIMEOUT)
        .await
    {
        tracing::debug!(username, error = %e, "Profile heading missing, trying fallback");
        if let Err(e) = page
            .wait_for_selector(
                selectors::PROFILE_HEADING_FALLBACK,
                PROFILE_HEADING_FALLBACK_TIMEOUT,
            )
            .await
        {
            tracing::debug!(username, error = %e, "Fallback profile heading missing");
            return false;
        }
    }
    true
}

/// A page owned by one operation.
///
/// [`release`](Self::release) closes it in place. If the operation is dropped
/// first, e.g. by a sibling failing in `try_join!` or a caller timeout, the
/// close runs on a spawned task instead.
struct PageLease<P: Page + 'static> {
    page: Arc<P>,
    username: String,
    released: bool,
}

impl<P: Page + 'static> PageLease<P> {
    fn new(page: P, username: &str) -> Self {
        Self {
            page: Arc::new(page),
            username: username.to_string(),
            released: false,
        }
    }

    async fn release(mut self) {
        self.released = true;
        close_page(&*self.page, &self.username).await;
    }
}

impl<P: Page + 'static> Deref for PageLease<P> {
    type Target = P;

    fn deref(&self) -> &P {
        &self.page
    }
}

impl<P: Page + 'static> Drop for PageLease<P> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let page = Arc::clone(&self.page);
        let username = std::mem::take(&mut self.username);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::debug!(username = %username, "Operation abandoned, closing page");
                handle.spawn(async move { close_page(&*page, &username).await });
            }
            Err(_) => tracing::warn!(username = %username, "No runtime to close abandoned page"),
        }
    }
}

async fn close_page<P: Page + ?Sized>(page: &P, username: &str) {
    if let Err(e) = page.close().await {
        tracing::warn!(username, error = %e, "Failed to close page");
    }
}
