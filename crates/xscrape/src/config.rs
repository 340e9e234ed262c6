//! Configuration for the browser and scrape requests.

use std::path::PathBuf;

use anyhow::{Context, Result};
use url::Url;

/// Site the scraper targets.
pub const DEFAULT_BASE_URL: &str = "https://x.com";

/// Desktop Chrome user agent; the site serves a reduced page to unknown agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1366;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 768;

/// Browser launch and page settings.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Run without a visible window.
    pub headless: bool,
    /// Chrome/Chromium executable; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    /// User agent applied to every page.
    pub user_agent: String,
    /// Window width in pixels.
    pub viewport_width: u32,
    /// Window height in pixels.
    pub viewport_height: u32,
    /// Base URL for timelines, profiles and relative links.
    pub base_url: Url,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            base_url: default_base_url(),
        }
    }
}

impl BrowserSettings {
    /// Create settings from environment variables.
    ///
    /// # Optional Environment Variables
    /// - `XSCRAPE_HEADLESS`: `false`/`0` to show the browser (default: true)
    /// - `XSCRAPE_CHROME_PATH`: Chrome executable
    /// - `XSCRAPE_USER_AGENT`: User agent override
    /// - `XSCRAPE_BASE_URL`: Site base URL (default: https://x.com)
    /// - `XSCRAPE_VIEWPORT_WIDTH` / `XSCRAPE_VIEWPORT_HEIGHT`: Window size (default: 1366x768)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let headless = std::env::var("XSCRAPE_HEADLESS")
            .ok()
            .map_or(defaults.headless, |v| parse_flag(&v));

        let chrome_path = std::env::var("XSCRAPE_CHROME_PATH").ok().map(PathBuf::from);

        let user_agent = std::env::var("XSCRAPE_USER_AGENT").unwrap_or(defaults.user_agent);

        let base_url = match std::env::var("XSCRAPE_BASE_URL") {
            Ok(raw) => Url::parse(&raw).context("XSCRAPE_BASE_URL is not a valid URL")?,
            Err(_) => defaults.base_url,
        };

        let viewport_width = std::env::var("XSCRAPE_VIEWPORT_WIDTH")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_VIEWPORT_WIDTH);

        let viewport_height = std::env::var("XSCRAPE_VIEWPORT_HEIGHT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_VIEWPORT_HEIGHT);

        Ok(Self {
            headless,
            chrome_path,
            user_agent,
            viewport_width,
            viewport_height,
            base_url,
        })
    }
}

/// The default base URL.
#[must_use]
pub fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("DEFAULT_BASE_URL is a valid URL")
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
