//! Chromium-backed pages using chromiumoxide.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{NavigateOptions, Page, PageSource, WaitCondition};
use crate::config::BrowserSettings;
use crate::error::PageError;

/// Interval between element lookups while waiting for a selector.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Resolves once the document is complete and the resource count has been
/// stable for half a second, or after five seconds regardless.
const NETWORK_SETTLE_SCRIPT: &str = r"(async () => {
    const deadline = Date.now() + 5000;
    let last = -1;
    let stableMs = 0;
    while (Date.now() < deadline) {
        const count = performance.getEntriesByType('resource').length;
        if (document.readyState === 'complete' && count === last) {
            stableMs += 100;
            if (stableMs >= 500) return true;
        } else {
            stableMs = 0;
        }
        last = count;
        await new Promise(r => setTimeout(r, 100));
    }
    return false;
})()";

/// A launched Chromium process that hands out independent pages.
pub struct ChromiumBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
    settings: BrowserSettings,
}

impl ChromiumBrowser {
    /// Launch a browser with the given settings.
    pub async fn launch(settings: BrowserSettings) -> Result<Self> {
        tracing::info!(
            headless = settings.headless,
            chrome_path = ?settings.chrome_path,
            "Launching browser"
        );

        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox") // Required for containerized environments
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage") // Avoid /dev/shm size issues in containers
            .arg("--disable-accelerated-2d-canvas")
            .arg("--no-first-run")
            .arg("--no-zygote")
            .arg("--disable-gpu")
            .window_size(settings.viewport_width, settings.viewport_height)
            .viewport(Viewport {
                width: settings.viewport_width,
                height: settings.viewport_height,
                ..Viewport::default()
            });
        if !settings.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &settings.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config).await?;

        // Spawn handler task
        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Browser launched");
        Ok(Self {
            browser,
            handler,
            settings,
        })
    }

    /// Settings the browser was launched with.
    pub fn settings(&self) -> &BrowserSettings {
        &self.settings
    }

    /// Close the browser and wait for its handler to finish.
    pub async fn close(mut self) -> Result<()> {
        tracing::info!("Closing browser");
        self.browser.close().await?;
        self.handler.await?;
        Ok(())
    }
}

#[async_trait]
impl PageSource for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn open_page(&self) -> Result<ChromiumPage, PageError> {
        let page = self.browser.new_page("about:blank").await?;
        page.set_user_agent(user_agent_override(&self.settings)).await?;
        tracing::debug!("Opened page");
        Ok(ChromiumPage { inner: page })
    }
}

/// Network-level user agent override applied to every new page.
fn user_agent_override(settings: &BrowserSettings) -> SetUserAgentOverrideParams {
    SetUserAgentOverrideParams::new(settings.user_agent.clone())
}

/// One browser tab.
pub struct ChromiumPage {
    inner: chromiumoxide::Page,
}

impl ChromiumPage {
    async fn settle_network(&self) -> Result<(), PageError> {
        let settled = self
            .evaluate(NETWORK_SETTLE_SCRIPT)
            .await?
            .as_bool()
            .unwrap_or(false);
        if !settled {
            tracing::debug!("Network did not settle, continuing");
        }
        Ok(())
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn goto(&self, url: &str, options: &NavigateOptions) -> Result<(), PageError> {
        let navigation = async {
            self.inner
                .goto(url)
                .await
                .map_err(|e| PageError::Navigation(e.to_string()))?;
            if options.wait == WaitCondition::NetworkIdle {
                self.settle_network().await?;
            }
            Ok::<(), PageError>(())
        };

        tokio::time::timeout(options.timeout, navigation)
            .await
            .map_err(|_| PageError::timeout(format!("navigation to {url}"), options.timeout))?
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<(), PageError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if let Ok(Ok(_)) = tokio::time::timeout(remaining, self.inner.find_element(selector)).await
            {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PageError::timeout(format!("wait for {selector}"), timeout));
            }
            tokio::time::sleep(SELECTOR_POLL_INTERVAL.min(remaining)).await;
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, PageError> {
        let result = self
            .inner
            .evaluate(script)
            .await
            .map_err(|e| PageError::Evaluation(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    async fn content(&self) -> Result<String, PageError> {
        Ok(self.inner.content().await?)
    }

    async fn close(&self) -> Result<(), PageError> {
        self.inner.clone().close().await?;
        Ok(())
    }
}
