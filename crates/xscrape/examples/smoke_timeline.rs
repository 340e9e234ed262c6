//! Smoke test for a live timeline and profile scrape.
//!
//! Launches Chromium, scrapes a handful of posts and the profile header of a
//! public account, and prints a summary.
//!
//! Run with: cargo run --example smoke_timeline -- [username]

use std::time::Duration;

use xscrape::{BrowserSettings, ChromiumBrowser, Scraper, TweetScrapeOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let username = std::env::args().nth(1).unwrap_or_else(|| "rustlang".to_string());
    println!("🔷 xscrape Smoke Test (@{username})\n");

    let settings = BrowserSettings::from_env()?;
    let base_url = settings.base_url.clone();

    println!("🌐 Launching browser...");
    let scraper = Scraper::new(ChromiumBrowser::launch(settings).await?, base_url);

    let options = TweetScrapeOptions {
        max_tweets: 5,
        max_scrolls: 3,
        scroll_delay: Duration::from_millis(1500),
        ..TweetScrapeOptions::default()
    };

    match scraper.scrape_user_complete(&username, &options).await {
        Ok(complete) => {
            let profile = &complete.profile;
            println!(
                "👤 {} ({} followers, {} following)",
                profile.display_name, profile.followers, profile.following
            );
            println!("📝 Found {} tweets", complete.tweets.len());
            for tweet in &complete.tweets {
                let preview: String = tweet.text.chars().take(60).collect();
                println!("   - [{}] {preview} ({} likes)", tweet.id, tweet.engagement.likes);
            }
        }
        Err(e) => println!("❌ Scrape failed: {e}"),
    }

    scraper.into_source().close().await?;
    println!("\n✅ Smoke test complete");
    Ok(())
}
