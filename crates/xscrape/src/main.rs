//! xscrape CLI - scrape public X (Twitter) timelines and profiles as JSON.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xscrape::{
    normalize_username, BrowserSettings, ChromiumBrowser, PageSource, Scraper, TweetScrapeOptions,
};

/// xscrape CLI - Scrape public X (Twitter) timelines and profiles.
#[derive(Parser)]
#[command(name = "xscrape")]
#[command(about = "Scrape public X (Twitter) timelines and profiles as JSON")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Chrome/Chromium executable (auto-detected when unset)
    #[arg(long, global = true, env = "XSCRAPE_CHROME_PATH")]
    chrome_path: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape a user's timeline
    Tweets {
        /// Username, with or without a leading @
        username: String,

        /// Maximum tweets to return
        #[arg(long, default_value = "100")]
        max_tweets: usize,

        /// Scrape the "with replies" timeline
        #[arg(long)]
        include_replies: bool,

        /// Drop reposts of other accounts' tweets
        #[arg(long)]
        exclude_retweets: bool,

        /// Settle time after each scroll, in milliseconds
        #[arg(long, default_value = "1000")]
        scroll_delay_ms: u64,

        /// Maximum scrolls
        #[arg(long, default_value = "100")]
        max_scrolls: u32,

        /// Stop after this many seconds and return what was collected
        #[arg(long)]
        deadline_secs: Option<u64>,
    },

    /// Scrape a user's profile header
    Profile {
        /// Username, with or without a leading @
        username: String,
    },

    /// Scrape profile and timeline together
    Complete {
        /// Username, with or without a leading @
        username: String,

        /// Maximum tweets to return
        #[arg(long, default_value = "20")]
        max_tweets: usize,

        /// Scrape the "with replies" timeline
        #[arg(long)]
        include_replies: bool,

        /// Drop reposts of other accounts' tweets
        #[arg(long)]
        exclude_retweets: bool,

        /// Stop the timeline scrape after this many seconds and return what was collected
        #[arg(long)]
        deadline_secs: Option<u64>,
    },
}

impl Commands {
    fn username(&self) -> &str {
        match self {
            Commands::Tweets { username, .. }
            | Commands::Profile { username }
            | Commands::Complete { username, .. } => username,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for JSON
    let filter = if cli.verbose {
        EnvFilter::new("xscrape=debug,info")
    } else {
        EnvFilter::new("xscrape=info,warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let username = cli.command.username().to_string();
    let outcome = async {
        let mut settings = BrowserSettings::from_env()?;
        if cli.headed {
            settings.headless = false;
        }
        if let Some(path) = cli.chrome_path {
            settings.chrome_path = Some(path);
        }
        run(cli.command, settings).await
    }
    .await;

    match outcome {
        Ok(envelope) => {
            print_json(&envelope, cli.pretty)?;
            Ok(())
        }
        Err(e) => {
            tracing::error!(username = %username, error = %e, "Scrape failed");
            print_json(
                &json!({
                    "success": false,
                    "error": e.to_string(),
                    "username": username,
                }),
                cli.pretty,
            )?;
            std::process::exit(1);
        }
    }
}

/// Launch the browser, run one command and shut the browser down.
async fn run(command: Commands, settings: BrowserSettings) -> Result<Value> {
    let base_url = settings.base_url.clone();
    let browser = ChromiumBrowser::launch(settings).await?;
    let scraper = Scraper::new(browser, base_url);

    let result = run_command(&scraper, command).await;

    if let Err(e) = scraper.into_source().close().await {
        tracing::warn!(error = %e, "Failed to close browser");
    }
    result
}

async fn run_command<S: PageSource>(scraper: &Scraper<S>, command: Commands) -> Result<Value> {
    let username = normalize_username(command.username())?;

    match command {
        Commands::Tweets {
            max_tweets,
            include_replies,
            exclude_retweets,
            scroll_delay_ms,
            max_scrolls,
            deadline_secs,
            ..
        } => {
            let options = TweetScrapeOptions {
                max_tweets,
                include_replies,
                include_retweets: !exclude_retweets,
                scroll_delay: Duration::from_millis(scroll_delay_ms),
                max_scrolls,
                ..TweetScrapeOptions::default()
            };

            spawn_deadline(&options.cancel, deadline_secs);

            let tweets = scraper.scrape_user_tweets(&username, &options).await?;
            Ok(json!({
                "success": true,
                "username": username,
                "totalTweets": tweets.len(),
                "tweets": tweets,
                "scrapedAt": Utc::now(),
            }))
        }
        Commands::Profile { .. } => {
            let profile = scraper.scrape_user_profile(&username).await?;
            Ok(json!({
                "success": true,
                "username": username,
                "profile": profile,
                "scrapedAt": Utc::now(),
            }))
        }
        Commands::Complete {
            max_tweets,
            include_replies,
            exclude_retweets,
            deadline_secs,
            ..
        } => {
            let options = TweetScrapeOptions {
                max_tweets,
                include_replies,
                include_retweets: !exclude_retweets,
                ..TweetScrapeOptions::default()
            };
            spawn_deadline(&options.cancel, deadline_secs);
            let complete = scraper.scrape_user_complete(&username, &options).await?;
            Ok(json!({
                "success": true,
                "username": username,
                "profile": complete.profile,
                "totalTweets": complete.tweets.len(),
                "tweets": complete.tweets,
                "scrapedAt": complete.scraped_at,
            }))
        }
    }
}

/// Fire `cancel` once the deadline passes.
fn spawn_deadline(cancel: &CancellationToken, deadline_secs: Option<u64>) {
    let Some(secs) = deadline_secs else {
        return;
    };
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        tracing::info!(deadline_secs = secs, "Deadline reached, stopping");
        cancel.cancel();
    });
}

fn print_json(value: &Value, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
