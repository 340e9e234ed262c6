//! Timeline HTML parser.

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::selectors;
use super::types::{identity_key, Engagement, MediaItem, MediaKind, PostRecord};
use crate::numbers::parse_abbreviated_number;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

static POST: LazyLock<Selector> = LazyLock::new(|| selector(selectors::POST));
static TEXT: LazyLock<Selector> = LazyLock::new(|| selector(selectors::POST_TEXT));
static TEXT_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector(selectors::POST_TEXT_FALLBACK));
static AUTHOR: LazyLock<Selector> = LazyLock::new(|| selector(selectors::POST_AUTHOR));
static AUTHOR_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector(selectors::POST_AUTHOR_FALLBACK));
static SOCIAL_CONTEXT: LazyLock<Selector> = LazyLock::new(|| selector(selectors::SOCIAL_CONTEXT));
static TIME: LazyLock<Selector> = LazyLock::new(|| selector(selectors::POST_TIME));
static STATUS_LINK: LazyLock<Selector> = LazyLock::new(|| selector(selectors::STATUS_LINK));
static STAT_GROUP: LazyLock<Selector> = LazyLock::new(|| selector(selectors::STAT_GROUP));
static LABELLED: LazyLock<Selector> = LazyLock::new(|| selector(selectors::LABELLED));
static MEDIA: LazyLock<Selector> = LazyLock::new(|| selector(selectors::MEDIA));
static VIDEO_SOURCE: LazyLock<Selector> = LazyLock::new(|| selector(selectors::VIDEO_SOURCE));

/// Extracts post records from a snapshot of a rendered timeline.
///
/// Extraction is a pure function of the snapshot, the repost flag and the set
/// of identities the caller has already accepted. Elements that lack text,
/// author or status id are skipped; they never abort the batch.
#[derive(Clone, Copy)]
pub struct PostParser<'a> {
    base_url: &'a Url,
    include_reposts: bool,
    known: &'a HashSet<String>,
}

impl<'a> PostParser<'a> {
    /// Create a parser resolving links against `base_url`.
    #[must_use]
    pub fn new(base_url: &'a Url, include_reposts: bool, known: &'a HashSet<String>) -> Self {
        Self {
            base_url,
            include_reposts,
            known,
        }
    }

    /// Lazily extract candidate records from every post element in `document`.
    pub fn extract<'d>(&self, document: &'d Html) -> impl Iterator<Item = PostRecord> + 'd
    where
        'a: 'd,
    {
        let parser: PostParser<'d> = *self;
        document
            .select(&POST)
            .filter_map(move |article| parser.extract_one(article))
    }

    /// Parse an HTML snapshot and collect the candidates.
    pub fn parse(&self, html: &str) -> Vec<PostRecord> {
        let document = Html::parse_document(html);
        let posts: Vec<PostRecord> = self.extract(&document).collect();
        tracing::debug!(count = posts.len(), "Extracted candidate posts");
        posts
    }

    fn extract_one(&self, article: ElementRef<'_>) -> Option<PostRecord> {
        let Some(text) = first_text(article, &TEXT, &TEXT_FALLBACK) else {
            tracing::trace!("Post has no text, skipping");
            return None;
        };

        let username = first_text(article, &AUTHOR, &AUTHOR_FALLBACK)
            .map(|name| name.trim_start_matches('@').trim().to_string())
            .filter(|name| !name.is_empty());
        let Some(username) = username else {
            tracing::trace!("Post has no author, skipping");
            return None;
        };

        let is_repost = article
            .select(&SOCIAL_CONTEXT)
            .next()
            .map(element_text)
            .is_some_and(|context| context.contains("Retweeted") || context.contains("Reposted"));
        if is_repost && !self.include_reposts {
            return None;
        }

        let timestamp = article
            .select(&TIME)
            .next()
            .and_then(|el| el.value().attr("datetime"))
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let href = article
            .select(&STATUS_LINK)
            .find_map(|el| el.value().attr("href"))?;
        let Some(id) = status_id(href) else {
            tracing::debug!(href, "Could not parse status id");
            return None;
        };

        if self.known.contains(&identity_key(&username, &id)) {
            return None;
        }

        Some(PostRecord {
            url: self.canonical_url(href),
            id,
            username,
            text,
            timestamp,
            is_repost,
            engagement: engagement(article),
            media: media(article, self.base_url),
            scraped_at: Utc::now(),
        })
    }

    /// Absolute status URL without query or fragment.
    fn canonical_url(&self, href: &str) -> String {
        match self.base_url.join(href) {
            Ok(mut url) => {
                url.set_query(None);
                url.set_fragment(None);
                url.into()
            }
            Err(_) => href.to_string(),
        }
    }
}

/// Collected, trimmed text of an element.
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Text of the first non-blank match for `primary`, else for `fallback`.
fn first_text(scope: ElementRef<'_>, primary: &Selector, fallback: &Selector) -> Option<String> {
    scope
        .select(primary)
        .next()
        .or_else(|| scope.select(fallback).next())
        .map(element_text)
        .filter(|text| !text.is_empty())
}

/// Extract the tweet id from a status link.
/// Links look like `/user/status/123`, `/user/status/123/photo/1` or `/user/status/123?s=20`.
pub fn status_id(href: &str) -> Option<String> {
    let after = href.split("/status/").nth(1)?;
    let id = after.split(['/', '?', '#']).next().unwrap_or_default();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(id.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stat {
    Replies,
    Reposts,
    Likes,
    Views,
}

/// Keyword table for engagement labels; first match wins.
const STAT_KEYWORDS: [(&[&str], Stat); 4] = [
    (&["reply", "replies"], Stat::Replies),
    (&["repost", "reposts"], Stat::Reposts),
    (&["like", "likes"], Stat::Likes),
    (&["view", "views"], Stat::Views),
];

fn classify(label: &str) -> Option<Stat> {
    let label = label.to_lowercase();
    STAT_KEYWORDS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| label.contains(*k)))
        .map(|(_, stat)| *stat)
}

fn engagement(article: ElementRef<'_>) -> Engagement {
    let mut counts = Engagement::default();
    let Some(group) = article.select(&STAT_GROUP).next() else {
        return counts;
    };

    for el in group.select(&LABELLED) {
        let label = el.value().attr("aria-label").unwrap_or_default();
        let Some(stat) = classify(label) else {
            continue;
        };
        let value = parse_abbreviated_number(&element_text(el));
        match stat {
            Stat::Replies => counts.replies = value,
            Stat::Reposts => counts.reposts = value,
            Stat::Likes => counts.likes = value,
            Stat::Views => counts.views = value,
        }
    }

    counts
}

/// CDN images and video sources. Video URLs are resolved against `base_url`.
fn media(article: ElementRef<'_>, base_url: &Url) -> Vec<MediaItem> {
    article
        .select(&MEDIA)
        .filter_map(|el| match el.value().name() {
            "img" => el
                .value()
                .attr("src")
                .filter(|src| is_media_cdn(src))
                .map(|src| MediaItem {
                    kind: MediaKind::Image,
                    url: src.to_string(),
                }),
            "video" => el
                .select(&VIDEO_SOURCE)
                .find_map(|source| source.value().attr("src"))
                .or_else(|| el.value().attr("src"))
                .filter(|src| !src.is_empty())
                .map(|src| MediaItem {
                    kind: MediaKind::Video,
                    url: base_url
                        .join(src)
                        .map_or_else(|_| src.to_string(), String::from),
                }),
            _ => None,
        })
        .collect()
}

fn is_media_cdn(src: &str) -> bool {
    Url::parse(src)
        .ok()
        .is_some_and(|url| url.host_str() == Some(selectors::MEDIA_CDN_HOST))
}
