//! Profile header parser.

use std::sync::LazyLock;

use chrono::Utc;
use scraper::{Html, Selector};

use super::parser::element_text;
use super::selectors;
use super::types::ProfileRecord;
use crate::numbers::parse_abbreviated_number;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("Invalid selector")
}

static NAME: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_NAME));
static NAME_FALLBACK: LazyLock<Selector> =
    LazyLock::new(|| selector(selectors::PROFILE_NAME_FALLBACK));
static BIO: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_BIO));
static LOCATION: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_LOCATION));
static WEBSITE: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_WEBSITE));
static JOIN_DATE: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_JOIN_DATE));
static FOLLOW_LINKS: LazyLock<Selector> =
    LazyLock::new(|| selector(selectors::PROFILE_FOLLOW_LINKS));
static AVATAR: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_AVATAR));
static BANNER: LazyLock<Selector> = LazyLock::new(|| selector(selectors::PROFILE_BANNER));
static VERIFIED: LazyLock<Vec<Selector>> =
    LazyLock::new(|| selectors::VERIFIED_BADGES.iter().map(|s| selector(s)).collect());

/// Parser for a rendered profile page.
pub struct ProfileParser;

impl ProfileParser {
    /// Parse the profile header out of page HTML.
    ///
    /// Missing fields fall back to empty strings and zero counts; this never fails.
    pub fn parse(html: &str) -> ProfileRecord {
        let document = Html::parse_document(html);

        let display_name = text_of(&document, &NAME)
            .or_else(|| text_of(&document, &NAME_FALLBACK))
            .unwrap_or_default();

        let (followers, following) = follow_counts(&document);

        let profile = ProfileRecord {
            display_name,
            bio: text_of(&document, &BIO).unwrap_or_default(),
            location: text_of(&document, &LOCATION).unwrap_or_default(),
            website: attr_of(&document, &WEBSITE, "href").unwrap_or_default(),
            join_date: text_of(&document, &JOIN_DATE).unwrap_or_default(),
            followers,
            following,
            profile_image: attr_of(&document, &AVATAR, "src").unwrap_or_default(),
            banner_image: attr_of(&document, &BANNER, "src").unwrap_or_default(),
            is_verified: VERIFIED.iter().any(|s| document.select(s).next().is_some()),
            scraped_at: Utc::now(),
        };

        tracing::debug!(
            display_name = %profile.display_name,
            followers = profile.followers,
            following = profile.following,
            verified = profile.is_verified,
            "Parsed profile"
        );
        profile
    }
}

fn text_of(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn attr_of(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(str::to_string)
}

/// Follower and following counts from the header's stat links.
fn follow_counts(document: &Html) -> (u64, u64) {
    let mut followers = 0;
    let mut following = 0;

    for link in document.select(&FOLLOW_LINKS) {
        let href = link.value().attr("href").unwrap_or_default();
        let count = parse_abbreviated_number(&element_text(link));
        if href.contains("/followers") {
            followers = count;
        } else if href.contains("/following") {
            following = count;
        }
    }

    (followers, following)
}
