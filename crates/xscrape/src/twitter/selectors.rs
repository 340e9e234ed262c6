//! CSS selectors and page markers for x.com markup.
//!
//! X changes its markup without notice, so most lookups have a primary and a
//! fallback selector.

/// Post container on timelines.
pub const POST: &str = "article";
/// Secondary post container selector used when `POST` never renders.
pub const POST_FALLBACK: &str = "[data-testid='tweet']";

pub const POST_TEXT: &str = "div[data-testid='tweetText']";
pub const POST_TEXT_FALLBACK: &str = "[lang]";

pub const POST_AUTHOR: &str = "div[dir='ltr'] > span";
pub const POST_AUTHOR_FALLBACK: &str = "[data-testid='User-Name'] span";

pub const SOCIAL_CONTEXT: &str = "span[data-testid='socialContext']";
pub const POST_TIME: &str = "time";
pub const STATUS_LINK: &str = "a[href*='/status/']";
pub const STAT_GROUP: &str = "div[role='group']";
pub const LABELLED: &str = "[aria-label]";
pub const MEDIA: &str = "img, video";
pub const VIDEO_SOURCE: &str = "source";

/// Profile header; its presence means the profile rendered.
pub const PROFILE_HEADING: &str = "[data-testid='UserName']";
pub const PROFILE_HEADING_FALLBACK: &str = "h2[role='heading']";

pub const PROFILE_NAME: &str = "[data-testid='UserName'] span";
pub const PROFILE_NAME_FALLBACK: &str = "h2[role='heading'] span";
pub const PROFILE_BIO: &str = "[data-testid='UserDescription'] span";
pub const PROFILE_LOCATION: &str = "[data-testid='UserLocation'] span";
pub const PROFILE_WEBSITE: &str = "[data-testid='UserUrl'] a";
pub const PROFILE_JOIN_DATE: &str = "[data-testid='UserJoinDate'] span";
pub const PROFILE_FOLLOW_LINKS: &str = "a[href*='/followers'], a[href*='/following']";
pub const PROFILE_AVATAR: &str = "[data-testid='UserAvatar'] img";
pub const PROFILE_BANNER: &str = "[data-testid='UserBannerImage'] img";

/// Any one of these marks the account as verified.
pub const VERIFIED_BADGES: [&str; 3] = [
    "[data-testid='UserName'] svg[aria-label*='Verified']",
    "[aria-label*='Verified account']",
    "svg[aria-label*='Verified']",
];

/// Host serving tweet images.
pub const MEDIA_CDN_HOST: &str = "pbs.twimg.com";

/// Page text shown for missing or suspended accounts.
pub const NOT_FOUND_MARKERS: [&str; 3] = [
    "This account doesn't exist",
    "This account doesn\u{2019}t exist",
    "Account suspended",
];

/// Whether page HTML carries a not-found or suspended marker.
#[must_use]
pub fn has_not_found_marker(html: &str) -> bool {
    NOT_FOUND_MARKERS.iter().any(|marker| html.contains(marker))
}
