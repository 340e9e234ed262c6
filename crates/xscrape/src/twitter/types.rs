//! Twitter data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post (tweet) extracted from a rendered timeline.
///
/// Only built when text, author and id are all present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRecord {
    /// Tweet ID from the status URL.
    pub id: String,
    /// Author handle (without @).
    pub username: String,
    /// Tweet text content.
    pub text: String,
    /// When the tweet was posted, if the page exposed a machine-readable time.
    pub timestamp: Option<DateTime<Utc>>,
    /// Canonical status URL.
    pub url: String,
    /// Whether this is a repost of someone else's tweet.
    #[serde(rename = "isRetweet")]
    pub is_repost: bool,
    /// Interaction counters.
    pub engagement: Engagement,
    /// Attached media, in document order.
    #[serde(default)]
    pub media: Vec<MediaItem>,
    /// When the record was extracted.
    pub scraped_at: DateTime<Utc>,
}

impl PostRecord {
    /// Identity key used for deduplication.
    #[must_use]
    pub fn identity(&self) -> String {
        identity_key(&self.username, &self.id)
    }
}

/// Compose the `username::id` identity key.
#[must_use]
pub fn identity_key(username: &str, id: &str) -> String {
    format!("{username}::{id}")
}

/// Interaction counters attached to a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub replies: u64,
    pub reposts: u64,
    pub likes: u64,
    pub views: u64,
}

/// Media attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Media type (image, video).
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// URL to the media.
    pub url: String,
}

/// Type of media attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Image attachment.
    Image,
    /// Video attachment.
    Video,
}

/// Profile header data for one account.
///
/// Text fields are empty strings when the page omits them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub display_name: String,
    pub bio: String,
    pub location: String,
    pub website: String,
    pub join_date: String,
    pub followers: u64,
    pub following: u64,
    pub profile_image: String,
    pub banner_image: String,
    pub is_verified: bool,
    pub scraped_at: DateTime<Utc>,
}
