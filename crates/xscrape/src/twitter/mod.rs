//! Twitter/X markup knowledge: record types, selectors and HTML parsers.

mod parser;
mod profile;
pub mod selectors;
mod types;

pub use parser::{status_id, PostParser};
pub use profile::ProfileParser;
pub use types::{identity_key, Engagement, MediaItem, MediaKind, PostRecord, ProfileRecord};
