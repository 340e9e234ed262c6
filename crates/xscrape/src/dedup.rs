//! Duplicate detection for scraped posts.

use std::collections::HashSet;

use crate::twitter::PostRecord;

/// Accumulates posts in first-seen order, dropping repeats.
///
/// Identity is `username::id`; re-rendered posts after a scroll carry the
/// same key and are ignored.
#[derive(Debug, Clone, Default)]
pub struct DedupAccumulator {
    /// Keys of accepted posts.
    seen: HashSet<String>,
    /// Accepted posts in insertion order.
    records: Vec<PostRecord>,
}

impl DedupAccumulator {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the record if its identity has not been seen.
    pub fn add_if_new(&mut self, record: PostRecord) -> bool {
        if !self.seen.insert(record.identity()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Merge a batch, returning how many were accepted.
    pub fn extend(&mut self, records: impl IntoIterator<Item = PostRecord>) -> usize {
        records
            .into_iter()
            .map(|record| usize::from(self.add_if_new(record)))
            .sum()
    }

    /// Check if an identity key has been accepted.
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains(key)
    }

    /// Keys of every accepted record.
    pub fn known_keys(&self) -> &HashSet<String> {
        &self.seen
    }

    /// Get the count of accepted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Accepted records in insertion order.
    pub fn records(&self) -> &[PostRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<PostRecord> {
        self.records
    }
}
