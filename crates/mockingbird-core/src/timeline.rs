//! Feed filtering with the real service's bound and count semantics.
//!
//! The order of operations is fixed: filter by bounds, sort descending by
//! identifier, then truncate to the count. `since_id` is a strict
//! exclusive lower bound, `max_id` an inclusive upper bound, and the
//! count defaults to [`DEFAULT_COUNT`] and is clamped to [`MAX_COUNT`].

use crate::entity::{DirectMessage, Message};

/// Count applied when the caller supplies none.
pub const DEFAULT_COUNT: usize = 20;

/// Upper clamp for any supplied count.
pub const MAX_COUNT: usize = 200;

/// An entity that can appear in a filtered feed.
pub trait FeedItem {
    /// Numeric identifier used for bounds and ordering.
    fn feed_id(&self) -> u64;
}

impl FeedItem for Message {
    fn feed_id(&self) -> u64 {
        self.id.value()
    }
}

impl FeedItem for DirectMessage {
    fn feed_id(&self) -> u64 {
        self.id.value()
    }
}

impl<T: FeedItem> FeedItem for &T {
    fn feed_id(&self) -> u64 {
        (*self).feed_id()
    }
}

/// Bound and count parameters for a feed query.
///
/// `None` fields mean "unbounded" for the ids and "documented default"
/// for the count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimelineQuery {
    /// Maximum number of entries returned; defaults to [`DEFAULT_COUNT`],
    /// clamped to [`MAX_COUNT`].
    pub count: Option<usize>,
    /// Strict exclusive lower bound: keep ids `> since_id`.
    pub since_id: Option<u64>,
    /// Inclusive upper bound: keep ids `<= max_id`.
    pub max_id: Option<u64>,
}

/// Apply bound, order and count semantics to an entity sequence.
///
/// Keeps items whose id is `> since_id` (when given) and `<= max_id`
/// (when given), sorts the survivors by id descending (newest first) and
/// returns the first `count` of them.
pub fn filter_timeline<T: FeedItem>(
    items: impl IntoIterator<Item = T>,
    query: &TimelineQuery,
) -> Vec<T> {
    let mut kept: Vec<T> = items
        .into_iter()
        .filter(|item| {
            let id = item.feed_id();
            query.since_id.is_none_or(|since| id > since)
                && query.max_id.is_none_or(|max| id <= max)
        })
        .collect();
    kept.sort_by(|a, b| b.feed_id().cmp(&a.feed_id()));
    kept.truncate(query.count.unwrap_or(DEFAULT_COUNT).min(MAX_COUNT));
    kept
}
