//! Mention extraction.
//!
//! Mentions are derived, never stored: they are recomputed from the
//! current text and the current user set every time an entity is
//! rendered. A handle that does not resolve to a known user is silently
//! dropped; the same handle mentioned twice produces two records.
//!
//! Spans are character offsets (code points), not byte offsets, matching
//! the index units the real service reports.

use std::sync::LazyLock;

use regex::Regex;

use crate::entity::UserId;
use crate::store::EntityStore;

/// `@` followed by one or more word characters.
static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"@[A-Za-z0-9_]+").expect("mention pattern is valid")
});

/// A resolved `@handle` reference found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    /// Identifier of the mentioned user.
    pub user_id: UserId,
    /// Handle as registered (without the `@`).
    pub screen_name: String,
    /// Display name of the mentioned user.
    pub name: String,
    /// Half-open character offset range of the whole `@handle` token.
    pub span: [usize; 2],
}

/// Convert a byte range of `text` into a character-offset span.
fn char_span(text: &str, start: usize, end: usize) -> [usize; 2] {
    let chars_before = text[..start].chars().count();
    let chars_within = text[start..end].chars().count();
    [chars_before, chars_before + chars_within]
}

/// Resolve one regex match against the user set.
fn resolve(store: &EntityStore, text: &str, m: &regex::Match<'_>) -> Option<Mention> {
    let handle = &m.as_str()[1..];
    let user = store.user_by_screen_name(handle)?;
    Some(Mention {
        user_id: user.id,
        screen_name: user.screen_name.clone(),
        name: user.name.clone(),
        span: char_span(text, m.start(), m.end()),
    })
}

/// Extract every resolvable mention from `text`, left to right.
pub fn extract_mentions(store: &EntityStore, text: &str) -> Vec<Mention> {
    MENTION_RE.find_iter(text).filter_map(|m| resolve(store, text, &m)).collect()
}

/// The mention anchored at the very start of `text`, if it resolves.
///
/// Used for the implied reply target: a message with no explicit reply
/// target whose text begins with a mention is treated as a reply to the
/// mentioned user.
pub fn leading_mention(store: &EntityStore, text: &str) -> Option<Mention> {
    let m = MENTION_RE.find(text)?;
    if m.start() != 0 {
        return None;
    }
    resolve(store, text, &m)
}
