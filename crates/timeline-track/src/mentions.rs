//! `@handle` mention extraction.
//!
//! Handles are `@` followed by one or more ASCII word characters
//! (`[A-Za-z0-9_]`). Extraction keeps every token in order of appearance,
//! repeated handles included, and does not normalise case.

use once_cell::sync::Lazy;
use regex::Regex;
use timeline_types::EntityId;

use crate::entity::UserLookup;
use crate::error::{Disposition, ErrorPolicy, FailureKind};

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid mention regex"));

/// A raw mention token found in text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionToken<'a> {
    raw: &'a str,
}

impl<'a> MentionToken<'a> {
    /// The token as it appears in the text, including `@`.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// The handle without the leading `@`.
    pub fn handle(&self) -> &'a str {
        &self.raw[1..]
    }
}

/// Scans `text` for mention tokens.
pub fn extract(text: &str) -> Vec<MentionToken<'_>> {
    MENTION_RE
        .find_iter(text)
        .map(|m| MentionToken { raw: m.as_str() })
        .collect()
}

/// Resolves tokens to user ids.
///
/// Tokens whose handle matches no user are dropped, handled as
/// [`FailureKind::UnresolvedMention`] under the [`ErrorPolicy`]. The result
/// keeps encounter order and duplicates.
pub fn resolve(tokens: &[MentionToken<'_>], lookup: &dyn UserLookup) -> Vec<EntityId> {
    tokens
        .iter()
        .filter_map(|token| {
            let user = lookup.find_by_handle(token.handle());
            if user.is_none() {
                let kind = FailureKind::UnresolvedMention;
                if ErrorPolicy.disposition(kind) != Disposition::Ignore {
                    tracing::error!(
                        handle = token.handle(),
                        kind = kind.as_label(),
                        "mention did not resolve to a user"
                    );
                }
            }
            user
        })
        .collect()
}
