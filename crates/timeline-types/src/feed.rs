//! Addressing scheme for feeds in the list store.

use crate::EntityId;

/// Key of the feed every activity is written to.
pub const GLOBAL_ACTIVITY_KEY: &str = "global:activity";

/// A feed destination in the list store.
///
/// | Variant | Store key |
/// |---------|-----------|
/// | `Global` | `global:activity` |
/// | `UserActivity` | `user:id:{id}:activity` |
/// | `UserMentions` | `user:id:{id}:mentions` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedKey {
    /// The single global activity feed.
    Global,
    /// A user's personal activity feed (own actions and followed actors).
    UserActivity(EntityId),
    /// Activities whose mentionable text named the user.
    UserMentions(EntityId),
}

impl FeedKey {
    /// Returns the store key for this feed.
    pub fn as_key(&self) -> String {
        match self {
            Self::Global => GLOBAL_ACTIVITY_KEY.to_string(),
            Self::UserActivity(id) => format!("user:id:{id}:activity"),
            Self::UserMentions(id) => format!("user:id:{id}:mentions"),
        }
    }
}

impl std::fmt::Display for FeedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_key())
    }
}

impl std::str::FromStr for FeedKey {
    type Err = ParseFeedKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == GLOBAL_ACTIVITY_KEY {
            return Ok(Self::Global);
        }

        let rest = s
            .strip_prefix("user:id:")
            .ok_or_else(|| ParseFeedKeyError(s.to_string()))?;
        let (id, feed) = rest
            .rsplit_once(':')
            .ok_or_else(|| ParseFeedKeyError(s.to_string()))?;
        if id.is_empty() {
            return Err(ParseFeedKeyError(s.to_string()));
        }

        // Only canonical integers map back to `Int`, so "007" keeps its key.
        let id = match id.parse::<i64>() {
            Ok(n) if n.to_string() == id => EntityId::Int(n),
            _ => EntityId::Str(id.to_string()),
        };

        match feed {
            "activity" => Ok(Self::UserActivity(id)),
            "mentions" => Ok(Self::UserMentions(id)),
            _ => Err(ParseFeedKeyError(s.to_string())),
        }
    }
}

/// Error returned when parsing an unknown feed key.
#[derive(Debug, Clone)]
pub struct ParseFeedKeyError(pub String);

impl std::fmt::Display for ParseFeedKeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown feed key: {}", self.0)
    }
}

impl std::error::Error for ParseFeedKeyError {}
