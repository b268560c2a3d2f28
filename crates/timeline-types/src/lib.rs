//! Shared types for the timeline activity-feed engine.
//!
//! This crate holds the records that cross crate boundaries: the
//! [`Activity`] built for every tracked lifecycle event, the [`EntityRef`]
//! snapshots it carries, the [`FeedKey`] addressing scheme of the list
//! store, and the JSON codec used to persist activities inside feeds.
//!
//! Nothing here talks to a store or knows about tracking rules. Both the
//! write side (`timeline-track`) and any feed reader depend on these types
//! so that what one side encodes the other can always decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

mod codec;
mod feed;

pub use codec::{decode_activity, encode_activity, CodecError};
pub use feed::{FeedKey, ParseFeedKeyError};

/// Keys owned by the [`EntityRef`] record itself.
///
/// Extra display fields must never use these names, otherwise the flattened
/// payload would carry duplicate keys.
pub const RESERVED_FIELDS: [&str; 3] = ["id", "class", "display_name"];

/// Identifier of a tracked entity.
///
/// Numeric identifiers stay numeric in the encoded payload; anything else
/// (UUIDs, slugs) is kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Integer primary key.
    Int(i64),
    /// Opaque string identifier.
    Str(String),
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Str(id) => f.write_str(id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Int(id)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::Str(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self::Str(id)
    }
}

/// Snapshot of an actor, object, or target at the moment an activity was
/// created.
///
/// Encoded as `{id, class, display_name, ...extra_fields}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    /// Identifier of the referenced entity.
    pub id: EntityId,
    /// Runtime type name of the referenced entity (e.g. `User`).
    #[serde(rename = "class")]
    pub type_name: String,
    /// Human-readable representation at snapshot time.
    pub display_name: String,
    /// Per-type display fields merged next to the fixed keys.
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl EntityRef {
    /// Creates a snapshot with no extra fields.
    pub fn new(
        id: impl Into<EntityId>,
        type_name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            type_name: type_name.into(),
            display_name: display_name.into(),
            extra_fields: Map::new(),
        }
    }

    /// Merges extra display fields into the snapshot.
    ///
    /// Later values win on key collisions. Keys listed in
    /// [`RESERVED_FIELDS`] are skipped and returned so the caller can report
    /// them.
    pub fn merge_extra_fields(&mut self, fields: Map<String, Value>) -> Vec<String> {
        let mut rejected = Vec::new();
        for (key, value) in fields {
            if RESERVED_FIELDS.contains(&key.as_str()) {
                rejected.push(key);
            } else {
                self.extra_fields.insert(key, value);
            }
        }
        rejected
    }
}

/// An immutable record of a verb performed by an actor on an object,
/// optionally against a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// The verb registered for the event type (never empty).
    pub verb: String,
    /// Who performed the action. Always present.
    pub actor: EntityRef,
    /// What the action was performed on.
    pub object: Option<EntityRef>,
    /// What the action was directed at, if anything.
    pub target: Option<EntityRef>,
    /// When the activity was built.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_id_display_matches_key_segment() {
        assert_eq!(EntityId::from(42).to_string(), "42");
        assert_eq!(EntityId::from("u-7").to_string(), "u-7");
    }

    #[test]
    fn entity_id_keeps_numeric_json_shape() {
        assert_eq!(serde_json::to_value(EntityId::from(1)).unwrap(), json!(1));
        assert_eq!(
            serde_json::to_value(EntityId::from("abc")).unwrap(),
            json!("abc")
        );
    }

    #[test]
    fn merge_extra_fields_rejects_reserved_keys() {
        let mut entity = EntityRef::new(1, "User", "alice");
        let mut fields = Map::new();
        fields.insert("avatar".to_string(), json!("a.png"));
        fields.insert("class".to_string(), json!("Admin"));

        let rejected = entity.merge_extra_fields(fields);

        assert_eq!(rejected, vec!["class".to_string()]);
        assert_eq!(entity.type_name, "User");
        assert_eq!(entity.extra_fields.get("avatar"), Some(&json!("a.png")));
        assert!(!entity.extra_fields.contains_key("class"));
    }

    #[test]
    fn entity_ref_flattens_extra_fields() {
        let mut entity = EntityRef::new(3, "Post", "Hello");
        let mut fields = Map::new();
        fields.insert("title".to_string(), json!("Hello"));
        entity.merge_extra_fields(fields);

        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            value,
            json!({"id": 3, "class": "Post", "display_name": "Hello", "title": "Hello"})
        );
    }
}
