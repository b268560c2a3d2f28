//! Capabilities the tracker needs from domain entities.
//!
//! Domain types stay outside this crate. A type takes part in tracking by
//! implementing [`Trackable`]; everything beyond identity and display is an
//! optional capability with an empty default.

use std::any::Any;
use std::sync::Arc;

use serde_json::{Map, Value};
use timeline_types::EntityId;

/// A resolved actor, object, or target.
pub type Subject = Arc<dyn Trackable>;

/// Upcast to [`Any`] so typed resolvers can recover the concrete type
/// behind a [`Subject`]. Implemented for every `'static` type.
pub trait AsAny {
    /// Returns `self` as [`Any`].
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A domain entity that can appear in an activity.
pub trait Trackable: AsAny + Send + Sync {
    /// Identifier used in the snapshot and in per-user feed keys.
    fn id(&self) -> EntityId;

    /// Human-readable representation stored as `display_name`.
    fn display_name(&self) -> String;

    /// Runtime type name stored as `class`.
    ///
    /// Defaults to the last path segment of the Rust type name. Generic
    /// types should override it.
    fn type_name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Extra display fields for a given verb. Empty unless overridden.
    fn fields_for(&self, _verb: &str) -> Map<String, Value> {
        Map::new()
    }

    /// The entity that created this one. Backs the default actor rule.
    fn creator(&self) -> Option<Subject> {
        None
    }

    /// Identifiers of this entity's followers. Backs the default followers
    /// rule; `None` means the entity has no followers relation at all.
    fn followers(&self) -> Option<Vec<EntityId>> {
        None
    }

    /// Value of a named display field, used by literal field collections
    /// on the object rule.
    fn field_value(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Recovers the concrete type behind a subject.
pub fn downcast<T: Trackable + 'static>(subject: &dyn Trackable) -> Option<&T> {
    AsAny::as_any(subject).downcast_ref::<T>()
}

/// Lookup of users by mention handle.
///
/// Any `Fn(&str) -> Option<EntityId>` closure is a lookup.
pub trait UserLookup: Send + Sync {
    /// Returns the user whose handle matches, without the leading `@`.
    fn find_by_handle(&self, handle: &str) -> Option<EntityId>;
}

impl<F> UserLookup for F
where
    F: Fn(&str) -> Option<EntityId> + Send + Sync,
{
    fn find_by_handle(&self, handle: &str) -> Option<EntityId> {
        self(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Account {
        id: i64,
    }

    impl Trackable for Account {
        fn id(&self) -> EntityId {
            EntityId::from(self.id)
        }

        fn display_name(&self) -> String {
            format!("account #{}", self.id)
        }
    }

    struct Other;

    impl Trackable for Other {
        fn id(&self) -> EntityId {
            EntityId::from(0)
        }

        fn display_name(&self) -> String {
            "other".to_string()
        }
    }

    #[test]
    fn default_type_name_is_short_type_name() {
        let account = Account { id: 1 };
        assert_eq!(account.type_name(), "Account");

        let subject: Subject = Arc::new(Account { id: 2 });
        assert_eq!(subject.type_name(), "Account");
    }

    #[test]
    fn downcast_recovers_concrete_type() {
        let subject: Subject = Arc::new(Account { id: 7 });
        let account = downcast::<Account>(subject.as_ref()).expect("should downcast");
        assert_eq!(account.id, 7);
        assert!(downcast::<Other>(subject.as_ref()).is_none());
    }

    #[test]
    fn optional_capabilities_default_to_empty() {
        let account = Account { id: 1 };
        assert!(account.fields_for("new_post").is_empty());
        assert!(account.creator().is_none());
        assert!(account.followers().is_none());
        assert!(account.field_value("title").is_none());
    }

    #[test]
    fn closures_are_user_lookups() {
        let lookup = |handle: &str| (handle == "alice").then(|| EntityId::from(1));
        assert_eq!(lookup.find_by_handle("alice"), Some(EntityId::from(1)));
        assert_eq!(lookup.find_by_handle("bob"), None);
    }
}
