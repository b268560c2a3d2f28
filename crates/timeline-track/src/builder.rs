//! Activity construction.
//!
//! [`build`] turns a triggering entity and its descriptor into an
//! [`Activity`]. Resolution order is object, actor, target, followers,
//! then snapshots. The actor gates everything after it: when it resolves
//! to nothing the build aborts before any per-type hook runs.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use timeline_types::{Activity, EntityId, EntityRef};

use crate::descriptor::{ActorRule, ObjectRule, TrackDescriptor};
use crate::entity::{Subject, Trackable};
use crate::error::{Disposition, ErrorPolicy, FailureKind};

/// Display fields requested by a literal object rule, keyed by lowercased
/// type name.
type DisplayFields = HashMap<String, Vec<String>>;

/// An activity ready for fan-out.
#[derive(Debug, Clone)]
pub struct BuiltActivity {
    /// The activity record.
    pub activity: Activity,
    /// Follower ids captured from the actor at build time.
    pub followers: Vec<EntityId>,
    /// Current text of the mentionable field, if the descriptor names one
    /// and the object exposes it.
    pub mention_source: Option<String>,
}

/// Result of [`build`].
#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// An activity was produced.
    Built(BuiltActivity),
    /// The guard rejected the entity; nothing was done.
    Skipped,
    /// The actor resolved to nothing; the failure was logged.
    Aborted,
}

/// Builds the activity for `entity` under `descriptor`.
pub fn build<E>(entity: &E, descriptor: &TrackDescriptor<E>) -> BuildOutcome
where
    E: Trackable + Clone + 'static,
{
    if !descriptor.passes_guard(entity) {
        tracing::trace!(event = descriptor.event(), "guard rejected entity");
        return BuildOutcome::Skipped;
    }

    let mut display_fields = DisplayFields::new();
    let object: Option<Subject> = match descriptor.object() {
        ObjectRule::SelfEntity => Some(Arc::new(entity.clone())),
        ObjectRule::Accessor(resolver) => resolver.resolve(entity),
        ObjectRule::Fields(fields) => {
            display_fields.insert(entity.type_name().to_lowercase(), fields.clone());
            Some(Arc::new(entity.clone()))
        }
    };

    let actor = match descriptor.actor() {
        ActorRule::Creator => entity.creator(),
        ActorRule::SelfAsObject => object.clone(),
        ActorRule::Accessor(resolver) => resolver.resolve(entity),
    };
    let Some(actor) = actor else {
        if ErrorPolicy.disposition(FailureKind::ActorResolution) == Disposition::LogError {
            tracing::error!(
                event = descriptor.event(),
                entity_type = entity.type_name(),
                entity_id = %entity.id(),
                actor_accessor = descriptor.actor().name(),
                "bad actor, aborting timeline track"
            );
        }
        return BuildOutcome::Aborted;
    };

    let target = descriptor
        .target()
        .and_then(|resolver| resolver.resolve(entity));

    let followers = descriptor.followers().resolve(actor.as_ref());

    let mention_source = match (descriptor.mentionable(), object.as_deref()) {
        (Some(field), Some(object)) => field.read(object),
        _ => None,
    };

    let verb = descriptor.verb();
    let activity = Activity {
        verb: verb.to_string(),
        actor: snapshot(actor.as_ref(), verb, &display_fields),
        object: object
            .as_deref()
            .map(|object| snapshot(object, verb, &display_fields)),
        target: target
            .as_deref()
            .map(|target| snapshot(target, verb, &display_fields)),
        created_at: Utc::now(),
    };

    tracing::debug!(
        event = descriptor.event(),
        verb,
        actor_id = %activity.actor.id,
        followers = followers.len(),
        "built activity"
    );

    BuildOutcome::Built(BuiltActivity {
        activity,
        followers,
        mention_source,
    })
}

fn snapshot(subject: &dyn Trackable, verb: &str, display_fields: &DisplayFields) -> EntityRef {
    let mut entity = EntityRef::new(subject.id(), subject.type_name(), subject.display_name());
    let mut extra = subject.fields_for(verb);

    if let Some(names) = display_fields.get(&entity.type_name.to_lowercase()) {
        for name in names {
            if let Some(value) = subject.field_value(name) {
                extra.insert(name.clone(), value);
            }
        }
    }

    let rejected = entity.merge_extra_fields(extra);
    if !rejected.is_empty() {
        tracing::warn!(
            entity_type = %entity.type_name,
            entity_id = %entity.id,
            fields = ?rejected,
            "ignoring extra fields that shadow reserved keys"
        );
    }

    entity
}
