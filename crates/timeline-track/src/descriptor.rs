//! Declarative tracking rules.
//!
//! A [`TrackDescriptor`] says how one event type becomes an activity: which
//! lifecycle point it runs at, how the actor, object, and target are found,
//! whose feeds receive follower fan-out, and which text is scanned for
//! mentions. Every rule is a typed resolver bound at registration time.

use std::borrow::Cow;
use std::sync::Arc;

use timeline_types::EntityId;

use crate::entity::{downcast, Subject, Trackable};

/// Lifecycle moment at which a descriptor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerPoint {
    /// After the entity was first persisted.
    #[default]
    Create,
    /// After an existing entity was changed.
    Update,
    /// After any persist, new or existing.
    Save,
    /// After the entity was removed.
    Destroy,
}

impl TriggerPoint {
    /// Returns the canonical label for this trigger point.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Save => "save",
            Self::Destroy => "destroy",
        }
    }
}

impl std::fmt::Display for TriggerPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

type AccessorFn<E> = dyn Fn(&E) -> Option<Subject> + Send + Sync;

/// A named accessor from the triggering entity to a related entity.
pub struct Resolver<E> {
    name: Cow<'static, str>,
    resolve: Arc<AccessorFn<E>>,
}

impl<E> Resolver<E> {
    /// Binds an accessor returning a concrete related type.
    pub fn new<T, F>(name: impl Into<Cow<'static, str>>, accessor: F) -> Self
    where
        T: Trackable + 'static,
        F: Fn(&E) -> Option<Arc<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            resolve: Arc::new(move |entity: &E| accessor(entity).map(|value| value as Subject)),
        }
    }

    /// Binds an accessor that already yields a [`Subject`], for relations
    /// whose concrete type varies.
    pub fn dynamic<F>(name: impl Into<Cow<'static, str>>, accessor: F) -> Self
    where
        F: Fn(&E) -> Option<Subject> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            resolve: Arc::new(accessor),
        }
    }

    /// The accessor name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the accessor.
    pub fn resolve(&self, entity: &E) -> Option<Subject> {
        (self.resolve)(entity)
    }
}

impl<E> Clone for Resolver<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            resolve: Arc::clone(&self.resolve),
        }
    }
}

/// How the actor of an activity is found.
pub enum ActorRule<E> {
    /// The entity's [`Trackable::creator`].
    Creator,
    /// The resolved object acts on itself (e.g. a user signing up).
    SelfAsObject,
    /// A custom accessor on the triggering entity.
    Accessor(Resolver<E>),
}

impl<E> ActorRule<E> {
    /// The accessor name, used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Creator => "creator",
            Self::SelfAsObject => "self",
            Self::Accessor(resolver) => resolver.name(),
        }
    }
}

/// How the object of an activity is found.
pub enum ObjectRule<E> {
    /// The triggering entity itself.
    SelfEntity,
    /// A related entity.
    Accessor(Resolver<E>),
    /// The triggering entity itself, with the listed fields merged into its
    /// snapshot as display fields.
    Fields(Vec<String>),
}

type FollowersFn = dyn Fn(&dyn Trackable) -> Option<Vec<EntityId>> + Send + Sync;

/// How followers are read from the resolved actor.
pub enum FollowersRule {
    /// The actor's [`Trackable::followers`].
    Followers,
    /// A typed relation on one actor type. Actors of other types have no
    /// followers under this rule.
    Relation {
        /// Relation name, used in logs.
        name: Cow<'static, str>,
        /// Reads follower ids from the actor.
        read: Arc<FollowersFn>,
    },
    /// No follower fan-out.
    Disabled,
}

impl FollowersRule {
    /// Binds a followers relation on actors of type `A`.
    pub fn of<A, F>(name: impl Into<Cow<'static, str>>, read: F) -> Self
    where
        A: Trackable + 'static,
        F: Fn(&A) -> Vec<EntityId> + Send + Sync + 'static,
    {
        Self::Relation {
            name: name.into(),
            read: Arc::new(move |actor: &dyn Trackable| downcast::<A>(actor).map(&read)),
        }
    }

    /// Reads the follower ids of `actor`, or an empty list when the actor
    /// does not expose the relation.
    pub fn resolve(&self, actor: &dyn Trackable) -> Vec<EntityId> {
        let followers = match self {
            Self::Followers => actor.followers(),
            Self::Relation { read, .. } => read(actor),
            Self::Disabled => None,
        };
        followers.unwrap_or_default()
    }

    /// The relation name, used in logs.
    pub fn name(&self) -> &str {
        match self {
            Self::Followers => "followers",
            Self::Relation { name, .. } => &**name,
            Self::Disabled => "none",
        }
    }
}

type MentionFn = dyn Fn(&dyn Trackable) -> Option<String> + Send + Sync;

/// The text field on the object that is scanned for `@handle` mentions.
pub struct MentionRule {
    name: Cow<'static, str>,
    read: Arc<MentionFn>,
}

impl MentionRule {
    /// Binds a text field on objects of type `O`. Objects of other types do
    /// not expose the field.
    pub fn field<O, F>(name: impl Into<Cow<'static, str>>, read: F) -> Self
    where
        O: Trackable + 'static,
        F: Fn(&O) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            read: Arc::new(move |object: &dyn Trackable| downcast::<O>(object).and_then(&read)),
        }
    }

    /// The field name, used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the current text of the field from `object`.
    pub fn read(&self, object: &dyn Trackable) -> Option<String> {
        (self.read)(object)
    }
}

type GuardFn<E> = dyn Fn(&E) -> bool + Send + Sync;

/// Optional rules for [`TrackRegistry::register`](crate::TrackRegistry::register).
///
/// Defaults: runs on create, actor is the entity's creator, object is the
/// entity itself, no target, followers come from the actor's `followers`,
/// nothing is scanned for mentions, no guard.
pub struct TrackOptions<E> {
    pub(crate) trigger: TriggerPoint,
    pub(crate) actor: ActorRule<E>,
    pub(crate) object: ObjectRule<E>,
    pub(crate) target: Option<Resolver<E>>,
    pub(crate) followers: FollowersRule,
    pub(crate) mentionable: Option<MentionRule>,
    pub(crate) guard: Option<Arc<GuardFn<E>>>,
}

impl<E> Default for TrackOptions<E> {
    fn default() -> Self {
        Self {
            trigger: TriggerPoint::default(),
            actor: ActorRule::Creator,
            object: ObjectRule::SelfEntity,
            target: None,
            followers: FollowersRule::Followers,
            mentionable: None,
            guard: None,
        }
    }
}

impl<E> TrackOptions<E> {
    /// Starts from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the lifecycle point.
    pub fn on(mut self, trigger: TriggerPoint) -> Self {
        self.trigger = trigger;
        self
    }

    /// Sets the actor rule.
    pub fn actor(mut self, actor: ActorRule<E>) -> Self {
        self.actor = actor;
        self
    }

    /// Sets the object rule.
    pub fn object(mut self, object: ObjectRule<E>) -> Self {
        self.object = object;
        self
    }

    /// Sets the target accessor.
    pub fn target(mut self, target: Resolver<E>) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the followers rule.
    pub fn followers(mut self, followers: FollowersRule) -> Self {
        self.followers = followers;
        self
    }

    /// Scans the given object field for mentions.
    pub fn mentionable(mut self, field: MentionRule) -> Self {
        self.mentionable = Some(field);
        self
    }

    /// Only track when `guard` holds for the triggering entity.
    pub fn guard<F>(mut self, guard: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Arc::new(guard));
        self
    }
}

/// The registered rule set for one event type. Immutable once registered.
pub struct TrackDescriptor<E> {
    event: String,
    verb: String,
    options: TrackOptions<E>,
}

impl<E> TrackDescriptor<E> {
    pub(crate) fn new(event: String, verb: String, options: TrackOptions<E>) -> Self {
        Self {
            event,
            verb,
            options,
        }
    }

    /// The event name the descriptor is registered under.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// The verb written into every activity.
    pub fn verb(&self) -> &str {
        &self.verb
    }

    /// When the descriptor runs.
    pub fn trigger(&self) -> TriggerPoint {
        self.options.trigger
    }

    /// How the actor is found.
    pub fn actor(&self) -> &ActorRule<E> {
        &self.options.actor
    }

    /// How the object is found.
    pub fn object(&self) -> &ObjectRule<E> {
        &self.options.object
    }

    /// How the target is found, if any.
    pub fn target(&self) -> Option<&Resolver<E>> {
        self.options.target.as_ref()
    }

    /// How followers are read from the actor.
    pub fn followers(&self) -> &FollowersRule {
        &self.options.followers
    }

    /// The mentionable field, if any.
    pub fn mentionable(&self) -> Option<&MentionRule> {
        self.options.mentionable.as_ref()
    }

    /// Evaluates the guard. Descriptors without one always pass.
    pub fn passes_guard(&self, entity: &E) -> bool {
        self.options.guard.as_ref().map_or(true, |guard| guard(entity))
    }
}

impl<E> std::fmt::Debug for TrackDescriptor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackDescriptor")
            .field("event", &self.event)
            .field("verb", &self.verb)
            .field("trigger", &self.options.trigger)
            .field("actor", &self.options.actor.name())
            .field("target", &self.options.target.as_ref().map(Resolver::name))
            .field("followers", &self.options.followers.name())
            .field(
                "mentionable",
                &self.options.mentionable.as_ref().map(MentionRule::name),
            )
            .field("guarded", &self.options.guard.is_some())
            .finish()
    }
}
