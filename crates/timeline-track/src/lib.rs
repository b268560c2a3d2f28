//! Write-side activity feed engine.
//!
//! Turns domain lifecycle events ("a post was created") into
//! [`Activity`](timeline_types::Activity) records and fans them out to
//! append-only feeds in a list store:
//!
//! | Feed | Receives |
//! |------|----------|
//! | `global:activity` | every activity |
//! | `user:id:{actor}:activity` | the actor's own activities |
//! | `user:id:{user}:mentions` | activities whose mentionable text names the user |
//! | `user:id:{follower}:activity` | activities of actors the user follows |
//!
//! # Pipeline
//!
//! 1. A [`TrackRegistry`] holds one [`TrackDescriptor`] per event name.
//! 2. [`build`] resolves actor, object, target, and followers from the
//!    triggering entity and snapshots them. A missing actor aborts.
//! 3. [`FanoutWriter::dispatch`] encodes the activity once and appends it to
//!    every destination through a [`FeedStore`]. Each append is independent.
//!
//! Runtime failures are logged and swallowed (see [`ErrorPolicy`]); only
//! [`ConfigurationError`]s reach the caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! use timeline_track::{FanoutWriter, FeedStore, MentionRule, SqliteListStore,
//!     TrackOptions, TrackRegistry, Tracker};
//!
//! let mut registry = TrackRegistry::<Post>::new();
//! registry.track(
//!     "new_post",
//!     TrackOptions::new().mentionable(MentionRule::field("body", |p: &Post| Some(p.body.clone()))),
//! )?;
//!
//! let store = Arc::new(SqliteListStore::open("timeline.db", Default::default())?);
//! let writer = FanoutWriter::new(FeedStore::new(store), Arc::new(find_user_by_handle));
//! let tracker = Tracker::new(registry, writer);
//!
//! tracker.track("new_post", &post)?;
//! ```

mod builder;
mod descriptor;
mod entity;
mod error;
mod fanout;
pub mod mentions;
mod reader;
mod registry;
mod store;
mod tracker;

pub use builder::{build, BuildOutcome, BuiltActivity};
pub use descriptor::{
    ActorRule, FollowersRule, MentionRule, ObjectRule, Resolver, TrackDescriptor, TrackOptions,
    TriggerPoint,
};
pub use entity::{downcast, AsAny, Subject, Trackable, UserLookup};
pub use error::{
    ConfigurationError, Disposition, ErrorPolicy, FailureKind, StoreError, StoreSetupError,
};
pub use fanout::{DispatchReport, FanoutWriter};
pub use reader::FeedReader;
pub use registry::TrackRegistry;
pub use store::{AppendOutcome, FeedStore, ListStore, SqliteListStore};
pub use tracker::{TrackOutcome, Tracker};
