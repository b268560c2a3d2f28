//! Multi-destination writes of a built activity.

use std::sync::Arc;

use timeline_types::{encode_activity, Activity, EntityId, FeedKey};

use crate::entity::UserLookup;
use crate::error::{Disposition, ErrorPolicy, FailureKind};
use crate::mentions;
use crate::store::{AppendOutcome, FeedStore};

/// Per-destination record of one dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Every attempted append, in write order.
    pub writes: Vec<(FeedKey, AppendOutcome)>,
}

impl DispatchReport {
    /// Number of attempted appends.
    pub fn attempted(&self) -> usize {
        self.writes.len()
    }

    /// Feeds that received the activity.
    pub fn written(&self) -> impl Iterator<Item = &FeedKey> {
        self.writes
            .iter()
            .filter(|(_, outcome)| *outcome == AppendOutcome::Written)
            .map(|(key, _)| key)
    }

    /// Feeds whose append failed, with the failure kind.
    pub fn failures(&self) -> impl Iterator<Item = (&FeedKey, FailureKind)> {
        self.writes.iter().filter_map(|(key, outcome)| match outcome {
            AppendOutcome::Failed(kind) => Some((key, *kind)),
            AppendOutcome::Written => None,
        })
    }
}

/// Writes activities to the global, actor, mention, and follower feeds.
#[derive(Clone)]
pub struct FanoutWriter {
    store: FeedStore,
    users: Arc<dyn UserLookup>,
}

impl FanoutWriter {
    /// Creates a writer that appends through `store` and resolves mention
    /// handles with `users`.
    pub fn new(store: FeedStore, users: Arc<dyn UserLookup>) -> Self {
        Self { store, users }
    }

    /// The store adapter.
    pub fn store(&self) -> &FeedStore {
        &self.store
    }

    /// Dispatches `activity` to every destination feed.
    ///
    /// Write order is global, actor, one per resolved mention, one per
    /// follower. Each append is independent: a failure is logged and the
    /// remaining destinations are still written. Nothing is deduplicated, so
    /// a follower who is also mentioned receives both writes.
    pub fn dispatch(
        &self,
        activity: &Activity,
        followers: &[EntityId],
        mention_source: Option<&str>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        let payload = match encode_activity(activity) {
            Ok(payload) => payload,
            Err(err) => {
                if ErrorPolicy.disposition(FailureKind::Encoding) == Disposition::LogError {
                    tracing::error!(verb = %activity.verb, error = %err, "failed to encode activity");
                }
                return report;
            }
        };

        let mut append = |key: FeedKey| {
            let outcome = self.store.append(&key, &payload);
            report.writes.push((key, outcome));
        };

        append(FeedKey::Global);
        append(FeedKey::UserActivity(activity.actor.id.clone()));

        if let Some(text) = mention_source {
            let tokens = mentions::extract(text);
            for user in mentions::resolve(&tokens, self.users.as_ref()) {
                append(FeedKey::UserMentions(user));
            }
        }

        for follower in followers {
            append(FeedKey::UserActivity(follower.clone()));
        }

        tracing::debug!(
            verb = %activity.verb,
            attempted = report.attempted(),
            failed = report.failures().count(),
            "dispatched activity"
        );

        report
    }
}
