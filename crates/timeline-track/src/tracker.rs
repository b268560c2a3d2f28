//! Host-facing entry point composing registry, builder, and writer.

use crate::builder::{build, BuildOutcome};
use crate::descriptor::{TrackDescriptor, TriggerPoint};
use crate::entity::Trackable;
use crate::error::ConfigurationError;
use crate::fanout::{DispatchReport, FanoutWriter};
use crate::registry::TrackRegistry;

/// What happened to one tracked event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// The activity was built and dispatched.
    Dispatched(DispatchReport),
    /// The guard rejected the entity.
    Skipped,
    /// The actor resolved to nothing; no writes were made.
    Aborted,
}

/// Runs tracking for one entity type.
///
/// The host calls [`track`](Self::track) or
/// [`on_lifecycle`](Self::on_lifecycle) after its own operation succeeded.
/// Both run to completion on the calling thread and never fail because of
/// the store.
pub struct Tracker<E> {
    registry: TrackRegistry<E>,
    writer: FanoutWriter,
}

impl<E> Tracker<E>
where
    E: Trackable + Clone + 'static,
{
    /// Creates a tracker over a fully registered `registry`.
    pub fn new(registry: TrackRegistry<E>, writer: FanoutWriter) -> Self {
        Self { registry, writer }
    }

    /// The descriptor registry.
    pub fn registry(&self) -> &TrackRegistry<E> {
        &self.registry
    }

    /// Tracks `entity` under the descriptor registered for `event`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownEvent` if no descriptor is
    /// registered for `event`. Runtime failures are never returned.
    pub fn track(&self, event: &str, entity: &E) -> Result<TrackOutcome, ConfigurationError> {
        let descriptor = self.registry.get(event)?;
        Ok(self.run(descriptor, entity))
    }

    /// Runs every descriptor registered for `trigger`, ordered by event name.
    pub fn on_lifecycle(&self, trigger: TriggerPoint, entity: &E) -> Vec<TrackOutcome> {
        self.registry
            .for_trigger(trigger)
            .map(|descriptor| self.run(descriptor, entity))
            .collect()
    }

    fn run(&self, descriptor: &TrackDescriptor<E>, entity: &E) -> TrackOutcome {
        match build(entity, descriptor) {
            BuildOutcome::Built(built) => TrackOutcome::Dispatched(self.writer.dispatch(
                &built.activity,
                &built.followers,
                built.mention_source.as_deref(),
            )),
            BuildOutcome::Skipped => TrackOutcome::Skipped,
            BuildOutcome::Aborted => TrackOutcome::Aborted,
        }
    }
}
