//! Event name to descriptor mapping.

use std::collections::BTreeMap;

use crate::descriptor::{TrackDescriptor, TrackOptions, TriggerPoint};
use crate::error::ConfigurationError;

/// All track descriptors for one entity type, keyed by event name.
///
/// Descriptors are added during startup and only read afterwards.
pub struct TrackRegistry<E> {
    descriptors: BTreeMap<String, TrackDescriptor<E>>,
}

impl<E> Default for TrackRegistry<E> {
    fn default() -> Self {
        Self {
            descriptors: BTreeMap::new(),
        }
    }
}

impl<E> TrackRegistry<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor for `event`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::EmptyVerb` if `verb` is blank,
    /// `ConfigurationError::EmptyEventName` if `event` is blank, or
    /// `ConfigurationError::DuplicateEvent` if `event` already has one.
    pub fn register(
        &mut self,
        event: impl Into<String>,
        verb: impl Into<String>,
        options: TrackOptions<E>,
    ) -> Result<&TrackDescriptor<E>, ConfigurationError> {
        let event = event.into();
        let verb = verb.into();

        if event.trim().is_empty() {
            return Err(ConfigurationError::EmptyEventName);
        }
        if verb.trim().is_empty() {
            return Err(ConfigurationError::EmptyVerb { event });
        }
        if self.descriptors.contains_key(&event) {
            return Err(ConfigurationError::DuplicateEvent(event));
        }

        let descriptor = TrackDescriptor::new(event.clone(), verb, options);
        tracing::debug!(?descriptor, "registered track");

        Ok(self.descriptors.entry(event).or_insert(descriptor))
    }

    /// Registers a descriptor whose verb equals its event name.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn track(
        &mut self,
        event: impl Into<String>,
        options: TrackOptions<E>,
    ) -> Result<&TrackDescriptor<E>, ConfigurationError> {
        let event = event.into();
        let verb = event.clone();
        self.register(event, verb, options)
    }

    /// Looks up the descriptor for `event`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::UnknownEvent` if nothing is registered
    /// under that name.
    pub fn get(&self, event: &str) -> Result<&TrackDescriptor<E>, ConfigurationError> {
        self.descriptors
            .get(event)
            .ok_or_else(|| ConfigurationError::UnknownEvent(event.to_string()))
    }

    /// Descriptors that run at `trigger`, ordered by event name.
    pub fn for_trigger(&self, trigger: TriggerPoint) -> impl Iterator<Item = &TrackDescriptor<E>> {
        self.descriptors
            .values()
            .filter(move |descriptor| descriptor.trigger() == trigger)
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether no descriptor is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
