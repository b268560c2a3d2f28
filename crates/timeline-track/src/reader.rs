//! Feed reads.

use std::sync::Arc;

use timeline_types::{decode_activity, Activity, FeedKey};

use crate::error::StoreError;
use crate::store::ListStore;

/// Reads decoded activities back out of feeds.
#[derive(Clone)]
pub struct FeedReader {
    list: Arc<dyn ListStore>,
}

impl FeedReader {
    /// Creates a reader over `list`.
    pub fn new(list: Arc<dyn ListStore>) -> Self {
        Self { list }
    }

    /// Returns up to `limit` activities of `feed`, newest first, skipping
    /// the first `offset` entries.
    ///
    /// Entries that fail to decode are skipped with a warning, so a page can
    /// hold fewer than `limit` activities.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    pub fn read(
        &self,
        feed: &FeedKey,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Activity>, StoreError> {
        let key = feed.as_key();
        let payloads = self.list.range(&key, offset, limit)?;

        let mut activities = Vec::with_capacity(payloads.len());
        for (index, payload) in payloads.iter().enumerate() {
            match decode_activity(payload) {
                Ok(activity) => activities.push(activity),
                Err(err) => {
                    tracing::warn!(
                        feed = %key,
                        position = offset + index,
                        error = %err,
                        "skipping undecodable feed entry"
                    );
                }
            }
        }

        Ok(activities)
    }

    /// Number of entries in `feed`, decodable or not.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be read.
    pub fn len(&self, feed: &FeedKey) -> Result<usize, StoreError> {
        self.list.len(&feed.as_key())
    }
}
