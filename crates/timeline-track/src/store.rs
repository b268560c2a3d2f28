//! List store access.
//!
//! [`ListStore`] is the seam to the external append-only list store:
//! push-to-head plus range reads. [`SqliteListStore`] implements it on the
//! `feed_items` table. [`FeedStore`] is the adapter the fan-out writer uses;
//! its [`append`](FeedStore::append) never returns an error.

use std::sync::Arc;

use rusqlite::params;
use timeline_db::{create_pool, run_migrations, DbPool, DbRuntimeSettings};
use timeline_types::FeedKey;

use crate::error::{Disposition, ErrorPolicy, FailureKind, StoreError, StoreSetupError};

/// A key-addressed store of append-only lists.
pub trait ListStore: Send + Sync {
    /// Prepends `payload` to the list at `key`.
    fn push(&self, key: &str, payload: &str) -> Result<(), StoreError>;

    /// Returns up to `limit` items of the list at `key`, newest first,
    /// skipping the first `offset`.
    fn range(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>, StoreError>;

    /// Number of items in the list at `key`.
    fn len(&self, key: &str) -> Result<usize, StoreError>;
}

/// SQLite-backed [`ListStore`].
///
/// Each call checks out one pooled connection and runs one statement; no
/// lock is held between calls.
#[derive(Clone)]
pub struct SqliteListStore {
    pool: DbPool,
}

impl SqliteListStore {
    /// Wraps a pool whose database has already been migrated.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Opens (or creates) the database at `path` and applies pending
    /// migrations.
    ///
    /// # Errors
    ///
    /// Returns `StoreSetupError` if the pool cannot be built or the schema
    /// cannot be migrated.
    pub fn open(path: &str, settings: DbRuntimeSettings) -> Result<Self, StoreSetupError> {
        let pool = create_pool(path, settings)?;
        {
            let conn = pool.get()?;
            let applied = run_migrations(&conn)?;
            if applied > 0 {
                tracing::info!(count = applied, path, "applied feed store migrations");
            }
        }
        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

impl ListStore for SqliteListStore {
    fn push(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO feed_items (feed_key, payload) VALUES (?1, ?2)",
            params![key, payload],
        )?;
        Ok(())
    }

    fn range(&self, key: &str, offset: usize, limit: usize) -> Result<Vec<String>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT payload FROM feed_items
             WHERE feed_key = ?1
             ORDER BY id DESC
             LIMIT ?2 OFFSET ?3",
        )?;
        // SQLite reads a negative OFFSET as zero; clamp instead of wrapping.
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let offset = i64::try_from(offset).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![key, limit, offset], |row| row.get(0))?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row?);
        }
        Ok(items)
    }

    fn len(&self, key: &str) -> Result<usize, StoreError> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM feed_items WHERE feed_key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

/// Result of a single [`FeedStore::append`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// The payload was pushed.
    Written,
    /// The push failed and was swallowed.
    Failed(FailureKind),
}

/// Store adapter used by the fan-out writer.
///
/// Explicitly constructed around an injected [`ListStore`]; cloning shares
/// the same store.
#[derive(Clone)]
pub struct FeedStore {
    list: Arc<dyn ListStore>,
    policy: ErrorPolicy,
}

impl FeedStore {
    /// Creates an adapter over `list`.
    pub fn new(list: Arc<dyn ListStore>) -> Self {
        Self {
            list,
            policy: ErrorPolicy,
        }
    }

    /// The wrapped list store.
    pub fn list(&self) -> &Arc<dyn ListStore> {
        &self.list
    }

    /// Pushes `payload` onto the head of the feed at `key`.
    ///
    /// Store failures are logged and reported in the returned outcome; they
    /// never propagate.
    pub fn append(&self, key: &FeedKey, payload: &str) -> AppendOutcome {
        let store_key = key.as_key();
        match self.list.push(&store_key, payload) {
            Ok(()) => {
                tracing::debug!(feed = %store_key, "appended activity");
                AppendOutcome::Written
            }
            Err(err) => {
                let kind = err.kind();
                if self.policy.disposition(kind) == Disposition::LogError {
                    tracing::error!(
                        feed = %store_key,
                        kind = kind.as_label(),
                        error = %err,
                        "timeline append failed"
                    );
                }
                AppendOutcome::Failed(kind)
            }
        }
    }
}
