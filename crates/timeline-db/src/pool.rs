//! Connection pool creation and configuration.

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use thiserror::Error;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,

    /// How long a caller waits to check out a connection, in milliseconds.
    pub connection_timeout_ms: u64,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 2_000,
            pool_max_size: 8,
            connection_timeout_ms: 1_000,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),

    /// A runtime setting is outside its accepted range.
    #[error("invalid pool settings: {0}")]
    InvalidSettings(&'static str),
}

/// Creates a new SQLite connection pool with WAL mode enabled.
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file. `:memory:` gives every
///   pooled connection its own private database, so in-memory pools are
///   only useful with `pool_max_size = 1`.
/// * `settings` - Busy timeout, pool size and checkout timeout.
///
/// # Errors
///
/// Returns `PoolError::InvalidSettings` if `pool_max_size` or
/// `connection_timeout_ms` is zero, and `PoolError::PoolInit` if the
/// connection pool cannot be created.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    if settings.pool_max_size == 0 {
        return Err(PoolError::InvalidSettings("pool_max_size must be positive"));
    }
    if settings.connection_timeout_ms == 0 {
        return Err(PoolError::InvalidSettings(
            "connection_timeout_ms must be positive",
        ));
    }

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| {
            // In-memory databases report "memory", which is acceptable.
            let journal_mode: String =
                conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
            if journal_mode != "wal" && journal_mode != "memory" {
                return Err(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!(
                        "failed to set WAL journal mode, got: {}",
                        journal_mode
                    )),
                ));
            }
            conn.busy_timeout(Duration::from_millis(settings.busy_timeout_ms))
        });

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .connection_timeout(Duration::from_millis(settings.connection_timeout_ms))
        .build(manager)?;

    tracing::debug!(
        path = db_path,
        pool_max_size = settings.pool_max_size,
        busy_timeout_ms = settings.busy_timeout_ms,
        "created feed store pool"
    );

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_in_memory_pool() {
        let settings = DbRuntimeSettings {
            busy_timeout_ms: 2_500,
            pool_max_size: 1,
            connection_timeout_ms: 500,
        };

        let pool = create_pool(":memory:", settings).expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert!(
            mode == "wal" || mode == "memory",
            "unexpected journal_mode: {mode}"
        );

        let busy_timeout: i32 = conn
            .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
            .expect("should query busy_timeout");
        assert_eq!(busy_timeout, 2_500, "busy timeout should match settings");

        assert_eq!(pool.max_size(), 1, "pool max size should match settings");
        assert_eq!(pool.connection_timeout(), Duration::from_millis(500));
    }

    #[test]
    fn file_pool_uses_wal() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("feeds.db");

        let pool = create_pool(
            path.to_str().expect("utf-8 path"),
            DbRuntimeSettings::default(),
        )
        .expect("pool creation should succeed");
        let conn = pool.get().expect("should get a connection");

        let mode: String = conn
            .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
            .expect("should query journal_mode");
        assert_eq!(mode, "wal");
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let settings = DbRuntimeSettings {
            pool_max_size: 0,
            ..DbRuntimeSettings::default()
        };

        let err = create_pool(":memory:", settings)
            .err()
            .expect("zero pool size should fail");
        assert!(
            matches!(err, PoolError::InvalidSettings(msg) if msg.contains("pool_max_size")),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn zero_connection_timeout_is_rejected() {
        let settings = DbRuntimeSettings {
            pool_max_size: 1,
            connection_timeout_ms: 0,
            ..DbRuntimeSettings::default()
        };

        let err = create_pool(":memory:", settings)
            .err()
            .expect("zero timeout should fail");
        assert!(
            matches!(err, PoolError::InvalidSettings(msg) if msg.contains("connection_timeout_ms")),
            "unexpected error: {err}"
        );
    }
}
