//! Error types and the error-handling policy of the tracking pipeline.
//!
//! Tracking distinguishes two classes of failure:
//!
//! - **Configuration errors** are programming mistakes (an empty verb, an
//!   unknown event name). They are returned to the registering code.
//! - **Runtime failures** (an actor that resolves to nothing, a store that
//!   cannot be reached) are logged and swallowed so the domain operation
//!   that triggered tracking is never affected.
//!
//! [`ErrorPolicy`] spells out which [`FailureKind`] gets which
//! [`Disposition`].

use thiserror::Error;

/// Errors raised while registering or looking up track descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A descriptor was registered with an empty verb.
    #[error("track '{event}' has an empty verb")]
    EmptyVerb {
        /// The event the descriptor was registered for.
        event: String,
    },

    /// A descriptor was registered with an empty event name.
    #[error("track event name is empty")]
    EmptyEventName,

    /// The event name already has a descriptor.
    #[error("track '{0}' is already registered")]
    DuplicateEvent(String),

    /// No descriptor is registered for the event name.
    #[error("no track registered for '{0}'")]
    UnknownEvent(String),
}

/// Errors reported by a list store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection to the store could be obtained.
    #[error("feed store unavailable: {0}")]
    Unavailable(String),

    /// The store accepted the connection but the operation failed.
    #[error("feed store database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

impl StoreError {
    /// Classifies the error for the [`ErrorPolicy`].
    ///
    /// Busy, locked, and unopenable databases count as connectivity
    /// failures; everything else is a rejected write.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Unavailable(_) => FailureKind::StoreUnavailable,
            Self::Database(rusqlite::Error::SqliteFailure(err, _))
                if matches!(
                    err.code,
                    rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                        | rusqlite::ErrorCode::CannotOpen
                ) =>
            {
                FailureKind::StoreUnavailable
            }
            Self::Database(_) => FailureKind::StoreRejected,
        }
    }
}

/// Errors raised while opening a SQLite-backed list store.
#[derive(Debug, Error)]
pub enum StoreSetupError {
    /// The connection pool could not be built.
    #[error(transparent)]
    Pool(#[from] timeline_db::PoolError),

    /// No connection could be checked out to run migrations.
    #[error("failed to get connection for migrations: {0}")]
    Checkout(#[from] r2d2::Error),

    /// The schema could not be migrated.
    #[error(transparent)]
    Migration(#[from] timeline_db::MigrationError),
}

/// Every failure the tracking pipeline can run into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The configured actor accessor produced nothing.
    ActorResolution,
    /// The store could not be reached for an append.
    StoreUnavailable,
    /// The store was reached but refused the append.
    StoreRejected,
    /// The activity could not be encoded.
    Encoding,
    /// A mention handle matched no user.
    UnresolvedMention,
    /// A descriptor was misconfigured or missing.
    Configuration,
}

impl FailureKind {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(self) -> &'static str {
        match self {
            Self::ActorResolution => "actor_resolution",
            Self::StoreUnavailable => "store_unavailable",
            Self::StoreRejected => "store_rejected",
            Self::Encoding => "encoding",
            Self::UnresolvedMention => "unresolved_mention",
            Self::Configuration => "configuration",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}

/// What happens to a failure of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Returned to the caller.
    Surface,
    /// Logged at error level, then swallowed.
    LogError,
    /// Dropped without a log line.
    Ignore,
}

/// The fixed error-handling contract of the tracker.
///
/// | Kind | Disposition |
/// |------|-------------|
/// | `Configuration` | `Surface` |
/// | `ActorResolution` | `LogError` |
/// | `StoreUnavailable` | `LogError` |
/// | `StoreRejected` | `LogError` |
/// | `Encoding` | `LogError` |
/// | `UnresolvedMention` | `Ignore` |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorPolicy;

impl ErrorPolicy {
    /// Returns the disposition for a failure kind.
    pub const fn disposition(&self, kind: FailureKind) -> Disposition {
        match kind {
            FailureKind::Configuration => Disposition::Surface,
            FailureKind::ActorResolution
            | FailureKind::StoreUnavailable
            | FailureKind::StoreRejected
            | FailureKind::Encoding => Disposition::LogError,
            FailureKind::UnresolvedMention => Disposition::Ignore,
        }
    }
}
