//! SQLite backing for the timeline list store.
//!
//! Provides connection pooling (via `r2d2`), WAL-mode initialization and
//! embedded SQL migrations for the `feed_items` table that holds every
//! feed. Feed semantics (push to head, range reads) live in
//! `timeline-track`; this crate only owns connections and schema.
//!
//! Every pooled connection is opened with a busy timeout and the pool
//! itself has a checkout timeout, so a slow or locked store bounds how long
//! a single append can hold up the caller.

mod migrations;
mod pool;

pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool, DbPool, DbRuntimeSettings, PoolError};
