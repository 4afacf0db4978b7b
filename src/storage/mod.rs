//!
//! shopfront storage module
//! ------------------------
//! This module owns the persistent SQLite store for shopfront. The store is a
//! single database file whose location is decided by `paths::resolve` (mounted
//! persistent volume when available, working directory otherwise) and whose
//! first-run initialization is handled by `provision`.
//!
//! Key responsibilities:
//! - Opening the store with the configured busy timeout and shared cache.
//! - Dispatching connection work onto the blocking thread pool so async
//!   handlers never hold the connection lock across an await point.
//! - Idempotent provisioning: file creation, schema application and reference
//!   data seeding each happen at most once per store lifetime.
//!
//! The public API centers around the `Store` type, a cloneable handle over an
//! `Arc<Mutex<Connection>>` that is constructed once at startup and injected
//! into every component that needs it.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;
use tracing::info;

mod paths;
pub mod provision;

pub use paths::{StorePath, resolve};

/// Alias for `Result<T, StoreError>`.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task was cancelled or panicked.
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoin(err.to_string())
    }
}

/// Thread-safe handle to the shopfront SQLite store.
///
/// All reads and writes go through [`Store::call`], which runs the closure on
/// the blocking thread pool while holding the connection lock.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or lazily create) the store at the resolved location.
    ///
    /// The underlying engine creates the file if it is missing, so opening
    /// succeeds whether or not `provision::ensure_store_file` ran first.
    /// Failure here is fatal to the caller: the service cannot function
    /// without storage.
    pub fn open(target: &StorePath) -> StoreResult<Self> {
        info!(path = %target.path.display(), "opening store");

        let mut flags = OpenFlags::default();
        if target.shared_cache {
            flags |= OpenFlags::SQLITE_OPEN_SHARED_CACHE;
        }
        let conn = Connection::open_with_flags(&target.path, flags)?;
        conn.busy_timeout(Duration::from_millis(target.busy_timeout_ms))?;

        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Create an in-memory store, used by tests.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    /// Execute a closure against the connection on the blocking pool.
    ///
    /// This is the only way components interact with the store from async
    /// code. The closure receives a `&Connection` and must return a
    /// `StoreResult<T>`.
    pub async fn call<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            f(&conn)
        })
        .await?
    }
}
