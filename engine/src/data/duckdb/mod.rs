//! DuckDB event store
//!
//! Embedded default backend. All schema definitions and migrations are
//! managed here.

pub mod error;
mod migrations;
pub mod repositories;
mod repository_impl;
pub mod schema;
pub mod sql_types;

pub use error::DuckdbError;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use duckdb::Connection;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};

use crate::core::constants::DEFAULT_QUERY_TIMEOUT_SECS;

const SESSION_SETUP: &str = "SET autoinstall_known_extensions = false;
     SET autoload_known_extensions = false;
     LOAD json;";

/// DuckDB event store service
///
/// Uses a single shared connection protected by a mutex.
pub struct DuckdbService {
    conn: Mutex<Option<Connection>>,
    timeout_secs: u64,
}

impl Drop for DuckdbService {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.get_mut().take() {
            // Best-effort close - log but don't panic on error
            if let Err((_, e)) = conn.close() {
                tracing::warn!("DuckDB connection close failed during drop: {}", e);
            }
        }
    }
}

impl DuckdbService {
    /// Open (or create) the database file and apply migrations
    pub async fn init(path: &Path, timeout_secs: u64) -> Result<Self, DuckdbError> {
        let db_path: PathBuf = path.to_path_buf();
        let conn = tokio::task::spawn_blocking(move || {
            if let Some(parent) = db_path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)?;
            }
            let conn = Connection::open(&db_path)?;
            conn.execute_batch(SESSION_SETUP)?;
            migrations::run_migrations(&conn)?;
            Ok::<_, DuckdbError>(conn)
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))??;

        tracing::debug!(path = %path.display(), timeout_secs, "DuckdbService initialized");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            timeout_secs,
        })
    }

    /// Open a private in-memory database with the full schema
    pub async fn open_in_memory() -> Result<Self, DuckdbError> {
        let conn = tokio::task::spawn_blocking(|| {
            let conn = Connection::open_in_memory()?;
            conn.execute_batch(SESSION_SETUP)?;
            migrations::run_migrations(&conn)?;
            Ok::<_, DuckdbError>(conn)
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))??;

        tracing::debug!("DuckdbService initialized in memory");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
        })
    }

    /// Get exclusive access to the connection.
    ///
    /// Fails with [`DuckdbError::Closed`] after `close()`.
    pub fn conn(&self) -> Result<MappedMutexGuard<'_, Connection>, DuckdbError> {
        MutexGuard::try_map(self.conn.lock(), |opt| opt.as_mut()).map_err(|_| DuckdbError::Closed)
    }

    /// Check if the connection is still open
    pub fn is_open(&self) -> bool {
        self.conn.lock().is_some()
    }

    /// Run a blocking DuckDB closure with the configured timeout
    pub async fn run_query<T, F>(self: &Arc<Self>, f: F) -> Result<T, DuckdbError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, DuckdbError> + Send + 'static,
    {
        let db = Arc::clone(self);
        let timeout_secs = self.timeout_secs;
        let task = tokio::task::spawn_blocking(move || {
            let conn = db.conn()?;
            f(&conn)
        });

        tokio::time::timeout(Duration::from_secs(timeout_secs), task)
            .await
            .map_err(|_| {
                tracing::warn!("DuckDB query timed out after {}s", timeout_secs);
                DuckdbError::Timeout { timeout_secs }
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "DuckDB query task failed");
                DuckdbError::Io(std::io::Error::other(format!(
                    "Query execution failed: {}",
                    e
                )))
            })?
    }

    /// Close the DuckDB connection gracefully with explicit error handling
    pub async fn close(self: Arc<Self>) -> Result<(), DuckdbError> {
        tokio::task::spawn_blocking(move || {
            let mut conn_guard = self.conn.lock();
            if let Some(conn) = conn_guard.take() {
                // Best-effort checkpoint before close - log but don't fail on error
                if let Err(e) = conn.execute("CHECKPOINT", []) {
                    tracing::warn!("CHECKPOINT failed during close: {}", e);
                }
                conn.close().map_err(|(_, e)| DuckdbError::Database(e))?;
                tracing::debug!("DuckDB connection closed");
            }
            Ok(())
        })
        .await
        .map_err(|e| DuckdbError::Io(std::io::Error::other(e)))?
    }
}

/// Execute a function within a transaction, automatically rolling back on error.
pub(crate) fn in_transaction<F, T>(conn: &Connection, f: F) -> Result<T, DuckdbError>
where
    F: FnOnce(&Connection) -> Result<T, DuckdbError>,
{
    conn.execute_batch("BEGIN TRANSACTION")?;
    match f(conn) {
        Ok(val) => {
            conn.execute_batch("COMMIT")?;
            Ok(val)
        }
        Err(e) => {
            // Best-effort rollback - log but return original error
            if let Err(rollback_err) = conn.execute_batch("ROLLBACK") {
                tracing::warn!("ROLLBACK failed after transaction error: {}", rollback_err);
            }
            Err(e)
        }
    }
}
