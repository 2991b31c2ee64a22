//! Unified error type for data layer
//!
//! Wraps errors from both event store backends (DuckDB, ClickHouse) while
//! keeping track of which backend produced them.

use thiserror::Error;

use crate::data::clickhouse::ClickhouseError;
use crate::data::duckdb::DuckdbError;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// DuckDB database error (embedded backend)
    #[error("DuckDB error: {0}")]
    Duckdb(#[from] duckdb::Error),

    /// ClickHouse database error (distributed backend)
    #[error("ClickHouse error: {0}")]
    Clickhouse(#[from] clickhouse::error::Error),

    /// Migration failed
    #[error("Migration {version} ({name}) failed on {backend}: {error}")]
    MigrationFailed {
        backend: &'static str,
        version: i32,
        name: String,
        error: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Backend not available
    #[error("Backend {backend} is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },
}

impl DataError {
    /// Create a migration failed error
    pub fn migration_failed(backend: &'static str, version: i32, name: &str, error: &str) -> Self {
        Self::MigrationFailed {
            backend,
            version,
            name: name.to_string(),
            error: error.to_string(),
        }
    }

    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Create a backend unavailable error
    pub fn backend_unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Duckdb(_) => "duckdb",
            Self::Clickhouse(_) => "clickhouse",
            Self::MigrationFailed { backend, .. } => backend,
            Self::Timeout { backend, .. } => backend,
            Self::BackendUnavailable { backend, .. } => backend,
            Self::Config(_) | Self::Io(_) => "unknown",
        }
    }
}

impl From<DuckdbError> for DataError {
    fn from(e: DuckdbError) -> Self {
        match e {
            DuckdbError::Database(e) => Self::Duckdb(e),
            DuckdbError::MigrationFailed {
                version,
                name,
                error,
            } => Self::migration_failed("duckdb", version, &name, &error),
            DuckdbError::Io(e) => Self::Io(e),
            DuckdbError::Timeout { timeout_secs } => Self::timeout("duckdb", timeout_secs),
            DuckdbError::Closed => Self::backend_unavailable("duckdb", "connection closed"),
        }
    }
}

impl From<ClickhouseError> for DataError {
    fn from(e: ClickhouseError) -> Self {
        match e {
            ClickhouseError::Database(e) => Self::Clickhouse(e),
            ClickhouseError::MigrationFailed {
                version,
                name,
                error,
            } => Self::migration_failed("clickhouse", version, &name, &error),
            ClickhouseError::Connection(msg) => Self::backend_unavailable("clickhouse", msg),
            ClickhouseError::Io(e) => Self::Io(e),
            ClickhouseError::Timeout { timeout_secs } => Self::timeout("clickhouse", timeout_secs),
        }
    }
}
