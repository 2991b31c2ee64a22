//! Data storage layer
//!
//! Provides the event store for the query engine:
//! - `duckdb` - Embedded event store (default)
//! - `clickhouse` - Columnar event store for large deployments
//! - `types` - Shared records and query parameters across both backends
//! - `filters` - Event-name and property predicates
//! - `queries` - Backend-neutral SQL shapes of every read
//! - `traits` - Repository trait for multi-database support
//! - `sql` - SQL dialect abstraction
//! - `error` - Unified error type for all backends
//!
//! ## Backend Support
//!
//! `BehaviorRepository` is implemented by DuckDB and ClickHouse. Callers
//! obtain it from [`AnalyticsService::repository`] and never see the backend.

pub mod clickhouse;
pub mod duckdb;
pub mod error;
pub mod filters;
pub mod queries;
pub mod sql;
pub mod traits;
pub mod types;

// Re-export backend-specific services
pub use clickhouse::ClickhouseService;
pub use duckdb::DuckdbService;

// Re-export unified error type
pub use error::DataError;

// Re-export repository trait
pub use traits::BehaviorRepository;

use std::sync::Arc;

use crate::core::config::{AnalyticsBackend, AppConfig};
use crate::core::storage::AppStorage;

/// Analytics database service enum
///
/// Wraps the underlying backend-specific service (DuckDB or ClickHouse).
/// Services are stored as Arc so repositories can be handed out freely.
pub enum AnalyticsService {
    /// DuckDB backend (default, embedded)
    Duckdb(Arc<DuckdbService>),
    /// ClickHouse backend (for larger deployments)
    Clickhouse(Arc<ClickhouseService>),
}

impl AnalyticsService {
    /// Initialize the analytics service based on configuration
    ///
    /// For DuckDB backend, uses the configured path or the storage default.
    /// For ClickHouse backend, requires a ClickhouseConfig.
    pub async fn init(config: &AppConfig, storage: &AppStorage) -> Result<Self, DataError> {
        match config.database.analytics {
            AnalyticsBackend::Duckdb => {
                let path = config
                    .database
                    .duckdb_path
                    .clone()
                    .unwrap_or_else(|| storage.duckdb_file());
                let service = DuckdbService::init(&path, config.query.timeout_secs).await?;
                Ok(Self::Duckdb(Arc::new(service)))
            }
            AnalyticsBackend::Clickhouse => {
                let ch = config.database.clickhouse.as_ref().ok_or_else(|| {
                    DataError::Config("ClickHouse configuration required".to_string())
                })?;
                let service = ClickhouseService::init(ch).await?;
                Ok(Self::Clickhouse(Arc::new(service)))
            }
        }
    }

    /// In-memory DuckDB service, for tests and demos
    pub async fn in_memory() -> Result<Self, DataError> {
        let service = DuckdbService::open_in_memory().await?;
        Ok(Self::Duckdb(Arc::new(service)))
    }

    /// Close the database connection gracefully
    pub async fn close(&self) -> Result<(), DataError> {
        match self {
            Self::Duckdb(d) => Arc::clone(d).close().await.map_err(Into::into),
            Self::Clickhouse(c) => {
                c.close().await;
                Ok(())
            }
        }
    }

    /// Get the backend type
    pub fn backend(&self) -> AnalyticsBackend {
        match self {
            Self::Duckdb(_) => AnalyticsBackend::Duckdb,
            Self::Clickhouse(_) => AnalyticsBackend::Clickhouse,
        }
    }

    /// Get the repository trait object for data operations
    pub fn repository(&self) -> Box<dyn BehaviorRepository + Send + Sync> {
        match self {
            Self::Duckdb(d) => Box::new(Arc::clone(d)),
            Self::Clickhouse(c) => Box::new(Arc::clone(c)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{DatabaseConfig, QueryConfig};

    fn duckdb_config(path: std::path::PathBuf) -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                analytics: AnalyticsBackend::Duckdb,
                duckdb_path: Some(path),
                clickhouse: None,
            },
            query: QueryConfig { timeout_secs: 5 },
        }
    }

    #[tokio::test]
    async fn test_init_duckdb_at_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.duckdb");
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());

        let service = AnalyticsService::init(&duckdb_config(path.clone()), &storage)
            .await
            .unwrap();
        assert_eq!(service.backend(), AnalyticsBackend::Duckdb);
        assert!(path.exists());

        let repo = service.repository();
        assert_eq!(repo.earliest_event_timestamp(1).await.unwrap(), None);
        service.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_clickhouse_requires_config() {
        let dir = tempfile::tempdir().unwrap();
        let storage = AppStorage::init_for_test(dir.path().to_path_buf());
        let mut config = duckdb_config(dir.path().join("unused.duckdb"));
        config.database.analytics = AnalyticsBackend::Clickhouse;

        let result = AnalyticsService::init(&config, &storage).await;
        assert!(matches!(result, Err(DataError::Config(_))));
    }
}
