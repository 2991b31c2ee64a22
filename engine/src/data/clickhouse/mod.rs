//! ClickHouse event store
//!
//! Backend for deployments whose event volume outgrows an embedded database.
//! Uses the async HTTP client; every query runs under the configured timeout.

pub mod error;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::ClickhouseError;

use std::future::Future;
use std::time::Duration;

use clickhouse::Client;

use crate::core::config::ClickhouseConfig;

/// ClickHouse event store service
///
/// The client keeps HTTP connections alive between queries, so one service
/// is shared by all callers.
pub struct ClickhouseService {
    client: Client,
    timeout_secs: u64,
}

impl ClickhouseService {
    /// Connect, then create or migrate the schema
    pub async fn init(config: &ClickhouseConfig) -> Result<Self, ClickhouseError> {
        let service = Self {
            client: build_client(config),
            timeout_secs: config.timeout_secs,
        };

        service.run_migrations().await?;

        tracing::debug!(
            url = %config.url,
            database = %config.database,
            compression = %config.compression,
            timeout_secs = config.timeout_secs,
            "ClickhouseService initialized"
        );

        Ok(service)
    }

    /// Get the ClickHouse client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Await a client future under the configured timeout
    pub async fn with_timeout<T, E, F>(&self, fut: F) -> Result<T, ClickhouseError>
    where
        F: Future<Output = Result<T, E>>,
        ClickhouseError: From<E>,
    {
        let timeout_secs = self.timeout_secs;
        tokio::time::timeout(Duration::from_secs(timeout_secs), fut)
            .await
            .map_err(|_| {
                tracing::warn!("ClickHouse query timed out after {}s", timeout_secs);
                ClickhouseError::Timeout { timeout_secs }
            })?
            .map_err(ClickhouseError::from)
    }

    /// Health check - verify connection to ClickHouse
    pub async fn health_check(&self) -> Result<(), ClickhouseError> {
        self.with_timeout(self.client.query("SELECT 1").execute())
            .await
    }

    /// Run schema migrations
    async fn run_migrations(&self) -> Result<(), ClickhouseError> {
        let table_exists: bool = self
            .client
            .query(
                "SELECT count() > 0 FROM system.tables WHERE database = currentDatabase() AND name = 'schema_version'",
            )
            .fetch_one()
            .await
            .map_err(|e| ClickhouseError::Connection(format!(
                "Failed to check schema_version table: {}. Verify ClickHouse is running and accessible.",
                e
            )))?;

        let current_version: Option<i32> = if table_exists {
            self.client
                .query("SELECT version FROM schema_version FINAL WHERE id = 1")
                .fetch_optional()
                .await?
        } else {
            None
        };

        match current_version {
            None => {
                tracing::debug!(
                    "Applying initial ClickHouse schema v{}",
                    schema::SCHEMA_VERSION
                );
                self.apply_initial_schema().await
            }
            Some(v) if v > schema::SCHEMA_VERSION => Err(ClickhouseError::MigrationFailed {
                version: v,
                name: "version_check".to_string(),
                error: format!(
                    "Database schema version {} is newer than application version {}. Upgrade the application.",
                    v,
                    schema::SCHEMA_VERSION
                ),
            }),
            Some(v) if v < schema::SCHEMA_VERSION => Err(ClickhouseError::MigrationFailed {
                version: v + 1,
                name: "unknown".to_string(),
                error: format!("No migration defined for version {}", v + 1),
            }),
            Some(_) => {
                tracing::debug!(
                    "ClickHouse schema is up to date (v{})",
                    schema::SCHEMA_VERSION
                );
                Ok(())
            }
        }
    }

    /// Apply initial schema
    async fn apply_initial_schema(&self) -> Result<(), ClickhouseError> {
        let statements = schema::generate_schema();

        for table_sql in &statements {
            self.client
                .query(table_sql)
                .execute()
                .await
                .map_err(|e| ClickhouseError::MigrationFailed {
                    version: schema::SCHEMA_VERSION,
                    name: "initial_schema".to_string(),
                    error: e.to_string(),
                })?;
        }

        let now = chrono::Utc::now().timestamp();
        self.client
            .query(
                "INSERT INTO schema_version (id, version, applied_at, description) VALUES (?, ?, ?, ?)",
            )
            .bind(1u8)
            .bind(schema::SCHEMA_VERSION)
            .bind(now)
            .bind("Initial schema")
            .execute()
            .await?;

        tracing::debug!(
            version = schema::SCHEMA_VERSION,
            statements = statements.len(),
            "ClickHouse schema applied successfully"
        );
        Ok(())
    }

    /// Close the connection gracefully (no-op for ClickHouse HTTP client)
    pub async fn close(&self) {
        tracing::debug!("ClickHouse connection closed");
    }
}

/// Build a client from configuration without connecting
fn build_client(config: &ClickhouseConfig) -> Client {
    let mut client = Client::default()
        .with_url(&config.url)
        .with_database(&config.database);

    if let Some(ref user) = config.user {
        client = client.with_user(user);
    }
    if let Some(ref password) = config.password {
        client = client.with_password(password);
    }
    if config.compression {
        client = client.with_compression(clickhouse::Compression::Lz4);
    }

    client
}
