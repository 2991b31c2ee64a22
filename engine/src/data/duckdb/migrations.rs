//! Database schema initialization and migrations
//!
//! Handles schema version tracking and incremental migrations.

use duckdb::Connection;

use super::error::DuckdbError;
use super::in_transaction;
use super::schema::{SCHEMA, SCHEMA_VERSION};

/// Initialize database schema or run pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DuckdbError> {
    let table_exists: bool = conn
        .query_row(
            "SELECT COUNT(*) > 0 FROM information_schema.tables WHERE table_name = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .unwrap_or(false);

    if !table_exists {
        tracing::debug!(
            "Initializing database with schema version {}",
            SCHEMA_VERSION
        );
        apply_initial_schema(conn)?;
        return Ok(());
    }

    let current_version: i32 = conn
        .query_row(
            "SELECT version FROM schema_version WHERE id = 1",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    if current_version > SCHEMA_VERSION {
        return Err(DuckdbError::MigrationFailed {
            version: current_version,
            name: "version_check".to_string(),
            error: format!(
                "Database schema version {} is newer than application version {}. Upgrade the application.",
                current_version, SCHEMA_VERSION
            ),
        });
    }

    if current_version == SCHEMA_VERSION {
        tracing::debug!(
            "Database schema is up to date (version {})",
            current_version
        );
        return Ok(());
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        tracing::debug!("Applying migration to version {}", version);
        apply_migration(conn, version)?;
    }

    Ok(())
}

fn apply_initial_schema(conn: &Connection) -> Result<(), DuckdbError> {
    let start = std::time::Instant::now();

    in_transaction(conn, |conn| {
        conn.execute_batch(SCHEMA)?;

        let now = chrono::Utc::now().timestamp_micros();
        conn.execute(
            "INSERT INTO schema_version (id, version, applied_at, description) VALUES (1, ?, ?, 'Initial schema')",
            duckdb::params![SCHEMA_VERSION, now],
        )?;

        tracing::debug!(
            "Applied initial schema in {}ms",
            start.elapsed().as_millis()
        );
        Ok(())
    })
}

fn apply_migration(_conn: &Connection, version: i32) -> Result<(), DuckdbError> {
    match version {
        1 => Ok(()), // Handled by apply_initial_schema
        _ => Err(DuckdbError::MigrationFailed {
            version,
            name: "unknown".to_string(),
            error: format!("Unknown migration version: {}", version),
        }),
    }
}
