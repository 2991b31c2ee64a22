use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CLICKHOUSE_DEFAULT_DATABASE, CONFIG_FILE_NAME, DEFAULT_QUERY_TIMEOUT_SECS,
};

// =============================================================================
// Analytics Backend Enum (DuckDB or ClickHouse)
// =============================================================================

/// Analytics database backend holding events, elements and identity links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsBackend {
    #[default]
    Duckdb,
    Clickhouse,
}

impl fmt::Display for AnalyticsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyticsBackend::Duckdb => write!(f, "duckdb"),
            AnalyticsBackend::Clickhouse => write!(f, "clickhouse"),
        }
    }
}

// =============================================================================
// File Config (as read from clickpath.json)
// =============================================================================

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DuckdbFileConfig {
    pub path: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ClickhouseFileConfig {
    pub url: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub compression: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    pub analytics: Option<AnalyticsBackend>,
    pub duckdb: Option<DuckdbFileConfig>,
    pub clickhouse: Option<ClickhouseFileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct QueryFileConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub database: Option<DatabaseFileConfig>,
    pub query: Option<QueryFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(database) = other.database {
            let current = self
                .database
                .get_or_insert_with(DatabaseFileConfig::default);
            if database.analytics.is_some() {
                tracing::trace!(analytics = ?database.analytics, "Merging database.analytics");
                current.analytics = database.analytics;
            }
            if let Some(duckdb) = database.duckdb {
                let current_duckdb = current.duckdb.get_or_insert_with(DuckdbFileConfig::default);
                if duckdb.path.is_some() {
                    tracing::trace!(path = ?duckdb.path, "Merging database.duckdb.path");
                    current_duckdb.path = duckdb.path;
                }
            }
            if let Some(ch) = database.clickhouse {
                let current_ch = current
                    .clickhouse
                    .get_or_insert_with(ClickhouseFileConfig::default);
                if ch.url.is_some() {
                    current_ch.url = ch.url;
                }
                if ch.database.is_some() {
                    current_ch.database = ch.database;
                }
                if ch.user.is_some() {
                    current_ch.user = ch.user;
                }
                if ch.password.is_some() {
                    current_ch.password = ch.password;
                }
                if ch.timeout_secs.is_some() {
                    current_ch.timeout_secs = ch.timeout_secs;
                }
                if ch.compression.is_some() {
                    current_ch.compression = ch.compression;
                }
            }
        }

        if let Some(query) = other.query {
            let current = self.query.get_or_insert_with(QueryFileConfig::default);
            if query.timeout_secs.is_some() {
                tracing::trace!(timeout_secs = ?query.timeout_secs, "Merging query.timeout_secs");
                current.timeout_secs = query.timeout_secs;
            }
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

#[derive(Debug, Clone)]
pub struct ClickhouseConfig {
    /// ClickHouse connection URL
    pub url: String,
    /// Database name
    pub database: String,
    /// Username for authentication
    pub user: Option<String>,
    /// Password for authentication
    pub password: Option<String>,
    /// Query timeout in seconds
    pub timeout_secs: u64,
    /// Enable LZ4 compression for requests/responses
    pub compression: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub analytics: AnalyticsBackend,
    /// Explicit DuckDB file; `None` uses the platform data directory
    pub duckdb_path: Option<PathBuf>,
    pub clickhouse: Option<ClickhouseConfig>,
}

#[derive(Debug, Clone)]
pub struct QueryConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub query: QueryConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.clickpath/clickpath.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_layers(cli, file_config);
        config.validate()?;
        Ok(config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_database = file_config.database.unwrap_or_default();
        let file_query = file_config.query.unwrap_or_default();
        let file_duckdb = file_database.duckdb.unwrap_or_default();

        let analytics = cli
            .analytics_backend
            .or(file_database.analytics)
            .unwrap_or_default();

        let duckdb_path = cli
            .duckdb_path
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_duckdb.path.as_deref().map(expand_path));

        let timeout_secs = cli
            .query_timeout_secs
            .or(file_query.timeout_secs)
            .unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);

        let clickhouse_url = cli
            .clickhouse_url
            .clone()
            .or_else(|| file_database.clickhouse.as_ref().and_then(|c| c.url.clone()));

        let clickhouse = if analytics == AnalyticsBackend::Clickhouse || clickhouse_url.is_some() {
            let file_ch = file_database.clickhouse.unwrap_or_default();
            Some(ClickhouseConfig {
                url: clickhouse_url.unwrap_or_default(),
                database: file_ch
                    .database
                    .unwrap_or_else(|| CLICKHOUSE_DEFAULT_DATABASE.to_string()),
                user: file_ch.user,
                password: file_ch.password,
                timeout_secs: file_ch.timeout_secs.unwrap_or(timeout_secs),
                compression: file_ch.compression.unwrap_or(true),
            })
        } else {
            None
        };

        Self {
            database: DatabaseConfig {
                analytics,
                duckdb_path,
                clickhouse,
            },
            query: QueryConfig { timeout_secs },
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.query.timeout_secs == 0 {
            anyhow::bail!("Configuration error: query.timeout_secs must be greater than 0");
        }

        if self.database.analytics == AnalyticsBackend::Clickhouse
            && self
                .database
                .clickhouse
                .as_ref()
                .is_none_or(|c| c.url.is_empty())
        {
            anyhow::bail!(
                "Configuration error: database.clickhouse.url is required when database.analytics is 'clickhouse'"
            );
        }

        Ok(())
    }
}

/// Get the profile config path (~/.clickpath/clickpath.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analytics_backend_serde() {
        let backend: AnalyticsBackend = serde_json::from_str(r#""clickhouse""#).unwrap();
        assert_eq!(backend, AnalyticsBackend::Clickhouse);
        assert_eq!(AnalyticsBackend::Duckdb.to_string(), "duckdb");
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "database": {
                "analytics": "clickhouse",
                "clickhouse": { "url": "http://localhost:8123", "database": "events" }
            },
            "query": { "timeout_secs": 12 }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let db = config.database.as_ref().unwrap();
        assert_eq!(db.analytics, Some(AnalyticsBackend::Clickhouse));
        assert_eq!(
            db.clickhouse.as_ref().unwrap().database.as_deref(),
            Some("events")
        );
        assert_eq!(config.query.unwrap().timeout_secs, Some(12));
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "databse": {} }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        assert!(config.database.is_none());
        assert!(config.extra.get("databse").is_some());
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{ "database": { "duckdb": { "path": "/tmp/a.duckdb" } }, "query": { "timeout_secs": 5 } }"#,
        )
        .unwrap();
        let overlay: FileConfig =
            serde_json::from_str(r#"{ "query": { "timeout_secs": 9 } }"#).unwrap();
        base.merge(overlay);

        assert_eq!(base.query.unwrap().timeout_secs, Some(9));
        assert_eq!(
            base.database.unwrap().duckdb.unwrap().path.as_deref(),
            Some("/tmp/a.duckdb")
        );
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_layers(&CliConfig::default(), FileConfig::default());
        assert_eq!(config.database.analytics, AnalyticsBackend::Duckdb);
        assert!(config.database.duckdb_path.is_none());
        assert!(config.database.clickhouse.is_none());
        assert_eq!(config.query.timeout_secs, DEFAULT_QUERY_TIMEOUT_SECS);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_app_config_cli_override() {
        let file: FileConfig =
            serde_json::from_str(r#"{ "query": { "timeout_secs": 5 } }"#).unwrap();
        let cli = CliConfig {
            query_timeout_secs: Some(60),
            duckdb_path: Some(PathBuf::from("/data/events.duckdb")),
            ..Default::default()
        };
        let config = AppConfig::from_layers(&cli, file);
        assert_eq!(config.query.timeout_secs, 60);
        assert_eq!(
            config.database.duckdb_path,
            Some(PathBuf::from("/data/events.duckdb"))
        );
    }

    #[test]
    fn test_app_config_clickhouse_requires_url() {
        let cli = CliConfig {
            analytics_backend: Some(AnalyticsBackend::Clickhouse),
            ..Default::default()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default());
        assert!(config.validate().is_err());

        let cli = CliConfig {
            analytics_backend: Some(AnalyticsBackend::Clickhouse),
            clickhouse_url: Some("http://localhost:8123".to_string()),
            ..Default::default()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default());
        assert!(config.validate().is_ok());
        let ch = config.database.clickhouse.unwrap();
        assert_eq!(ch.database, CLICKHOUSE_DEFAULT_DATABASE);
        assert!(ch.compression);
    }

    #[test]
    fn test_app_config_zero_timeout_rejected() {
        let cli = CliConfig {
            query_timeout_secs: Some(0),
            ..Default::default()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default());
        assert!(config.validate().is_err());
    }
}
