//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\Clickpath\` | `~/Library/Application Support/Clickpath/` | `$XDG_DATA_HOME/clickpath/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::constants::{APP_DOT_FOLDER, APP_NAME, DUCKDB_DB_FILENAME, ENV_DATA_DIR};
use crate::utils::file::expand_path;

/// Subdirectory holding the embedded DuckDB database
const DUCKDB_SUBDIR: &str = "duckdb";

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init() -> Result<Self> {
        let data_dir = Self::resolve_data_dir();

        let duckdb_dir = data_dir.join(DUCKDB_SUBDIR);
        tokio::fs::create_dir_all(&duckdb_dir).await.with_context(|| {
            format!(
                "Failed to create duckdb directory: {}",
                duckdb_dir.display()
            )
        })?;

        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);
        tracing::debug!(data_dir = %data_dir.display(), "Storage initialized");

        Ok(Self { data_dir })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Default DuckDB database file
    pub fn duckdb_file(&self) -> PathBuf {
        self.data_dir.join(DUCKDB_SUBDIR).join(DUCKDB_DB_FILENAME)
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duckdb_file_location() {
        let storage = AppStorage::init_for_test(PathBuf::from("/var/lib/clickpath"));
        assert_eq!(
            storage.duckdb_file(),
            PathBuf::from("/var/lib/clickpath/duckdb/clickpath.duckdb")
        );
        assert_eq!(storage.data_dir(), Path::new("/var/lib/clickpath"));
    }

    #[test]
    fn test_resolve_data_dir_fallback() {
        // SAFETY: Test runs single-threaded, no concurrent access to env var
        unsafe { std::env::remove_var(ENV_DATA_DIR) };
        let path = AppStorage::resolve_data_dir();
        assert!(!path.as_os_str().is_empty());
    }
}
