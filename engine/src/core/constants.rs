// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Clickpath";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "clickpath";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".clickpath";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "clickpath.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CLICKPATH_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CLICKPATH_LOG";

// =============================================================================
// Environment Variables - Storage & Database
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "CLICKPATH_DATA_DIR";

/// Environment variable for analytics backend (duckdb or clickhouse)
pub const ENV_ANALYTICS_BACKEND: &str = "CLICKPATH_ANALYTICS_BACKEND";

/// Environment variable for an explicit DuckDB database file
pub const ENV_DUCKDB_PATH: &str = "CLICKPATH_DUCKDB_PATH";

/// Environment variable for ClickHouse connection URL
pub const ENV_CLICKHOUSE_URL: &str = "CLICKPATH_CLICKHOUSE_URL";

/// Environment variable for the query timeout in seconds
pub const ENV_QUERY_TIMEOUT_SECS: &str = "CLICKPATH_QUERY_TIMEOUT_SECS";

/// Environment variable for the team used by CLI commands
pub const ENV_TEAM: &str = "CLICKPATH_TEAM";

// =============================================================================
// DuckDB
// =============================================================================

/// DuckDB database file name inside the duckdb data subdirectory
pub const DUCKDB_DB_FILENAME: &str = "clickpath.duckdb";

/// Default query timeout in seconds (DuckDB and ClickHouse)
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// ClickHouse
// =============================================================================

/// Default ClickHouse database name
pub const CLICKHOUSE_DEFAULT_DATABASE: &str = "clickpath";

// =============================================================================
// Query Limits
// =============================================================================

/// Days before "now" used as the lower bound for a team without events
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Maximum number of query keys in a single volume request
pub const VOLUME_MAX_QUERY_KEYS: usize = 50;

/// Maximum number of element positions per query key
pub const VOLUME_MAX_POSITIONS: usize = 32;

/// Maximum number of property filters on an entity filter
pub const MAX_PROPERTY_FILTERS: usize = 50;

/// Maximum size of filter / predicate JSON in bytes (64KB)
pub const MAX_FILTER_JSON_SIZE: usize = 64 * 1024;

// =============================================================================
// Demo Data
// =============================================================================

/// Default number of persons generated by the demo command
pub const DEMO_DEFAULT_PERSONS: usize = 40;
