use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::AnalyticsBackend;
use super::constants::{
    ENV_ANALYTICS_BACKEND, ENV_CLICKHOUSE_URL, ENV_CONFIG, ENV_DUCKDB_PATH,
    ENV_QUERY_TIMEOUT_SECS, ENV_TEAM,
};

#[derive(Parser)]
#[command(name = "clickpath")]
#[command(version, about = "Behavioral queries over team event stores", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Analytics database backend (duckdb or clickhouse)
    #[arg(long, global = true, env = ENV_ANALYTICS_BACKEND, value_parser = parse_analytics_backend)]
    pub analytics_backend: Option<AnalyticsBackend>,

    /// Explicit DuckDB database file (defaults to the data directory)
    #[arg(long, global = true, env = ENV_DUCKDB_PATH)]
    pub duckdb_path: Option<PathBuf>,

    /// ClickHouse connection URL (when using clickhouse backend)
    #[arg(long, global = true, env = ENV_CLICKHOUSE_URL)]
    pub clickhouse_url: Option<String>,

    /// Query timeout in seconds
    #[arg(long, global = true, env = ENV_QUERY_TIMEOUT_SECS)]
    pub query_timeout_secs: Option<u64>,
}

/// Parse analytics backend from CLI/env string
fn parse_analytics_backend(s: &str) -> Result<AnalyticsBackend, String> {
    match s.to_lowercase().as_str() {
        "duckdb" => Ok(AnalyticsBackend::Duckdb),
        "clickhouse" => Ok(AnalyticsBackend::Clickhouse),
        _ => Err(format!(
            "Invalid analytics backend '{}'. Valid options: duckdb, clickhouse",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Earliest event timestamp for a team (default lower bound for open ranges)
    Earliest {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
    },
    /// Resolve a distinct id to its current person
    Person {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
        #[arg(long)]
        distinct_id: String,
    },
    /// Print the latest distinct id -> person mapping for a team
    Mapping {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
    },
    /// Stickiness: persons active in exactly N buckets, or the full distribution
    Stickiness {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
        /// Bucket granularity (day, week, month)
        #[arg(long, default_value = "day")]
        granularity: String,
        /// Range start (RFC 3339 or YYYY-MM-DD); defaults to the team's earliest event
        #[arg(long)]
        from: Option<String>,
        /// Range end (RFC 3339 or YYYY-MM-DD); defaults to now
        #[arg(long)]
        to: Option<String>,
        /// Only count events with this name
        #[arg(long)]
        event: Option<String>,
        /// Property filters as a JSON array
        #[arg(long)]
        filters: Option<String>,
        /// Exact number of active buckets; omit to print the distribution
        #[arg(long)]
        intervals: Option<u32>,
    },
    /// Count events matching ordered element predicates, per query key
    Volume {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
        /// JSON object: {"key": [{"tag_name": "button"}, ...], ...}
        #[arg(long)]
        query: String,
    },
    /// Append a JSON batch of events, elements and identity associations
    Ingest {
        #[arg(long)]
        file: PathBuf,
    },
    /// Generate a demo dataset for a team
    Demo {
        #[arg(long, env = ENV_TEAM)]
        team: Option<i64>,
        #[arg(long)]
        persons: Option<usize>,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub config: Option<PathBuf>,
    pub analytics_backend: Option<AnalyticsBackend>,
    pub duckdb_path: Option<PathBuf>,
    pub clickhouse_url: Option<String>,
    pub query_timeout_secs: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Commands) {
    let cli = Cli::parse();
    let config = CliConfig {
        config: cli.config,
        analytics_backend: cli.analytics_backend,
        duckdb_path: cli.duckdb_path,
        clickhouse_url: cli.clickhouse_url,
        query_timeout_secs: cli.query_timeout_secs,
    };
    (config, cli.command)
}
