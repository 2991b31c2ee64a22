//! ClickHouse schema definitions
//!
//! Single-node MergeTree tables. Rows are append-only; identity history is
//! kept and resolved at query time like on DuckDB.
//!
//! - Events are ordered by team and day for range scans
//! - Elements are ordered by `(team_id, event_id, order_index)` so each
//!   positional existence check is a point lookup

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Schema version table
pub const SCHEMA_VERSION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    id UInt8,
    version Int32,
    applied_at Int64,
    description Nullable(String)
) ENGINE = ReplacingMergeTree()
ORDER BY id
"#;

/// Events table
pub const EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    id                  String,
    team_id             Int64,
    distinct_id         String,
    event               LowCardinality(String),
    timestamp           DateTime64(6, 'UTC'),
    properties          String
) ENGINE = MergeTree()
PARTITION BY toYYYYMM(timestamp)
ORDER BY (team_id, toDate(timestamp), event, distinct_id)
"#;

/// Elements table
pub const ELEMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS elements (
    team_id             Int64,
    event_id            String,
    order_index         UInt32,
    tag_name            Nullable(String),
    text                Nullable(String),
    href                Nullable(String),
    attr_id             Nullable(String),
    attr_class          Array(String),
    nth_child           Nullable(Int64),
    nth_of_type         Nullable(Int64),
    attributes          String
) ENGINE = MergeTree()
ORDER BY (team_id, event_id, order_index)
"#;

/// Identity associations table
pub const PERSON_DISTINCT_ID_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS person_distinct_id (
    id                  Int64,
    team_id             Int64,
    distinct_id         String,
    person_id           String,
    created_at          DateTime64(6, 'UTC')
) ENGINE = MergeTree()
ORDER BY (team_id, distinct_id, created_at, id)
"#;

/// All statements of the initial schema, in creation order
pub fn generate_schema() -> Vec<&'static str> {
    vec![
        SCHEMA_VERSION_TABLE,
        EVENTS_TABLE,
        ELEMENTS_TABLE,
        PERSON_DISTINCT_ID_TABLE,
    ]
}
