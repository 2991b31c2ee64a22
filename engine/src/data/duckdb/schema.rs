//! DuckDB schema definitions
//!
//! Append-only storage with no PRIMARY KEY constraints on data tables.
//! Superseded identity associations are never deleted; the current one is
//! picked at query time by `ROW_NUMBER()` over `(created_at, id)`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- Infrastructure: Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at BIGINT NOT NULL,
    description VARCHAR
);

-- ═══════════════════════════════════════════════════════════════════════════════
-- Events: one row per captured event, never updated
-- ═══════════════════════════════════════════════════════════════════════════════
CREATE TABLE IF NOT EXISTS events (
    id                  VARCHAR NOT NULL,   -- UUID
    team_id             BIGINT NOT NULL,    -- Tenant isolation
    distinct_id         VARCHAR NOT NULL,   -- Visitor identifier as sent by the client
    event               VARCHAR NOT NULL,   -- Event name ($pageview, purchase, ...)
    timestamp           TIMESTAMP NOT NULL, -- UTC, microsecond precision
    properties          JSON                -- Arbitrary event properties
);

-- ═══════════════════════════════════════════════════════════════════════════════
-- Elements: DOM element chain of autocaptured events, position 0 innermost
-- ═══════════════════════════════════════════════════════════════════════════════
CREATE TABLE IF NOT EXISTS elements (
    team_id             BIGINT NOT NULL,
    event_id            VARCHAR NOT NULL,
    order_index         INTEGER NOT NULL,
    tag_name            VARCHAR,
    text                VARCHAR,
    href                VARCHAR,
    attr_id             VARCHAR,
    attr_class          VARCHAR[],
    nth_child           BIGINT,
    nth_of_type         BIGINT,
    attributes          JSON
);

-- ═══════════════════════════════════════════════════════════════════════════════
-- Identity associations: distinct id -> person, latest (created_at, id) wins
-- ═══════════════════════════════════════════════════════════════════════════════
CREATE TABLE IF NOT EXISTS person_distinct_id (
    id                  BIGINT NOT NULL,
    team_id             BIGINT NOT NULL,
    distinct_id         VARCHAR NOT NULL,
    person_id           VARCHAR NOT NULL,
    created_at          TIMESTAMP NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_events_team_ts ON events(team_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_events_team_distinct ON events(team_id, distinct_id);
CREATE INDEX IF NOT EXISTS idx_elements_event ON elements(team_id, event_id, order_index);
CREATE INDEX IF NOT EXISTS idx_pdi_team_distinct ON person_distinct_id(team_id, distinct_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = ["schema_version", "events", "elements", "person_distinct_id"];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_element_classes_are_a_list() {
        assert!(SCHEMA.contains("attr_class          VARCHAR[]"));
    }
}
