/// Key-value table backing the record store.
///
/// One row per storage key. Values are opaque text: the record list is stored
/// as a JSON document and the counter as a decimal string.
pub const KV_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
);
"#;

/// Tracks which schema migrations have been applied.
pub const MIGRATION_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at INTEGER NOT NULL,
    description TEXT
);
"#;
