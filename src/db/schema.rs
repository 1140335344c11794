// Database schema — table creation and version tracking.
//
// A `schema_version` table records which schema revision a database file
// was created with. Revision 1 is the full profile record below; any later
// change to the table lands as a numbered migration checked against it.

use rusqlite::Connection;

use crate::error::{PersistenceContext, Result};

/// Current schema revision.
pub const SCHEMA_VERSION: i64 = 1;

/// Create all tables if they don't exist yet.
///
/// This is idempotent — safe to call on every startup.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- Author profiles: one aggregate fingerprint per author
        -- The fingerprint is JSON so its shape can evolve without migrations
        CREATE TABLE IF NOT EXISTS author_profiles (
            author_id TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            fingerprint TEXT NOT NULL,          -- JSON-encoded Fingerprint
            sample_count INTEGER NOT NULL,
            created_at TEXT NOT NULL,           -- RFC 3339, UTC; kept across merges
            updated_at TEXT NOT NULL,           -- RFC 3339, UTC
            version INTEGER NOT NULL DEFAULT 1  -- bumped on every write
        );

        -- Index for staleness checks
        CREATE INDEX IF NOT EXISTS idx_profiles_updated
            ON author_profiles(updated_at);
        ",
    )
    .persistence("creating database tables")?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .persistence("recording schema version")?;

    Ok(())
}

/// Count the number of tables in the database (useful for init confirmation).
pub fn table_count(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )
    .persistence("counting tables")
}
