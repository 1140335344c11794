// Database queries — CRUD operations for author profiles.
//
// Every database interaction goes through this module. This keeps SQL
// contained in one place and gives the rest of the app clean Rust interfaces.
// Timestamps are stored as RFC 3339 strings in UTC with microsecond
// precision, which sort lexically in time order.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{InkprintError, PersistenceContext, Result};
use crate::features::fingerprint::Fingerprint;

use super::models::{stale_cutoff, AuthorProfile};

const PROFILE_COLUMNS: &str =
    "author_id, display_name, fingerprint, sample_count, created_at, updated_at, version";

fn timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .persistence("parsing stored timestamp")
}

/// Raw column values, decoded outside the rusqlite row closure so JSON and
/// timestamp errors surface as persistence failures.
struct ProfileRow {
    author_id: String,
    display_name: String,
    fingerprint: String,
    sample_count: u32,
    created_at: String,
    updated_at: String,
    version: u32,
}

impl ProfileRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            author_id: row.get(0)?,
            display_name: row.get(1)?,
            fingerprint: row.get(2)?,
            sample_count: row.get(3)?,
            created_at: row.get(4)?,
            updated_at: row.get(5)?,
            version: row.get(6)?,
        })
    }

    fn into_profile(self) -> Result<AuthorProfile> {
        let fingerprint: Fingerprint = serde_json::from_str(&self.fingerprint)
            .map_err(|e| {
                InkprintError::persistence(
                    format!("decoding fingerprint for author '{}'", self.author_id),
                    e,
                )
            })?;
        let created_at = parse_timestamp(&self.created_at)?;
        let updated_at = parse_timestamp(&self.updated_at)?;

        Ok(AuthorProfile {
            author_id: self.author_id,
            display_name: self.display_name,
            fingerprint,
            sample_count: self.sample_count,
            created_at,
            updated_at,
            version: self.version,
        })
    }
}

// --- Author profiles ---

/// Insert or replace a profile record (upsert on author_id).
pub fn upsert_profile(conn: &Connection, profile: &AuthorProfile) -> Result<()> {
    let fingerprint_json =
        serde_json::to_string(&profile.fingerprint).persistence("encoding fingerprint")?;

    conn.execute(
        "INSERT INTO author_profiles
            (author_id, display_name, fingerprint, sample_count, created_at, updated_at, version)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(author_id) DO UPDATE SET
            display_name = ?2,
            fingerprint = ?3,
            sample_count = ?4,
            created_at = ?5,
            updated_at = ?6,
            version = ?7",
        params![
            profile.author_id,
            profile.display_name,
            fingerprint_json,
            profile.sample_count,
            timestamp(&profile.created_at),
            timestamp(&profile.updated_at),
            profile.version,
        ],
    )
    .persistence("writing author profile")?;
    Ok(())
}

/// Load a single profile by author id.
pub fn get_profile(conn: &Connection, author_id: &str) -> Result<Option<AuthorProfile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM author_profiles WHERE author_id = ?1");
    let row = conn
        .query_row(&sql, params![author_id], ProfileRow::from_row)
        .optional()
        .persistence("reading author profile")?;

    row.map(ProfileRow::into_profile).transpose()
}

/// Delete a profile. Returns true if a row was removed.
pub fn delete_profile(conn: &Connection, author_id: &str) -> Result<bool> {
    let removed = conn
        .execute(
            "DELETE FROM author_profiles WHERE author_id = ?1",
            params![author_id],
        )
        .persistence("deleting author profile")?;
    Ok(removed > 0)
}

/// All profiles, ordered by author id.
pub fn list_profiles(conn: &Connection) -> Result<Vec<AuthorProfile>> {
    let sql = format!("SELECT {PROFILE_COLUMNS} FROM author_profiles ORDER BY author_id");
    let mut stmt = conn.prepare(&sql).persistence("listing author profiles")?;
    let rows = stmt
        .query_map([], ProfileRow::from_row)
        .persistence("listing author profiles")?
        .collect::<rusqlite::Result<Vec<_>>>()
        .persistence("listing author profiles")?;

    rows.into_iter().map(ProfileRow::into_profile).collect()
}

/// Author ids whose profile was last written more than `max_age_days` ago.
pub fn stale_profiles(conn: &Connection, max_age_days: i64) -> Result<Vec<String>> {
    let cutoff = timestamp(&stale_cutoff(max_age_days)?);
    let mut stmt = conn
        .prepare(
            "SELECT author_id FROM author_profiles
             WHERE updated_at < ?1
             ORDER BY author_id",
        )
        .persistence("finding stale profiles")?;
    let ids = stmt
        .query_map(params![cutoff], |row| row.get(0))
        .persistence("finding stale profiles")?
        .collect::<rusqlite::Result<Vec<String>>>()
        .persistence("finding stale profiles")?;
    Ok(ids)
}

/// Number of stored profiles.
pub fn count_profiles(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM author_profiles", [], |row| row.get(0))
        .persistence("counting author profiles")?;
    Ok(count.max(0) as usize)
}
