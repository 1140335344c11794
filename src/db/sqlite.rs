// SqliteProfileRepository — rusqlite backend implementing ProfileRepository.
//
// The Connection is wrapped in std::sync::Mutex because Connection is !Sync.
// Trait methods lock the mutex, do synchronous rusqlite work, and return.
// A panic while holding the lock leaves the connection itself usable, so a
// poisoned lock is recovered rather than propagated.
//
// `update` runs inside a BEGIN IMMEDIATE transaction, which takes SQLite's
// write lock before the read. That serializes merges across every
// connection to the file, including ones in other processes.
//
// The free functions in queries.rs stay usable against a bare Connection.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, TransactionBehavior};

use crate::error::{PersistenceContext, Result};

use super::models::AuthorProfile;
use super::traits::ProfileRepository;

pub struct SqliteProfileRepository {
    conn: Mutex<Connection>,
}

impl SqliteProfileRepository {
    /// Wrap an already-opened rusqlite Connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of tables in the schema (used by `inkprint init`).
    pub fn table_count(&self) -> Result<i64> {
        super::schema::table_count(&self.conn())
    }
}

impl ProfileRepository for SqliteProfileRepository {
    fn get(&self, author_id: &str) -> Result<Option<AuthorProfile>> {
        super::queries::get_profile(&self.conn(), author_id)
    }

    fn put(&self, profile: &AuthorProfile) -> Result<()> {
        super::queries::upsert_profile(&self.conn(), profile)
    }

    fn update(
        &self,
        author_id: &str,
        apply: &dyn Fn(Option<AuthorProfile>) -> Result<AuthorProfile>,
    ) -> Result<AuthorProfile> {
        let mut conn = self.conn();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .persistence("starting profile update")?;
        // Dropping `tx` on an early return rolls back
        let profile = apply(super::queries::get_profile(&tx, author_id)?)?;
        super::queries::upsert_profile(&tx, &profile)?;
        tx.commit().persistence("committing profile update")?;
        Ok(profile)
    }

    fn delete(&self, author_id: &str) -> Result<bool> {
        super::queries::delete_profile(&self.conn(), author_id)
    }

    fn list(&self) -> Result<Vec<AuthorProfile>> {
        super::queries::list_profiles(&self.conn())
    }

    fn stale_profiles(&self, max_age_days: i64) -> Result<Vec<String>> {
        super::queries::stale_profiles(&self.conn(), max_age_days)
    }

    fn count(&self) -> Result<usize> {
        super::queries::count_profiles(&self.conn())
    }
}
