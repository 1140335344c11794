// Profile repository trait — backend-agnostic storage for author profiles.
//
// Implementors: SqliteProfileRepository (wraps rusqlite) and
// MemoryProfileRepository. The profile store owns merge logic; a repository
// moves whole records in and out and makes `update` atomic against every
// other writer of the same backing store.
//
// Failures surface as InkprintError::Persistence. Implementations must not
// retry internally.

use crate::error::Result;

use super::models::AuthorProfile;

pub trait ProfileRepository: Send + Sync {
    /// Load a profile by author id.
    fn get(&self, author_id: &str) -> Result<Option<AuthorProfile>>;

    /// Insert or replace a profile record.
    fn put(&self, profile: &AuthorProfile) -> Result<()>;

    /// Read-modify-write one profile atomically.
    ///
    /// `apply` gets the stored record (if any) and returns the record to
    /// write. No other write to the same store lands between the read and
    /// the write. An error from `apply` leaves the store untouched.
    fn update(
        &self,
        author_id: &str,
        apply: &dyn Fn(Option<AuthorProfile>) -> Result<AuthorProfile>,
    ) -> Result<AuthorProfile>;

    /// Remove a profile. Returns whether a record existed.
    fn delete(&self, author_id: &str) -> Result<bool>;

    /// All profiles, ordered by author id.
    fn list(&self) -> Result<Vec<AuthorProfile>>;

    /// Ids of profiles whose `updated_at` is older than `max_age_days`.
    fn stale_profiles(&self, max_age_days: i64) -> Result<Vec<String>>;

    /// Number of stored profiles.
    fn count(&self) -> Result<usize> {
        Ok(self.list()?.len())
    }
}
