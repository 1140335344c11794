// In-memory repository — used by tests and by callers that don't need
// profiles to outlive the process.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;

use super::models::{stale_cutoff, AuthorProfile};
use super::traits::ProfileRepository;

#[derive(Default)]
pub struct MemoryProfileRepository {
    profiles: RwLock<BTreeMap<String, AuthorProfile>>,
}

impl MemoryProfileRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProfileRepository for MemoryProfileRepository {
    fn get(&self, author_id: &str) -> Result<Option<AuthorProfile>> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.get(author_id).cloned())
    }

    fn put(&self, profile: &AuthorProfile) -> Result<()> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        profiles.insert(profile.author_id.clone(), profile.clone());
        Ok(())
    }

    fn update(
        &self,
        author_id: &str,
        apply: &dyn Fn(Option<AuthorProfile>) -> Result<AuthorProfile>,
    ) -> Result<AuthorProfile> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        let profile = apply(profiles.get(author_id).cloned())?;
        profiles.insert(profile.author_id.clone(), profile.clone());
        Ok(profile)
    }

    fn delete(&self, author_id: &str) -> Result<bool> {
        let mut profiles = self.profiles.write().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.remove(author_id).is_some())
    }

    fn list(&self) -> Result<Vec<AuthorProfile>> {
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles.values().cloned().collect())
    }

    fn stale_profiles(&self, max_age_days: i64) -> Result<Vec<String>> {
        let cutoff = stale_cutoff(max_age_days)?;
        let profiles = self.profiles.read().unwrap_or_else(PoisonError::into_inner);
        Ok(profiles
            .values()
            .filter(|p| p.updated_at < cutoff)
            .map(|p| p.author_id.clone())
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.profiles.read().unwrap_or_else(PoisonError::into_inner).len())
    }
}
