// ProfileStore — keyed, versioned author profiles on top of a repository.
//
// Saves go through ProfileRepository::update, which makes the read, merge
// and write for one author a single atomic step. Two stores sharing a
// backing file (one per CLI process) therefore can't both read version N
// and both write N+1. Reads go straight to the repository.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::db::models::AuthorProfile;
use crate::db::traits::ProfileRepository;
use crate::error::{InkprintError, Result};
use crate::features::fingerprint::Fingerprint;

use super::merge::merge_fingerprints;

pub struct ProfileStore {
    repository: Arc<dyn ProfileRepository>,
    min_words: u32,
}

impl ProfileStore {
    /// `min_words` is used to recompute `low_confidence` on merged aggregates.
    pub fn new(repository: Arc<dyn ProfileRepository>, min_words: u32) -> Self {
        Self {
            repository,
            min_words,
        }
    }

    /// Create or merge a profile from `fingerprint`. Returns the author id.
    ///
    /// The id comes from `fingerprint.subject_id`; a fingerprint without one
    /// starts a new profile under a fresh UUID.
    pub fn save(&self, fingerprint: &Fingerprint, display_name: &str) -> Result<String> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(InkprintError::Input(
                "display name must not be empty".to_string(),
            ));
        }

        let author_id = match fingerprint.subject_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let profile = self.repository.update(&author_id, &|stored: Option<AuthorProfile>| {
            Ok(match stored {
                Some(existing) => self.merged(existing, fingerprint, display_name),
                None => AuthorProfile::new(&author_id, display_name, fingerprint.clone()),
            })
        })?;

        info!(
            author_id = %profile.author_id,
            samples = profile.sample_count,
            version = profile.version,
            "Saved author profile"
        );

        Ok(profile.author_id)
    }

    fn merged(
        &self,
        existing: AuthorProfile,
        fingerprint: &Fingerprint,
        display_name: &str,
    ) -> AuthorProfile {
        let merged = merge_fingerprints(
            &existing.fingerprint,
            existing.sample_count,
            fingerprint,
            self.min_words,
        );
        AuthorProfile {
            author_id: existing.author_id,
            display_name: display_name.to_string(),
            fingerprint: merged,
            sample_count: existing.sample_count.saturating_add(1),
            created_at: existing.created_at,
            updated_at: Utc::now(),
            version: existing.version.saturating_add(1),
        }
    }

    /// Load a profile, failing with `NotFound` if the author is unknown.
    pub fn get(&self, author_id: &str) -> Result<AuthorProfile> {
        self.repository
            .get(author_id)?
            .ok_or_else(|| InkprintError::NotFound(author_id.to_string()))
    }

    pub fn list(&self) -> Result<Vec<AuthorProfile>> {
        self.repository.list()
    }

    pub fn count(&self) -> Result<usize> {
        self.repository.count()
    }

    /// Remove a profile. Deleting an unknown author is not an error;
    /// the return value says whether anything was removed.
    pub fn delete(&self, author_id: &str) -> Result<bool> {
        let removed = self.repository.delete(author_id)?;
        debug!(author_id, removed, "Deleted author profile");
        Ok(removed)
    }

    /// Ids of profiles not written in the last `max_age_days` days.
    /// Negative or unrepresentable ages are input errors.
    pub fn stale(&self, max_age_days: i64) -> Result<Vec<String>> {
        self.repository.stale_profiles(max_age_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryProfileRepository;
    use crate::features::fingerprint::PunctuationClass;
    use std::collections::BTreeMap;

    fn store() -> ProfileStore {
        ProfileStore::new(Arc::new(MemoryProfileRepository::new()), 50)
    }

    fn fp(subject: Option<&str>, sentence_length: f64) -> Fingerprint {
        Fingerprint {
            subject_id: subject.map(str::to_string),
            avg_sentence_length: sentence_length,
            lexical_diversity: 0.5,
            passive_voice_ratio: 0.1,
            hapax_ratio: 0.4,
            function_word_ratio: 0.45,
            punctuation_histogram: BTreeMap::from([(PunctuationClass::Period, 60.0)]),
            signal_vector: vec![1.0, 2.0],
            dictionary_version: "test-v1".to_string(),
            sample_word_count: 120,
            sentence_count: 8,
            low_confidence: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_save_without_subject_generates_id() {
        let store = store();
        let id = store.save(&fp(None, 12.0), "Anon").unwrap();
        assert!(Uuid::parse_str(&id).is_ok());

        let profile = store.get(&id).unwrap();
        assert_eq!(profile.sample_count, 1);
        assert_eq!(profile.version, 1);
        assert_eq!(profile.fingerprint.subject_id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_save_with_known_subject_merges() {
        let store = store();
        let id = store.save(&fp(Some("ann"), 10.0), "Ann").unwrap();
        assert_eq!(id, "ann");
        store.save(&fp(Some("ann"), 20.0), "Ann B.").unwrap();

        let profile = store.get("ann").unwrap();
        assert_eq!(profile.sample_count, 2);
        assert_eq!(profile.version, 2);
        assert_eq!(profile.display_name, "Ann B.");
        assert!((profile.fingerprint.avg_sentence_length - 15.0).abs() < 1e-12);
        assert!(profile.updated_at >= profile.created_at);
    }

    #[test]
    fn test_empty_display_name_rejected() {
        let store = store();
        let err = store.save(&fp(None, 10.0), "   ").unwrap_err();
        assert!(matches!(err, InkprintError::Input(_)));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let err = store().get("ghost").unwrap_err();
        assert!(matches!(err, InkprintError::NotFound(ref id) if id == "ghost"));
    }

    #[test]
    fn test_delete_is_idempotent() {
        let store = store();
        store.save(&fp(Some("x"), 10.0), "X").unwrap();
        assert!(store.delete("x").unwrap());
        assert!(!store.delete("x").unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_saves_lose_nothing() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        store.save(&fp(Some("busy"), 12.0), "Busy").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let profile = store.get("busy").unwrap();
        assert_eq!(profile.sample_count, 40);
        assert_eq!(profile.version, 40);
    }
}
