// Unit tests for the profile store and its repositories.
//
// Covers the create-or-merge lifecycle, the sample-count-weighted merge
// rule, write serialization under concurrency, and the SQLite repository.
// SQLite tests use in-memory databases except the shared-file case, which
// writes to a uniquely named file in the temp directory and removes it.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use inkprint::db::memory::MemoryProfileRepository;
use inkprint::db::traits::ProfileRepository;
use inkprint::error::InkprintError;
use inkprint::features::fingerprint::{Fingerprint, PunctuationClass};
use inkprint::profiles::merge::merge_fingerprints;
use inkprint::profiles::store::ProfileStore;

fn sample(subject: Option<&str>, sentence_length: f64, comma: f64, signal: Vec<f64>) -> Fingerprint {
    Fingerprint {
        subject_id: subject.map(str::to_string),
        avg_sentence_length: sentence_length,
        lexical_diversity: 0.5,
        passive_voice_ratio: 0.2,
        hapax_ratio: 0.35,
        function_word_ratio: 0.5,
        punctuation_histogram: BTreeMap::from([(PunctuationClass::Comma, comma)]),
        signal_vector: signal,
        dictionary_version: "test-v1".to_string(),
        sample_word_count: 100,
        sentence_count: 6,
        low_confidence: false,
        created_at: Utc::now(),
    }
}

fn memory_store() -> ProfileStore {
    ProfileStore::new(Arc::new(MemoryProfileRepository::new()), 50)
}

// ============================================================
// Merge rule
// ============================================================

#[test]
fn three_samples_average_evenly() {
    let store = memory_store();
    for length in [10.0, 20.0, 30.0] {
        store
            .save(&sample(Some("tri"), length, length, vec![length]), "Tri")
            .unwrap();
    }

    let profile = store.get("tri").unwrap();
    assert_eq!(profile.sample_count, 3);
    assert!((profile.fingerprint.avg_sentence_length - 20.0).abs() < 1e-9);
    assert!((profile.fingerprint.punctuation(PunctuationClass::Comma) - 20.0).abs() < 1e-9);
    assert!((profile.fingerprint.signal_vector[0] - 20.0).abs() < 1e-9);
    assert_eq!(profile.fingerprint.sample_word_count, 300);
}

#[test]
fn saving_same_content_twice_keeps_aggregate() {
    let store = memory_store();
    let fp = sample(Some("twin"), 17.3, 42.0, vec![1.5, 0.0, 3.2]);
    store.save(&fp, "Twin").unwrap();
    store.save(&fp, "Twin").unwrap();

    let aggregate = store.get("twin").unwrap().fingerprint;
    assert!((aggregate.avg_sentence_length - fp.avg_sentence_length).abs() < 1e-9);
    assert!((aggregate.lexical_diversity - fp.lexical_diversity).abs() < 1e-9);
    assert!((aggregate.passive_voice_ratio - fp.passive_voice_ratio).abs() < 1e-9);
    for (a, b) in aggregate.signal_vector.iter().zip(&fp.signal_vector) {
        assert!((a - b).abs() < 1e-9);
    }
}

#[test]
fn merge_with_heavier_aggregate() {
    let aggregate = sample(None, 10.0, 10.0, vec![0.0]);
    let new = sample(None, 110.0, 10.0, vec![10.0]);
    // aggregate stands for 9 samples
    let merged = merge_fingerprints(&aggregate, 9, &new, 50);
    assert!((merged.avg_sentence_length - 20.0).abs() < 1e-12);
    assert!((merged.signal_vector[0] - 1.0).abs() < 1e-12);
}

// ============================================================
// Store lifecycle
// ============================================================

#[test]
fn unknown_subject_creates_profile_under_that_id() {
    let store = memory_store();
    let id = store
        .save(&sample(Some("custom-id"), 12.0, 30.0, vec![1.0]), "Custom")
        .unwrap();
    assert_eq!(id, "custom-id");
    assert_eq!(store.get("custom-id").unwrap().version, 1);
}

#[test]
fn missing_subject_gets_fresh_ids() {
    let store = memory_store();
    let a = store.save(&sample(None, 12.0, 30.0, vec![1.0]), "A").unwrap();
    let b = store.save(&sample(None, 12.0, 30.0, vec![1.0]), "B").unwrap();
    assert_ne!(a, b);
    assert_eq!(store.list().unwrap().len(), 2);
}

#[test]
fn empty_display_name_is_input_error() {
    let err = memory_store()
        .save(&sample(None, 12.0, 30.0, vec![]), "")
        .unwrap_err();
    assert!(matches!(err, InkprintError::Input(_)));
}

#[test]
fn get_missing_is_not_found() {
    assert!(matches!(
        memory_store().get("missing"),
        Err(InkprintError::NotFound(_))
    ));
}

#[test]
fn delete_twice_is_fine() {
    let store = memory_store();
    store
        .save(&sample(Some("gone"), 12.0, 30.0, vec![]), "Gone")
        .unwrap();
    assert!(store.delete("gone").unwrap());
    assert!(!store.delete("gone").unwrap());
    assert!(!store.delete("never-existed").unwrap());
}

#[test]
fn concurrent_saves_keep_every_sample() {
    let store = Arc::new(memory_store());
    std::thread::scope(|scope| {
        for _ in 0..6 {
            let store = Arc::clone(&store);
            scope.spawn(move || {
                for _ in 0..10 {
                    store
                        .save(&sample(Some("shared"), 15.0, 30.0, vec![1.0]), "Shared")
                        .unwrap();
                }
            });
        }
    });
    let profile = store.get("shared").unwrap();
    assert_eq!(profile.sample_count, 60);
    assert_eq!(profile.version, 60);
    assert_eq!(profile.fingerprint.sample_word_count, 6000);
}

#[test]
fn memory_repository_stale_profiles() {
    let repo = MemoryProfileRepository::new();
    let store = ProfileStore::new(Arc::new(MemoryProfileRepository::new()), 50);
    store
        .save(&sample(Some("fresh"), 12.0, 30.0, vec![]), "Fresh")
        .unwrap();
    let mut old = store.get("fresh").unwrap();
    old.author_id = "old".to_string();
    old.updated_at = Utc::now() - chrono::Duration::days(100);
    repo.put(&old).unwrap();
    repo.put(&store.get("fresh").unwrap()).unwrap();

    assert_eq!(repo.stale_profiles(30).unwrap(), vec!["old"]);
    assert_eq!(repo.count().unwrap(), 2);
}

#[test]
fn stale_with_unusable_age_is_input_error() {
    let store = memory_store();
    assert!(matches!(store.stale(-1), Err(InkprintError::Input(_))));
    assert!(matches!(store.stale(i64::MAX), Err(InkprintError::Input(_))));
}

#[test]
fn failed_update_leaves_record_untouched() {
    let repo = MemoryProfileRepository::new();
    let store = ProfileStore::new(Arc::new(MemoryProfileRepository::new()), 50);
    store
        .save(&sample(Some("kept"), 12.0, 30.0, vec![]), "Kept")
        .unwrap();
    repo.put(&store.get("kept").unwrap()).unwrap();

    let result = repo.update("kept", &|_| Err(InkprintError::Input("rejected".to_string())));
    assert!(matches!(result, Err(InkprintError::Input(_))));

    let stored = repo.get("kept").unwrap().unwrap();
    assert_eq!(stored.version, 1);
    assert_eq!(stored.display_name, "Kept");
}

// ============================================================
// SQLite repository
// ============================================================

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::*;
    use inkprint::db::{self, schema, SqliteProfileRepository};

    fn sqlite_store() -> ProfileStore {
        let conn = db::initialize(":memory:").unwrap();
        ProfileStore::new(Arc::new(SqliteProfileRepository::new(conn)), 50)
    }

    #[test]
    fn schema_creation_is_idempotent() {
        let conn = db::initialize(":memory:").unwrap();
        schema::create_tables(&conn).unwrap();
        schema::create_tables(&conn).unwrap();
        assert_eq!(schema::table_count(&conn).unwrap(), 2);
    }

    #[test]
    fn profile_survives_round_trip_through_sqlite() {
        let store = sqlite_store();
        let fp = sample(Some("ann"), 14.25, 33.0, vec![0.5, 0.0, 2.0]);
        store.save(&fp, "Ann").unwrap();

        let profile = store.get("ann").unwrap();
        assert_eq!(profile.display_name, "Ann");
        assert_eq!(profile.fingerprint.avg_sentence_length, 14.25);
        assert_eq!(profile.fingerprint.signal_vector, vec![0.5, 0.0, 2.0]);
        assert_eq!(profile.fingerprint.subject_id.as_deref(), Some("ann"));
    }

    #[test]
    fn merge_bumps_version_in_sqlite() {
        let store = sqlite_store();
        store
            .save(&sample(Some("bo"), 10.0, 30.0, vec![1.0]), "Bo")
            .unwrap();
        store
            .save(&sample(Some("bo"), 20.0, 30.0, vec![1.0]), "Bo")
            .unwrap();

        let profile = store.get("bo").unwrap();
        assert_eq!(profile.version, 2);
        assert_eq!(profile.sample_count, 2);
        assert!(profile.updated_at >= profile.created_at);
        assert!((profile.fingerprint.avg_sentence_length - 15.0).abs() < 1e-9);
    }

    #[test]
    fn concurrent_saves_through_sqlite() {
        let store = Arc::new(sqlite_store());
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let store = Arc::clone(&store);
                scope.spawn(move || {
                    for _ in 0..5 {
                        store
                            .save(&sample(Some("busy"), 15.0, 30.0, vec![1.0]), "Busy")
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(store.get("busy").unwrap().sample_count, 20);
    }

    /// Removes the database file and its WAL side files on drop.
    struct TempDb(std::path::PathBuf);

    impl TempDb {
        fn new() -> Self {
            let name = format!("inkprint-test-{}.db", uuid::Uuid::new_v4());
            Self(std::env::temp_dir().join(name))
        }

        fn path(&self) -> &str {
            self.0.to_str().unwrap()
        }
    }

    impl Drop for TempDb {
        fn drop(&mut self) {
            for suffix in ["", "-wal", "-shm"] {
                let _ = std::fs::remove_file(format!("{}{suffix}", self.path()));
            }
        }
    }

    #[test]
    fn stores_sharing_one_file_lose_no_samples() {
        let file = TempDb::new();
        db::initialize(file.path()).unwrap();

        // One connection and one store per writer, as separate CLI runs have
        let stores: Vec<ProfileStore> = (0..4)
            .map(|_| {
                let conn = db::open(file.path()).unwrap();
                ProfileStore::new(Arc::new(SqliteProfileRepository::new(conn)), 50)
            })
            .collect();

        std::thread::scope(|scope| {
            for store in &stores {
                scope.spawn(move || {
                    for _ in 0..25 {
                        store
                            .save(&sample(Some("shared"), 15.0, 30.0, vec![1.0]), "Shared")
                            .unwrap();
                    }
                });
            }
        });

        let profile = stores[0].get("shared").unwrap();
        assert_eq!(profile.sample_count, 100);
        assert_eq!(profile.version, 100);
        assert_eq!(profile.fingerprint.sample_word_count, 10_000);
    }

    #[test]
    fn failed_update_rolls_back_in_sqlite() {
        let repo = SqliteProfileRepository::new(db::initialize(":memory:").unwrap());
        let created = repo
            .update("ro", &|_| {
                Ok(inkprint::db::models::AuthorProfile::new(
                    "ro",
                    "Ro",
                    sample(None, 12.0, 30.0, vec![]),
                ))
            })
            .unwrap();
        assert_eq!(created.version, 1);

        let result = repo.update("ro", &|_| Err(InkprintError::Input("rejected".to_string())));
        assert!(matches!(result, Err(InkprintError::Input(_))));

        // The connection is usable again and the record is unchanged
        let stored = repo.get("ro").unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn list_and_delete_through_sqlite() {
        let store = sqlite_store();
        for id in ["c", "a", "b"] {
            store
                .save(&sample(Some(id), 12.0, 30.0, vec![]), "Someone")
                .unwrap();
        }
        let ids: Vec<String> = store
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.author_id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert!(store.delete("b").unwrap());
        assert_eq!(store.count().unwrap(), 2);
    }
}
