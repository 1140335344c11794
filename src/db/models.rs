// Data models — the author profile record owned by the profile store.
//
// These types flow through the whole engine. They are kept apart from the
// repository code so scoring can use them without depending on rusqlite.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{InkprintError, Result};
use crate::features::fingerprint::Fingerprint;

/// A named author with an aggregate fingerprint built from one or more samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub author_id: String,
    pub display_name: String,
    /// Sample-count-weighted running average of every saved sample
    pub fingerprint: Fingerprint,
    pub sample_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Record version, starting at 1 and bumped on every write
    pub version: u32,
}

impl AuthorProfile {
    /// A fresh profile built from a single sample.
    pub fn new(author_id: &str, display_name: &str, mut fingerprint: Fingerprint) -> Self {
        let now = Utc::now();
        fingerprint.subject_id = Some(author_id.to_string());
        Self {
            author_id: author_id.to_string(),
            display_name: display_name.to_string(),
            fingerprint,
            sample_count: 1,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Days since this profile was last written.
    pub fn age_days(&self) -> i64 {
        (Utc::now() - self.updated_at).num_days()
    }
}

/// The instant `max_age_days` before now. Profiles last written before it
/// are stale. Negative or unrepresentable ages are input errors.
pub fn stale_cutoff(max_age_days: i64) -> Result<DateTime<Utc>> {
    if max_age_days < 0 {
        return Err(InkprintError::Input(format!(
            "max age must not be negative, got {max_age_days} days"
        )));
    }
    Duration::try_days(max_age_days)
        .and_then(|age| Utc::now().checked_sub_signed(age))
        .ok_or_else(|| {
            InkprintError::Input(format!("max age of {max_age_days} days is out of range"))
        })
}
