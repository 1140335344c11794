// Quality flags — explicit markers that a result rests on weak evidence.
//
// Attribution and anomaly results never hide uncertainty: anything
// computed from a short sample, from fingerprints built under different
// pattern dictionaries, or from a profile with a single sample says so.

use serde::{Deserialize, Serialize};

use crate::features::fingerprint::Fingerprint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityFlag {
    /// One of the fingerprints is below the minimum word count.
    SmallSample,
    /// Signal vectors differ in length or dictionary version.
    DimensionMismatch,
    /// The stored profile was built from a single sample.
    SingleSampleProfile,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::SmallSample => "small sample",
            QualityFlag::DimensionMismatch => "dimension mismatch",
            QualityFlag::SingleSampleProfile => "single-sample profile",
        }
    }
}

impl std::fmt::Display for QualityFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// True when two fingerprints were not built against the same dictionary shape.
pub fn dimension_mismatch(a: &Fingerprint, b: &Fingerprint) -> bool {
    a.signal_vector.len() != b.signal_vector.len() || a.dictionary_version != b.dictionary_version
}

/// Collect the quality flags for comparing `sample` against a profile
/// aggregate built from `profile_samples` samples.
pub fn assess(sample: &Fingerprint, baseline: &Fingerprint, profile_samples: u32) -> Vec<QualityFlag> {
    let mut flags = Vec::new();
    if sample.low_confidence || baseline.low_confidence {
        flags.push(QualityFlag::SmallSample);
    }
    if dimension_mismatch(sample, baseline) {
        flags.push(QualityFlag::DimensionMismatch);
    }
    if profile_samples <= 1 {
        flags.push(QualityFlag::SingleSampleProfile);
    }
    flags
}
