// Attribution scoring — similarity breakdown in, 0-100 score and tier out.
//
// The composite score is 100 x the weighted sum of the similarity
// components. Weights are configuration: they must be finite, within
// [0, 1], and sum to 1.0, or the engine refuses to start.
//
// Ranking scores every stored profile in parallel (rayon). A caller can
// pass a Deadline; profiles not reached before it trips are skipped and the
// result is marked truncated instead of blocking.

use std::cmp::Ordering;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::db::models::AuthorProfile;
use crate::error::{InkprintError, Result};
use crate::features::fingerprint::Fingerprint;
use crate::profiles::store::ProfileStore;

use super::deadline::Deadline;
use super::quality::{self, QualityFlag};
use super::similarity::{SimilarityBreakdown, SimilarityEngine};

/// Tolerance for the weights-sum-to-one check.
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Configurable weights for the composite attribution score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Rhetorical signal cosine (default 0.40)
    pub signal_alignment: f64,
    /// Mean of sentence-length and lexical-diversity matches (default 0.25)
    pub linguistic_metrics: f64,
    /// Punctuation histogram match (default 0.15)
    pub punctuation: f64,
    /// Hapax and function-word matches (default 0.15)
    pub vocabulary_richness: f64,
    /// Passive voice match (default 0.05)
    pub voice: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            signal_alignment: 0.40,
            linguistic_metrics: 0.25,
            punctuation: 0.15,
            vocabulary_richness: 0.15,
            voice: 0.05,
        }
    }
}

impl ScoringWeights {
    fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("signal_alignment", self.signal_alignment),
            ("linguistic_metrics", self.linguistic_metrics),
            ("punctuation", self.punctuation),
            ("vocabulary_richness", self.vocabulary_richness),
            ("voice", self.voice),
        ]
    }

    fn total(&self) -> f64 {
        self.as_array().iter().map(|(_, w)| w).sum()
    }

    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.as_array() {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(InkprintError::Config(format!(
                    "weight '{name}' must be within [0, 1], got {weight}"
                )));
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(InkprintError::Config(format!(
                "attribution weights must sum to 1.0, got {total:.6}"
            )));
        }
        Ok(())
    }

    /// Weighted combination of a breakdown, in [0, 1].
    ///
    /// Divides by the actual weight total so rounding in the configured
    /// weights cannot push a perfect match off exactly 1.0.
    pub fn combine(&self, b: &SimilarityBreakdown) -> f64 {
        let linguistic = (b.sentence_length_match + b.lexical_diversity_match) / 2.0;
        let parts = [
            (self.signal_alignment, b.signal_alignment),
            (self.linguistic_metrics, linguistic),
            (self.punctuation, b.punctuation_match),
            (self.vocabulary_richness, b.vocabulary_richness_match),
            (self.voice, b.passive_voice_match),
        ];
        let weighted: f64 = parts.iter().map(|(w, s)| w * s).sum();
        let total: f64 = parts.iter().map(|(w, _)| w).sum();
        if total <= 0.0 {
            return 0.0;
        }
        (weighted / total).clamp(0.0, 1.0)
    }
}

/// Score boundaries for the confidence tiers (lower bounds, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub high: f64,
    pub likely: f64,
    pub possible: f64,
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            high: 90.0,
            likely: 75.0,
            possible: 60.0,
        }
    }
}

impl TierThresholds {
    pub fn validate(&self) -> Result<()> {
        let ordered = self.high <= 100.0
            && self.high > self.likely
            && self.likely > self.possible
            && self.possible > 0.0;
        if !ordered {
            return Err(InkprintError::Config(format!(
                "tier thresholds must satisfy 100 >= high > likely > possible > 0, got {}/{}/{}",
                self.high, self.likely, self.possible
            )));
        }
        Ok(())
    }
}

/// Categorical confidence bucket for an attribution score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    Inconclusive,
    Possible,
    Likely,
    High,
}

impl ConfidenceLevel {
    /// Determine the tier from a 0-100 score.
    pub fn from_score(score: f64, tiers: &TierThresholds) -> Self {
        match score {
            s if s >= tiers.high => ConfidenceLevel::High,
            s if s >= tiers.likely => ConfidenceLevel::Likely,
            s if s >= tiers.possible => ConfidenceLevel::Possible,
            _ => ConfidenceLevel::Inconclusive,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Inconclusive => "inconclusive",
            ConfidenceLevel::Possible => "possible",
            ConfidenceLevel::Likely => "likely",
            ConfidenceLevel::High => "high",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One candidate author's score for a fingerprint. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub candidate_author_id: String,
    pub display_name: String,
    /// 0.0 to 100.0
    pub score: f64,
    pub breakdown: SimilarityBreakdown,
    pub confidence_level: ConfidenceLevel,
    pub quality: Vec<QualityFlag>,
}

/// Ranked results plus how much of the profile set was actually scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAttributions {
    /// Descending by score, ties broken by author id
    pub results: Vec<AttributionResult>,
    /// The deadline tripped before every profile was scored
    pub truncated: bool,
    pub profiles_considered: usize,
    pub profiles_total: usize,
}

/// Scores fingerprints against stored author profiles. Read-only: it never
/// writes to the store.
pub struct AttributionScorer {
    store: Arc<ProfileStore>,
    similarity: SimilarityEngine,
    tiers: TierThresholds,
}

impl AttributionScorer {
    pub fn new(store: Arc<ProfileStore>, similarity: SimilarityEngine, tiers: TierThresholds) -> Self {
        Self {
            store,
            similarity,
            tiers,
        }
    }

    /// Score a fingerprint against one profile without touching the store.
    pub fn score_against(&self, fingerprint: &Fingerprint, profile: &AuthorProfile) -> AttributionResult {
        let sim = self.similarity.similarity(fingerprint, &profile.fingerprint);
        let score = (sim.overall * 100.0).clamp(0.0, 100.0);

        AttributionResult {
            candidate_author_id: profile.author_id.clone(),
            display_name: profile.display_name.clone(),
            score,
            breakdown: sim.breakdown,
            confidence_level: ConfidenceLevel::from_score(score, &self.tiers),
            quality: quality::assess(fingerprint, &profile.fingerprint, profile.sample_count),
        }
    }

    /// Score a fingerprint against a single stored author.
    pub fn score(&self, fingerprint: &Fingerprint, author_id: &str) -> Result<AttributionResult> {
        let profile = self.store.get(author_id)?;
        let result = self.score_against(fingerprint, &profile);

        info!(
            author_id,
            score = format!("{:.1}", result.score),
            tier = result.confidence_level.as_str(),
            "Scored attribution"
        );

        Ok(result)
    }

    /// Rank every stored profile, keeping results with `score >= min_confidence`.
    pub fn rank(&self, fingerprint: &Fingerprint, min_confidence: f64) -> Result<Vec<AttributionResult>> {
        Ok(self
            .rank_with_deadline(fingerprint, min_confidence, &Deadline::never())?
            .results)
    }

    /// Like `rank`, but stops scoring once `deadline` trips and reports the
    /// partial result as truncated.
    pub fn rank_with_deadline(
        &self,
        fingerprint: &Fingerprint,
        min_confidence: f64,
        deadline: &Deadline,
    ) -> Result<RankedAttributions> {
        if !min_confidence.is_finite() || !(0.0..=100.0).contains(&min_confidence) {
            return Err(InkprintError::Input(format!(
                "min_confidence must be within [0, 100], got {min_confidence}"
            )));
        }

        let profiles = self.store.list()?;
        let profiles_total = profiles.len();

        let scored: Vec<AttributionResult> = profiles
            .par_iter()
            .filter_map(|profile| {
                if deadline.is_expired() {
                    return None;
                }
                Some(self.score_against(fingerprint, profile))
            })
            .collect();

        let profiles_considered = scored.len();
        let truncated = profiles_considered < profiles_total;

        let mut results: Vec<AttributionResult> = scored
            .into_iter()
            .filter(|r| r.score >= min_confidence)
            .collect();
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.candidate_author_id.cmp(&b.candidate_author_id))
        });

        debug!(
            profiles_total,
            profiles_considered,
            matches = results.len(),
            truncated,
            "Ranked profiles"
        );

        Ok(RankedAttributions {
            results,
            truncated,
            profiles_considered,
            profiles_total,
        })
    }
}
