// Multi-part similarity between two fingerprints.
//
// The primary signal is cosine similarity of the rhetorical signal vectors.
// Scalar metrics are compared with a tolerance-scaled absolute difference:
//
//   match = 1 - min(1, |a - b| / tolerance)
//
// so a difference of one full tolerance (or more) scores 0.0 and identical
// values score 1.0. Every component lands in [0, 1] and is exposed in the
// breakdown so callers can reweight or debug individual signals.

use serde::{Deserialize, Serialize};

use crate::error::{InkprintError, Result};
use crate::features::fingerprint::{Fingerprint, PunctuationClass};

use super::attribution::ScoringWeights;
use super::quality;

/// Per-metric tolerances: the absolute difference at which a scalar
/// metric stops contributing any similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityTolerances {
    /// Words per sentence (default 10.0)
    pub sentence_length: f64,
    /// Type/token ratio (default 0.25)
    pub lexical_diversity: f64,
    /// Passive voice ratio (default 0.30)
    pub passive_voice: f64,
    /// Per punctuation class, in occurrences per 1000 words (default 20.0)
    pub punctuation: f64,
    /// Hapax legomena ratio (default 0.25)
    pub hapax_ratio: f64,
    /// Function-word ratio (default 0.20)
    pub function_word_ratio: f64,
}

impl Default for SimilarityTolerances {
    fn default() -> Self {
        Self {
            sentence_length: 10.0,
            lexical_diversity: 0.25,
            passive_voice: 0.30,
            punctuation: 20.0,
            hapax_ratio: 0.25,
            function_word_ratio: 0.20,
        }
    }
}

impl SimilarityTolerances {
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("sentence_length", self.sentence_length),
            ("lexical_diversity", self.lexical_diversity),
            ("passive_voice", self.passive_voice),
            ("punctuation", self.punctuation),
            ("hapax_ratio", self.hapax_ratio),
            ("function_word_ratio", self.function_word_ratio),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(InkprintError::Config(format!(
                    "similarity tolerance '{name}' must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Individual similarity components, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityBreakdown {
    pub signal_alignment: f64,
    pub sentence_length_match: f64,
    pub lexical_diversity_match: f64,
    pub passive_voice_match: f64,
    pub punctuation_match: f64,
    pub vocabulary_richness_match: f64,
}

impl SimilarityBreakdown {
    /// (component name, sub-score) pairs in a stable order.
    pub fn components(&self) -> [(&'static str, f64); 6] {
        [
            ("signal_alignment", self.signal_alignment),
            ("sentence_length_match", self.sentence_length_match),
            ("lexical_diversity_match", self.lexical_diversity_match),
            ("passive_voice_match", self.passive_voice_match),
            ("punctuation_match", self.punctuation_match),
            ("vocabulary_richness_match", self.vocabulary_richness_match),
        ]
    }
}

/// Result of comparing two fingerprints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    /// Weighted combination of the breakdown, in [0, 1]
    pub overall: f64,
    pub breakdown: SimilarityBreakdown,
    /// The signal vectors came from different dictionary shapes and were padded
    pub dimension_mismatch: bool,
}

/// Stateless comparison of fingerprints. Safe to share across threads.
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    tolerances: SimilarityTolerances,
    weights: ScoringWeights,
}

impl SimilarityEngine {
    pub fn new(tolerances: SimilarityTolerances, weights: ScoringWeights) -> Self {
        Self {
            tolerances,
            weights,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Compare two fingerprints. Symmetric; `similarity(fp, fp).overall == 1.0`.
    pub fn similarity(&self, a: &Fingerprint, b: &Fingerprint) -> Similarity {
        let t = &self.tolerances;

        let vocabulary_richness_match = (scalar_match(a.hapax_ratio, b.hapax_ratio, t.hapax_ratio)
            + scalar_match(
                a.function_word_ratio,
                b.function_word_ratio,
                t.function_word_ratio,
            ))
            / 2.0;

        let breakdown = SimilarityBreakdown {
            signal_alignment: cosine_similarity(&a.signal_vector, &b.signal_vector),
            sentence_length_match: scalar_match(
                a.avg_sentence_length,
                b.avg_sentence_length,
                t.sentence_length,
            ),
            lexical_diversity_match: scalar_match(
                a.lexical_diversity,
                b.lexical_diversity,
                t.lexical_diversity,
            ),
            passive_voice_match: scalar_match(
                a.passive_voice_ratio,
                b.passive_voice_ratio,
                t.passive_voice,
            ),
            punctuation_match: punctuation_match(a, b, t.punctuation),
            vocabulary_richness_match,
        };

        Similarity {
            overall: self.weights.combine(&breakdown),
            breakdown,
            dimension_mismatch: quality::dimension_mismatch(a, b),
        }
    }
}

/// `1 - min(1, |a - b| / tolerance)`.
pub fn scalar_match(a: f64, b: f64, tolerance: f64) -> f64 {
    1.0 - ((a - b).abs() / tolerance).min(1.0)
}

/// Cosine similarity of two non-negative vectors, clamped to [0, 1].
///
/// The shorter vector is zero-padded. Two all-zero vectors count as
/// identical (1.0); a zero vector against a non-zero one scores 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let len = a.len().max(b.len());
    let at = |v: &[f64], i: usize| v.get(i).copied().unwrap_or(0.0);

    // Exact shortcut so self-similarity is exactly 1.0 despite sqrt rounding
    if (0..len).all(|i| at(a, i) == at(b, i)) {
        return 1.0;
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for i in 0..len {
        let (x, y) = (at(a, i), at(b, i));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0)
}

/// Mean per-class punctuation match over the union of classes present in
/// either histogram. Two empty histograms match perfectly.
pub fn punctuation_match(a: &Fingerprint, b: &Fingerprint, tolerance: f64) -> f64 {
    let classes: std::collections::BTreeSet<PunctuationClass> = a
        .punctuation_histogram
        .keys()
        .chain(b.punctuation_histogram.keys())
        .copied()
        .collect();

    if classes.is_empty() {
        return 1.0;
    }

    let total: f64 = classes
        .iter()
        .map(|&class| scalar_match(a.punctuation(class), b.punctuation(class), tolerance))
        .sum();
    total / classes.len() as f64
}
