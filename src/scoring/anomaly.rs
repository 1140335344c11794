// Stylistic drift detection against an author's stored baseline.
//
// Each metric gets a delta against the baseline and is flagged when the
// delta exceeds its threshold. Severity comes from the flag count, with an
// escalation to critical when any single delta reaches twice its threshold.
//
// Evaluation is read-only. A suspicious sample must never fold itself into
// the baseline it is being judged against; re-baselining is an explicit
// ProfileStore::save.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{InkprintError, Result};
use crate::features::extractor::FeatureExtractor;
use crate::features::fingerprint::{Fingerprint, PunctuationClass};
use crate::profiles::store::ProfileStore;

use super::quality::{self, QualityFlag};
use super::similarity::cosine_similarity;

/// Guards relative deltas against a zero baseline.
const RELATIVE_DELTA_EPSILON: f64 = 1e-9;

/// Per-metric drift thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyThresholds {
    /// Relative change in average sentence length (default 0.25)
    pub sentence_length_shift: f64,
    /// 1 - cosine similarity of signal vectors (default 0.30)
    pub signal_consistency_drop: f64,
    /// Relative change in lexical diversity (default 0.20)
    pub vocabulary_shift: f64,
    /// Total punctuation change relative to the baseline total (default 0.35)
    pub punctuation_variation: f64,
    /// Absolute change in passive voice ratio (default 0.15). Kept low
    /// because voice shifts are a strong synthetic-text indicator.
    pub voice_ratio_shift: f64,
}

impl Default for AnomalyThresholds {
    fn default() -> Self {
        Self {
            sentence_length_shift: 0.25,
            signal_consistency_drop: 0.30,
            vocabulary_shift: 0.20,
            punctuation_variation: 0.35,
            voice_ratio_shift: 0.15,
        }
    }
}

impl AnomalyThresholds {
    pub fn validate(&self) -> Result<()> {
        for metric in DriftMetric::ALL {
            let value = self.threshold(metric);
            if !value.is_finite() || value <= 0.0 {
                return Err(InkprintError::Config(format!(
                    "anomaly threshold '{}' must be positive and finite, got {value}",
                    metric.as_str()
                )));
            }
        }
        Ok(())
    }

    pub fn threshold(&self, metric: DriftMetric) -> f64 {
        match metric {
            DriftMetric::SentenceLengthShift => self.sentence_length_shift,
            DriftMetric::SignalConsistencyDrop => self.signal_consistency_drop,
            DriftMetric::VocabularyShift => self.vocabulary_shift,
            DriftMetric::PunctuationVariation => self.punctuation_variation,
            DriftMetric::VoiceRatioShift => self.voice_ratio_shift,
        }
    }
}

/// The metrics checked for drift, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftMetric {
    SentenceLengthShift,
    SignalConsistencyDrop,
    VocabularyShift,
    PunctuationVariation,
    VoiceRatioShift,
}

impl DriftMetric {
    pub const ALL: [DriftMetric; 5] = [
        DriftMetric::SentenceLengthShift,
        DriftMetric::SignalConsistencyDrop,
        DriftMetric::VocabularyShift,
        DriftMetric::PunctuationVariation,
        DriftMetric::VoiceRatioShift,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DriftMetric::SentenceLengthShift => "sentence_length_shift",
            DriftMetric::SignalConsistencyDrop => "signal_consistency_drop",
            DriftMetric::VocabularyShift => "vocabulary_shift",
            DriftMetric::PunctuationVariation => "punctuation_variation",
            DriftMetric::VoiceRatioShift => "voice_ratio_shift",
        }
    }

    /// Delta of `current` against `baseline` for this metric.
    pub fn delta(&self, baseline: &Fingerprint, current: &Fingerprint) -> f64 {
        match self {
            DriftMetric::SentenceLengthShift => {
                relative_delta(baseline.avg_sentence_length, current.avg_sentence_length)
            }
            DriftMetric::SignalConsistencyDrop => {
                1.0 - cosine_similarity(&baseline.signal_vector, &current.signal_vector)
            }
            DriftMetric::VocabularyShift => {
                relative_delta(baseline.lexical_diversity, current.lexical_diversity)
            }
            DriftMetric::PunctuationVariation => punctuation_variation(baseline, current),
            DriftMetric::VoiceRatioShift => {
                (current.passive_voice_ratio - baseline.passive_voice_ratio).abs()
            }
        }
    }
}

impl std::fmt::Display for DriftMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A metric whose delta exceeded its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricAnomaly {
    pub metric: DriftMetric,
    pub delta: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Severity from the flagged metrics. Any delta at twice its threshold
    /// is critical regardless of how many metrics moved.
    pub fn from_anomalies(anomalies: &[MetricAnomaly]) -> Self {
        let extreme = anomalies.iter().any(|a| a.delta >= 2.0 * a.threshold);
        match anomalies.len() {
            _ if extreme => Severity::Critical,
            0 => Severity::None,
            1 => Severity::Low,
            2 => Severity::Medium,
            3 => Severity::High,
            _ => Severity::Critical,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Drift evaluation for one new sample. `severity == None` is a normal,
/// non-error outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub author_id: String,
    pub severity: Severity,
    /// Flagged metrics, in `DriftMetric::ALL` order
    pub anomalies_detected: Vec<MetricAnomaly>,
    /// 0.0 to 1.0, driven by sample sizes on both sides
    pub confidence: f64,
    pub baseline_fingerprint: Fingerprint,
    pub current_fingerprint: Fingerprint,
    pub quality: Vec<QualityFlag>,
    pub evaluated_at: DateTime<Utc>,
}

/// Compares new samples against stored baselines. Never writes to the store.
pub struct AnomalyDetector {
    store: Arc<ProfileStore>,
    extractor: Arc<FeatureExtractor>,
    thresholds: AnomalyThresholds,
}

impl AnomalyDetector {
    pub fn new(
        store: Arc<ProfileStore>,
        extractor: Arc<FeatureExtractor>,
        thresholds: AnomalyThresholds,
    ) -> Self {
        Self {
            store,
            extractor,
            thresholds,
        }
    }

    /// Extract a fingerprint from `text` and compare it to the author's baseline.
    pub fn evaluate(&self, author_id: &str, text: &str) -> Result<AnomalyReport> {
        let profile = self.store.get(author_id)?;
        let current = self.extractor.extract(text)?;
        let mut report = self.compare(author_id, &profile.fingerprint, current);

        if profile.sample_count <= 1 {
            report.quality.push(QualityFlag::SingleSampleProfile);
        }

        if report.severity >= Severity::High {
            warn!(
                author_id,
                severity = report.severity.as_str(),
                flagged = report.anomalies_detected.len(),
                "Significant stylistic drift detected"
            );
        } else {
            info!(
                author_id,
                severity = report.severity.as_str(),
                flagged = report.anomalies_detected.len(),
                "Evaluated sample against baseline"
            );
        }

        Ok(report)
    }

    /// Compare an already-extracted fingerprint against a baseline.
    pub fn compare(
        &self,
        author_id: &str,
        baseline: &Fingerprint,
        current: Fingerprint,
    ) -> AnomalyReport {
        let anomalies_detected: Vec<MetricAnomaly> = DriftMetric::ALL
            .iter()
            .filter_map(|&metric| {
                let delta = metric.delta(baseline, &current);
                let threshold = self.thresholds.threshold(metric);
                (delta > threshold).then_some(MetricAnomaly {
                    metric,
                    delta,
                    threshold,
                })
            })
            .collect();

        let mismatch = quality::dimension_mismatch(baseline, &current);
        let mut confidence = sample_confidence(baseline.sample_word_count, self.extractor.min_words())
            .min(sample_confidence(current.sample_word_count, self.extractor.min_words()));
        if mismatch {
            confidence /= 2.0;
        }

        let mut flags = Vec::new();
        if baseline.low_confidence || current.low_confidence {
            flags.push(QualityFlag::SmallSample);
        }
        if mismatch {
            flags.push(QualityFlag::DimensionMismatch);
        }

        AnomalyReport {
            author_id: author_id.to_string(),
            severity: Severity::from_anomalies(&anomalies_detected),
            anomalies_detected,
            confidence,
            baseline_fingerprint: baseline.clone(),
            current_fingerprint: current,
            quality: flags,
            evaluated_at: Utc::now(),
        }
    }
}

/// `|current - baseline| / |baseline|`, 0.0 when both are zero.
pub fn relative_delta(baseline: f64, current: f64) -> f64 {
    let diff = (current - baseline).abs();
    if diff == 0.0 {
        return 0.0;
    }
    diff / baseline.abs().max(RELATIVE_DELTA_EPSILON)
}

/// Sum of per-class punctuation changes relative to the baseline total.
pub fn punctuation_variation(baseline: &Fingerprint, current: &Fingerprint) -> f64 {
    let classes: std::collections::BTreeSet<PunctuationClass> = baseline
        .punctuation_histogram
        .keys()
        .chain(current.punctuation_histogram.keys())
        .copied()
        .collect();

    let change: f64 = classes
        .iter()
        .map(|&c| (current.punctuation(c) - baseline.punctuation(c)).abs())
        .sum();
    let baseline_total: f64 = baseline.punctuation_histogram.values().sum();

    change / baseline_total.max(1.0)
}

/// Confidence contribution of a sample size: n / (n + min_words).
fn sample_confidence(words: u32, min_words: u32) -> f64 {
    let n = f64::from(words);
    let total = n + f64::from(min_words);
    if total == 0.0 {
        return 0.0;
    }
    n / total
}
