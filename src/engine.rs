// AttributionEngine — the public entry point wiring every component together.
//
// The engine is built once with its collaborators injected (text analyzer,
// profile repository, pattern dictionary, validated config) and is then
// shared freely: every method takes `&self` and the type is Send + Sync.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::db::models::AuthorProfile;
use crate::db::traits::ProfileRepository;
use crate::error::Result;
use crate::features::extractor::FeatureExtractor;
use crate::features::fingerprint::Fingerprint;
use crate::features::patterns::PatternDictionary;
use crate::nlp::rules::RuleBasedAnalyzer;
use crate::nlp::traits::TextAnalyzer;
use crate::profiles::store::ProfileStore;
use crate::scoring::anomaly::{AnomalyDetector, AnomalyReport};
use crate::scoring::attribution::{AttributionResult, AttributionScorer, RankedAttributions};
use crate::scoring::deadline::Deadline;
use crate::scoring::similarity::{Similarity, SimilarityEngine};

pub struct AttributionEngine {
    config: EngineConfig,
    extractor: Arc<FeatureExtractor>,
    store: Arc<ProfileStore>,
    similarity: SimilarityEngine,
    scorer: AttributionScorer,
    detector: AnomalyDetector,
}

impl AttributionEngine {
    /// Build an engine. Fails with `Config` if `config` doesn't validate.
    pub fn new(
        analyzer: Arc<dyn TextAnalyzer>,
        repository: Arc<dyn ProfileRepository>,
        dictionary: PatternDictionary,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let extractor = Arc::new(FeatureExtractor::new(
            analyzer,
            Arc::new(dictionary),
            config.min_words,
        ));
        let store = Arc::new(ProfileStore::new(repository, config.min_words));
        let similarity = SimilarityEngine::new(config.tolerances, config.weights);
        let scorer = AttributionScorer::new(Arc::clone(&store), similarity.clone(), config.tiers);
        let detector = AnomalyDetector::new(
            Arc::clone(&store),
            Arc::clone(&extractor),
            config.anomaly_thresholds,
        );

        Ok(Self {
            config,
            extractor,
            store,
            similarity,
            scorer,
            detector,
        })
    }

    /// Rule-based analyzer, built-in dictionary and default config.
    pub fn with_defaults(repository: Arc<dyn ProfileRepository>) -> Result<Self> {
        Self::new(
            Arc::new(RuleBasedAnalyzer),
            repository,
            PatternDictionary::builtin()?,
            EngineConfig::default(),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &PatternDictionary {
        self.extractor.dictionary()
    }

    pub fn extract_fingerprint(&self, text: &str) -> Result<Fingerprint> {
        self.extractor.extract(text)
    }

    /// Create or merge an author profile. Returns the author id.
    pub fn save_profile(&self, fingerprint: &Fingerprint, display_name: &str) -> Result<String> {
        self.store.save(fingerprint, display_name)
    }

    /// Every profile scoring at least `min_confidence`, best first.
    pub fn compare_to_profiles(
        &self,
        fingerprint: &Fingerprint,
        min_confidence: f64,
    ) -> Result<Vec<AttributionResult>> {
        self.scorer.rank(fingerprint, min_confidence)
    }

    pub fn compare_to_profiles_with_deadline(
        &self,
        fingerprint: &Fingerprint,
        min_confidence: f64,
        deadline: &Deadline,
    ) -> Result<RankedAttributions> {
        self.scorer
            .rank_with_deadline(fingerprint, min_confidence, deadline)
    }

    /// Fingerprint `text` and score it against one author.
    pub fn attribution_score(&self, text: &str, author_id: &str) -> Result<AttributionResult> {
        let fingerprint = self.extractor.extract(text)?;
        self.scorer.score(&fingerprint, author_id)
    }

    /// Compare `text` against the author's stored baseline. Read-only.
    pub fn detect_anomalies(&self, author_id: &str, text: &str) -> Result<AnomalyReport> {
        self.detector.evaluate(author_id, text)
    }

    pub fn similarity(&self, a: &Fingerprint, b: &Fingerprint) -> Similarity {
        self.similarity.similarity(a, b)
    }

    pub fn get_profile(&self, author_id: &str) -> Result<AuthorProfile> {
        self.store.get(author_id)
    }

    pub fn list_profiles(&self) -> Result<Vec<AuthorProfile>> {
        self.store.list()
    }

    pub fn profile_count(&self) -> Result<usize> {
        self.store.count()
    }

    pub fn delete_profile(&self, author_id: &str) -> Result<bool> {
        self.store.delete(author_id)
    }

    pub fn stale_profiles(&self, max_age_days: i64) -> Result<Vec<String>> {
        self.store.stale(max_age_days)
    }
}
