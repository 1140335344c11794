// Composition tests — verifying that the components chain together.
//
// These tests exercise the full data flow through the engine:
//   Text -> Analyzer -> Fingerprint -> ProfileStore -> Similarity -> Scores
// using the in-memory repository (and in-memory SQLite when the feature is
// on), so there are no network calls or filesystem side effects.

use std::sync::Arc;

use inkprint::db::memory::MemoryProfileRepository;
use inkprint::error::InkprintError;
use inkprint::scoring::anomaly::Severity;
use inkprint::scoring::attribution::ConfidenceLevel;
use inkprint::scoring::deadline::Deadline;
use inkprint::AttributionEngine;

const ACADEMIC: &str = "The results of the longitudinal study were analyzed using a \
mixed-effects model, which accounted for variation between participating institutions \
over the entire observation period. It was observed that retention rates were \
substantially influenced by the availability of structured mentoring programs and by the \
frequency of formal academic feedback. Furthermore, the relationship between early \
assessment scores and subsequent completion was found to be moderated by socioeconomic \
background, although the effect size remained modest across all cohorts. These findings \
are consistent with previous research conducted in comparable educational settings; \
however, the generalizability of the conclusions is limited by the reliance on \
self-reported survey measures. Consequently, further investigation is required to \
establish whether the observed associations reflect causal mechanisms or merely \
correlational patterns.";

// Same paragraph with two words swapped for synonyms
const ACADEMIC_NEAR_DUPLICATE: &str = "The results of the longitudinal study were analyzed \
using a mixed-effects model, which accounted for variation between participating \
institutions over the entire observation period. It was observed that retention rates \
were considerably influenced by the availability of structured mentoring programs and by \
the frequency of formal academic feedback. Furthermore, the relationship between early \
assessment scores and subsequent completion was found to be moderated by socioeconomic \
background, although the effect size remained small across all cohorts. These findings \
are consistent with previous research conducted in comparable educational settings; \
however, the generalizability of the conclusions is limited by the reliance on \
self-reported survey measures. Consequently, further investigation is required to \
establish whether the observed associations reflect causal mechanisms or merely \
correlational patterns.";

const CASUAL: &str = "Okay so I tried the new cafe today! Honestly it was great. My \
coffee was huge. I loved it so much! We sat outside. You gotta go there. Yeah, the cake \
was kinda dry though. But whatever! I'm going back tomorrow for sure. My friend says the \
pancakes are amazing. Can't wait!";

fn engine() -> AttributionEngine {
    AttributionEngine::with_defaults(Arc::new(MemoryProfileRepository::new())).unwrap()
}

/// Engine with one academic and one casual author enrolled.
fn enrolled() -> (AttributionEngine, String, String) {
    let engine = engine();
    let academic = engine.extract_fingerprint(ACADEMIC).unwrap();
    let casual = engine.extract_fingerprint(CASUAL).unwrap();
    let academic_id = engine.save_profile(&academic, "Dr. Formal").unwrap();
    let casual_id = engine.save_profile(&casual, "Casual Cat").unwrap();
    (engine, academic_id, casual_id)
}

// ============================================================
// Chain: Text -> Fingerprint
// ============================================================

#[test]
fn fingerprints_are_well_formed_for_varied_inputs() {
    let engine = engine();
    let inputs = [
        ACADEMIC,
        CASUAL,
        "a",
        "!!!",
        "...",
        "Wait -- what? (Really!) \"Yes,\" she said; fine: done...",
        "Emoji only 🎉🎉",
        "no punctuation at all just words running on and on",
    ];
    for text in inputs {
        let fp = engine.extract_fingerprint(text).unwrap();
        assert!(fp.avg_sentence_length > 0.0, "avg sentence length for {text:?}");
        assert!(
            fp.signal_vector.iter().all(|&v| v >= 0.0),
            "negative signal for {text:?}"
        );
        assert_eq!(fp.signal_vector.len(), engine.dictionary().len());
        assert!(fp.punctuation_histogram.values().all(|&v| v >= 0.0));
        assert!((0.0..=1.0).contains(&fp.passive_voice_ratio));
    }
}

#[test]
fn empty_text_is_input_error() {
    let engine = engine();
    for text in ["", "   ", "\n\t\n"] {
        assert!(matches!(
            engine.extract_fingerprint(text),
            Err(InkprintError::Input(_))
        ));
    }
}

#[test]
fn three_word_text_is_low_confidence() {
    let fp = engine().extract_fingerprint("The cat sat.").unwrap();
    assert!(fp.low_confidence);
    assert_eq!(fp.sample_word_count, 3);
}

#[test]
fn academic_text_detects_passive_voice() {
    let fp = engine().extract_fingerprint(ACADEMIC).unwrap();
    assert!(!fp.low_confidence);
    assert!(fp.passive_voice_ratio > 0.3);
    assert!(fp.avg_sentence_length > 20.0);
}

// ============================================================
// Chain: Fingerprint -> Similarity
// ============================================================

#[test]
fn extracted_fingerprint_is_identical_to_itself() {
    let engine = engine();
    for text in [ACADEMIC, CASUAL, "The cat sat."] {
        let fp = engine.extract_fingerprint(text).unwrap();
        assert_eq!(engine.similarity(&fp, &fp).overall, 1.0);
    }
}

#[test]
fn near_duplicate_paragraphs_are_highly_similar() {
    let engine = engine();
    let a = engine.extract_fingerprint(ACADEMIC).unwrap();
    let b = engine.extract_fingerprint(ACADEMIC_NEAR_DUPLICATE).unwrap();
    let overall = engine.similarity(&a, &b).overall;
    assert!(overall > 0.9, "near duplicates scored {overall}");
}

#[test]
fn different_registers_are_less_similar_than_duplicates() {
    let engine = engine();
    let academic = engine.extract_fingerprint(ACADEMIC).unwrap();
    let near = engine.extract_fingerprint(ACADEMIC_NEAR_DUPLICATE).unwrap();
    let casual = engine.extract_fingerprint(CASUAL).unwrap();
    assert!(
        engine.similarity(&academic, &casual).overall < engine.similarity(&academic, &near).overall
    );
}

// ============================================================
// Chain: Fingerprint -> Profiles -> Attribution
// ============================================================

#[test]
fn empty_store_compares_to_nothing() {
    let engine = engine();
    let fp = engine.extract_fingerprint(ACADEMIC).unwrap();
    assert!(engine.compare_to_profiles(&fp, 0.0).unwrap().is_empty());
}

#[test]
fn unknown_text_ranks_its_author_first() {
    let (engine, academic_id, _) = enrolled();
    let fp = engine.extract_fingerprint(ACADEMIC_NEAR_DUPLICATE).unwrap();
    let ranked = engine.compare_to_profiles(&fp, 0.0).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate_author_id, academic_id);
    assert_eq!(ranked[0].display_name, "Dr. Formal");
    assert_eq!(ranked[0].confidence_level, ConfidenceLevel::High);
}

#[test]
fn min_confidence_filters_every_result() {
    let (engine, _, _) = enrolled();
    let fp = engine.extract_fingerprint(CASUAL).unwrap();
    for threshold in [0.0, 25.0, 60.0, 90.0, 100.0] {
        let ranked = engine.compare_to_profiles(&fp, threshold).unwrap();
        assert!(ranked.iter().all(|r| r.score >= threshold));
    }
}

#[test]
fn attribution_score_for_enrolled_author() {
    let (engine, academic_id, casual_id) = enrolled();
    let own = engine.attribution_score(ACADEMIC, &academic_id).unwrap();
    let other = engine.attribution_score(ACADEMIC, &casual_id).unwrap();
    assert_eq!(own.score, 100.0);
    assert!(other.score < own.score);
    assert!(matches!(
        engine.attribution_score(ACADEMIC, "nobody"),
        Err(InkprintError::NotFound(_))
    ));
}

#[test]
fn cancelled_scan_is_truncated() {
    let (engine, _, _) = enrolled();
    let fp = engine.extract_fingerprint(CASUAL).unwrap();
    let deadline = Deadline::never();
    deadline.cancel();
    let ranked = engine
        .compare_to_profiles_with_deadline(&fp, 0.0, &deadline)
        .unwrap();
    assert!(ranked.truncated);
    assert_eq!(ranked.profiles_total, 2);
}

#[test]
fn saving_same_fingerprint_twice_approximates_input() {
    let engine = engine();
    let mut fp = engine.extract_fingerprint(ACADEMIC).unwrap();
    let id = engine.save_profile(&fp, "Twice").unwrap();
    fp.subject_id = Some(id.clone());
    engine.save_profile(&fp, "Twice").unwrap();

    let profile = engine.get_profile(&id).unwrap();
    assert_eq!(profile.sample_count, 2);
    let sim = engine.similarity(&profile.fingerprint, &fp);
    assert!(sim.overall > 0.999, "aggregate drifted: {}", sim.overall);
    assert_eq!(profile.fingerprint.sample_word_count, fp.sample_word_count * 2);
}

// ============================================================
// Chain: Profiles -> Anomaly detection
// ============================================================

#[test]
fn identical_sample_has_no_drift() {
    let (engine, academic_id, _) = enrolled();
    let report = engine.detect_anomalies(&academic_id, ACADEMIC).unwrap();
    assert_eq!(report.severity, Severity::None);
    assert!(report.anomalies_detected.is_empty());
}

#[test]
fn casual_sample_drifts_from_academic_baseline() {
    let (engine, academic_id, _) = enrolled();
    let report = engine.detect_anomalies(&academic_id, CASUAL).unwrap();
    assert!(!report.anomalies_detected.is_empty());
    assert_ne!(report.severity, Severity::None);
    assert!((0.0..=1.0).contains(&report.confidence));
}

#[test]
fn drift_check_on_missing_author_is_not_found() {
    let engine = engine();
    assert!(matches!(
        engine.detect_anomalies("ghost", CASUAL),
        Err(InkprintError::NotFound(_))
    ));
}

#[test]
fn deleted_profile_disappears_from_ranking() {
    let (engine, academic_id, _) = enrolled();
    assert!(engine.delete_profile(&academic_id).unwrap());
    let fp = engine.extract_fingerprint(ACADEMIC).unwrap();
    let ranked = engine.compare_to_profiles(&fp, 0.0).unwrap();
    assert!(ranked.iter().all(|r| r.candidate_author_id != academic_id));
    assert_eq!(engine.list_profiles().unwrap().len(), 1);
}

#[test]
fn stale_profiles_rejects_unusable_ages() {
    let (engine, _, _) = enrolled();
    assert!(engine.stale_profiles(90).unwrap().is_empty());
    assert!(matches!(
        engine.stale_profiles(i64::MAX),
        Err(InkprintError::Input(_))
    ));
    assert!(matches!(
        engine.stale_profiles(-7),
        Err(InkprintError::Input(_))
    ));
}

#[cfg(feature = "sqlite")]
#[test]
fn full_flow_against_sqlite() {
    use inkprint::db::SqliteProfileRepository;

    let conn = inkprint::db::initialize(":memory:").unwrap();
    let engine =
        AttributionEngine::with_defaults(Arc::new(SqliteProfileRepository::new(conn))).unwrap();

    let fp = engine.extract_fingerprint(ACADEMIC).unwrap();
    let id = engine.save_profile(&fp, "Dr. Formal").unwrap();

    let near = engine.extract_fingerprint(ACADEMIC_NEAR_DUPLICATE).unwrap();
    let ranked = engine.compare_to_profiles(&near, 50.0).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].candidate_author_id, id);

    let report = engine.detect_anomalies(&id, CASUAL).unwrap();
    assert_ne!(report.severity, Severity::None);
}
