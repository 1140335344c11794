// Feature extraction — raw text in, Fingerprint out.
//
// Sentence and token boundaries come from the injected TextAnalyzer; the
// signal vector comes from the pattern dictionary. Everything else is
// counting. Short texts never fail: they come back with
// `low_confidence = true` and the caller decides what to do with them.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use stop_words::{get, LANGUAGE};
use tracing::{debug, info};

use crate::error::{InkprintError, Result};
use crate::nlp::traits::{PosTag, TextAnalyzer, Token};

use super::fingerprint::{Fingerprint, PunctuationClass};
use super::patterns::PatternDictionary;

/// Adverbs allowed between the auxiliary and the participle ("was quickly written").
const MAX_INTERVENING_ADVERBS: usize = 2;

/// Floor for `avg_sentence_length` when a text has no word tokens at all.
const SENTENCE_LENGTH_FLOOR: f64 = 1e-3;

/// Turns text into fingerprints. Holds no mutable state, so one instance
/// can be shared across threads.
pub struct FeatureExtractor {
    analyzer: Arc<dyn TextAnalyzer>,
    dictionary: Arc<PatternDictionary>,
    function_words: HashSet<String>,
    min_words: u32,
}

impl FeatureExtractor {
    pub fn new(
        analyzer: Arc<dyn TextAnalyzer>,
        dictionary: Arc<PatternDictionary>,
        min_words: u32,
    ) -> Self {
        // English stop words double as the function-word list
        let function_words: HashSet<String> = get(LANGUAGE::English).into_iter().collect();
        Self {
            analyzer,
            dictionary,
            function_words,
            min_words,
        }
    }

    pub fn dictionary(&self) -> &PatternDictionary {
        &self.dictionary
    }

    pub fn min_words(&self) -> u32 {
        self.min_words
    }

    /// Build a fingerprint from a text.
    ///
    /// Fails only on empty or whitespace-only input (or if the analyzer
    /// fails). Texts shorter than the configured minimum are flagged
    /// `low_confidence` instead of rejected.
    pub fn extract(&self, text: &str) -> Result<Fingerprint> {
        if text.trim().is_empty() {
            return Err(InkprintError::Input(
                "cannot fingerprint empty or whitespace-only text".to_string(),
            ));
        }

        let analyzed = self.analyzer.analyze(text)?;
        let tokens: Vec<&Token> = analyzed.tokens().collect();
        let word_count = tokens.len();
        let sentence_count = analyzed.sentences.len().max(1);

        let avg_sentence_length =
            (word_count as f64 / sentence_count as f64).max(SENTENCE_LENGTH_FLOOR);

        // Type/token statistics over lemmas
        let mut lemma_counts: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            *lemma_counts.entry(token.lemma.as_str()).or_insert(0) += 1;
        }
        let hapax = lemma_counts.values().filter(|&&n| n == 1).count();
        let function_word_count = tokens
            .iter()
            .filter(|t| {
                let lower = t.text.replace('’', "'").to_lowercase();
                self.function_words.contains(&lower)
            })
            .count();

        let (lexical_diversity, hapax_ratio, function_word_ratio) = if word_count == 0 {
            (0.0, 0.0, 0.0)
        } else {
            let n = word_count as f64;
            (
                lemma_counts.len() as f64 / n,
                hapax as f64 / n,
                function_word_count as f64 / n,
            )
        };

        // Passive voice: auxiliary + participle sequences per finite clause
        let passives: usize = analyzed
            .sentences
            .iter()
            .map(|s| count_passives(&s.tokens))
            .sum();
        let clause_markers = tokens
            .iter()
            .filter(|t| t.tag == PosTag::Subordinator)
            .count()
            + text.matches(';').count();
        let clauses = sentence_count + clause_markers;
        let passive_voice_ratio = (passives as f64 / clauses as f64).clamp(0.0, 1.0);

        let punctuation_histogram: BTreeMap<PunctuationClass, f64> = count_punctuation(text)
            .into_iter()
            .map(|(class, count)| (class, per_thousand(count, word_count)))
            .collect();

        let signal_vector: Vec<f64> = self
            .dictionary
            .scan(text)
            .into_iter()
            .map(|count| per_thousand(count, word_count))
            .collect();

        let sample_word_count = u32::try_from(word_count).unwrap_or(u32::MAX);
        let low_confidence = sample_word_count < self.min_words;

        debug!(
            words = word_count,
            sentences = sentence_count,
            passives,
            dictionary = self.dictionary.version(),
            "Extracted fingerprint"
        );
        if low_confidence {
            info!(
                words = word_count,
                min_words = self.min_words,
                "Sample below minimum length, fingerprint marked low confidence"
            );
        }

        Ok(Fingerprint {
            subject_id: None,
            avg_sentence_length,
            lexical_diversity,
            passive_voice_ratio,
            hapax_ratio,
            function_word_ratio,
            punctuation_histogram,
            signal_vector,
            dictionary_version: self.dictionary.version().to_string(),
            sample_word_count,
            sentence_count: u32::try_from(sentence_count).unwrap_or(u32::MAX),
            low_confidence,
            created_at: Utc::now(),
        })
    }
}

/// Occurrences per 1000 words. Texts without words normalize against 1.
fn per_thousand(count: usize, words: usize) -> f64 {
    count as f64 * 1000.0 / words.max(1) as f64
}

/// Count auxiliary + past participle sequences in one sentence.
///
/// "has been written" counts once: "has" is a plain auxiliary and only
/// "been" can open the passive.
pub fn count_passives(tokens: &[Token]) -> usize {
    let mut count = 0;
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].tag == PosTag::PassiveAuxiliary {
            let mut j = i + 1;
            while j < tokens.len()
                && j - i - 1 < MAX_INTERVENING_ADVERBS
                && tokens[j].tag == PosTag::Adverb
            {
                j += 1;
            }
            if tokens.get(j).is_some_and(|t| t.tag == PosTag::PastParticiple) {
                count += 1;
                i = j + 1;
                continue;
            }
        }
        i += 1;
    }

    count
}

/// Count punctuation marks by class. Runs of three or more periods are one
/// ellipsis; runs of two or more hyphens are one dash.
pub fn count_punctuation(text: &str) -> BTreeMap<PunctuationClass, usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut counts = BTreeMap::new();
    let mut i = 0;

    while i < chars.len() {
        let run_of = |target: char| chars[i..].iter().take_while(|&&c| c == target).count();

        let (class, width) = match chars[i] {
            '.' => {
                let run = run_of('.');
                if run >= 3 {
                    (Some(PunctuationClass::Ellipsis), run)
                } else {
                    (Some(PunctuationClass::Period), 1)
                }
            }
            '-' => {
                let run = run_of('-');
                if run >= 2 {
                    (Some(PunctuationClass::Dash), run)
                } else {
                    (None, 1)
                }
            }
            '…' => (Some(PunctuationClass::Ellipsis), 1),
            '—' | '–' => (Some(PunctuationClass::Dash), 1),
            ',' => (Some(PunctuationClass::Comma), 1),
            ';' => (Some(PunctuationClass::Semicolon), 1),
            ':' => (Some(PunctuationClass::Colon), 1),
            '?' => (Some(PunctuationClass::Question), 1),
            '!' => (Some(PunctuationClass::Exclamation), 1),
            '"' | '“' | '”' => (Some(PunctuationClass::Quote), 1),
            '(' | ')' => (Some(PunctuationClass::Parenthesis), 1),
            '\'' | '’' => (Some(PunctuationClass::Apostrophe), 1),
            _ => (None, 1),
        };

        if let Some(class) = class {
            *counts.entry(class).or_insert(0) += 1;
        }
        i += width;
    }

    counts
}
