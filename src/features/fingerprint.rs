// Fingerprint — the structured representation of how someone writes.
//
// A fingerprint is a handful of scalar style metrics plus a signal vector
// indexed against the rhetorical pattern dictionary. It is a fixed-shape
// record so it can be compared, averaged and stored as JSON without any
// dictionary-shaped guesswork.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Punctuation classes counted in the histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationClass {
    Comma,
    Period,
    Semicolon,
    Colon,
    Question,
    Exclamation,
    /// Em dash, en dash, or a typed double hyphen.
    Dash,
    Ellipsis,
    Quote,
    Parenthesis,
    Apostrophe,
}

impl PunctuationClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            PunctuationClass::Comma => "comma",
            PunctuationClass::Period => "period",
            PunctuationClass::Semicolon => "semicolon",
            PunctuationClass::Colon => "colon",
            PunctuationClass::Question => "question",
            PunctuationClass::Exclamation => "exclamation",
            PunctuationClass::Dash => "dash",
            PunctuationClass::Ellipsis => "ellipsis",
            PunctuationClass::Quote => "quote",
            PunctuationClass::Parenthesis => "parenthesis",
            PunctuationClass::Apostrophe => "apostrophe",
        }
    }
}

impl std::fmt::Display for PunctuationClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A complete stylometric fingerprint for one text (or an aggregate of many).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fingerprint {
    /// Author this sample belongs to, when known. Drives create-vs-merge on save.
    pub subject_id: Option<String>,
    /// Words per sentence (always > 0)
    pub avg_sentence_length: f64,
    /// Unique lemmas / total tokens
    pub lexical_diversity: f64,
    /// Passive constructions / finite clauses, in [0, 1]
    pub passive_voice_ratio: f64,
    /// Share of tokens whose lemma occurs exactly once
    pub hapax_ratio: f64,
    /// Share of tokens that are function words
    pub function_word_ratio: f64,
    /// Punctuation class -> occurrences per 1000 words. Absent classes are 0.
    pub punctuation_histogram: BTreeMap<PunctuationClass, f64>,
    /// Occurrences per 1000 words for each pattern, in dictionary order
    pub signal_vector: Vec<f64>,
    /// Version of the pattern dictionary that produced `signal_vector`
    pub dictionary_version: String,
    pub sample_word_count: u32,
    pub sentence_count: u32,
    /// True when the sample is too short for reliable comparison
    pub low_confidence: bool,
    pub created_at: DateTime<Utc>,
}

impl Fingerprint {
    /// Attach an author id, marking this sample as evidence for that author.
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Frequency for a punctuation class, 0.0 when the class never occurred.
    pub fn punctuation(&self, class: PunctuationClass) -> f64 {
        self.punctuation_histogram.get(&class).copied().unwrap_or(0.0)
    }

    /// Signal value at a dimension, 0.0 past the end of the vector.
    pub fn signal(&self, index: usize) -> f64 {
        self.signal_vector.get(index).copied().unwrap_or(0.0)
    }

    /// Display the fingerprint as a formatted summary in the terminal.
    ///
    /// `pattern_names` labels the signal dimensions; only non-zero
    /// dimensions are drawn so a short sample stays readable.
    pub fn display(&self, pattern_names: &[String]) {
        println!(
            "\n{}",
            format!(
                "=== Fingerprint ({} words, {} sentences, dictionary {}) ===",
                self.sample_word_count, self.sentence_count, self.dictionary_version
            )
            .bold()
        );
        if self.low_confidence {
            println!(
                "  {}",
                "Low confidence: sample is too short for reliable attribution".yellow()
            );
        }
        println!();

        println!("  Avg sentence length:  {:.1} words", self.avg_sentence_length);
        println!("  Lexical diversity:    {:.3}", self.lexical_diversity);
        println!("  Passive voice ratio:  {:.3}", self.passive_voice_ratio);
        println!("  Hapax ratio:          {:.3}", self.hapax_ratio);
        println!("  Function-word ratio:  {:.3}", self.function_word_ratio);
        println!();

        if !self.punctuation_histogram.is_empty() {
            println!("  {}", "Punctuation (per 1000 words)".bold());
            for (class, freq) in &self.punctuation_histogram {
                println!("    {:<14} {:>8.1}", class.as_str(), freq);
            }
            println!();
        }

        let max_signal = self.signal_vector.iter().copied().fold(0.0_f64, f64::max);
        if max_signal <= 0.0 {
            println!("  {}", "No rhetorical patterns detected".dimmed());
            return;
        }

        println!("  {}", "Rhetorical signals (per 1000 words)".bold());
        let bar_width: usize = 20;
        for (i, value) in self.signal_vector.iter().enumerate() {
            if *value <= 0.0 {
                continue;
            }
            let name = pattern_names.get(i).map(String::as_str).unwrap_or("?");
            let filled = ((value / max_signal) * bar_width as f64).round() as usize;
            let bar = format!(
                "[{}{}]",
                "=".repeat(filled),
                " ".repeat(bar_width.saturating_sub(filled))
            );
            println!("    {:<26} {} {:>7.1}", name, bar.bright_blue(), value);
        }
    }
}
