// Rhetorical pattern dictionary — the axis labels of the signal vector.
//
// Each entry is a named, case-insensitive regular expression. The entry's
// position is its dimension index, so the dictionary length is the signal
// vector length everywhere in the system. Changing the dictionary means
// bumping its version: fingerprints built under another version are still
// comparable (zero padding) but get flagged as a dimension mismatch.

use std::collections::HashSet;
use std::path::Path;

use regex_lite::Regex;
use serde::Deserialize;

use crate::error::{InkprintError, Result};

/// Version tag of the built-in dictionary.
pub const BUILTIN_VERSION: &str = "rhetoric-v1";

/// Built-in English rhetorical markers, in dimension order.
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    ("hedging", r"\b(?:perhaps|maybe|arguably|possibly|presumably|somewhat|apparently)\b"),
    ("intensifier", r"\b(?:very|really|extremely|incredibly|absolutely|totally|highly)\b"),
    ("certainty", r"\b(?:clearly|obviously|certainly|undoubtedly|definitely|of course)\b"),
    ("contrast", r"\b(?:however|nevertheless|nonetheless|on the other hand|conversely)\b"),
    ("addition", r"\b(?:moreover|furthermore|in addition|additionally)\b"),
    ("causal", r"\b(?:therefore|thus|hence|consequently|as a result)\b"),
    ("exemplification", r"\b(?:for example|for instance|such as|e\.g\.)"),
    ("conclusion", r"\b(?:in conclusion|to summarize|in summary|ultimately)\b"),
    ("first_person_singular", r"\b(?:i|me|my|mine|myself)\b"),
    ("first_person_plural", r"\b(?:we|us|our|ours|ourselves)\b"),
    ("second_person", r"\b(?:you|your|yours|yourself|yourselves)\b"),
    ("negation", r"\b(?:not|no|never|nothing|nobody|none|neither|nor)\b|n['’]t\b"),
    ("contraction", r"\b[a-z]+['’](?:s|re|ve|ll|d|m|t)\b"),
    ("rhetorical_question", r"\b(?:why|how|what|who|isn['’]t it|don['’]t you)\b[^.!?]*\?"),
    ("exclamation", r"!"),
    ("direct_quote", r#""[^"]+"|“[^”]+”"#),
    ("parenthetical", r"\([^)]*\)"),
    ("enumeration", r"\b(?:firstly|secondly|thirdly|finally|lastly)\b"),
    ("comparative", r"\b(?:more|less|better|worse|greater|fewer)\s+than\b"),
    ("superlative", r"\b(?:most|least|best|worst)\b"),
    ("temporal_framing", r"\b(?:today|now|currently|nowadays|recently|yesterday|tomorrow)\b"),
    ("obligation", r"\b(?:must|should|ought to|have to|need to)\b"),
    ("emphasis", r"\b(?:indeed|in fact|actually|truly)\b"),
    ("conditional", r"\b(?:unless|provided that|assuming that|if)\b"),
    (
        "source_attribution",
        r"\b(?:according to|studies show|research suggests|evidence suggests)\b",
    ),
    ("colloquial", r"\b(?:gonna|wanna|gotta|kinda|sorta|yeah|lol|okay|stuff|guys)\b"),
];

/// One dictionary entry.
#[derive(Debug, Clone)]
pub struct RhetoricalPattern {
    pub name: String,
    regex: Regex,
}

impl RhetoricalPattern {
    /// Number of non-overlapping matches in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }
}

/// An ordered, versioned set of rhetorical patterns.
#[derive(Debug, Clone)]
pub struct PatternDictionary {
    version: String,
    patterns: Vec<RhetoricalPattern>,
}

/// On-disk JSON shape of a dictionary.
#[derive(Debug, Deserialize)]
struct DictionaryFile {
    version: String,
    patterns: Vec<PatternEntry>,
}

#[derive(Debug, Deserialize)]
struct PatternEntry {
    name: String,
    pattern: String,
}

impl PatternDictionary {
    /// Build a dictionary from (name, regex) pairs. Matching is always
    /// case-insensitive. Fails on an empty list, duplicate names, or an
    /// invalid regular expression.
    pub fn new<I, N, P>(version: impl Into<String>, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: AsRef<str>,
    {
        let version = version.into();
        if version.trim().is_empty() {
            return Err(InkprintError::Config(
                "pattern dictionary version must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        let mut patterns = Vec::new();
        for (name, pattern) in entries {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(InkprintError::Config(format!(
                    "duplicate pattern name '{name}' in dictionary {version}"
                )));
            }
            let regex = Regex::new(&format!("(?i){}", pattern.as_ref())).map_err(|e| {
                InkprintError::Config(format!("pattern '{name}' is not a valid regex: {e}"))
            })?;
            patterns.push(RhetoricalPattern { name, regex });
        }

        if patterns.is_empty() {
            return Err(InkprintError::Config(format!(
                "pattern dictionary {version} has no entries"
            )));
        }

        Ok(Self { version, patterns })
    }

    /// The built-in English dictionary.
    pub fn builtin() -> Result<Self> {
        Self::new(BUILTIN_VERSION, BUILTIN_PATTERNS.iter().copied())
    }

    /// Parse a dictionary from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        let file: DictionaryFile = serde_json::from_str(json)
            .map_err(|e| InkprintError::Config(format!("malformed pattern dictionary: {e}")))?;
        Self::new(
            file.version,
            file.patterns.into_iter().map(|p| (p.name, p.pattern)),
        )
    }

    /// Load a dictionary from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            InkprintError::Config(format!(
                "cannot read pattern dictionary {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&json)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Dimensionality of every signal vector built with this dictionary.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.patterns.iter().map(|p| p.name.clone()).collect()
    }

    /// Raw match counts for every pattern, in dimension order.
    pub fn scan(&self, text: &str) -> Vec<usize> {
        self.patterns.iter().map(|p| p.count(text)).collect()
    }
}
