// Text analyzer trait — swap-ready abstraction over the NLP pipeline.
//
// Like the profile repository, this keeps an external collaborator behind a
// trait so engines can be built with a stub analyzer in tests.

use crate::error::Result;

/// Coarse part-of-speech classes. Only the distinctions the stylometric
/// features need are modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    /// Forms of "be" and "get" that can introduce a passive construction.
    PassiveAuxiliary,
    /// Other auxiliaries and modals (have, do, will, can, ...).
    Auxiliary,
    PastParticiple,
    Adverb,
    Pronoun,
    /// Subordinating conjunctions and relative pronouns that open a clause.
    Subordinator,
    Number,
    Word,
}

/// A single word token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub text: String,
    /// Normalized form used for type/token statistics.
    pub lemma: String,
    pub tag: PosTag,
}

/// One sentence worth of tokens. A sentence may be empty when the text
/// contains only punctuation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sentence {
    pub tokens: Vec<Token>,
}

/// Output of the analyzer for a whole text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalyzedText {
    pub sentences: Vec<Sentence>,
}

impl AnalyzedText {
    /// Total number of word tokens across all sentences.
    pub fn word_count(&self) -> usize {
        self.sentences.iter().map(|s| s.tokens.len()).sum()
    }

    /// Iterate every token in document order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.sentences.iter().flat_map(|s| s.tokens.iter())
    }
}

/// Trait for turning raw text into sentences of tagged tokens.
pub trait TextAnalyzer: Send + Sync {
    /// Analyze a non-empty text. Implementations must return at least one
    /// sentence for any text that is not whitespace-only.
    fn analyze(&self, text: &str) -> Result<AnalyzedText>;
}
