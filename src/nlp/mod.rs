// NLP boundary — sentence segmentation, tokenization and coarse POS tagging.
//
// The feature extractor only talks to the `TextAnalyzer` trait. The
// rule-based analyzer is the default; a real tagging pipeline can be
// swapped in without touching the rest of the crate.

pub mod rules;
pub mod traits;
