// Feature extraction — fingerprints, the rhetorical pattern dictionary,
// and the extractor that ties them to the NLP analyzer.

pub mod extractor;
pub mod fingerprint;
pub mod patterns;
