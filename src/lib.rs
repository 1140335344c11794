// Inkprint: forensic authorship attribution and stylistic drift detection
//
// This is the library root. Each module corresponds to a major subsystem:
// text analysis feeds feature extraction, fingerprints are stored as author
// profiles, and the scoring layer compares fingerprints against them.

pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod features;
pub mod nlp;
pub mod output;
pub mod profiles;
pub mod scoring;
pub mod status;

pub use engine::AttributionEngine;
pub use error::{InkprintError, Result};
