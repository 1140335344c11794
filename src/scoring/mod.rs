// Scoring — fingerprint similarity, attribution tiers, and drift detection.

pub mod anomaly;
pub mod attribution;
pub mod deadline;
pub mod quality;
pub mod similarity;
