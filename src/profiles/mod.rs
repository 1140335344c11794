// Author profiles — the only mutable shared state in the engine.
//
// `store` owns the create-or-merge lifecycle on top of an atomic repository
// update; `merge` is the pure averaging rule it applies.

pub mod merge;
pub mod store;
