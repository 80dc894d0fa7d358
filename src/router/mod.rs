//! Router module for working-model selection.
//!
//! This module handles picking the model a request is served with:
//! - Candidates are tried in fixed preference order
//! - The first candidate that answers a probe wins
//! - The last probe failure is kept for error reporting

mod selector;

pub use selector::{probe_candidates, ModelCandidates, ProbeOutcome};
