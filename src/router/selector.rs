//! Working-model selection by sequential probing.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use crate::config::DEFAULT_MODEL_CANDIDATES;

/// Ordered, immutable list of candidate model identifiers.
///
/// Cheap to clone; shared by every request for the life of the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelCandidates(Arc<[String]>);

impl ModelCandidates {
    pub fn new(models: Vec<String>) -> Self {
        Self(models.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ModelCandidates {
    fn default() -> Self {
        Self::new(
            DEFAULT_MODEL_CANDIDATES
                .iter()
                .map(|m| m.to_string())
                .collect(),
        )
    }
}

/// Result of probing the candidate list for one request.
#[derive(Debug)]
pub enum ProbeOutcome<E> {
    /// A candidate answered; `attempts` counts probes sent, including the winner.
    Selected { model: String, attempts: usize },
    /// Every candidate failed. `last_error` is `None` only for an empty list.
    Exhausted {
        last_error: Option<E>,
        attempts: usize,
    },
}

impl<E> ProbeOutcome<E> {
    pub fn attempts(&self) -> usize {
        match self {
            ProbeOutcome::Selected { attempts, .. } => *attempts,
            ProbeOutcome::Exhausted { attempts, .. } => *attempts,
        }
    }
}

/// Probe candidates in order and stop at the first one that succeeds.
///
/// Probes run strictly one after another. A failure is remembered and the
/// next candidate is tried; only the most recent failure survives.
pub async fn probe_candidates<E, F, Fut>(
    candidates: &ModelCandidates,
    mut probe: F,
) -> ProbeOutcome<E>
where
    E: Display,
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let mut last_error: Option<E> = None;
    let mut attempts = 0;

    for model in candidates.iter() {
        attempts += 1;

        match probe(model.to_string()).await {
            Ok(()) => {
                tracing::info!(model = %model, attempts, "Model probe succeeded");
                return ProbeOutcome::Selected {
                    model: model.to_string(),
                    attempts,
                };
            }
            Err(err) => {
                tracing::warn!(model = %model, error = %err, "Model probe failed");
                last_error = Some(err);
            }
        }
    }

    ProbeOutcome::Exhausted {
        last_error,
        attempts,
    }
}
