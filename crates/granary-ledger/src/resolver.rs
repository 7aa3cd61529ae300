//! Pending-work resolver
//!
//! Answers the one question the training/prediction runner asks:
//! which aggregate artifacts has this model not consumed yet? Per
//! artifact the lifecycle is created, then eligible-pending, then
//! consumed; there is no way back, and reprocessing requires a fresh
//! merge producing a new handle.

use crate::error::LedgerError;
use crate::ledger::{ConsumptionLedger, LedgerBackend};
use crate::record::{ConsumptionAction, ConsumptionRecord};
use granary_artifact::{ArtifactBackend, ArtifactHandle, DatasetStore, Labelling};
use indexmap::IndexMap;

/// Resolves pending work against a store and a consumption ledger
#[derive(Debug)]
pub struct WorkResolver<'a, B: ArtifactBackend, L: LedgerBackend> {
    store: &'a DatasetStore<B>,
    ledger: &'a ConsumptionLedger<L>,
}

impl<'a, B: ArtifactBackend, L: LedgerBackend> WorkResolver<'a, B, L> {
    /// Bind a resolver to a store and a ledger
    #[inline]
    #[must_use]
    pub fn new(store: &'a DatasetStore<B>, ledger: &'a ConsumptionLedger<L>) -> Self {
        Self { store, ledger }
    }

    /// Record that a model consumed an artifact for an action
    ///
    /// Idempotent: repeating the same (model, artifact, action) tuple
    /// succeeds and leaves one logical record. Callers report only
    /// successful processing; a failed run must not be recorded.
    ///
    /// # Errors
    /// - [`LedgerError::NotFound`] if the handle does not resolve in the store
    /// - [`LedgerError::WriteFailed`] if the ledger backend cannot persist
    pub fn record_consumption(
        &self,
        model_id: u64,
        artifact: ArtifactHandle,
        action: ConsumptionAction,
    ) -> Result<(), LedgerError> {
        if !self.store.contains(&artifact) {
            return Err(LedgerError::NotFound(artifact));
        }
        self.ledger
            .record(ConsumptionRecord::new(model_id, artifact, action))
    }

    /// Not-yet-consumed aggregate artifacts, grouped by
    /// time-partitioning method
    ///
    /// Selects labelled aggregates when `want_training` is true,
    /// unlabelled otherwise. Evaluation-flagged aggregates are never
    /// pending. Artifacts already consumed for the matching action
    /// (`Trained` when training, `Predicted` otherwise) are excluded;
    /// the other action's history is irrelevant. Only methods named in
    /// `time_splitting_methods` are considered, and a method with
    /// nothing pending is absent from the result rather than mapped to
    /// an empty list. Within each method the order is creation order,
    /// oldest first.
    #[must_use]
    pub fn pending_artifacts<S: AsRef<str>>(
        &self,
        model_id: u64,
        want_training: bool,
        time_splitting_methods: &[S],
    ) -> IndexMap<String, Vec<ArtifactHandle>> {
        let (labelling, action) = if want_training {
            (Labelling::Labelled, ConsumptionAction::Trained)
        } else {
            (Labelling::Unlabelled, ConsumptionAction::Predicted)
        };
        let consumed = self.ledger.consumed_for(model_id, action);

        let mut pending: IndexMap<String, Vec<ArtifactHandle>> = IndexMap::new();
        for artifact in self.store.aggregates_for(model_id, labelling) {
            if artifact.scope.is_evaluation() {
                continue;
            }
            let Some(method) = artifact.scope.time_splitting() else {
                continue;
            };
            if !time_splitting_methods.iter().any(|m| m.as_ref() == method) {
                continue;
            }
            if consumed.contains(&artifact.handle) {
                continue;
            }
            pending
                .entry(method.to_string())
                .or_default()
                .push(artifact.handle);
        }
        tracing::debug!(
            model_id,
            want_training,
            methods = pending.len(),
            "resolved pending artifacts"
        );
        pending
    }
}
