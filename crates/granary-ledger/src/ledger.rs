//! The append-only consumption ledger
//!
//! [`LedgerBackend`] is the persistence collaborator: a simple
//! append-only table of (model, artifact, action, time). Recording the
//! same logical consumption twice must succeed; the query side
//! deduplicates by artifact handle.

use crate::error::LedgerError;
use crate::record::{ConsumptionAction, ConsumptionRecord};
use granary_artifact::ArtifactHandle;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Persistence collaborator for consumption records
///
/// # Contract
/// - `append` is an idempotent upsert: concurrent appends of the
///   identical (model, artifact, action) tuple both succeed
/// - reads reflect every append committed before the read began
pub trait LedgerBackend: Send + Sync {
    /// Append one consumption record
    ///
    /// # Errors
    /// [`LedgerError::WriteFailed`] if the backend cannot persist.
    fn append(&self, record: ConsumptionRecord) -> Result<(), LedgerError>;

    /// Handles consumed by a model for an action, deduplicated
    fn consumed(&self, model_id: u64, action: ConsumptionAction) -> HashSet<ArtifactHandle>;

    /// Whether one specific consumption is on record
    fn is_consumed(&self, model_id: u64, artifact: &ArtifactHandle, action: ConsumptionAction) -> bool {
        self.consumed(model_id, action).contains(artifact)
    }
}

/// In-memory reference ledger
///
/// Keeps the raw append-only log, duplicates included; queries
/// deduplicate. Read-after-write consistent through the `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: RwLock<Vec<ConsumptionRecord>>,
}

impl MemoryLedger {
    /// Empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw appends, duplicates included
    #[must_use]
    pub fn raw_len(&self) -> usize {
        self.records.read().len()
    }

    /// Snapshot of the raw log in append order
    #[must_use]
    pub fn records(&self) -> Vec<ConsumptionRecord> {
        self.records.read().clone()
    }
}

impl LedgerBackend for MemoryLedger {
    fn append(&self, record: ConsumptionRecord) -> Result<(), LedgerError> {
        self.records.write().push(record);
        Ok(())
    }

    fn consumed(&self, model_id: u64, action: ConsumptionAction) -> HashSet<ArtifactHandle> {
        self.records
            .read()
            .iter()
            .filter(|record| record.model_id == model_id && record.action == action)
            .map(|record| record.artifact)
            .collect()
    }
}

/// Typed front door over a ledger backend
#[derive(Debug)]
pub struct ConsumptionLedger<L: LedgerBackend> {
    backend: L,
}

impl<L: LedgerBackend> ConsumptionLedger<L> {
    /// Wrap a ledger backend
    #[inline]
    #[must_use]
    pub fn new(backend: L) -> Self {
        Self { backend }
    }

    /// Access the underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &L {
        &self.backend
    }

    /// Append one record; duplicates of a logical consumption are harmless
    ///
    /// # Errors
    /// [`LedgerError::WriteFailed`] if the backend cannot persist.
    pub fn record(&self, record: ConsumptionRecord) -> Result<(), LedgerError> {
        tracing::debug!(
            model_id = record.model_id,
            artifact = %record.artifact.short(),
            action = %record.action,
            "recording consumption"
        );
        self.backend.append(record)
    }

    /// Handles consumed by a model for an action, deduplicated
    #[must_use]
    pub fn consumed_for(&self, model_id: u64, action: ConsumptionAction) -> HashSet<ArtifactHandle> {
        self.backend.consumed(model_id, action)
    }

    /// Whether one specific consumption is on record
    #[must_use]
    pub fn is_consumed(
        &self,
        model_id: u64,
        artifact: &ArtifactHandle,
        action: ConsumptionAction,
    ) -> bool {
        self.backend.is_consumed(model_id, artifact, action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(byte: u8) -> ArtifactHandle {
        ArtifactHandle::from_bytes([byte; 32])
    }

    #[test]
    fn duplicate_appends_collapse_on_query() {
        let ledger = ConsumptionLedger::new(MemoryLedger::new());
        let record = ConsumptionRecord::new(1, handle(1), ConsumptionAction::Trained);
        ledger.record(record.clone()).unwrap();
        ledger.record(record).unwrap();

        assert_eq!(ledger.backend().raw_len(), 2);
        assert_eq!(ledger.consumed_for(1, ConsumptionAction::Trained).len(), 1);
        assert!(ledger.is_consumed(1, &handle(1), ConsumptionAction::Trained));
    }

    #[test]
    fn actions_are_tracked_independently() {
        let ledger = ConsumptionLedger::new(MemoryLedger::new());
        ledger
            .record(ConsumptionRecord::new(1, handle(1), ConsumptionAction::Predicted))
            .unwrap();

        assert!(ledger.is_consumed(1, &handle(1), ConsumptionAction::Predicted));
        assert!(!ledger.is_consumed(1, &handle(1), ConsumptionAction::Trained));
    }

    #[test]
    fn models_are_tracked_independently() {
        let ledger = ConsumptionLedger::new(MemoryLedger::new());
        ledger
            .record(ConsumptionRecord::new(1, handle(1), ConsumptionAction::Trained))
            .unwrap();

        assert!(ledger.consumed_for(2, ConsumptionAction::Trained).is_empty());
    }

    #[test]
    fn raw_log_preserves_append_order() {
        let ledger = MemoryLedger::new();
        ledger
            .append(ConsumptionRecord::new(1, handle(1), ConsumptionAction::Trained))
            .unwrap();
        ledger
            .append(ConsumptionRecord::new(1, handle(2), ConsumptionAction::Trained))
            .unwrap();

        let records = ledger.records();
        assert_eq!(records[0].artifact, handle(1));
        assert_eq!(records[1].artifact, handle(2));
    }
}
