//! Error types for the consumption ledger and resolver

use granary_artifact::{ArtifactHandle, StoreError};

/// Errors raised by consumption recording and pending-work resolution
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A handle passed to `record_consumption` does not resolve to an
    /// existing artifact. Fatal to the calling operation.
    #[error("artifact not found: {0}")]
    NotFound(ArtifactHandle),

    /// The ledger backend could not persist a record.
    #[error("ledger write failed: {0}")]
    WriteFailed(String),

    /// An artifact store failure surfaced during resolution.
    #[error(transparent)]
    Store(#[from] StoreError),
}
