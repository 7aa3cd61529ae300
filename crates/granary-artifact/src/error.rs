//! Error types for the artifact store and merge engine
//!
//! Covers scope validation, schema compatibility during merges,
//! backend write failures, and handle resolution.

use crate::handle::ArtifactHandle;

/// Errors raised by the artifact store and the merge engine
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The dataset scope is internally inconsistent.
    ///
    /// Rejected before any I/O; the caller must fix the scope and retry.
    #[error("invalid scope: {0}")]
    InvalidScope(String),

    /// Header rows of artifacts being merged differ.
    ///
    /// Indicates a data-integrity bug in the row-producing subsystem;
    /// retrying without regenerating the inputs will fail again.
    #[error("incompatible schema: {reference} vs {mismatch}")]
    IncompatibleSchema {
        /// Handle whose header block set the expected schema
        reference: ArtifactHandle,
        /// First handle whose header block diverged
        mismatch: ArtifactHandle,
    },

    /// The backing store could not persist the session.
    ///
    /// The session is implicitly aborted; the whole begin/append/commit
    /// sequence may be retried.
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),

    /// A handle does not resolve to an existing artifact.
    #[error("artifact not found: {0}")]
    NotFound(ArtifactHandle),

    /// A committed buffer did not contain the 3-row header block.
    #[error("malformed dataset: {0}")]
    MalformedDataset(String),

    /// Merge was invoked with no input artifacts.
    #[error("merge requires at least one input artifact")]
    EmptyMergeSet,
}

impl StoreError {
    /// Whether retrying the same operation unchanged can ever succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StorageWriteFailed(_))
    }
}
