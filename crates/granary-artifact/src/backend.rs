//! Artifact persistence backends
//!
//! The store only needs create-once/read-many semantics and a stable
//! handle-to-content mapping; [`ArtifactBackend`] captures exactly
//! that. [`MemoryBackend`] is the reference implementation and the one
//! used throughout the test suites.

use crate::error::StoreError;
use crate::handle::ArtifactHandle;
use crate::rows::Dataset;
use crate::scope::DatasetScope;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A finalized artifact as held by a backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredArtifact {
    /// Content-addressed identity
    pub handle: ArtifactHandle,
    /// Where the artifact belongs
    pub scope: DatasetScope,
    /// The immutable row content
    pub dataset: Dataset,
    /// Commit time (UTC)
    pub created_at: DateTime<Utc>,
}

/// Byte-level persistence collaborator for artifacts
///
/// # Contract
/// - `put_if_absent` is atomic: an artifact is either fully visible or
///   absent, never partial
/// - a handle, once stored, always resolves to the same content
/// - `list_for_model` returns artifacts in creation order
pub trait ArtifactBackend: Send + Sync {
    /// Publish an artifact unless its handle already exists
    ///
    /// Returns `true` if the artifact was inserted, `false` if the
    /// handle was already present (content-addressing dedup).
    ///
    /// # Errors
    /// [`StoreError::StorageWriteFailed`] if the backend cannot persist.
    fn put_if_absent(&self, artifact: StoredArtifact) -> Result<bool, StoreError>;

    /// Resolve a handle to its stored artifact
    fn get(&self, handle: &ArtifactHandle) -> Option<Arc<StoredArtifact>>;

    /// Whether a handle resolves
    fn contains(&self, handle: &ArtifactHandle) -> bool {
        self.get(handle).is_some()
    }

    /// All artifacts for a model, oldest first
    fn list_for_model(&self, model_id: u64) -> Vec<Arc<StoredArtifact>>;
}

/// In-memory reference backend
///
/// Insertion order of the underlying map is creation order, which is
/// what `list_for_model` relies on. An optional capacity limit stands
/// in for storage exhaustion in tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    artifacts: RwLock<IndexMap<ArtifactHandle, Arc<StoredArtifact>>>,
    capacity: Option<usize>,
}

impl MemoryBackend {
    /// Unbounded backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that refuses writes beyond `capacity` artifacts
    #[must_use]
    pub fn with_capacity_limit(capacity: usize) -> Self {
        Self {
            artifacts: RwLock::new(IndexMap::new()),
            capacity: Some(capacity),
        }
    }

    /// Number of stored artifacts
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.read().len()
    }

    /// Whether the backend holds no artifacts
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.read().is_empty()
    }
}

impl ArtifactBackend for MemoryBackend {
    fn put_if_absent(&self, artifact: StoredArtifact) -> Result<bool, StoreError> {
        let mut artifacts = self.artifacts.write();
        if artifacts.contains_key(&artifact.handle) {
            return Ok(false);
        }
        if let Some(capacity) = self.capacity {
            if artifacts.len() >= capacity {
                return Err(StoreError::StorageWriteFailed(format!(
                    "backend capacity of {capacity} artifacts exhausted"
                )));
            }
        }
        artifacts.insert(artifact.handle, Arc::new(artifact));
        Ok(true)
    }

    fn get(&self, handle: &ArtifactHandle) -> Option<Arc<StoredArtifact>> {
        self.artifacts.read().get(handle).cloned()
    }

    fn contains(&self, handle: &ArtifactHandle) -> bool {
        self.artifacts.read().contains_key(handle)
    }

    fn list_for_model(&self, model_id: u64) -> Vec<Arc<StoredArtifact>> {
        self.artifacts
            .read()
            .values()
            .filter(|artifact| artifact.scope.model_id() == model_id)
            .cloned()
            .collect()
    }
}
