//! The dataset artifact store
//!
//! Turns buffered row sequences into durable, write-once artifacts via
//! a two-phase protocol: [`DatasetStore::begin`] opens a
//! [`WriteSession`], rows are buffered with [`WriteSession::append`],
//! and [`WriteSession::commit`] publishes atomically. A session dropped
//! without committing aborts itself, so no caller has to remember
//! cleanup on error paths.

use crate::backend::{ArtifactBackend, StoredArtifact};
use crate::error::StoreError;
use crate::handle::ArtifactHandle;
use crate::rows::{Dataset, Row};
use crate::scope::{DatasetScope, Labelling};
use chrono::Utc;
use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Write-once store for dataset artifacts
///
/// Generic over its persistence collaborator; all row buffering and
/// identity derivation happens here, the backend only sees finished
/// artifacts.
#[derive(Debug)]
pub struct DatasetStore<B: ArtifactBackend> {
    backend: B,
}

impl<B: ArtifactBackend> DatasetStore<B> {
    /// Wrap a persistence backend
    #[inline]
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend
    #[inline]
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open a write session bound to `scope`
    ///
    /// Scope validity is enforced when the [`DatasetScope`] is
    /// constructed, so a session can always be opened. Nothing is
    /// visible to readers until the session commits.
    pub fn begin(&self, scope: DatasetScope) -> WriteSession<'_, B> {
        tracing::debug!(scope = %scope, "opening write session");
        WriteSession {
            store: self,
            scope,
            rows: Vec::new(),
            committed: false,
        }
    }

    /// Resolve a handle
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the handle does not resolve.
    pub fn get(&self, handle: &ArtifactHandle) -> Result<Arc<StoredArtifact>, StoreError> {
        self.backend.get(handle).ok_or(StoreError::NotFound(*handle))
    }

    /// Whether a handle resolves to a stored artifact
    #[inline]
    #[must_use]
    pub fn contains(&self, handle: &ArtifactHandle) -> bool {
        self.backend.contains(handle)
    }

    /// The row content of an artifact
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the handle does not resolve.
    pub fn dataset(&self, handle: &ArtifactHandle) -> Result<Dataset, StoreError> {
        Ok(self.get(handle)?.dataset.clone())
    }

    /// Data rows of an artifact keyed by sample identifier
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the handle does not resolve.
    pub fn structured_data(
        &self,
        handle: &ArtifactHandle,
    ) -> Result<IndexMap<String, Vec<String>>, StoreError> {
        Ok(self.get(handle)?.dataset.structured_data())
    }

    /// Aggregate artifacts for a model and labelling kind, oldest first
    ///
    /// Evaluation-flagged aggregates are included; callers that must
    /// not see them filter on [`DatasetScope::is_evaluation`].
    #[must_use]
    pub fn aggregates_for(&self, model_id: u64, labelling: Labelling) -> Vec<Arc<StoredArtifact>> {
        self.backend
            .list_for_model(model_id)
            .into_iter()
            .filter(|artifact| {
                artifact.scope.is_aggregate() && artifact.scope.labelling() == labelling
            })
            .collect()
    }

    /// CSV export of the newest labelled, non-evaluation aggregate for
    /// a time-partitioning method
    ///
    /// Returns `None` when the model has no such aggregate yet.
    #[must_use]
    pub fn export_training_data(&self, model_id: u64, time_splitting: &str) -> Option<String> {
        let newest = self
            .aggregates_for(model_id, Labelling::Labelled)
            .into_iter()
            .filter(|artifact| {
                !artifact.scope.is_evaluation()
                    && artifact.scope.time_splitting() == Some(time_splitting)
            })
            .next_back()?;
        tracing::debug!(
            model_id,
            time_splitting,
            handle = %newest.handle.short(),
            "exporting training data"
        );
        Some(newest.dataset.to_csv())
    }
}

/// A buffered, single-writer session for one artifact
///
/// Holds rows in memory until `commit`; nothing is visible to readers
/// before then. Dropping the session without committing discards the
/// buffer, which is the abort path.
#[derive(Debug)]
pub struct WriteSession<'a, B: ArtifactBackend> {
    store: &'a DatasetStore<B>,
    scope: DatasetScope,
    rows: Vec<Row>,
    committed: bool,
}

impl<B: ArtifactBackend> WriteSession<'_, B> {
    /// The scope this session is bound to
    #[inline]
    #[must_use]
    pub fn scope(&self) -> &DatasetScope {
        &self.scope
    }

    /// Number of buffered rows
    #[inline]
    #[must_use]
    pub fn buffered_rows(&self) -> usize {
        self.rows.len()
    }

    /// Buffer rows; callable any number of times before commit
    ///
    /// The first three rows across all appends form the header block
    /// (variable names, one sample of raw values, display headers).
    pub fn append<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Row>,
    {
        self.rows.extend(rows);
    }

    /// Atomically publish the buffered rows as a new artifact
    ///
    /// Committing byte-identical content under an identical scope
    /// returns the existing handle instead of storing a duplicate.
    /// On any failure the session behaves as if it had been aborted:
    /// no partial artifact is ever visible.
    ///
    /// # Errors
    /// - [`StoreError::MalformedDataset`] if fewer than 3 rows were buffered
    /// - [`StoreError::StorageWriteFailed`] if the backend rejects the write
    pub fn commit(mut self) -> Result<ArtifactHandle, StoreError> {
        self.committed = true;
        let rows = std::mem::take(&mut self.rows);
        let dataset = Dataset::from_rows(rows)?;
        let handle = ArtifactHandle::for_dataset(&self.scope, &dataset);
        let inserted = self.store.backend.put_if_absent(StoredArtifact {
            handle,
            scope: self.scope.clone(),
            dataset,
            created_at: Utc::now(),
        })?;
        if inserted {
            tracing::info!(scope = %self.scope, handle = %handle.short(), "artifact committed");
        } else {
            tracing::debug!(
                scope = %self.scope,
                handle = %handle.short(),
                "identical artifact already stored, reusing handle"
            );
        }
        Ok(handle)
    }

    /// Discard the session without publishing anything
    ///
    /// Safe to call at any point; equivalent to dropping the session.
    pub fn abort(mut self) {
        self.committed = true;
        self.rows.clear();
        tracing::debug!(scope = %self.scope, "write session aborted");
    }
}

impl<B: ArtifactBackend> Drop for WriteSession<'_, B> {
    fn drop(&mut self) {
        if !self.committed {
            tracing::debug!(
                scope = %self.scope,
                buffered = self.rows.len(),
                "write session dropped without commit, discarding buffer"
            );
        }
    }
}

/// Named locks keyed by dataset scope
///
/// The store itself never serializes writers: content addressing in
/// `commit` collapses identical racing results into one handle. Callers
/// that want strict at-most-one-writer semantics per scope take one of
/// these locks around the whole begin/append/commit sequence.
#[derive(Debug, Default)]
pub struct ScopeLocks {
    locks: DashMap<String, Arc<LockState>>,
}

#[derive(Debug, Default)]
struct LockState {
    held: Mutex<bool>,
    released: Condvar,
}

/// Guard returned by [`ScopeLocks::acquire`]; releases on drop
#[must_use = "the scope stays locked only while the guard is alive"]
#[derive(Debug)]
pub struct ScopeLockGuard {
    state: Arc<LockState>,
}

impl Drop for ScopeLockGuard {
    fn drop(&mut self) {
        *self.state.held.lock() = false;
        self.state.released.notify_one();
    }
}

impl ScopeLocks {
    /// Empty lock registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state_for(&self, scope: &DatasetScope) -> Arc<LockState> {
        self.locks
            .entry(scope.storage_key())
            .or_default()
            .clone()
    }

    /// Block until the scope's lock is held
    pub fn acquire(&self, scope: &DatasetScope) -> ScopeLockGuard {
        let state = self.state_for(scope);
        {
            let mut held = state.held.lock();
            while *held {
                state.released.wait(&mut held);
            }
            *held = true;
        }
        ScopeLockGuard { state }
    }

    /// Take the scope's lock only if it is free
    pub fn try_acquire(&self, scope: &DatasetScope) -> Option<ScopeLockGuard> {
        let state = self.state_for(scope);
        {
            let mut held = state.held.lock();
            if *held {
                return None;
            }
            *held = true;
        }
        Some(ScopeLockGuard { state })
    }
}
