//! Merge engine for aggregate artifacts
//!
//! Combines N per-entity artifacts that share a header block into one
//! aggregate artifact keyed by (model, time-partitioning method,
//! labelling kind, evaluation flag). The output goes through the
//! store's two-phase write, so a failure midway leaves no partial
//! aggregate visible.

use crate::backend::ArtifactBackend;
use crate::error::StoreError;
use crate::handle::ArtifactHandle;
use crate::rows::Row;
use crate::scope::{DatasetScope, Labelling};
use crate::store::DatasetStore;

/// Merge per-entity artifacts into one aggregate artifact
///
/// The first input's header block wins; every other input must carry a
/// byte-identical one. Data rows are concatenated in input order with
/// no deduplication; a sample may legitimately appear once per source
/// entity. Inputs are never mutated, and the output always has a fresh
/// identity unless the store's content addressing recognizes an
/// identical scope+content repeat.
///
/// # Errors
/// - [`StoreError::EmptyMergeSet`] if `handles` is empty
/// - [`StoreError::NotFound`] if any handle does not resolve
/// - [`StoreError::IncompatibleSchema`] if header rows 0-2 differ
///   across inputs; nothing is written
/// - [`StoreError::StorageWriteFailed`] if publishing the aggregate fails
pub fn merge_datasets<B: ArtifactBackend>(
    store: &DatasetStore<B>,
    handles: &[ArtifactHandle],
    model_id: u64,
    time_splitting: &str,
    labelling: Labelling,
    evaluation: bool,
) -> Result<ArtifactHandle, StoreError> {
    let (first, rest) = handles.split_first().ok_or(StoreError::EmptyMergeSet)?;
    let scope = DatasetScope::aggregate(model_id, time_splitting, labelling, evaluation)?;

    let reference = store.get(first)?;
    let expected_schema = reference.dataset.schema_digest();
    let mut data_rows: Vec<Row> = reference.dataset.data_rows().to_vec();

    for handle in rest {
        let input = store.get(handle)?;
        if input.dataset.schema_digest() != expected_schema {
            tracing::warn!(
                reference = %first.short(),
                mismatch = %handle.short(),
                "refusing to merge artifacts with differing header rows"
            );
            return Err(StoreError::IncompatibleSchema {
                reference: *first,
                mismatch: *handle,
            });
        }
        data_rows.extend_from_slice(input.dataset.data_rows());
    }

    let mut session = store.begin(scope);
    session.append(reference.dataset.header().rows().map(Clone::clone));
    session.append(data_rows);
    let handle = session.commit()?;
    tracing::info!(
        model_id,
        time_splitting,
        inputs = handles.len(),
        handle = %handle.short(),
        "merged datasets into aggregate artifact"
    );
    Ok(handle)
}
