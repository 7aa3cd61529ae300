//! Testing utilities for the Granary workspace
//!
//! Shared fixtures: the canonical 3-row header block and helpers for
//! committing per-entity datasets without repeating the session
//! boilerplate in every test.

#![allow(missing_docs)]

use granary_artifact::{
    merge_datasets, ArtifactBackend, ArtifactHandle, DatasetScope, DatasetStore, Labelling,
    MemoryBackend, Row,
};

/// The header block used across compatible fixtures:
/// variable names, one sample of raw values, display headers.
pub fn shared_top_rows() -> Vec<Row> {
    vec![
        Row::new(["var1", "var2"]),
        Row::new(["value1", "value2"]),
        Row::new(["header1", "header2"]),
    ]
}

/// A header block that is incompatible with [`shared_top_rows`]
pub fn divergent_top_rows() -> Vec<Row> {
    vec![
        Row::new(["var1", "varX"]),
        Row::new(["value1", "value2"]),
        Row::new(["header1", "header2"]),
    ]
}

/// Fresh store over the in-memory reference backend
pub fn memory_store() -> DatasetStore<MemoryBackend> {
    DatasetStore::new(MemoryBackend::new())
}

/// Commit a labelled per-entity dataset with the shared header block
pub fn store_entity_dataset<B: ArtifactBackend>(
    store: &DatasetStore<B>,
    model_id: u64,
    entity_id: u64,
    data: Vec<Row>,
) -> ArtifactHandle {
    store_entity_dataset_with(store, model_id, entity_id, Labelling::Labelled, data)
}

/// Commit a per-entity dataset with an explicit labelling kind
pub fn store_entity_dataset_with<B: ArtifactBackend>(
    store: &DatasetStore<B>,
    model_id: u64,
    entity_id: u64,
    labelling: Labelling,
    data: Vec<Row>,
) -> ArtifactHandle {
    let scope = DatasetScope::for_entity(model_id, entity_id, None::<String>, labelling, false)
        .expect("valid per-entity scope");
    let mut session = store.begin(scope);
    session.append(shared_top_rows());
    session.append(data);
    session.commit().expect("commit fixture dataset")
}

/// Merge already-stored handles into a non-evaluation aggregate
pub fn merge_into_aggregate<B: ArtifactBackend>(
    store: &DatasetStore<B>,
    handles: &[ArtifactHandle],
    model_id: u64,
    time_splitting: &str,
    labelling: Labelling,
) -> ArtifactHandle {
    merge_datasets(store, handles, model_id, time_splitting, labelling, false)
        .expect("merge fixture datasets")
}
