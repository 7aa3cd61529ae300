//! Granary Artifact Store
//!
//! Content-addressed, write-once dataset artifacts with a merge engine.
//!
//! # Core Concepts
//!
//! - [`Dataset`]: rows with an explicit 3-row header block
//! - [`DatasetScope`]: where an artifact belongs (model, entity, method)
//! - [`ArtifactHandle`]: opaque identity derived from scope + content
//! - [`DatasetStore`]: two-phase write sessions over a pluggable backend
//! - [`merge_datasets`]: combine per-entity artifacts into an aggregate
//!
//! # Example
//!
//! ```rust
//! use granary_artifact::{DatasetScope, DatasetStore, Labelling, MemoryBackend, Row};
//!
//! # fn main() -> Result<(), granary_artifact::StoreError> {
//! let store = DatasetStore::new(MemoryBackend::new());
//! let scope = DatasetScope::for_entity(42, 1, None::<String>, Labelling::Labelled, false)?;
//!
//! let mut session = store.begin(scope);
//! session.append([
//!     Row::new(["var1", "var2"]),
//!     Row::new(["value1", "value2"]),
//!     Row::new(["header1", "header2"]),
//!     Row::new(["sample1", "yeah"]),
//! ]);
//! let handle = session.commit()?;
//! assert!(store.contains(&handle));
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod backend;
mod digest;
mod error;
mod handle;
mod merge;
mod rows;
mod scope;
mod store;

// Re-exports
pub use backend::{ArtifactBackend, MemoryBackend, StoredArtifact};
pub use digest::{Digest, DigestError};
pub use error::StoreError;
pub use handle::ArtifactHandle;
pub use merge::merge_datasets;
pub use rows::{Dataset, HeaderBlock, Row, HEADER_ROWS};
pub use scope::{DatasetScope, Labelling};
pub use store::{DatasetStore, ScopeLockGuard, ScopeLocks, WriteSession};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
