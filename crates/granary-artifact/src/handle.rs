//! Artifact handles
//!
//! An [`ArtifactHandle`] is the opaque identity of a stored artifact:
//! the digest of its scope tuple together with its content digest. It
//! is never derived from a path, and two artifacts with differing
//! content can never share a handle.

use crate::digest::{Digest, DigestError};
use crate::rows::Dataset;
use crate::scope::DatasetScope;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Opaque, content-addressed identity of a stored artifact
///
/// Equality follows (scope, content digest): committing byte-identical
/// content under an identical scope yields the same handle, which is
/// what lets `commit` deduplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArtifactHandle(Digest);

impl ArtifactHandle {
    /// Derive the handle for content stored under a scope
    #[must_use]
    pub fn derive(scope: &DatasetScope, content_digest: Digest) -> Self {
        let key = scope.storage_key();
        Self(Digest::compute_chunks([
            key.as_bytes(),
            content_digest.as_bytes().as_slice(),
        ]))
    }

    /// Derive the handle a dataset would get under a scope
    #[inline]
    #[must_use]
    pub fn for_dataset(scope: &DatasetScope, dataset: &Dataset) -> Self {
        Self::derive(scope, dataset.content_digest())
    }

    /// Wrap raw handle bytes (e.g. read back from persistence)
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(Digest::new(bytes))
    }

    /// The underlying digest
    #[inline]
    #[must_use]
    pub const fn digest(&self) -> &Digest {
        &self.0
    }

    /// Short prefix for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        self.0.short()
    }
}

impl Display for ArtifactHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for ArtifactHandle {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl serde::Serialize for ArtifactHandle {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for ArtifactHandle {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self(Digest::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::{HeaderBlock, Row};
    use crate::scope::Labelling;

    fn dataset(cell: &str) -> Dataset {
        Dataset::new(
            HeaderBlock::new(
                Row::new(["var1"]),
                Row::new(["value1"]),
                Row::new(["header1"]),
            ),
            vec![Row::new([cell])],
        )
    }

    #[test]
    fn same_scope_and_content_share_a_handle() {
        let scope = DatasetScope::aggregate(1, "quarterly", Labelling::Labelled, false).unwrap();
        let a = ArtifactHandle::for_dataset(&scope, &dataset("yeah"));
        let b = ArtifactHandle::for_dataset(&scope, &dataset("yeah"));
        assert_eq!(a, b);
    }

    #[test]
    fn content_changes_the_handle() {
        let scope = DatasetScope::aggregate(1, "quarterly", Labelling::Labelled, false).unwrap();
        let a = ArtifactHandle::for_dataset(&scope, &dataset("yeah"));
        let b = ArtifactHandle::for_dataset(&scope, &dataset("no"));
        assert_ne!(a, b);
    }

    #[test]
    fn scope_changes_the_handle() {
        let labelled = DatasetScope::aggregate(1, "quarterly", Labelling::Labelled, false).unwrap();
        let unlabelled =
            DatasetScope::aggregate(1, "quarterly", Labelling::Unlabelled, false).unwrap();
        let rows = dataset("yeah");
        assert_ne!(
            ArtifactHandle::for_dataset(&labelled, &rows),
            ArtifactHandle::for_dataset(&unlabelled, &rows)
        );
    }

    #[test]
    fn display_round_trips() {
        let scope = DatasetScope::aggregate(1, "quarterly", Labelling::Labelled, false).unwrap();
        let handle = ArtifactHandle::for_dataset(&scope, &dataset("yeah"));
        let parsed: ArtifactHandle = handle.to_string().parse().unwrap();
        assert_eq!(handle, parsed);
    }
}
