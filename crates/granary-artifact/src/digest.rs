//! Content digests for dataset rows
//!
//! Provides [`Digest`], the 32-byte Blake3 value used to fingerprint
//! row content and header schemas.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A 32-byte Blake3 digest over dataset content
///
/// Immutable and cheap to clone (Copy). Rendered as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// Wrap raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Compute the digest of arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Compute the digest of a serializable value (canonical JSON encoding)
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn compute_serializable<T: serde::Serialize>(value: &T) -> Result<Self, DigestError> {
        let encoded = serde_json::to_vec(value)?;
        Ok(Self::compute(&encoded))
    }

    /// Incremental digest over a sequence of byte chunks
    ///
    /// Each chunk is length-prefixed so chunk boundaries are part of
    /// the fingerprint.
    #[must_use]
    pub fn compute_chunks<'a>(chunks: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = blake3::Hasher::new();
        for chunk in chunks {
            hasher.update(&(chunk.len() as u64).to_le_bytes());
            hasher.update(chunk);
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Incremental digest over groups of byte chunks
    ///
    /// Each group is prefixed with its chunk count and each chunk with
    /// its length, so both chunk and group boundaries are part of the
    /// fingerprint: regrouping the same chunks changes the digest.
    #[must_use]
    pub fn compute_grouped_chunks<'a, G, C>(groups: G) -> Self
    where
        G: IntoIterator<Item = C>,
        C: IntoIterator<Item = &'a [u8]>,
        C::IntoIter: ExactSizeIterator,
    {
        let mut hasher = blake3::Hasher::new();
        for group in groups {
            let chunks = group.into_iter();
            hasher.update(&(chunks.len() as u64).to_le_bytes());
            for chunk in chunks {
                hasher.update(&(chunk.len() as u64).to_le_bytes());
                hasher.update(chunk);
            }
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Short prefix (first 8 bytes, 16 hex chars) for log lines
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }
}

impl Display for Digest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(DigestError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl serde::Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when constructing digests
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    /// Wrong number of bytes for a digest
    #[error("invalid digest length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex decoding failed
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// JSON encoding of the digested value failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_is_deterministic() {
        assert_eq!(Digest::compute(b"rows"), Digest::compute(b"rows"));
        assert_ne!(Digest::compute(b"rows"), Digest::compute(b"other"));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        let digest = Digest::compute(b"round trip");
        let parsed: Digest = digest.to_string().parse().unwrap();
        assert_eq!(digest, parsed);
    }

    #[test]
    fn from_str_rejects_wrong_length() {
        let result: Result<Digest, _> = "abcd".parse();
        assert!(matches!(
            result,
            Err(DigestError::InvalidLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn chunk_boundaries_affect_digest() {
        let joined = Digest::compute_chunks([b"ab".as_slice(), b"c".as_slice()]);
        let shifted = Digest::compute_chunks([b"a".as_slice(), b"bc".as_slice()]);
        assert_ne!(joined, shifted);
    }

    #[test]
    fn group_boundaries_affect_digest() {
        // Same chunks, regrouped: one group of two vs two groups of one.
        let together = Digest::compute_grouped_chunks([vec![b"d1".as_slice(), b"d2".as_slice()]]);
        let split =
            Digest::compute_grouped_chunks([vec![b"d1".as_slice()], vec![b"d2".as_slice()]]);
        assert_ne!(together, split);
    }

    #[test]
    fn grouped_digest_is_deterministic() {
        let groups = || [vec![b"a".as_slice()], vec![b"b".as_slice(), b"c".as_slice()]];
        assert_eq!(
            Digest::compute_grouped_chunks(groups()),
            Digest::compute_grouped_chunks(groups())
        );
    }

    #[test]
    fn serde_round_trip_as_hex() {
        let digest = Digest::compute(b"serde");
        let json = serde_json::to_string(&digest).unwrap();
        assert!(json.starts_with('"'));
        let decoded: Digest = serde_json::from_str(&json).unwrap();
        assert_eq!(digest, decoded);
    }

    #[test]
    fn short_is_prefix_of_full() {
        let digest = Digest::compute(b"short");
        assert_eq!(digest.short().len(), 16);
        assert!(digest.to_string().starts_with(&digest.short()));
    }
}
