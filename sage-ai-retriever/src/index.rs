//! Exact k-nearest-neighbor vector index.
//!
//! The index owns a flat `f32` buffer of embedding vectors and answers
//! top-k queries under squared Euclidean distance. Squared distance is
//! monotonically equivalent to true Euclidean distance for ranking, so the
//! square root is never taken. Search is exhaustive: the corpus is assumed
//! to fit in memory, and approximate-nearest-neighbor structures are
//! explicitly out of scope.
//!
//! Positions returned by [`VectorIndex::search`] are zero-based insertion
//! ranks; the caller is responsible for keeping any parallel storage (chunk
//! texts) aligned with them.
//!
//! ## Persistence
//!
//! [`VectorIndex::serialize`] produces a self-describing binary artifact:
//!
//! ```text
//! magic     8 bytes   b"SAGEVIDX"
//! version   4 bytes   u32 LE, currently 1
//! dimension 4 bytes   u32 LE
//! count     8 bytes   u64 LE
//! checksum 32 bytes   blake3 of the payload
//! payload   count * dimension * 4 bytes of f32 vector data
//! ```
//!
//! `deserialize(serialize(idx))` round-trips bit-exactly: the restored index
//! returns identical search results for any query and `k`. Any header or
//! checksum inconsistency is reported as corruption rather than producing a
//! silently wrong index.

use crate::error::{Result, RetrieverError};
use serde::Serialize;

const MAGIC: &[u8; 8] = b"SAGEVIDX";
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8 + 4 + 4 + 8 + 32;

/// One search result: an insertion-rank position and its squared Euclidean
/// distance from the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    pub position: usize,
    pub distance: f32,
}

/// In-memory exact k-NN index over squared Euclidean distance.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    /// Flat row-major vector storage, exclusively owned
    data: Vec<f32>,
    dimension: usize,
    count: usize,
}

impl VectorIndex {
    /// Build an index from an ordered sequence of embedding vectors.
    ///
    /// The dimensionality of the first vector fixes the index dimensionality
    /// for its whole lifetime. Fails with `EmptyInput` on an empty sequence
    /// and `DimensionMismatch` if any vector disagrees with the first.
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = vectors.first() else {
            return Err(RetrieverError::empty_input(
                "index build",
                "cannot build an index from zero vectors",
            ));
        };
        let dimension = first.len();
        if dimension == 0 {
            return Err(RetrieverError::empty_input(
                "index build",
                "cannot build an index from zero-dimensional vectors",
            ));
        }

        let mut data = Vec::with_capacity(vectors.len() * dimension);
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(RetrieverError::DimensionMismatch {
                    operation: "index build",
                    expected: dimension,
                    actual: vector.len(),
                });
            }
            data.extend_from_slice(vector);
        }

        Ok(Self {
            data,
            dimension,
            count: vectors.len(),
        })
    }

    /// Number of vectors stored in the index.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Dimensionality of every stored vector.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Exact top-k search under squared Euclidean distance.
    ///
    /// Returns `min(k, len)` hits sorted ascending by distance, ties broken
    /// by insertion order (lower position first). Fails with
    /// `DimensionMismatch` if the query dimensionality disagrees with the
    /// index, `EmptyIndex` if the index holds zero vectors, and `EmptyInput`
    /// for `k == 0`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if self.count == 0 {
            return Err(RetrieverError::EmptyIndex);
        }
        if query.len() != self.dimension {
            return Err(RetrieverError::DimensionMismatch {
                operation: "search",
                expected: self.dimension,
                actual: query.len(),
            });
        }
        if k == 0 {
            return Err(RetrieverError::empty_input(
                "search",
                "k must be greater than zero",
            ));
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| {
                let distance: f32 = row
                    .iter()
                    .zip(query)
                    .map(|(a, b)| (a - b) * (a - b))
                    .sum();
                SearchHit { position, distance }
            })
            .collect();

        // Stable ascending by distance; positions are already in insertion
        // order, so equal distances keep the lower position first.
        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);

        Ok(hits)
    }

    /// Serialize the index into a self-describing byte stream.
    pub fn serialize(&self) -> Vec<u8> {
        let payload: &[u8] = bytemuck::cast_slice(&self.data);
        let checksum = blake3::hash(payload);

        let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&(self.dimension as u32).to_le_bytes());
        bytes.extend_from_slice(&(self.count as u64).to_le_bytes());
        bytes.extend_from_slice(checksum.as_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    /// Reconstruct an index from a serialized byte stream.
    ///
    /// Every header field and the payload checksum are validated; any
    /// inconsistency fails with `PersistenceCorruption` naming what was
    /// wrong, never a silently misaligned index.
    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(RetrieverError::corruption(format!(
                "index artifact truncated: {} bytes is shorter than the header",
                bytes.len()
            )));
        }

        if &bytes[..8] != MAGIC {
            return Err(RetrieverError::corruption(
                "index artifact has wrong magic bytes",
            ));
        }

        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if version != FORMAT_VERSION {
            return Err(RetrieverError::corruption(format!(
                "unsupported index format version {version}"
            )));
        }

        let dimension =
            u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        let count = u64::from_le_bytes([
            bytes[16], bytes[17], bytes[18], bytes[19], bytes[20], bytes[21], bytes[22],
            bytes[23],
        ]) as usize;
        let checksum_bytes = &bytes[24..56];
        let payload = &bytes[HEADER_LEN..];

        let expected_len = count
            .checked_mul(dimension)
            .and_then(|n| n.checked_mul(std::mem::size_of::<f32>()))
            .ok_or_else(|| RetrieverError::corruption("index artifact header overflows"))?;
        if payload.len() != expected_len {
            return Err(RetrieverError::corruption(format!(
                "index payload is {} bytes but header promises {expected_len}",
                payload.len()
            )));
        }

        let checksum = blake3::hash(payload);
        if checksum.as_bytes() != checksum_bytes {
            return Err(RetrieverError::corruption(
                "index payload checksum mismatch",
            ));
        }

        // pod_collect_to_vec copies, so the byte stream needs no alignment.
        let data: Vec<f32> = bytemuck::pod_collect_to_vec(payload);
        Ok(Self {
            data,
            dimension,
            count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![3.0, 3.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_build_empty_fails() {
        let err = VectorIndex::build(vec![]).unwrap_err();
        assert!(matches!(err, RetrieverError::EmptyInput { .. }));
    }

    #[test]
    fn test_build_ragged_fails() {
        let err = VectorIndex::build(vec![vec![1.0, 2.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            RetrieverError::DimensionMismatch {
                expected: 2,
                actual: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_search_orders_by_distance() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0], 4).unwrap();

        assert_eq!(hits.len(), 4);
        assert_eq!(hits[0].position, 0);
        assert_eq!(hits[0].distance, 0.0);
        assert_eq!(hits[1].position, 1);
        assert_eq!(hits[1].distance, 1.0);
        assert_eq!(hits[2].position, 2);
        assert_eq!(hits[2].distance, 4.0);
        assert_eq!(hits[3].position, 3);
        assert_eq!(hits[3].distance, 18.0);

        for pair in hits.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_search_ties_break_by_insertion_order() {
        let index = VectorIndex::build(vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ])
        .unwrap();

        let hits = index.search(&[0.0, 0.0], 3).unwrap();
        // All three are equidistant from the origin.
        assert_eq!(
            hits.iter().map(|h| h.position).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn test_search_k_larger_than_index() {
        let index = sample_index();
        let hits = index.search(&[0.0, 0.0], 100).unwrap();
        assert_eq!(hits.len(), index.len());
    }

    #[test]
    fn test_search_k_zero_fails() {
        let index = sample_index();
        let err = index.search(&[0.0, 0.0], 0).unwrap_err();
        assert!(matches!(err, RetrieverError::EmptyInput { .. }));
    }

    #[test]
    fn test_search_dimension_mismatch() {
        // An index built at dimension 384 must reject a 128-dim query.
        let vectors: Vec<Vec<f32>> = (0..2)
            .map(|i| (0..384).map(|j| (i * 384 + j) as f32).collect())
            .collect();
        let index = VectorIndex::build(vectors).unwrap();

        let query = vec![0.0f32; 128];
        let err = index.search(&query, 1).unwrap_err();
        assert!(matches!(
            err,
            RetrieverError::DimensionMismatch {
                expected: 384,
                actual: 128,
                ..
            }
        ));
    }

    #[test]
    fn test_serialize_round_trip_is_bit_exact() {
        let index = sample_index();
        let restored = VectorIndex::deserialize(&index.serialize()).unwrap();

        assert_eq!(restored.len(), index.len());
        assert_eq!(restored.dimension(), index.dimension());

        let query = [0.7, -1.3];
        for k in 1..=index.len() {
            let original = index.search(&query, k).unwrap();
            let roundtrip = restored.search(&query, k).unwrap();
            assert_eq!(original, roundtrip);
        }
    }

    #[test]
    fn test_search_on_empty_index_fails() {
        // An empty index cannot be built, but it can be restored from an
        // artifact that holds zero vectors.
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"SAGEVIDX");
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(blake3::hash(&[]).as_bytes());

        let index = VectorIndex::deserialize(&bytes).unwrap();
        assert!(index.is_empty());

        let err = index.search(&[0.0; 4], 1).unwrap_err();
        assert!(matches!(err, RetrieverError::EmptyIndex));
    }

    #[test]
    fn test_deserialize_rejects_bad_magic() {
        let mut bytes = sample_index().serialize();
        bytes[0] = b'X';
        let err = VectorIndex::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, RetrieverError::PersistenceCorruption { .. }));
    }

    #[test]
    fn test_deserialize_rejects_flipped_payload() {
        let mut bytes = sample_index().serialize();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let err = VectorIndex::deserialize(&bytes).unwrap_err();
        assert!(matches!(err, RetrieverError::PersistenceCorruption { .. }));
    }

    #[test]
    fn test_deserialize_rejects_truncation() {
        let bytes = sample_index().serialize();
        let err = VectorIndex::deserialize(&bytes[..bytes.len() - 3]).unwrap_err();
        assert!(matches!(err, RetrieverError::PersistenceCorruption { .. }));
    }
}
