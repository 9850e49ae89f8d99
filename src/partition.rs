//! Contiguous partitioning of an ordered document sequence across shards.
//!
//! Slice `i` of a plan over `L` documents and `N` shards covers offsets
//! `[i * L/N, (i + 1) * L/N)`. Input that does not divide evenly is refused
//! up front; the caller decides whether to trim the input or change the
//! shard count.

use std::ops::Range;

use crate::error::{IndexerError, Result};

/// A pure function of (document count, shard count) to shard slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    document_count: usize,
    shard_count: usize,
}

impl PartitionPlan {
    /// Plan a split of `document_count` documents across `shard_count` shards.
    pub fn new(document_count: usize, shard_count: usize) -> Result<Self> {
        if shard_count == 0 {
            return Err(IndexerError::invalid_config("Shard count cannot be zero"));
        }
        if document_count % shard_count != 0 {
            return Err(IndexerError::PartitionPrecondition {
                documents: document_count,
                shards: shard_count,
            });
        }
        Ok(Self {
            document_count,
            shard_count,
        })
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    /// Length of every slice.
    pub fn slice_len(&self) -> usize {
        self.document_count / self.shard_count
    }

    /// Offsets covered by the slice of shard `ordinal`.
    pub fn range(&self, ordinal: usize) -> Range<usize> {
        let len = self.slice_len();
        ordinal * len..(ordinal + 1) * len
    }

    /// Split `docs` into one slice per shard, in ordinal order.
    pub fn split<'a, T>(&self, docs: &'a [T]) -> Result<Vec<&'a [T]>> {
        if docs.len() != self.document_count {
            return Err(IndexerError::invalid_operation(format!(
                "Plan covers {} documents but {} were supplied",
                self.document_count,
                docs.len()
            )));
        }
        Ok((0..self.shard_count)
            .map(|ordinal| &docs[self.range(ordinal)])
            .collect())
    }
}

/// Largest prefix length of `document_count` that divides evenly across
/// `shard_count` shards.
pub fn even_prefix_len(document_count: usize, shard_count: usize) -> usize {
    if shard_count == 0 {
        return 0;
    }
    document_count / shard_count * shard_count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_even_split_reproduces_input() {
        for shards in 1..=6 {
            for per_shard in 0..=5 {
                let docs: Vec<usize> = (0..shards * per_shard).collect();
                let plan = PartitionPlan::new(docs.len(), shards).unwrap();
                let slices = plan.split(&docs).unwrap();

                assert_eq!(slices.len(), shards);
                assert!(slices.iter().all(|s| s.len() == per_shard));
                assert_eq!(slices.concat(), docs);
            }
        }
    }

    #[test]
    fn test_slice_ranges() {
        let plan = PartitionPlan::new(40, 2).unwrap();
        assert_eq!(plan.slice_len(), 20);
        assert_eq!(plan.range(0), 0..20);
        assert_eq!(plan.range(1), 20..40);
    }

    #[test]
    fn test_uneven_input_is_rejected() {
        let err = PartitionPlan::new(7, 2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PartitionPrecondition);
        assert!(matches!(
            err,
            IndexerError::PartitionPrecondition {
                documents: 7,
                shards: 2
            }
        ));
    }

    #[test]
    fn test_zero_shards_is_rejected() {
        let err = PartitionPlan::new(4, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_split_length_mismatch() {
        let plan = PartitionPlan::new(4, 2).unwrap();
        assert!(plan.split(&[1, 2, 3]).is_err());
    }

    #[test]
    fn test_even_prefix_len() {
        assert_eq!(even_prefix_len(7, 2), 6);
        assert_eq!(even_prefix_len(9, 3), 9);
        assert_eq!(even_prefix_len(2, 5), 0);
        assert_eq!(even_prefix_len(5, 0), 0);
    }
}
