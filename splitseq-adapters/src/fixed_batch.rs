//! Chunking a sequence into fixed-size lists

use splitseq_core::{Advance, BatchSplittable, Characteristics, Result, Splittable};

/// Yields every batch split off the wrapped sequence as one `Vec`.
///
/// Batch boundaries are those of the wrapped sequence's `split`, so the
/// output is deterministic for a given input and batch size.
#[derive(Debug)]
pub struct FixedBatch<S> {
    inner: S,
}

impl<S: Splittable> FixedBatch<S> {
    /// Chunk `inner` along its own split boundaries
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Get a reference to the wrapped sequence
    pub fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S: Splittable> Advance for FixedBatch<S> {
    type Item = Vec<S::Item>;

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        match self.inner.split()? {
            Some(batch) => {
                action(batch.into_vec());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn characteristics(&self) -> Characteristics {
        self.inner.characteristics()
            & (Characteristics::ORDERED | Characteristics::NONNULL | Characteristics::IMMUTABLE)
    }
}

/// Chunk `source` into lists of `batch_size` elements; the last one may be
/// shorter
pub fn fixed_batches<A: Advance>(
    source: A,
    batch_size: usize,
) -> Result<BatchSplittable<FixedBatch<BatchSplittable<A>>>> {
    let inner = BatchSplittable::with_batch_size(source, batch_size)?;
    Ok(BatchSplittable::new(FixedBatch::new(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::VecSource;
    use splitseq_core::PullSequence;
    use test_case::test_case;

    fn chunk_lengths(len: usize, batch_size: usize) -> Vec<usize> {
        let source = PullSequence::new(VecSource::new((0..len).collect()));
        let mut chunks = fixed_batches(source, batch_size).unwrap();
        let mut lengths = Vec::new();
        chunks.for_each_remaining(&mut |chunk| lengths.push(chunk.len())).unwrap();
        lengths
    }

    #[test_case(205, 64, vec![64, 64, 64, 13] ; "uneven tail")]
    #[test_case(20, 5, vec![5, 5, 5, 5] ; "exact multiple")]
    #[test_case(0, 5, vec![] ; "empty")]
    fn test_chunk_lengths(len: usize, batch_size: usize, expected: Vec<usize>) {
        assert_eq!(chunk_lengths(len, batch_size), expected);
    }

    #[test]
    fn test_chunks_keep_order() {
        let source = PullSequence::new(VecSource::new(vec!['a', 'b', 'c', 'd', 'e']));
        let mut chunks = fixed_batches(source, 2).unwrap();

        let mut seen = Vec::new();
        chunks.for_each_remaining(&mut |chunk| seen.push(chunk)).unwrap();
        assert_eq!(seen, vec![vec!['a', 'b'], vec!['c', 'd'], vec!['e']]);
        assert!(chunks.next_item().unwrap().is_none());
    }

    #[test]
    fn test_chunks_can_be_split_again() {
        let source = PullSequence::new(VecSource::new((0..10).collect::<Vec<u32>>()));
        let mut chunks = BatchSplittable::with_batch_size(
            FixedBatch::new(BatchSplittable::with_batch_size(source, 3).unwrap()),
            2,
        )
        .unwrap();

        let first = chunks.split().unwrap().unwrap().into_vec();
        assert_eq!(first, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        let second = chunks.split().unwrap().unwrap().into_vec();
        assert_eq!(second, vec![vec![6, 7, 8], vec![9]]);
        assert!(chunks.split().unwrap().is_none());
    }

    #[test]
    fn test_chunks_never_claim_sized() {
        let source = PullSequence::new(VecSource::new(vec![1, 2, 3]));
        let chunks = fixed_batches(source, 2).unwrap();
        assert!(!chunks.has_characteristics(Characteristics::SIZED));
    }
}
