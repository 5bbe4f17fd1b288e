//! Lockstep combination of several sequences

use splitseq_core::{Advance, BatchSplittable, Characteristics, Result, Splittable};

const ZIP_FLAGS: Characteristics = Characteristics::ORDERED
    .union(Characteristics::NONNULL)
    .union(Characteristics::IMMUTABLE);

/// Pairs up the elements of two sequences position by position.
///
/// Each step advances `left`, then `right`. The zipped sequence ends at the
/// first step where either input is exhausted, and an element already pulled
/// from `left` in that step is discarded.
#[derive(Debug)]
pub struct Zip<A, B> {
    left: A,
    right: B,
    finished: bool,
}

impl<A: Splittable, B: Splittable> Zip<A, B> {
    /// Zip `left` with `right`
    pub fn new(left: A, right: B) -> Self {
        Self {
            left,
            right,
            finished: false,
        }
    }
}

impl<A: Splittable, B: Splittable> Advance for Zip<A, B> {
    type Item = (A::Item, B::Item);

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        let Some(a) = self.left.next_item()? else {
            self.finished = true;
            return Ok(false);
        };
        let Some(b) = self.right.next_item()? else {
            self.finished = true;
            return Ok(false);
        };
        action((a, b));
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        self.left.characteristics() & self.right.characteristics() & ZIP_FLAGS
    }
}

/// Zips any number of sequences of the same element type into rows.
///
/// Inputs are advanced in order and the first exhausted input ends the whole
/// sequence; values pulled earlier in that step are discarded. With no
/// inputs the sequence is empty.
#[derive(Debug)]
pub struct ZipN<S> {
    inputs: Vec<S>,
    finished: bool,
}

impl<S: Splittable> ZipN<S> {
    /// Zip all of `inputs`
    pub fn new(inputs: Vec<S>) -> Self {
        let finished = inputs.is_empty();
        Self { inputs, finished }
    }

    /// Number of zipped inputs
    pub fn width(&self) -> usize {
        self.inputs.len()
    }
}

impl<S: Splittable> Advance for ZipN<S> {
    type Item = Vec<S::Item>;

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        if self.finished {
            return Ok(false);
        }
        let mut row = Vec::with_capacity(self.inputs.len());
        for input in &mut self.inputs {
            match input.next_item()? {
                Some(value) => row.push(value),
                None => {
                    self.finished = true;
                    return Ok(false);
                }
            }
        }
        action(row);
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        self.inputs
            .iter()
            .fold(ZIP_FLAGS, |acc, input| acc & input.characteristics())
    }
}

/// Zip two sequences into a batch-splittable sequence of pairs
pub fn zip<A: Splittable, B: Splittable>(left: A, right: B) -> BatchSplittable<Zip<A, B>> {
    BatchSplittable::new(Zip::new(left, right))
}

/// Zip any number of sequences into a batch-splittable sequence of rows
pub fn zip_all<S: Splittable>(inputs: Vec<S>) -> BatchSplittable<ZipN<S>> {
    BatchSplittable::new(ZipN::new(inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::VecSource;
    use splitseq_core::{PullSequence, SizeEstimate};

    fn ordered<T>(items: Vec<T>) -> BatchSplittable<PullSequence<VecSource<T>>> {
        BatchSplittable::new(
            PullSequence::new(VecSource::new(items)).with_characteristics(Characteristics::ORDERED),
        )
    }

    /// Yields `0..len` and counts how often it was asked for an element
    struct Counting {
        next: u32,
        len: u32,
        pulls: usize,
    }

    impl Advance for Counting {
        type Item = u32;

        fn try_advance(&mut self, action: &mut dyn FnMut(u32)) -> Result<bool> {
            self.pulls += 1;
            if self.next >= self.len {
                return Ok(false);
            }
            action(self.next);
            self.next += 1;
            Ok(true)
        }
    }

    fn counting(len: u32) -> BatchSplittable<Counting> {
        BatchSplittable::new(Counting {
            next: 0,
            len,
            pulls: 0,
        })
    }

    fn drain<S: Splittable>(mut seq: S) -> Vec<S::Item> {
        let mut out = Vec::new();
        seq.for_each_remaining(&mut |item| out.push(item)).unwrap();
        out
    }

    #[test]
    fn test_zip_stops_at_shorter_input() {
        let pairs = drain(zip(ordered(vec![1, 2, 3]), ordered(vec!['A', 'B'])));
        assert_eq!(pairs, vec![(1, 'A'), (2, 'B')]);

        let swapped = drain(zip(ordered(vec!['A', 'B']), ordered(vec![1, 2, 3])));
        assert_eq!(swapped, vec![('A', 1), ('B', 2)]);
    }

    #[test]
    fn test_zip_stays_finished() {
        let mut zipped = zip(ordered(vec![1]), ordered(Vec::<u8>::new()));
        assert!(zipped.next_item().unwrap().is_none());
        assert!(zipped.next_item().unwrap().is_none());
    }

    #[test]
    fn test_zip_skips_right_once_left_is_exhausted() {
        let mut zipped = zip(counting(0), counting(5));
        assert!(zipped.next_item().unwrap().is_none());
        assert!(zipped.next_item().unwrap().is_none());
        assert_eq!(zipped.get_ref().left.get_ref().pulls, 1);
        assert_eq!(zipped.get_ref().right.get_ref().pulls, 0);
    }

    #[test]
    fn test_zip_discards_left_value_of_failed_step() {
        let mut zipped = zip(counting(3), counting(1));
        assert_eq!(zipped.next_item().unwrap(), Some((0, 0)));
        assert!(zipped.next_item().unwrap().is_none());

        let left = &mut zipped.get_mut().left;
        assert_eq!(left.get_ref().pulls, 2);
        assert_eq!(left.next_item().unwrap(), Some(2));
    }

    #[test]
    fn test_zip_n_stops_at_first_exhausted_input() {
        let mut zipped = zip_all(vec![counting(2), counting(1), counting(4)]);
        assert_eq!(zipped.next_item().unwrap(), Some(vec![0, 0, 0]));
        assert!(zipped.next_item().unwrap().is_none());
        assert!(zipped.next_item().unwrap().is_none());

        let pulls: Vec<usize> = zipped
            .get_ref()
            .inputs
            .iter()
            .map(|input| input.get_ref().pulls)
            .collect();
        assert_eq!(pulls, vec![2, 2, 1]);
    }

    #[test]
    fn test_zip_keeps_only_common_characteristics() {
        let unordered = BatchSplittable::new(PullSequence::new(VecSource::new(vec![1, 2])));
        let zipped = zip(ordered(vec![1, 2]), unordered);

        assert!(!zipped.has_characteristics(Characteristics::ORDERED));
        assert!(zipped.has_characteristics(Characteristics::NONNULL | Characteristics::IMMUTABLE));
        assert!(!zipped.has_characteristics(Characteristics::SIZED));
        assert_eq!(zipped.estimate_size(), SizeEstimate::Unbounded);
        assert!(zipped.comparator().is_err());
    }

    #[test]
    fn test_zip_n_rows() {
        let rows = drain(zip_all(vec![
            ordered(vec![1, 2, 3]),
            ordered(vec![10, 20, 30, 40]),
            ordered(vec![100, 200, 300]),
        ]));
        assert_eq!(rows, vec![vec![1, 10, 100], vec![2, 20, 200], vec![3, 30, 300]]);
    }

    #[test]
    fn test_zip_n_without_inputs_is_empty() {
        let zipped = zip_all(Vec::<BatchSplittable<PullSequence<VecSource<u8>>>>::new());
        assert!(drain(zipped).is_empty());
    }

    #[test]
    fn test_zip_n_is_ordered_when_all_inputs_are() {
        let zipped = zip_all(vec![ordered(vec![1]), ordered(vec![2])]);
        assert!(zipped.has_characteristics(Characteristics::ORDERED));
        assert_eq!(zipped.get_ref().width(), 2);
    }

    #[test]
    fn test_zipped_pairs_split_into_batches() {
        let mut zipped = BatchSplittable::with_batch_size(
            Zip::new(ordered((0..5).collect::<Vec<u32>>()), ordered(vec!["a"; 5])),
            2,
        )
        .unwrap();

        let sizes: Vec<usize> = std::iter::from_fn(|| zipped.split().unwrap())
            .map(|batch| batch.len())
            .collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }
}
