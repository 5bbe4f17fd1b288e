//! Grouping consecutive elements that share a key

use splitseq_core::{Advance, BatchSplittable, Characteristics, Result, Splittable};

/// Groups runs of consecutive elements whose keys are equal.
///
/// This is run-length grouping: a key that shows up again after a different
/// key starts a new group instead of joining the earlier one. The element
/// that ends a group is held back and opens the next group.
pub struct PartitionBy<S: Splittable, F> {
    inner: S,
    key_fn: F,
    pending: Option<S::Item>,
}

impl<S, F, K> PartitionBy<S, F>
where
    S: Splittable,
    F: FnMut(&S::Item) -> K,
    K: PartialEq,
{
    /// Group `inner` by the key computed by `key_fn`
    pub fn new(inner: S, key_fn: F) -> Self {
        Self {
            inner,
            key_fn,
            pending: None,
        }
    }
}

impl<S, F, K> Advance for PartitionBy<S, F>
where
    S: Splittable,
    F: FnMut(&S::Item) -> K,
    K: PartialEq,
{
    type Item = Vec<S::Item>;

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        let head = match self.pending.take() {
            Some(head) => head,
            None => match self.inner.next_item()? {
                Some(head) => head,
                None => return Ok(false),
            },
        };

        let key = (self.key_fn)(&head);
        let mut group = vec![head];
        while let Some(item) = self.inner.next_item()? {
            if (self.key_fn)(&item) == key {
                group.push(item);
            } else {
                self.pending = Some(item);
                break;
            }
        }

        action(group);
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        self.inner.characteristics()
            & (Characteristics::ORDERED | Characteristics::NONNULL | Characteristics::IMMUTABLE)
    }
}

/// Group the runs of `inner` by `key_fn`, splitting off groups in batches of
/// `batch_size`
pub fn partition_by<S, F, K>(
    inner: S,
    key_fn: F,
    batch_size: usize,
) -> Result<BatchSplittable<PartitionBy<S, F>>>
where
    S: Splittable,
    F: FnMut(&S::Item) -> K,
    K: PartialEq,
{
    BatchSplittable::with_batch_size(PartitionBy::new(inner, key_fn), batch_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::VecSource;
    use proptest::prelude::*;
    use splitseq_core::PullSequence;

    fn partition<T, K, F>(items: &[T], key_fn: F) -> Vec<Vec<T>>
    where
        T: Clone,
        K: PartialEq,
        F: FnMut(&T) -> K,
    {
        let inner = BatchSplittable::new(PullSequence::new(VecSource::new(items.to_vec())));
        let mut groups = partition_by(inner, key_fn, 16).unwrap();
        let mut out = Vec::new();
        groups.for_each_remaining(&mut |group| out.push(group)).unwrap();
        out
    }

    #[test]
    fn test_adjacent_runs_only() {
        let groups = partition(&[1, 1, 2, 2, 2, 3, 1], |x| *x);
        assert_eq!(groups, vec![vec![1, 1], vec![2, 2, 2], vec![3], vec![1]]);
    }

    #[test]
    fn test_parity_key() {
        let groups = partition(&[2, 4, 1, 3, 5, 6], |x: &i32| x % 2 == 0);
        assert_eq!(groups, vec![vec![2, 4], vec![1, 3, 5], vec![6]]);
    }

    #[test]
    fn test_empty_source_has_no_groups() {
        let empty: [u8; 0] = [];
        let groups = partition(&empty, |x| *x);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_single_element() {
        assert_eq!(partition(&["x"], |s| s.len()), vec![vec!["x"]]);
    }

    #[test]
    fn test_groups_split_into_batches() {
        let inner = BatchSplittable::new(PullSequence::new(VecSource::new(vec![
            0, 0, 1, 2, 2, 3, 4, 4, 4,
        ])));
        let mut groups = partition_by(inner, |x| *x, 2).unwrap();

        let first = groups.split().unwrap().unwrap().into_vec();
        assert_eq!(first, vec![vec![0, 0], vec![1]]);
        let second = groups.split().unwrap().unwrap().into_vec();
        assert_eq!(second, vec![vec![2, 2], vec![3]]);
        let third = groups.split().unwrap().unwrap().into_vec();
        assert_eq!(third, vec![vec![4, 4, 4]]);
        assert!(groups.split().unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_groups_flatten_to_input(items in proptest::collection::vec(0u8..4, 0..200)) {
            let groups = partition(&items, |x| *x);

            let flattened: Vec<u8> = groups.iter().flatten().copied().collect();
            prop_assert_eq!(&flattened, &items);

            for group in &groups {
                prop_assert!(!group.is_empty());
                prop_assert!(group.iter().all(|x| *x == group[0]));
            }
            for pair in groups.windows(2) {
                prop_assert_ne!(pair[0][0], pair[1][0]);
            }
        }
    }
}
