//! Materialized batches split off a sequence

use static_assertions::assert_impl_all;

use crate::characteristics::Characteristics;
use crate::error::Result;
use crate::sequence::{SizeEstimate, Splittable};

/// A finite, ordered run of elements split off the front of a sequence.
///
/// A batch owns its elements and shares nothing with the sequence it came
/// from, so it can be consumed on any thread while the residual keeps being
/// traversed. It is itself [`Splittable`]: splitting hands out its first half.
#[derive(Debug, Clone)]
pub struct Batch<T> {
    items: std::vec::IntoIter<T>,
    characteristics: Characteristics,
}

assert_impl_all!(Batch<u64>: Send, Sync);
assert_impl_all!(Batch<String>: Send, Sync);

impl<T> Batch<T> {
    /// Create a batch reporting the parent's characteristics plus
    /// `SIZED | SUBSIZED`
    pub fn new(items: Vec<T>, characteristics: Characteristics) -> Self {
        Self {
            items: items.into_iter(),
            characteristics: characteristics | Characteristics::SIZED | Characteristics::SUBSIZED,
        }
    }

    /// Number of elements not yet consumed
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether every element has been consumed
    pub fn is_empty(&self) -> bool {
        self.items.as_slice().is_empty()
    }

    /// The remaining elements
    pub fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Iterate over the remaining elements
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.as_slice().iter()
    }

    /// Take the remaining elements
    pub fn into_vec(self) -> Vec<T> {
        self.items.collect()
    }
}

impl<T> IntoIterator for Batch<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items
    }
}

impl<'a, T> IntoIterator for &'a Batch<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T> Splittable for Batch<T> {
    type Item = T;

    fn try_advance(&mut self, action: &mut dyn FnMut(T)) -> Result<bool> {
        match self.items.next() {
            Some(item) => {
                action(item);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn split(&mut self) -> Result<Option<Batch<T>>> {
        let len = self.items.len();
        if len == 0 {
            return Ok(None);
        }
        let prefix_len = len.div_ceil(2);
        let prefix: Vec<T> = self.items.by_ref().take(prefix_len).collect();
        Ok(Some(Batch {
            items: prefix.into_iter(),
            characteristics: self.characteristics,
        }))
    }

    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Finite(self.items.len() as u64)
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_is_sized() {
        let batch = Batch::new(vec![1, 2, 3], Characteristics::ORDERED);
        assert!(batch.has_characteristics(
            Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED
        ));
        assert_eq!(batch.estimate_size(), SizeEstimate::Finite(3));
    }

    #[test]
    fn test_batch_split_takes_front_half() {
        let mut batch = Batch::new((0..5).collect(), Characteristics::ORDERED);
        let front = batch.split().unwrap().unwrap();

        assert_eq!(front.as_slice(), &[0, 1, 2]);
        assert_eq!(batch.as_slice(), &[3, 4]);
        assert_eq!(batch.estimate_size(), SizeEstimate::Finite(2));
    }

    #[test]
    fn test_single_element_batch_splits_whole() {
        let mut batch = Batch::new(vec!["a"], Characteristics::empty());
        let front = batch.split().unwrap().unwrap();

        assert_eq!(front.into_vec(), vec!["a"]);
        assert!(batch.is_empty());
        assert!(batch.split().unwrap().is_none());
    }

    #[test]
    fn test_batch_advance_then_collect() {
        let mut batch = Batch::new(vec![10, 20, 30], Characteristics::ORDERED);
        assert_eq!(batch.next_item().unwrap(), Some(10));
        assert_eq!(batch.iter().copied().collect::<Vec<_>>(), vec![20, 30]);
        assert_eq!(batch.into_vec(), vec![20, 30]);
    }
}
