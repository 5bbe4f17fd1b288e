//! Sink trait and implementations for sequence output

use crate::error::Result;

/// A sink that consumes batches of computed results
pub trait Sink {
    /// The type of items this sink consumes
    type Item;

    /// Consume a batch of items
    fn consume(&mut self, items: Vec<Self::Item>) -> Result<()>;

    /// Flush any buffered items and finalize
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A sink that collects items in memory
#[derive(Debug)]
pub struct CollectingSink<T> {
    /// The collected items
    items: Vec<T>,

    /// Maximum number of items to collect
    max_items: Option<usize>,

    /// Number of `consume` calls seen
    batches: usize,
}

impl<T> CollectingSink<T> {
    /// Create a new collecting sink with no limit
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            max_items: None,
            batches: 0,
        }
    }

    /// Create a new collecting sink with a maximum number of items
    pub fn with_capacity(max_items: usize) -> Self {
        Self {
            items: Vec::with_capacity(max_items),
            max_items: Some(max_items),
            batches: 0,
        }
    }

    /// Get the collected items
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of batches consumed so far
    pub fn batches(&self) -> usize {
        self.batches
    }

    /// Take ownership of the collected items
    pub fn take_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for CollectingSink<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Sink for CollectingSink<T> {
    type Item = T;

    fn consume(&mut self, mut items: Vec<T>) -> Result<()> {
        self.batches += 1;
        if let Some(max) = self.max_items {
            let remaining = max.saturating_sub(self.items.len());
            if remaining < items.len() {
                items.truncate(remaining);
            }
        }

        self.items.extend(items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let mut sink = CollectingSink::new();
        sink.consume(vec![1, 2]).unwrap();
        sink.consume(vec![3]).unwrap();
        sink.flush().unwrap();

        assert_eq!(sink.items(), &[1, 2, 3]);
        assert_eq!(sink.batches(), 2);
    }

    #[test]
    fn test_collecting_sink_limit() {
        let mut sink = CollectingSink::with_capacity(3);
        sink.consume(vec![1, 2]).unwrap();
        sink.consume(vec![3, 4, 5]).unwrap();

        assert_eq!(sink.take_items(), vec![1, 2, 3]);
    }
}
