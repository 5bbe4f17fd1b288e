//! Concrete pull sources

use std::io::BufRead;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use splitseq_core::{BatchSplittable, Error, PullSequence, PullSource, Result};

/// Longest sequence a [`RandomIntSource`] generates, exclusive
pub const RANDOM_MAX_LEN: usize = 10_000;

/// Upper bound of generated values, exclusive
pub const RANDOM_MAX_VALUE: i32 = 10;

/// A finite in-memory source with an exact size
#[derive(Debug, Clone)]
pub struct VecSource<T> {
    items: std::vec::IntoIter<T>,
}

impl<T> VecSource<T> {
    /// Create a source yielding `items` in order
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter(),
        }
    }
}

impl<T> PullSource for VecSource<T> {
    type Item = T;

    fn has_next(&mut self) -> Result<bool> {
        Ok(!self.items.as_slice().is_empty())
    }

    fn next(&mut self) -> Result<T> {
        self.items.next().ok_or(Error::SourceExhausted)
    }

    fn size_hint(&self) -> Option<u64> {
        Some(self.items.len() as u64)
    }
}

/// Yields the lines of a reader without their line terminators
#[derive(Debug)]
pub struct LineSource<R> {
    reader: R,
    pending: Option<String>,
    done: bool,
}

impl<R: BufRead> LineSource<R> {
    /// Read lines from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: None,
            done: false,
        }
    }

    fn fill(&mut self) -> Result<()> {
        if self.pending.is_some() || self.done {
            return Ok(());
        }
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            self.done = true;
            return Ok(());
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        self.pending = Some(line);
        Ok(())
    }
}

impl<R: BufRead> PullSource for LineSource<R> {
    type Item = String;

    fn has_next(&mut self) -> Result<bool> {
        self.fill()?;
        Ok(self.pending.is_some())
    }

    fn next(&mut self) -> Result<String> {
        self.fill()?;
        self.pending.take().ok_or(Error::SourceExhausted)
    }
}

/// A random-length run of small random integers.
///
/// The length is drawn from `0..RANDOM_MAX_LEN` and every value from
/// `0..RANDOM_MAX_VALUE`.
#[derive(Debug, Clone)]
pub struct RandomIntSource {
    values: Vec<i32>,
    index: usize,
}

impl RandomIntSource {
    /// Generate from the thread-local generator
    pub fn new() -> Self {
        Self::generate(&mut rand::thread_rng())
    }

    /// Generate deterministically from `seed`
    pub fn with_seed(seed: u64) -> Self {
        Self::generate(&mut StdRng::seed_from_u64(seed))
    }

    /// Serve exactly `values`
    pub fn from_values(values: Vec<i32>) -> Self {
        Self { values, index: 0 }
    }

    fn generate<G: Rng>(rng: &mut G) -> Self {
        let len = rng.gen_range(0..RANDOM_MAX_LEN);
        let values = (0..len).map(|_| rng.gen_range(0..RANDOM_MAX_VALUE)).collect();
        Self::from_values(values)
    }

    /// Total number of values, consumed or not
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the source generated no values at all
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for RandomIntSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PullSource for RandomIntSource {
    type Item = i32;

    fn has_next(&mut self) -> Result<bool> {
        Ok(self.index < self.values.len())
    }

    fn next(&mut self) -> Result<i32> {
        let value = *self.values.get(self.index).ok_or(Error::SourceExhausted)?;
        self.index += 1;
        Ok(value)
    }

    fn size_hint(&self) -> Option<u64> {
        Some((self.values.len() - self.index) as u64)
    }
}

/// Wrap a pull source in a batch-splittable sequence
pub fn source_sequence<P: PullSource>(
    source: P,
    batch_size: usize,
) -> Result<BatchSplittable<PullSequence<P>>> {
    BatchSplittable::with_batch_size(PullSequence::new(source), batch_size)
}
