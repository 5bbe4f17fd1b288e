//! Splittable sequences and the fixed-batch splitting algorithm
//!
//! A sequential source only has to know how to produce its next element
//! ([`Advance`]). Wrapping it in a [`BatchSplittable`] gives it the full
//! driver contract ([`Splittable`]): every `split` call pulls a strict prefix
//! of up to `batch_size` elements off the front of the source and returns it
//! as an independent, already-materialized [`Batch`].
//!
//! Fetching stays strictly sequential. Parallel speedup comes from handing
//! the fetched batches to other workers, so it only pays off when the time to
//! fetch one element is small compared to the time needed to process it
//! divided by the level of parallelism. A batch size for which processing one
//! batch takes about 1 to 10 milliseconds is a good starting point.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

use tracing::trace;

use crate::batch::Batch;
use crate::characteristics::Characteristics;
use crate::config::SplitConfig;
use crate::error::{Error, Result};

/// Batch size used when none is configured
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Remaining element count of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeEstimate {
    /// At most this many elements remain (exactly this many if `SIZED`)
    Finite(u64),

    /// The count is unknown or unbounded
    Unbounded,
}

impl SizeEstimate {
    /// Whether the estimate is a finite count
    pub fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }

    /// The finite count, if any
    pub fn finite(self) -> Option<u64> {
        match self {
            Self::Finite(n) => Some(n),
            Self::Unbounded => None,
        }
    }

    /// Estimate after `n` more elements have been removed
    #[must_use]
    pub fn consumed(self, n: u64) -> Self {
        match self {
            Self::Finite(count) => Self::Finite(count.saturating_sub(n)),
            Self::Unbounded => Self::Unbounded,
        }
    }
}

impl From<Option<u64>> for SizeEstimate {
    fn from(count: Option<u64>) -> Self {
        count.map_or(Self::Unbounded, Self::Finite)
    }
}

/// Ordering exposed by a sorted sequence.
///
/// None of the sequences in this workspace expose one: they follow encounter
/// order and report `Ok(None)` from [`Splittable::comparator`]. A sequence
/// over sorted data overrides that method to return its ordering.
pub type Comparator<T> = fn(&T, &T) -> Ordering;

/// A strictly sequential producer that can hand out one element at a time.
///
/// This is the only primitive a concrete source has to supply.
pub trait Advance {
    /// The type of elements produced
    type Item;

    /// Pull exactly one element and pass it to `action`.
    ///
    /// Returns `Ok(false)` without calling `action` when the source is
    /// exhausted.
    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool>;

    /// Guarantees this source makes about its elements
    fn characteristics(&self) -> Characteristics {
        Characteristics::empty()
    }

    /// Remaining element count when the sequence is created
    fn estimate_size(&self) -> SizeEstimate {
        SizeEstimate::Unbounded
    }
}

/// The contract a driver traverses and splits.
///
/// At most one caller drives a given sequence at a time. Batches returned by
/// [`split`](Splittable::split) never overlap with each other or with what
/// remains, so a batch and the residual can be consumed on different threads
/// without synchronization.
pub trait Splittable {
    /// The type of elements produced
    type Item;

    /// Pull exactly one element and pass it to `action`.
    ///
    /// Once this returns `Ok(false)` every later call returns `Ok(false)`.
    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool>;

    /// Remove a prefix of the remaining elements and return it as a batch.
    ///
    /// Returns `Ok(None)` only when no element remains.
    fn split(&mut self) -> Result<Option<Batch<Self::Item>>>;

    /// Current estimate of the remaining element count; never increases
    fn estimate_size(&self) -> SizeEstimate;

    /// Guarantees reported by this sequence
    fn characteristics(&self) -> Characteristics;

    /// Whether every flag of `characteristics` is reported
    fn has_characteristics(&self, characteristics: Characteristics) -> bool {
        self.characteristics().contains(characteristics)
    }

    /// The ordering of this sequence.
    ///
    /// `Ok(None)` means elements follow encounter order with no comparator.
    /// Asking for an ordering on a sequence that is not `ORDERED` is a
    /// contract violation and fails with [`Error::InvalidState`].
    fn comparator(&self) -> Result<Option<Comparator<Self::Item>>> {
        if self.has_characteristics(Characteristics::ORDERED) {
            Ok(None)
        } else {
            Err(Error::InvalidState(
                "sequence is not ORDERED, there is no ordering to expose".into(),
            ))
        }
    }

    /// Pass every remaining element to `action`
    fn for_each_remaining(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<()> {
        while self.try_advance(action)? {}
        Ok(())
    }

    /// Take the next element, if any
    fn next_item(&mut self) -> Result<Option<Self::Item>> {
        let mut slot = None;
        self.try_advance(&mut |item| slot = Some(item))?;
        Ok(slot)
    }
}

/// A sequence whose underlying resource has to be released explicitly
pub trait Closeable {
    /// Release the resource. Calling this more than once is a no-op.
    fn close(&mut self);
}

/// Turns any [`Advance`] source into a [`Splittable`] sequence that splits
/// off its strict prefix in batches of a fixed size.
///
/// Characteristics and the size estimate are taken from the source once, at
/// construction. A finite estimate decreases by one on every successful
/// advance and by the batch length on every split.
///
/// If the source fails while a batch is being filled, the elements already
/// pulled for that batch are kept and served first by the next call.
pub struct BatchSplittable<A: Advance> {
    source: A,
    batch_size: usize,
    characteristics: Characteristics,
    estimate: SizeEstimate,
    pending: VecDeque<A::Item>,
    exhausted: bool,
}

impl<A: Advance> BatchSplittable<A> {
    /// Wrap `source` using [`DEFAULT_BATCH_SIZE`]
    pub fn new(source: A) -> Self {
        let (characteristics, estimate) = Self::reported(&source);
        Self {
            source,
            batch_size: DEFAULT_BATCH_SIZE,
            characteristics: characteristics.with_subsized(),
            estimate,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Wrap `source`, splitting off batches of `batch_size`
    pub fn with_batch_size(source: A, batch_size: usize) -> Result<Self> {
        let (characteristics, estimate) = Self::reported(&source);
        Self::with_parts(source, characteristics, batch_size, estimate)
    }

    /// Wrap `source` using the batch size from `config`
    pub fn from_config(source: A, config: &SplitConfig) -> Result<Self> {
        config.validate()?;
        Self::with_batch_size(source, config.batch_size)
    }

    /// Wrap `source`, overriding the characteristics and estimate it reports.
    ///
    /// Reporting `SIZED` requires a finite estimate and implies `SUBSIZED`.
    pub fn with_parts(
        source: A,
        characteristics: Characteristics,
        batch_size: usize,
        estimate: SizeEstimate,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::InvalidArgument(
                "Batch size must be greater than 0".into(),
            ));
        }
        if characteristics.contains(Characteristics::SIZED) && !estimate.is_finite() {
            return Err(Error::InvalidArgument(
                "A SIZED sequence needs a finite size estimate".into(),
            ));
        }

        Ok(Self {
            source,
            batch_size,
            characteristics: characteristics.with_subsized(),
            estimate,
            pending: VecDeque::new(),
            exhausted: false,
        })
    }

    /// Size of the batches split off this sequence
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Get a reference to the wrapped source
    pub fn get_ref(&self) -> &A {
        &self.source
    }

    /// Get a mutable reference to the wrapped source
    pub fn get_mut(&mut self) -> &mut A {
        &mut self.source
    }

    /// Unwrap the source
    pub fn into_inner(self) -> A {
        self.source
    }

    /// What the source reports, without `SIZED` unless its estimate is finite
    fn reported(source: &A) -> (Characteristics, SizeEstimate) {
        let estimate = source.estimate_size();
        let mut characteristics = source.characteristics();
        if !estimate.is_finite() {
            characteristics = characteristics
                .difference(Characteristics::SIZED | Characteristics::SUBSIZED);
        }
        (characteristics, estimate)
    }

    fn advance_source(&mut self, action: &mut dyn FnMut(A::Item)) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        let advanced = self.source.try_advance(action)?;
        if !advanced {
            self.exhausted = true;
        }
        Ok(advanced)
    }
}

impl<A: Advance> Splittable for BatchSplittable<A> {
    type Item = A::Item;

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        let advanced = match self.pending.pop_front() {
            Some(item) => {
                action(item);
                true
            }
            None => self.advance_source(action)?,
        };
        if advanced {
            self.estimate = self.estimate.consumed(1);
        }
        Ok(advanced)
    }

    fn split(&mut self) -> Result<Option<Batch<Self::Item>>> {
        let mut buffer = Vec::with_capacity(self.batch_size);
        let held = self.pending.len().min(self.batch_size);
        buffer.extend(self.pending.drain(..held));
        while buffer.len() < self.batch_size {
            let advanced = self.advance_source(&mut |item| buffer.push(item));
            match advanced {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    // Keep what was pulled so far, ahead of anything still held
                    for item in buffer.into_iter().rev() {
                        self.pending.push_front(item);
                    }
                    return Err(e);
                }
            }
        }

        if buffer.is_empty() {
            return Ok(None);
        }

        self.estimate = self.estimate.consumed(buffer.len() as u64);
        trace!(
            batch_len = buffer.len(),
            batch_size = self.batch_size,
            "split off batch"
        );
        Ok(Some(Batch::new(buffer, self.characteristics)))
    }

    fn estimate_size(&self) -> SizeEstimate {
        self.estimate
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }
}

impl<A: Advance + fmt::Debug> fmt::Debug for BatchSplittable<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchSplittable")
            .field("source", &self.source)
            .field("batch_size", &self.batch_size)
            .field("characteristics", &self.characteristics)
            .field("estimate", &self.estimate)
            .field("pending", &self.pending.len())
            .field("exhausted", &self.exhausted)
            .finish()
    }
}

impl<A: Advance + Closeable> Closeable for BatchSplittable<A> {
    fn close(&mut self) {
        self.source.close();
    }
}
