//! Source traits consumed by the sequence adapters

use crate::characteristics::Characteristics;
use crate::error::Result;
use crate::sequence::{Advance, SizeEstimate};

/// A strictly sequential, pull-based producer of elements
pub trait PullSource {
    /// The type of items produced by this source
    type Item;

    /// Whether another element is available
    fn has_next(&mut self) -> Result<bool>;

    /// Produce the next element.
    ///
    /// Fails with [`Error::SourceExhausted`](crate::Error::SourceExhausted)
    /// when called after the source ran dry.
    fn next(&mut self) -> Result<Self::Item>;

    /// Exact number of remaining items, if known
    fn size_hint(&self) -> Option<u64> {
        None
    }
}

/// A forward-only cursor over an external result set that holds resources
/// until it is released
pub trait Cursor {
    /// The type of a single field of a row
    type Field;

    /// Move to the next row. Returns `Ok(false)` when there is none.
    fn advance(&mut self) -> Result<bool>;

    /// Fields of the row the cursor is positioned on
    fn current_row(&mut self) -> Result<Vec<Self::Field>>;

    /// Release the underlying resources. Must tolerate repeated calls.
    fn release(&mut self);
}

/// Adapts a [`PullSource`] into an [`Advance`] source.
///
/// Reports `NONNULL | IMMUTABLE` plus `SIZED` when the source knows its
/// remaining size.
#[derive(Debug)]
pub struct PullSequence<P> {
    source: P,
    characteristics: Characteristics,
}

impl<P: PullSource> PullSequence<P> {
    /// Create a new pull sequence
    pub fn new(source: P) -> Self {
        let mut characteristics = Characteristics::NONNULL | Characteristics::IMMUTABLE;
        if source.size_hint().is_some() {
            characteristics |= Characteristics::SIZED;
        }
        Self {
            source,
            characteristics,
        }
    }

    /// Report additional characteristics, e.g. `ORDERED` for ordered sources
    #[must_use]
    pub fn with_characteristics(mut self, additional: Characteristics) -> Self {
        self.characteristics |= additional;
        self
    }

    /// Get a reference to the wrapped source
    pub fn get_ref(&self) -> &P {
        &self.source
    }

    /// Unwrap the source
    pub fn into_inner(self) -> P {
        self.source
    }
}

impl<P: PullSource> Advance for PullSequence<P> {
    type Item = P::Item;

    fn try_advance(&mut self, action: &mut dyn FnMut(P::Item)) -> Result<bool> {
        if !self.source.has_next()? {
            return Ok(false);
        }
        action(self.source.next()?);
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        self.characteristics
    }

    fn estimate_size(&self) -> SizeEstimate {
        self.source.size_hint().into()
    }
}
