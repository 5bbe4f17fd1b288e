//! Sequences over external cursors that must be released

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use splitseq_core::{
    Advance, BatchSplittable, Characteristics, Closeable, Cursor, Error, Result, SequenceStream,
};
use tracing::debug;

/// One row read from a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row<F> {
    /// The cursor produces single-field rows
    Scalar(F),

    /// The cursor produces rows of several fields
    Tuple(Vec<F>),
}

impl<F> Row<F> {
    /// The field of a scalar row
    pub fn into_scalar(self) -> Option<F> {
        match self {
            Self::Scalar(field) => Some(field),
            Self::Tuple(_) => None,
        }
    }

    /// All fields of the row, in cursor order
    pub fn into_fields(self) -> Vec<F> {
        match self {
            Self::Scalar(field) => vec![field],
            Self::Tuple(fields) => fields,
        }
    }

    /// Number of fields
    pub fn width(&self) -> usize {
        match self {
            Self::Scalar(_) => 1,
            Self::Tuple(fields) => fields.len(),
        }
    }
}

/// Row shape, fixed by the first row read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowShape {
    Unresolved,
    Scalar,
    Tuple(usize),
}

#[derive(Debug)]
enum CursorState<C> {
    Open(C),
    Closed,
}

/// Adapts a [`Cursor`] into a sequence of [`Row`]s and owns its release.
///
/// The cursor is released exactly once: when it reports no more rows, on an
/// explicit [`close`](Closeable::close), or when the adapter is dropped,
/// whichever comes first. A closed adapter never touches the cursor again.
#[derive(Debug)]
pub struct ResourceBound<C: Cursor> {
    state: CursorState<C>,
    shape: RowShape,
}

impl<C: Cursor> ResourceBound<C> {
    /// Take ownership of an open `cursor`
    pub fn new(cursor: C) -> Self {
        Self {
            state: CursorState::Open(cursor),
            shape: RowShape::Unresolved,
        }
    }

    /// Whether the cursor has been released
    pub fn is_closed(&self) -> bool {
        matches!(self.state, CursorState::Closed)
    }

    fn shape_row(&mut self, fields: Vec<C::Field>) -> Result<Row<C::Field>> {
        match self.shape {
            RowShape::Unresolved => {
                self.shape = if fields.len() == 1 {
                    RowShape::Scalar
                } else {
                    RowShape::Tuple(fields.len())
                };
                self.shape_row(fields)
            }
            RowShape::Scalar => {
                let width = fields.len();
                let [field] = <[C::Field; 1]>::try_from(fields).map_err(|_| {
                    Error::TypeMismatch(format!(
                        "Expected single-field rows, got a row of {width} fields"
                    ))
                })?;
                Ok(Row::Scalar(field))
            }
            RowShape::Tuple(width) if fields.len() == width => Ok(Row::Tuple(fields)),
            RowShape::Tuple(width) => Err(Error::TypeMismatch(format!(
                "Expected rows of {width} fields, got a row of {} fields",
                fields.len()
            ))),
        }
    }
}

impl<C: Cursor> Advance for ResourceBound<C> {
    type Item = Row<C::Field>;

    fn try_advance(&mut self, action: &mut dyn FnMut(Self::Item)) -> Result<bool> {
        let CursorState::Open(cursor) = &mut self.state else {
            return Ok(false);
        };
        if !cursor.advance()? {
            self.close();
            return Ok(false);
        }
        let fields = cursor.current_row()?;
        let row = self.shape_row(fields)?;
        action(row);
        Ok(true)
    }

    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::NONNULL
    }
}

impl<C: Cursor> Closeable for ResourceBound<C> {
    fn close(&mut self) {
        if let CursorState::Open(mut cursor) =
            std::mem::replace(&mut self.state, CursorState::Closed)
        {
            cursor.release();
            debug!("released cursor");
        }
    }
}

impl<C: Cursor> Drop for ResourceBound<C> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Wrap `cursor` in a batch-splittable sequence of rows
pub fn resource_sequence<C: Cursor>(
    cursor: C,
    batch_size: usize,
) -> Result<BatchSplittable<ResourceBound<C>>> {
    BatchSplittable::with_batch_size(ResourceBound::new(cursor), batch_size)
}

/// A stream over `seq` that releases the cursor when the stream is closed
/// or dropped
pub fn result_stream<C>(
    seq: BatchSplittable<ResourceBound<C>>,
) -> SequenceStream<BatchSplittable<ResourceBound<C>>>
where
    C: Cursor + 'static,
{
    SequenceStream::closing(seq)
}

/// An in-memory [`Cursor`] over prepared rows
#[derive(Debug)]
pub struct VecCursor<F> {
    rows: Vec<Vec<F>>,
    next: usize,
    current: Option<usize>,
    released: bool,
    releases: Arc<AtomicUsize>,
}

impl<F: Clone> VecCursor<F> {
    /// Serve `rows` in order
    pub fn new(rows: Vec<Vec<F>>) -> Self {
        Self {
            rows,
            next: 0,
            current: None,
            released: false,
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A handle counting every call to `release`, usable after the cursor
    /// has been moved into an adapter
    pub fn release_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.releases)
    }

    /// Number of `release` calls so far
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl<F: Clone> Cursor for VecCursor<F> {
    type Field = F;

    fn advance(&mut self) -> Result<bool> {
        if self.released {
            return Err(Error::InvalidState("Cursor advanced after release".into()));
        }
        if self.next >= self.rows.len() {
            self.current = None;
            return Ok(false);
        }
        self.current = Some(self.next);
        self.next += 1;
        Ok(true)
    }

    fn current_row(&mut self) -> Result<Vec<F>> {
        if self.released {
            return Err(Error::InvalidState("Cursor read after release".into()));
        }
        self.current
            .and_then(|index| self.rows.get(index))
            .cloned()
            .ok_or_else(|| Error::InvalidState("Cursor is not positioned on a row".into()))
    }

    fn release(&mut self) {
        self.released = true;
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}
