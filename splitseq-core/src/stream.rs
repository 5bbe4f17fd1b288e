//! Iteration over a splittable sequence with close hooks

use std::fmt;

use tracing::debug;

use crate::batch::Batch;
use crate::characteristics::Characteristics;
use crate::error::Result;
use crate::sequence::{Closeable, Comparator, SizeEstimate, Splittable};

type CloseHook<S> = Box<dyn FnOnce(&mut S) + Send>;

/// An iterator over a sequence that runs registered hooks when it is closed.
///
/// Closing happens once, either through [`close`](SequenceStream::close) or
/// when the stream is dropped, so resources tied to the sequence are released
/// even when iteration is abandoned early. The stream stops after the first
/// error it yields.
pub struct SequenceStream<S: Splittable> {
    sequence: S,
    on_close: Vec<CloseHook<S>>,
    closed: bool,
    failed: bool,
}

impl<S: Splittable> SequenceStream<S> {
    /// Create a stream with no close hooks
    pub fn new(sequence: S) -> Self {
        Self {
            sequence,
            on_close: Vec::new(),
            closed: false,
            failed: false,
        }
    }

    /// Register a hook to run when the stream is closed
    #[must_use]
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(&mut S) + Send + 'static,
    {
        self.on_close.push(Box::new(hook));
        self
    }

    /// Run every close hook, in registration order. Later calls do nothing.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let hooks = std::mem::take(&mut self.on_close);
        debug!(hooks = hooks.len(), "closing sequence stream");
        for hook in hooks {
            hook(&mut self.sequence);
        }
    }

    /// Whether the stream has been closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Get a reference to the underlying sequence
    pub fn sequence(&self) -> &S {
        &self.sequence
    }

    /// Get a mutable reference to the underlying sequence
    pub fn sequence_mut(&mut self) -> &mut S {
        &mut self.sequence
    }
}

impl<S: Splittable + Closeable + 'static> SequenceStream<S> {
    /// Create a stream that closes `sequence` when the stream is closed
    pub fn closing(sequence: S) -> Self {
        Self::new(sequence).on_close(|sequence: &mut S| sequence.close())
    }
}

impl<S: Splittable> Iterator for SequenceStream<S> {
    type Item = Result<S::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed || self.failed {
            return None;
        }
        match self.sequence.next_item() {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: Splittable> Splittable for SequenceStream<S> {
    type Item = S::Item;

    fn try_advance(&mut self, action: &mut dyn FnMut(S::Item)) -> Result<bool> {
        if self.closed || self.failed {
            return Ok(false);
        }
        let advanced = self.sequence.try_advance(action);
        self.failed = advanced.is_err();
        advanced
    }

    fn split(&mut self) -> Result<Option<Batch<S::Item>>> {
        if self.closed || self.failed {
            return Ok(None);
        }
        let batch = self.sequence.split();
        self.failed = batch.is_err();
        batch
    }

    fn estimate_size(&self) -> SizeEstimate {
        self.sequence.estimate_size()
    }

    fn characteristics(&self) -> Characteristics {
        self.sequence.characteristics()
    }

    fn comparator(&self) -> Result<Option<Comparator<S::Item>>> {
        self.sequence.comparator()
    }
}

impl<S: Splittable> Closeable for SequenceStream<S> {
    fn close(&mut self) {
        SequenceStream::close(self);
    }
}

impl<S: Splittable> Drop for SequenceStream<S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<S: Splittable + fmt::Debug> fmt::Debug for SequenceStream<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceStream")
            .field("sequence", &self.sequence)
            .field("on_close", &self.on_close.len())
            .field("closed", &self.closed)
            .field("failed", &self.failed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Yields its items, then optionally fails once
    struct Scripted {
        items: Vec<u32>,
        fail_at_end: bool,
        closes: Arc<AtomicUsize>,
    }

    impl Splittable for Scripted {
        type Item = u32;

        fn try_advance(&mut self, action: &mut dyn FnMut(u32)) -> Result<bool> {
            if self.items.is_empty() {
                if self.fail_at_end {
                    return Err(Error::Io(std::io::Error::other("fetch failed")));
                }
                return Ok(false);
            }
            action(self.items.remove(0));
            Ok(true)
        }

        fn split(&mut self) -> Result<Option<Batch<u32>>> {
            Ok(None)
        }

        fn estimate_size(&self) -> SizeEstimate {
            SizeEstimate::Unbounded
        }

        fn characteristics(&self) -> Characteristics {
            Characteristics::ORDERED
        }
    }

    impl Closeable for Scripted {
        fn close(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn scripted(items: Vec<u32>, fail_at_end: bool) -> (Scripted, Arc<AtomicUsize>) {
        let closes = Arc::new(AtomicUsize::new(0));
        let seq = Scripted {
            items,
            fail_at_end,
            closes: Arc::clone(&closes),
        };
        (seq, closes)
    }

    #[test]
    fn test_stream_yields_items_in_order() {
        let (seq, _) = scripted(vec![1, 2, 3], false);
        let collected: Result<Vec<u32>> = SequenceStream::new(seq).collect();
        assert_eq!(collected.unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_close_hook_runs_once() {
        let (seq, closes) = scripted(vec![1, 2], false);
        let mut stream = SequenceStream::closing(seq);
        assert_eq!(stream.next().unwrap().unwrap(), 1);

        stream.close();
        stream.close();
        assert!(stream.next().is_none());
        drop(stream);

        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_closes_abandoned_stream() {
        let (seq, closes) = scripted(vec![1, 2, 3], false);
        {
            let mut stream = SequenceStream::closing(seq);
            let _ = stream.next();
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stream_stops_after_error() {
        let (seq, _) = scripted(vec![7], true);
        let mut stream = SequenceStream::new(seq);

        assert_eq!(stream.next().unwrap().unwrap(), 7);
        assert!(matches!(stream.next(), Some(Err(Error::Io(_)))));
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_advance_stops_after_error() {
        let (seq, _) = scripted(vec![7], true);
        let mut stream = SequenceStream::new(seq);

        assert_eq!(stream.next_item().unwrap(), Some(7));
        assert!(matches!(stream.next_item(), Err(Error::Io(_))));
        assert_eq!(stream.next_item().unwrap(), None);
        assert!(stream.split().unwrap().is_none());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_comparator_follows_sequence() {
        let (seq, _) = scripted(vec![1], false);
        assert!(SequenceStream::new(seq).comparator().unwrap().is_none());

        let unordered = SequenceStream::new(Batch::new(vec![1, 2], Characteristics::empty()));
        assert!(matches!(unordered.comparator(), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let (seq, _) = scripted(Vec::new(), false);
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let first = Arc::clone(&order);
        let second = Arc::clone(&order);

        let stream = SequenceStream::new(seq)
            .on_close(move |_| first.lock().unwrap().push("first"))
            .on_close(move |_| second.lock().unwrap().push("second"));
        drop(stream);

        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);
    }
}
