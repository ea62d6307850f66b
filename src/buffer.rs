//! The reorder buffer.
//!
//! Completions are accepted in whatever order they arrive, but values are released in strictly
//! increasing index order, without gaps. A completion for an index ahead of the cursor is held
//! until every index before it has been released.

use std::fmt;

use async_channel::Receiver;

use crate::channel::{channel, Channel};
use crate::hooks::{Complete, Emit, End, Push};
use crate::Error;

/// Releases out-of-order completions in index order.
///
/// The buffer is created for a fixed number of computations. Each computation reports its value
/// exactly once through [`complete()`][OrderedBuffer::complete()]. Values are passed to the
/// emission hook as soon as every lower index has been released, and the completion hook runs
/// once the last index has been released.
///
/// # Examples
///
/// ```
/// use ordered_stream::OrderedBuffer;
///
/// let (mut buffer, r) = OrderedBuffer::new(3);
///
/// assert_eq!(buffer.complete(2, "c"), Ok(0));
/// assert_eq!(buffer.complete(0, "a"), Ok(1));
/// assert_eq!(buffer.complete(1, "b"), Ok(2));
/// assert!(buffer.is_finished());
///
/// assert_eq!(r.try_recv(), Ok("a"));
/// assert_eq!(r.try_recv(), Ok("b"));
/// assert_eq!(r.try_recv(), Ok("c"));
/// assert!(r.is_closed());
/// ```
pub struct OrderedBuffer<T, E = Push, C = End> {
    /// Completed values that have not been released yet, indexed by position.
    slots: Vec<Option<T>>,

    /// The next index to release. Every index below it has been released.
    cursor: usize,

    /// Set once the completion hook has run.
    finished: bool,

    /// The write half of the output channel.
    channel: Channel<T>,

    emit: E,
    on_complete: C,
}

impl<T> OrderedBuffer<T> {
    /// Creates a buffer for `len` computations that pushes values and ends the channel when done.
    pub fn new(len: usize) -> (OrderedBuffer<T>, Receiver<T>) {
        OrderedBuffer::with_hooks(len, Push, End)
    }
}

impl<T, E, C> OrderedBuffer<T, E, C>
where
    E: Emit<T>,
    C: Complete<T>,
{
    /// Creates a buffer for `len` computations with custom hooks.
    ///
    /// Returns the buffer and the receiving side of its output channel.
    pub fn with_hooks(
        len: usize,
        emit: E,
        on_complete: C,
    ) -> (OrderedBuffer<T, E, C>, Receiver<T>) {
        let (channel, receiver) = channel();
        let mut slots = Vec::with_capacity(len);
        slots.resize_with(len, || None);

        let buffer = OrderedBuffer {
            slots,
            cursor: 0,
            finished: false,
            channel,
            emit,
            on_complete,
        };
        (buffer, receiver)
    }

    /// Records the value of the computation at `index` and releases everything that became
    /// contiguous.
    ///
    /// Returns the number of values released by this call.
    ///
    /// Fails if `index` is out of range or the computation at `index` has already completed. A
    /// failed call leaves the buffer untouched.
    pub fn complete(&mut self, index: usize, value: T) -> Result<usize, Error> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })?;

        if index < self.cursor || slot.is_some() {
            return Err(Error::AlreadyCompleted(index));
        }

        tracing::trace!(index, "computation completed");
        *slot = Some(value);
        Ok(self.flush())
    }

    /// Releases every buffered value that is contiguous with the cursor.
    ///
    /// If the cursor has reached the end of the sequence, this runs the completion hook, unless it
    /// has already run. Calling this on an empty buffer finishes it right away.
    ///
    /// Returns the number of values released by this call.
    pub fn flush(&mut self) -> usize {
        let start = self.cursor;

        while let Some(value) = self.slots.get_mut(self.cursor).and_then(Option::take) {
            self.emit.emit(&self.channel, value);
            self.cursor += 1;
        }

        // The slot under the cursor is always empty here.
        debug_assert!(self.slots.get(self.cursor).map_or(true, Option::is_none));

        let released = self.cursor - start;
        if released > 0 {
            tracing::debug!(released, cursor = self.cursor, "released buffered values");
        }

        if self.cursor == self.slots.len() && !self.finished {
            self.finished = true;
            tracing::debug!(len = self.slots.len(), "all computations released");
            self.on_complete.complete(&self.channel);
        }

        released
    }
}

impl<T, E, C> OrderedBuffer<T, E, C> {
    /// Returns the number of computations in the sequence.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the sequence has no computations.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the next index to be released.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Returns the number of completed values waiting for a lower index.
    pub fn buffered(&self) -> usize {
        self.slots[self.cursor..].iter().filter(|s| s.is_some()).count()
    }

    /// Returns `true` once every value has been released and the completion hook has run.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the write half of the output channel.
    pub fn channel(&self) -> &Channel<T> {
        &self.channel
    }
}

impl<T, E, C> fmt::Debug for OrderedBuffer<T, E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedBuffer")
            .field("len", &self.len())
            .field("cursor", &self.cursor)
            .field("buffered", &self.buffered())
            .field("finished", &self.finished)
            .finish()
    }
}
