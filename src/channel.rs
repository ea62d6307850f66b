//! The two halves of the output channel.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_channel::{Receiver, Sender};
use futures_lite::Stream;

/// Creates an unbounded output channel.
pub(crate) fn channel<T>() -> (Channel<T>, Receiver<T>) {
    let (sender, receiver) = async_channel::unbounded();
    (Channel { sender }, receiver)
}

/// The sending side of an ordered stream.
///
/// Released values are pushed into it by the emission hook, and the completion hook ends it. The
/// receiving side is an [`async_channel::Receiver`], which implements [`Stream`].
///
/// Handles can be cloned. The channel also ends once every handle is dropped.
///
/// [`Stream`]: futures_lite::Stream
pub struct Channel<T> {
    sender: Sender<T>,
}

impl<T> Channel<T> {
    /// Pushes a value into the channel.
    ///
    /// Returns `false` and drops the value if the channel has ended or its receiver is gone.
    pub fn push(&self, value: T) -> bool {
        match self.sender.try_send(value) {
            Ok(()) => true,
            Err(_) => {
                tracing::trace!("output channel is closed, dropping value");
                false
            }
        }
    }

    /// Ends the channel.
    ///
    /// Values already pushed can still be received. Returns `true` if this call ended the channel.
    pub fn end(&self) -> bool {
        self.sender.close()
    }

    /// Returns `true` if the channel has ended or its receiver is gone.
    pub fn is_ended(&self) -> bool {
        self.sender.is_closed()
    }

    /// Returns the number of values waiting to be received.
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Returns `true` if no values are waiting to be received.
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Channel<T> {
        Channel {
            sender: self.sender.clone(),
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Channel { .. }")
    }
}

/// The receiving side of an ordered stream.
///
/// Values are only released once the stream is first polled or received from, so no hook runs
/// before the caller holds this handle. Dropping it unblocks the release as well, but the released
/// values are discarded.
///
/// This type implements [`Stream`], yielding values in index order until the channel ends.
pub struct OrderedStream<T> {
    receiver: Receiver<T>,

    /// Closed to let the collector start releasing values.
    start: Sender<()>,
}

impl<T> OrderedStream<T> {
    pub(crate) fn new(receiver: Receiver<T>, start: Sender<()>) -> OrderedStream<T> {
        OrderedStream { receiver, start }
    }

    /// Receives the next value.
    ///
    /// Returns `None` once the channel has ended and every value has been received.
    pub async fn recv(&self) -> Option<T> {
        self.start();
        self.receiver.recv().await.ok()
    }

    /// Receives the next value if one is ready.
    pub fn try_recv(&self) -> Option<T> {
        self.start();
        self.receiver.try_recv().ok()
    }

    /// Returns `true` once values are allowed to be released.
    pub fn is_started(&self) -> bool {
        self.start.is_closed()
    }

    /// Returns `true` if the channel has ended.
    pub fn is_closed(&self) -> bool {
        self.receiver.is_closed()
    }

    /// Returns the number of values waiting to be received.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns `true` if no values are waiting to be received.
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    fn start(&self) {
        if self.start.close() {
            tracing::trace!("ordered stream started");
        }
    }
}

impl<T> Stream for OrderedStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.start();
        Pin::new(&mut self.receiver).poll_next(cx)
    }
}

impl<T> fmt::Debug for OrderedStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("OrderedStream { .. }")
    }
}

#[cfg(test)]
mod tests {
    use futures_lite::{future, StreamExt};

    use super::*;

    #[test]
    fn push_then_end() {
        let (ch, r) = channel();
        assert!(ch.push(1));
        assert!(ch.push(2));
        assert_eq!(ch.len(), 2);

        assert!(ch.end());
        assert!(!ch.end());
        assert!(ch.is_ended());
        assert!(!ch.push(3));

        assert_eq!(r.try_recv(), Ok(1));
        assert_eq!(r.try_recv(), Ok(2));
        assert!(r.try_recv().is_err());
        assert!(r.is_closed());
    }

    #[test]
    fn receiver_dropped() {
        let (ch, r) = channel();
        drop(r);
        assert!(ch.is_ended());
        assert!(!ch.push("lost"));
        assert!(ch.is_empty());
    }

    #[test]
    fn last_handle_dropped() {
        let (ch, r) = channel::<()>();
        let other = ch.clone();
        drop(ch);
        assert!(!r.is_closed());
        drop(other);
        assert!(r.is_closed());
    }

    #[test]
    fn stream_starts_on_first_poll() {
        let (ch, r) = channel();
        let (start, started) = async_channel::bounded::<()>(1);
        let mut stream = OrderedStream::new(r, start);
        assert!(!stream.is_started());
        assert!(!started.is_closed());

        ch.push(1);
        ch.end();
        assert_eq!(future::block_on(stream.next()), Some(1));
        assert!(stream.is_started());
        assert!(started.is_closed());
        assert_eq!(future::block_on(stream.recv()), None);
    }

    #[test]
    fn stream_starts_on_try_recv() {
        let (_ch, r) = channel::<u8>();
        let (start, started) = async_channel::bounded::<()>(1);
        let stream = OrderedStream::new(r, start);
        assert_eq!(stream.try_recv(), None);
        assert!(started.is_closed());
    }

    #[test]
    fn dropped_stream_starts() {
        let (ch, r) = channel::<u8>();
        let (start, started) = async_channel::bounded::<()>(1);
        drop(OrderedStream::new(r, start));
        assert!(started.is_closed());
        assert!(ch.is_ended());
    }
}
