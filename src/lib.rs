//! Stream the values of concurrently running futures in the order the futures were given.
//!
//! Futures complete in whatever order they complete, but their values come out of the stream
//! strictly in index order. Values that complete early are buffered until every value before them
//! has been released, and each value is released as soon as it becomes eligible.
//!
//! # Examples
//!
//! The second future completes first, yet its value is received second:
//!
//! ```
//! use std::time::Duration;
//!
//! use async_io::Timer;
//! use futures_lite::{FutureExt, StreamExt};
//!
//! let slow = async {
//!     Timer::after(Duration::from_millis(50)).await;
//!     "slow"
//! };
//! let fast = async { "fast" };
//!
//! let r = ordered_stream::ordered(vec![slow.boxed(), fast.boxed()]);
//!
//! let values: Vec<_> = ordered_stream::block_on(r.collect());
//! assert_eq!(values, ["slow", "fast"]);
//! ```
//!
//! How values are emitted and how the end of the stream is signaled can be customized through
//! [`Options`].
//!
//! The futures start running as soon as they are spawned, but no value is released, and no hook
//! runs, before the returned [`OrderedStream`] is first polled.
//!
//! # Global executor
//!
//! [`ordered()`] and [`ordered_stream()`] spawn onto a global executor that gets lazily
//! initialized on first use. It is run by a single background thread, but you can also configure
//! the number of threads by setting the `ORDERED_STREAM_THREADS` environment variable. To use
//! your own executor, see [`Options::spawn_on()`] and [`Options::spawn_local()`].

#![forbid(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

#[cfg(doctest)]
doc_comment::doctest!("../README.md");

use std::future::Future;

mod buffer;
mod channel;
mod error;
mod executor;
mod options;

pub mod hooks;

pub use buffer::OrderedBuffer;
pub use channel::{Channel, OrderedStream};
pub use error::Error;
pub use executor::THREADS_ENV;
pub use hooks::{Complete, Emit};
pub use options::Options;

#[doc(inline)]
pub use {
    async_channel::Receiver,
    async_executor::{Executor, LocalExecutor},
    async_io::block_on,
};

/// Streams the values of `futures` in order, using the default hooks.
///
/// The futures are spawned onto the global executor. The returned stream yields every value in
/// index order and then ends.
///
/// # Examples
///
/// ```
/// use futures_lite::{future, StreamExt};
///
/// let r = ordered_stream::ordered((1..=3).map(future::ready));
/// assert_eq!(ordered_stream::block_on(r.collect::<Vec<_>>()), [1, 2, 3]);
/// ```
///
/// The argument has to be a sequence:
///
/// ```compile_fail
/// let r = ordered_stream::ordered(42);
/// ```
///
/// And every element of the sequence has to be a future:
///
/// ```compile_fail
/// let r = ordered_stream::ordered(vec!["foo", "bar"]);
/// ```
pub fn ordered<T, I>(futures: I) -> OrderedStream<T>
where
    I: IntoIterator,
    I::Item: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    Options::new().spawn(futures)
}

/// Streams the values of `futures` in order, emitting and ending through the hooks in `options`.
///
/// The futures are spawned onto the global executor.
///
/// # Examples
///
/// ```
/// use futures_lite::{future, StreamExt};
/// use ordered_stream::{Channel, Options};
///
/// let options = Options::new().on_complete(|ch: &Channel<&'static str>| {
///     ch.push("done");
///     ch.end();
/// });
/// let r = ordered_stream::ordered_stream(vec![future::ready("a"), future::ready("b")], options);
///
/// let values: Vec<_> = ordered_stream::block_on(r.collect());
/// assert_eq!(values, ["a", "b", "done"]);
/// ```
///
/// The options have to be built with [`Options`]:
///
/// ```compile_fail
/// use futures_lite::future;
///
/// let r = ordered_stream::ordered_stream(vec![future::ready(1)], true);
/// ```
pub fn ordered_stream<T, I, E, C>(futures: I, options: Options<E, C>) -> OrderedStream<T>
where
    I: IntoIterator,
    I::Item: Future<Output = T> + Send + 'static,
    T: Send + 'static,
    E: Emit<T> + Send + 'static,
    C: Complete<T> + Send + 'static,
{
    options.spawn(futures)
}
