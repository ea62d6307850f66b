//! Spawning computations and reordering their values.

use std::future::Future;

use async_channel::{Receiver, Sender};
use async_executor::{Executor, LocalExecutor};

use crate::buffer::OrderedBuffer;
use crate::channel::OrderedStream;
use crate::hooks::{Complete, Emit, End, Push};

/// Configuration for an ordered stream.
///
/// By default, every released value is pushed into the output channel and the channel is ended
/// once the last value has been released. Both can be replaced with [`emit()`][Options::emit()]
/// and [`on_complete()`][Options::on_complete()].
///
/// # Examples
///
/// ```
/// use ordered_stream::{Channel, Options};
/// use futures_lite::{future, StreamExt};
///
/// let r = Options::new()
///     .emit(|ch: &Channel<String>, v: String| {
///         ch.push(v.to_uppercase());
///     })
///     .spawn(vec![future::ready("a".to_string()), future::ready("b".to_string())]);
///
/// let values: Vec<String> = ordered_stream::block_on(r.collect());
/// assert_eq!(values, ["A", "B"]);
/// ```
#[derive(Debug, Clone)]
pub struct Options<E = Push, C = End> {
    emit: E,
    on_complete: C,
}

impl Options {
    /// Creates options with the default hooks.
    pub fn new() -> Options {
        Options {
            emit: Push,
            on_complete: End,
        }
    }
}

impl Default for Options {
    fn default() -> Options {
        Options::new()
    }
}

impl<E, C> Options<E, C> {
    /// Sets the hook invoked for every released value, in index order.
    ///
    /// The hook has to implement [`Emit`], which closures taking the channel and the value do:
    ///
    /// ```compile_fail
    /// use futures_lite::future;
    /// use ordered_stream::Options;
    ///
    /// let r = Options::new().emit(true).spawn(vec![future::ready(1)]);
    /// ```
    pub fn emit<E2>(self, emit: E2) -> Options<E2, C> {
        Options {
            emit,
            on_complete: self.on_complete,
        }
    }

    /// Sets the hook invoked once, after the last value has been released.
    ///
    /// The hook has to implement [`Complete`], which closures taking the channel do:
    ///
    /// ```compile_fail
    /// use futures_lite::future;
    /// use ordered_stream::Options;
    ///
    /// let r = Options::new().on_complete("end").spawn(vec![future::ready(1)]);
    /// ```
    pub fn on_complete<C2>(self, on_complete: C2) -> Options<E, C2> {
        Options {
            emit: self.emit,
            on_complete,
        }
    }

    /// Spawns the computations onto the global executor.
    ///
    /// Returns the receiving side of the output channel. The computations start running right
    /// away, but no value is released and no hook runs until the returned stream is first polled.
    pub fn spawn<T, I>(self, futures: I) -> OrderedStream<T>
    where
        I: IntoIterator,
        I::Item: Future<Output = T> + Send + 'static,
        T: Send + 'static,
        E: Emit<T> + Send + 'static,
        C: Complete<T> + Send + 'static,
    {
        self.spawn_on(crate::executor::global(), futures)
    }

    /// Spawns the computations onto `executor`.
    ///
    /// The executor has to be run for values to be released.
    pub fn spawn_on<'a, T, I>(self, executor: &Executor<'a>, futures: I) -> OrderedStream<T>
    where
        I: IntoIterator,
        I::Item: Future<Output = T> + Send + 'a,
        T: Send + 'a,
        E: Emit<T> + Send + 'a,
        C: Complete<T> + Send + 'a,
    {
        let (collector, computations, stream) = self.prepare(futures.into_iter().collect());
        executor.spawn(collector).detach();
        for computation in computations {
            executor.spawn(computation).detach();
        }
        stream
    }

    /// Spawns the computations onto a thread-local `executor`.
    ///
    /// Neither the computations nor the hooks need to be [`Send`].
    ///
    /// # Examples
    ///
    /// ```
    /// use std::rc::Rc;
    ///
    /// use async_executor::LocalExecutor;
    /// use futures_lite::{future, StreamExt};
    /// use ordered_stream::Options;
    ///
    /// let ex = LocalExecutor::new();
    /// let shared = Rc::new(5);
    ///
    /// let r = Options::new().spawn_local(&ex, (0..3).map(|i| {
    ///     let shared = shared.clone();
    ///     async move { i * *shared }
    /// }));
    ///
    /// let values: Vec<i32> = future::block_on(ex.run(r.collect()));
    /// assert_eq!(values, [0, 5, 10]);
    /// ```
    pub fn spawn_local<'a, T, I>(self, executor: &LocalExecutor<'a>, futures: I) -> OrderedStream<T>
    where
        I: IntoIterator,
        I::Item: Future<Output = T> + 'a,
        T: 'a,
        E: Emit<T> + 'a,
        C: Complete<T> + 'a,
    {
        let (collector, computations, stream) = self.prepare(futures.into_iter().collect());
        executor.spawn(collector).detach();
        for computation in computations {
            executor.spawn(computation).detach();
        }
        stream
    }

    /// Builds the collector, one task per computation, and the stream they feed.
    fn prepare<T, F>(
        self,
        futures: Vec<F>,
    ) -> (
        impl Future<Output = ()>,
        Vec<impl Future<Output = ()>>,
        OrderedStream<T>,
    )
    where
        F: Future<Output = T>,
        E: Emit<T>,
        C: Complete<T>,
    {
        let (buffer, output) =
            OrderedBuffer::with_hooks(futures.len(), self.emit, self.on_complete);
        let (start, started) = async_channel::bounded(1);
        let (done, completions) = async_channel::unbounded();

        let computations = futures
            .into_iter()
            .enumerate()
            .map(|(index, future)| resolve(index, future, done.clone()))
            .collect::<Vec<_>>();

        let collector = reorder(buffer, started, completions);
        (collector, computations, OrderedStream::new(output, start))
    }
}

/// Awaits a single computation and reports its value together with its index.
async fn resolve<T, F>(index: usize, future: F, done: Sender<(usize, T)>)
where
    F: Future<Output = T>,
{
    let value = future.await;
    // The collector only stops listening once the stream has stalled.
    done.send((index, value)).await.ok();
}

/// Feeds completions into the buffer until every value has been released.
async fn reorder<T, E, C>(
    mut buffer: OrderedBuffer<T, E, C>,
    started: Receiver<()>,
    completions: Receiver<(usize, T)>,
) where
    E: Emit<T>,
    C: Complete<T>,
{
    // Nothing is sent on this channel; it closes when the stream is first polled or dropped.
    started.recv().await.ok();

    tracing::debug!(len = buffer.len(), "reordering computations");
    buffer.flush();

    while !buffer.is_finished() {
        match completions.recv().await {
            Ok((index, value)) => {
                if let Err(err) = buffer.complete(index, value) {
                    tracing::error!(%err, "completion rejected");
                }
            }
            Err(_) => {
                tracing::error!(
                    cursor = buffer.cursor(),
                    len = buffer.len(),
                    buffered = buffer.buffered(),
                    "computation dropped before completing, stream stalled"
                );
                return;
            }
        }
    }
}
