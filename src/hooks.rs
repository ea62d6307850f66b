//! Hooks deciding how released values and the end of the stream reach the output channel.
//!
//! Closures can be used as hooks directly:
//!
//! ```
//! use ordered_stream::{Channel, Options};
//!
//! let options = Options::new()
//!     .emit(|ch: &Channel<i32>, v: i32| {
//!         ch.push(v * 10);
//!     })
//!     .on_complete(|ch: &Channel<i32>| {
//!         ch.push(-1);
//!         ch.end();
//!     });
//! # drop(options);
//! ```

use crate::channel::Channel;

/// Invoked once per released value, in index order.
pub trait Emit<T> {
    /// Emits `value` through `channel`.
    fn emit(&mut self, channel: &Channel<T>, value: T);
}

impl<T, F> Emit<T> for F
where
    F: FnMut(&Channel<T>, T),
{
    fn emit(&mut self, channel: &Channel<T>, value: T) {
        self(channel, value)
    }
}

/// Invoked exactly once, after the last value has been released.
pub trait Complete<T> {
    /// Signals the end of the stream through `channel`.
    fn complete(&mut self, channel: &Channel<T>);
}

impl<T, F> Complete<T> for F
where
    F: FnMut(&Channel<T>),
{
    fn complete(&mut self, channel: &Channel<T>) {
        self(channel)
    }
}

/// The default emission hook: pushes the value into the channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Push;

impl<T> Emit<T> for Push {
    fn emit(&mut self, channel: &Channel<T>, value: T) {
        channel.push(value);
    }
}

/// The default completion hook: ends the channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct End;

impl<T> Complete<T> for End {
    fn complete(&mut self, channel: &Channel<T>) {
        channel.end();
    }
}
