use thiserror::Error;

/// An error reported by [`OrderedBuffer`][crate::OrderedBuffer] when a completion is rejected.
///
/// A rejected completion never changes the state of the buffer.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The index does not name any computation in the sequence.
    #[error("index {index} is out of range for a sequence of {len} computations")]
    OutOfRange {
        /// The rejected index.
        index: usize,
        /// The number of computations in the sequence.
        len: usize,
    },

    /// The computation at this index has already completed.
    #[error("computation {0} has already completed")]
    AlreadyCompleted(usize),
}
