//! Parallel run-length encoding of lowercase text.
//!
//! A fixed pool of worker threads splits the input into contiguous
//! segments, run-length encodes each segment independently, folds per-letter
//! counts into a shared [`Histogram`], and then lays every worker's runs into
//! a shared output buffer at offsets derived from a prefix sum over the
//! per-worker run counts. A barrier separates the unordered counting phase
//! from the ordered placement phase.
//!
//! ```
//! use pzip::{compress, PzipOptions, Run};
//!
//! let out = compress(b"aaabbbcccd", &PzipOptions { threads: 1, ..Default::default() })?;
//! assert_eq!(out.runs[0], Run::new(b'a', 3));
//! assert_eq!(out.histogram.get(b'd'), 1);
//! # Ok::<(), pzip::PzError>(())
//! ```

pub mod alphabet;
pub mod frequency;
pub mod partition;
pub mod pool;
pub mod rle;

pub mod ffi;

#[cfg(test)]
mod validation;

pub use frequency::Histogram;
pub use partition::{RemainderPolicy, Segment};
pub use pool::{compress, max_runs, pzip, pzip_with_options, PzipOptions, PzipOutput};
pub use rle::Run;

/// Error types for pzip operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PzError {
    /// The worker count must be at least 1.
    #[error("invalid thread count: {0}")]
    InvalidThreadCount(usize),
    /// The input contains a byte outside `a`–`z`.
    #[error("invalid symbol 0x{byte:02x} at position {position}")]
    InvalidSymbol { position: usize, byte: u8 },
    /// Output buffer is too small to hold the result.
    #[error("output buffer too small: need {needed}, have {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },
    /// A worker thread could not be started.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
    /// A lock was poisoned or another synchronization primitive failed.
    #[error("synchronization failure: {0}")]
    Sync(String),
    /// The phase barrier was torn down because another worker failed.
    #[error("aborted: another worker failed")]
    Aborted,
    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
    /// Logic error inside the worker pool.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type PzResult<T> = Result<T, PzError>;
