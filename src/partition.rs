//! Input partitioning.
//!
//! Splits an input of length `L` into `n` contiguous, non-overlapping
//! segments of `L / n` bytes each, in worker-index order. Segment order is
//! input order, which is what lets the output placement phase reconstruct
//! the input by laying segments out by worker index.

/// What to do with the `L mod n` bytes that do not fill a whole segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RemainderPolicy {
    /// Extend the last segment to the end of the input. Nothing is dropped.
    #[default]
    LastWorker,
    /// Leave the trailing bytes out of every segment. They are never
    /// encoded and never counted.
    Truncate,
}

/// A half-open range `[start, end)` of the input assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Worker index; also the segment's rank in the output.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrow this segment's bytes out of the full input.
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        &input[self.start..self.end]
    }
}

/// Compute the segment for worker `index` of `workers`.
///
/// `workers` must be nonzero.
pub fn segment_for(len: usize, workers: usize, index: usize, policy: RemainderPolicy) -> Segment {
    let segment_size = len / workers;
    let start = index * segment_size;
    let end = if index + 1 == workers && policy == RemainderPolicy::LastWorker {
        len
    } else {
        (index + 1) * segment_size
    };
    Segment { index, start, end }
}

/// Split `len` bytes into `workers` segments.
///
/// Returns an empty list when `workers` is zero.
pub fn partition(len: usize, workers: usize, policy: RemainderPolicy) -> Vec<Segment> {
    (0..workers)
        .map(|i| segment_for(len, workers, i, policy))
        .collect()
}

/// Number of input bytes covered by the segments of [`partition`].
pub fn processed_len(len: usize, workers: usize, policy: RemainderPolicy) -> usize {
    if workers == 0 {
        return 0;
    }
    match policy {
        RemainderPolicy::LastWorker => len,
        RemainderPolicy::Truncate => workers * (len / workers),
    }
}
