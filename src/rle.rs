//! Run-Length Encoding (RLE) of lowercase text.
//!
//! Each run is a `(symbol, count)` pair describing a maximal repetition of
//! one letter. Runs are produced per segment, so two runs of the same letter
//! may sit next to each other in the parallel output when a repetition
//! straddles a segment boundary. Decoding handles that case like any other.

use crate::{PzError, PzResult};

/// A maximal repetition of one symbol within a segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Run {
    /// The repeated byte (`a`–`z` for validated input).
    pub symbol: u8,
    /// Number of consecutive occurrences. Always at least 1 for runs
    /// produced by the encoder.
    pub count: usize,
}

impl Run {
    pub fn new(symbol: u8, count: usize) -> Self {
        Self { symbol, count }
    }

    /// The symbol as a `char`, for display.
    pub fn symbol_char(&self) -> char {
        self.symbol as char
    }
}

impl std::fmt::Display for Run {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.symbol_char(), self.count)
    }
}

/// Run-length encode one segment.
///
/// Scans left to right, extending the open run while the symbol repeats and
/// closing it on the first change. No histogram work happens here; counts
/// are tallied afterwards from the finished run list.
pub fn encode_segment(segment: &[u8]) -> Vec<Run> {
    let Some((&first, rest)) = segment.split_first() else {
        return Vec::new();
    };

    let mut runs = Vec::new();
    let mut current = Run::new(first, 1);
    for &byte in rest {
        if byte == current.symbol {
            current.count += 1;
        } else {
            runs.push(current);
            current = Run::new(byte, 1);
        }
    }
    runs.push(current);
    runs
}

/// Serial run-length encoding of the whole input.
///
/// Equivalent to the parallel result with a single worker.
pub fn encode(input: &[u8]) -> Vec<Run> {
    encode_segment(input)
}

/// Number of bytes the runs expand to.
pub fn decoded_len(runs: &[Run]) -> usize {
    runs.iter().map(|r| r.count).sum()
}

/// Expand runs back into the original bytes.
pub fn decode(runs: &[Run]) -> Vec<u8> {
    let mut output = Vec::with_capacity(decoded_len(runs));
    for run in runs {
        output.extend(std::iter::repeat(run.symbol).take(run.count));
    }
    output
}

/// Expand runs into a pre-allocated output buffer.
///
/// Returns the number of bytes written.
pub fn decode_to_buf(runs: &[Run], output: &mut [u8]) -> PzResult<usize> {
    let needed = decoded_len(runs);
    if needed > output.len() {
        return Err(PzError::BufferTooSmall {
            needed,
            capacity: output.len(),
        });
    }

    let mut out_pos = 0;
    for run in runs {
        output[out_pos..out_pos + run.count].fill(run.symbol);
        out_pos += run.count;
    }
    Ok(out_pos)
}
