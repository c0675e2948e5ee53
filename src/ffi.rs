//! C-callable FFI layer for pzip.
//!
//! Mirrors the classic `pzip()` calling convention: the caller allocates
//! every output, sized for the worst case, and the library only writes
//! into them. Unlike that convention, failures come back as error codes.

use std::os::raw::{c_char, c_int};
use std::slice;

use crate::alphabet::ALPHABET_LEN;
use crate::frequency::Histogram;
use crate::rle::Run;
use crate::{pool, PzError};

// Error codes matching the C API design
pub const PZ_OK: c_int = 0;
pub const PZ_ERROR_BUFFER_TOO_SMALL: c_int = -1;
pub const PZ_ERROR_INVALID_INPUT: c_int = -2;
pub const PZ_ERROR_INVALID_THREADS: c_int = -3;
pub const PZ_ERROR_WORKER_FAILED: c_int = -4;

/// Convert a [`PzError`] to an FFI error code.
fn error_to_code(e: &PzError) -> c_int {
    match e {
        PzError::BufferTooSmall { .. } => PZ_ERROR_BUFFER_TOO_SMALL,
        PzError::InvalidSymbol { .. } => PZ_ERROR_INVALID_INPUT,
        PzError::InvalidThreadCount(_) => PZ_ERROR_INVALID_THREADS,
        _ => PZ_ERROR_WORKER_FAILED,
    }
}

/// One run as seen from C.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PzZippedChar {
    pub character: c_char,
    pub occurence: c_int,
}

impl TryFrom<Run> for PzZippedChar {
    type Error = PzError;

    fn try_from(run: Run) -> Result<Self, Self::Error> {
        let occurence = c_int::try_from(run.count)
            .map_err(|_| PzError::Internal(format!("run of {} does not fit a C int", run.count)))?;
        Ok(Self {
            character: run.symbol as c_char,
            occurence,
        })
    }
}

/// Zip `input_len` lowercase characters with `n_threads` workers.
///
/// On success `zipped[0..n]` holds the runs in input order,
/// `*zipped_count` is increased by `n`, and every
/// `char_frequency[letter - 'a']` is increased by that letter's count.
/// Returns [`PZ_OK`] or a negative error code; on error the outputs are
/// left untouched.
///
/// # Safety
///
/// - `input` must point to `input_len` readable bytes.
/// - `zipped` must point to at least as many writable [`PzZippedChar`]s
///   as runs are produced (`input_len` is always enough).
/// - `zipped_count` must point to a writable `int`.
/// - `char_frequency` must point to 26 writable `int`s.
#[no_mangle]
pub unsafe extern "C" fn pz_zip(
    n_threads: c_int,
    input: *const c_char,
    input_len: c_int,
    zipped: *mut PzZippedChar,
    zipped_count: *mut c_int,
    char_frequency: *mut c_int,
) -> c_int {
    if input.is_null() || zipped.is_null() || zipped_count.is_null() || char_frequency.is_null() {
        return PZ_ERROR_INVALID_INPUT;
    }
    let Ok(n_threads) = usize::try_from(n_threads) else {
        return PZ_ERROR_INVALID_THREADS;
    };
    let Ok(input_len) = usize::try_from(input_len) else {
        return PZ_ERROR_INVALID_INPUT;
    };

    let input = slice::from_raw_parts(input as *const u8, input_len);

    // Stage into Rust-typed buffers, then publish only on success.
    let mut runs = vec![Run::default(); pool::max_runs(input_len)];
    let mut count = 0usize;
    let mut histogram = Histogram::new();
    if let Err(e) = pool::pzip(n_threads, input, &mut runs, &mut count, &mut histogram) {
        return error_to_code(&e);
    }

    let converted: Result<Vec<PzZippedChar>, PzError> =
        runs[..count].iter().map(|&r| PzZippedChar::try_from(r)).collect();
    let Ok(converted) = converted else {
        return PZ_ERROR_WORKER_FAILED;
    };

    // Compute every accumulated counter before touching caller memory.
    let char_frequency = slice::from_raw_parts_mut(char_frequency, ALPHABET_LEN);
    let Some(new_count) = c_int::try_from(count)
        .ok()
        .and_then(|added| (*zipped_count).checked_add(added))
    else {
        return PZ_ERROR_WORKER_FAILED;
    };
    let mut new_frequency = [0 as c_int; ALPHABET_LEN];
    for ((dst, &old), &src) in new_frequency
        .iter_mut()
        .zip(char_frequency.iter())
        .zip(histogram.counts.iter())
    {
        let Some(sum) = c_int::try_from(src).ok().and_then(|src| old.checked_add(src)) else {
            return PZ_ERROR_WORKER_FAILED;
        };
        *dst = sum;
    }

    // Only the produced runs are covered; the caller's buffer may be no larger.
    let zipped = slice::from_raw_parts_mut(zipped, count);
    zipped.copy_from_slice(&converted);
    *zipped_count = new_count;
    char_frequency.copy_from_slice(&new_frequency);

    PZ_OK
}
