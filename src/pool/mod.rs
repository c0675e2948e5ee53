//! Worker pool orchestrator.
//!
//! Spawns one scoped thread per segment and drives the two-phase protocol:
//!
//! | Phase     | Work                                   | Synchronization     |
//! |-----------|----------------------------------------|---------------------|
//! | encode    | RLE of the worker's own segment        | none                |
//! | aggregate | merge local letter counts              | histogram mutex     |
//! | publish   | store own run count                    | write-once slot     |
//! | fence     | wait for every worker's run count      | phase barrier       |
//! | place     | prefix-sum offset, copy runs to output | output mutex        |
//!
//! Output ranges are assigned in worker-index order, which is input order,
//! so the output read front to back is the RLE of the whole input. Runs are
//! never merged across segment boundaries: `"aab"` split as `["a", "ab"]`
//! encodes to `(a,1) (a,1) (b,1)`.

mod barrier;
mod context;
mod worker;

use std::ops::Range;

use log::{debug, warn};

use crate::alphabet;
use crate::frequency::Histogram;
use crate::partition::{self, RemainderPolicy};
use crate::rle::{self, Run};
use crate::{PzError, PzResult};

use context::ZipContext;

/// Options controlling a pzip invocation.
#[derive(Debug, Clone, Default)]
pub struct PzipOptions {
    /// Number of worker threads. 0 = auto (use all available cores).
    ///
    /// The effective count is capped at the input length so that every
    /// worker gets a non-empty segment.
    pub threads: usize,
    /// What to do with the `len % threads` bytes left after equal-size
    /// segmentation.
    pub remainder: RemainderPolicy,
}

/// Result of [`compress`]: owned runs plus the letter histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PzipOutput {
    /// The encoded runs, exactly `total_runs` long.
    pub runs: Vec<Run>,
    /// Occurrences of each letter in the processed input.
    pub histogram: Histogram,
    /// Number of input bytes covered by the segments. Smaller than the input
    /// only under [`RemainderPolicy::Truncate`].
    pub processed_len: usize,
    /// The slice of `runs` written by each worker, in worker order.
    pub worker_ranges: Vec<Range<usize>>,
}

impl PzipOutput {
    /// Expand the runs back into text.
    pub fn decode(&self) -> Vec<u8> {
        rle::decode(&self.runs)
    }
}

/// What one pool run reports back to the entry points.
struct PoolReport {
    workers: usize,
    worker_ranges: Vec<Range<usize>>,
}

/// Worst-case number of runs for `input_len` bytes: one per byte.
pub fn max_runs(input_len: usize) -> usize {
    input_len
}

/// Resolve thread count: 0 means use all available cores.
pub(crate) fn resolve_thread_count(threads: usize) -> usize {
    if threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        threads
    }
}

/// Number of workers actually spawned for `len` bytes.
pub(crate) fn effective_workers(len: usize, threads: usize) -> usize {
    resolve_thread_count(threads).min(len)
}

/// Zip `input` with exactly `n_threads` workers into caller-owned buffers.
///
/// `output` must hold at least as many runs as are produced
/// ([`max_runs`] is always enough). `output_count` and `histogram` are only
/// incremented, so callers start them at zero. Only `output[..*output_count]`
/// is meaningful afterwards; later slots are left untouched.
///
/// Remainder bytes go to the last worker. On error the buffers may be
/// partially written.
pub fn pzip(
    n_threads: usize,
    input: &[u8],
    output: &mut [Run],
    output_count: &mut usize,
    histogram: &mut Histogram,
) -> PzResult<()> {
    if n_threads == 0 {
        return Err(PzError::InvalidThreadCount(n_threads));
    }
    let options = PzipOptions {
        threads: n_threads,
        ..PzipOptions::default()
    };
    pzip_with_options(input, &options, output, output_count, histogram)
}

/// Like [`pzip`], with the thread count and remainder policy taken from
/// `options`.
pub fn pzip_with_options(
    input: &[u8],
    options: &PzipOptions,
    output: &mut [Run],
    output_count: &mut usize,
    histogram: &mut Histogram,
) -> PzResult<()> {
    run_pool(input, options, output, output_count, histogram).map(|_| ())
}

/// Zip `input` into freshly allocated buffers.
pub fn compress(input: &[u8], options: &PzipOptions) -> PzResult<PzipOutput> {
    let mut runs = vec![Run::default(); max_runs(input.len())];
    let mut count = 0usize;
    let mut histogram = Histogram::new();

    let report = run_pool(input, options, &mut runs, &mut count, &mut histogram)?;
    runs.truncate(count);

    Ok(PzipOutput {
        runs,
        histogram,
        processed_len: partition::processed_len(input.len(), report.workers, options.remainder),
        worker_ranges: report.worker_ranges,
    })
}

fn run_pool(
    input: &[u8],
    options: &PzipOptions,
    output: &mut [Run],
    output_count: &mut usize,
    histogram: &mut Histogram,
) -> PzResult<PoolReport> {
    alphabet::validate(input)?;

    let requested = resolve_thread_count(options.threads);
    let workers = effective_workers(input.len(), options.threads);
    if workers == 0 {
        return Ok(PoolReport {
            workers: 0,
            worker_ranges: Vec::new(),
        });
    }

    debug!(
        "pzip: {} bytes, {workers} workers (requested {requested}), remainder {:?}",
        input.len(),
        options.remainder
    );
    if options.remainder == RemainderPolicy::Truncate && input.len() % workers != 0 {
        warn!(
            "pzip: dropping {} trailing bytes that do not fill a segment",
            input.len() % workers
        );
    }

    let ctx = ZipContext::new(
        input,
        workers,
        options.remainder,
        output,
        output_count,
        histogram,
    );
    let worker_ranges = dispatch(&ctx, workers)?;
    drop(ctx);

    debug!(
        "pzip: {} runs, {} letters in use, {:.3} bits/letter",
        worker_ranges.last().map_or(0, |r| r.end),
        histogram.used(),
        histogram.entropy()
    );

    Ok(PoolReport {
        workers,
        worker_ranges,
    })
}

/// Spawn `workers` scoped threads over `ctx`, join them all, and return
/// each worker's output range or the first failure.
fn dispatch(ctx: &ZipContext<'_>, workers: usize) -> PzResult<Vec<Range<usize>>> {
    std::thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers);
        for index in 0..workers {
            let spawned = std::thread::Builder::new()
                .name(format!("pzip-{index}"))
                .spawn_scoped(scope, move || worker::run_worker(ctx, index));
            match spawned {
                Ok(handle) => handles.push((index, handle)),
                Err(e) => {
                    // The missing worker would never reach the barrier.
                    ctx.signal_error(PzError::Spawn(e.to_string()));
                    break;
                }
            }
        }

        for (index, handle) in handles {
            if handle.join().is_err() {
                ctx.signal_error(PzError::WorkerPanicked { worker: index });
            }
        }
    });

    if let Some(err) = ctx.first_error() {
        return Err(err);
    }
    ctx.output_ranges()
}
