//! The per-worker body.
//!
//! Each worker runs the same four steps over its own segment:
//!
//! 1. encode the segment into a local run list (no shared state touched);
//! 2. tally the run list and merge it into the shared histogram (lock #1);
//! 3. publish its run count, then wait for everyone else's (barrier);
//! 4. compute its output offset and copy its runs into place (lock #2).

use log::trace;

use super::barrier::PhaseBarrier;
use super::context::ZipContext;
use crate::frequency::Histogram;
use crate::rle;
use crate::PzResult;

/// Aborts the barrier if the worker unwinds, so a panic before the barrier
/// cannot strand the other workers.
struct AbortOnUnwind<'b> {
    barrier: &'b PhaseBarrier,
}

impl Drop for AbortOnUnwind<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.barrier.abort();
        }
    }
}

/// Entry point of worker thread `index`. Failures are reported through the
/// context rather than returned.
pub(crate) fn run_worker(ctx: &ZipContext<'_>, index: usize) {
    let _guard = AbortOnUnwind {
        barrier: ctx.barrier(),
    };
    if let Err(e) = zip_segment(ctx, index) {
        ctx.signal_error(e);
    }
}

fn zip_segment(ctx: &ZipContext<'_>, index: usize) -> PzResult<()> {
    let segment = ctx.segment(index);
    let runs = rle::encode_segment(segment.slice(ctx.input()));

    let local = Histogram::from_runs(&runs);
    ctx.merge_histogram(&local)?;

    #[cfg(test)]
    if ctx.panics_in(index) {
        panic!("worker {index} panicked before publishing");
    }

    // Must happen before the barrier: every offset depends on it.
    ctx.publish_run_count(index, runs.len())?;
    ctx.wait_for_publication()?;

    let offset = ctx.place_runs(index, &runs)?;
    trace!(
        "worker {index}: segment [{}, {}) -> {} runs at offset {offset}",
        segment.start,
        segment.end,
        runs.len()
    );
    Ok(())
}
