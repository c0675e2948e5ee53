//! Per-invocation shared state.
//!
//! One [`ZipContext`] is built for each call, borrowed by every worker of
//! that call, and dropped after they are joined. Nothing is process-global,
//! so independent invocations can run concurrently.

use std::ops::Range;
use std::sync::{Mutex, OnceLock};

use log::error;

use super::barrier::PhaseBarrier;
use crate::frequency::Histogram;
use crate::partition::{segment_for, RemainderPolicy, Segment};
use crate::rle::Run;
use crate::{PzError, PzResult};

/// Caller-owned output buffer plus its completion tally.
struct OutputSink<'a> {
    runs: &'a mut [Run],
    count: &'a mut usize,
}

/// Context shared among all worker threads of one invocation.
pub(crate) struct ZipContext<'a> {
    input: &'a [u8],
    workers: usize,
    remainder: RemainderPolicy,
    /// First critical section: histogram aggregation.
    histogram: Mutex<&'a mut Histogram>,
    /// Second critical section: output placement.
    output: Mutex<OutputSink<'a>>,
    /// Write-once run count per worker, published before the barrier.
    run_counts: Vec<OnceLock<usize>>,
    barrier: PhaseBarrier,
    error_capture: Mutex<Option<PzError>>,
    /// Worker that panics mid-segment, for exercising the unwind path.
    #[cfg(test)]
    panic_in: Option<usize>,
}

impl<'a> ZipContext<'a> {
    pub(crate) fn new(
        input: &'a [u8],
        workers: usize,
        remainder: RemainderPolicy,
        output: &'a mut [Run],
        output_count: &'a mut usize,
        histogram: &'a mut Histogram,
    ) -> Self {
        Self {
            input,
            workers,
            remainder,
            histogram: Mutex::new(histogram),
            output: Mutex::new(OutputSink {
                runs: output,
                count: output_count,
            }),
            run_counts: (0..workers).map(|_| OnceLock::new()).collect(),
            barrier: PhaseBarrier::new(workers),
            error_capture: Mutex::new(None),
            #[cfg(test)]
            panic_in: None,
        }
    }

    /// Make worker `index` panic after merging its histogram.
    #[cfg(test)]
    pub(crate) fn with_panic_in(mut self, index: usize) -> Self {
        self.panic_in = Some(index);
        self
    }

    #[cfg(test)]
    pub(crate) fn panics_in(&self, index: usize) -> bool {
        self.panic_in == Some(index)
    }

    pub(crate) fn input(&self) -> &'a [u8] {
        self.input
    }

    pub(crate) fn segment(&self, index: usize) -> Segment {
        segment_for(self.input.len(), self.workers, index, self.remainder)
    }

    pub(crate) fn barrier(&self) -> &PhaseBarrier {
        &self.barrier
    }

    /// Fold one worker's local counts into the shared histogram.
    pub(crate) fn merge_histogram(&self, local: &Histogram) -> PzResult<()> {
        let mut shared = self
            .histogram
            .lock()
            .map_err(|_| PzError::Sync("histogram mutex poisoned".into()))?;
        shared.merge_from(local);
        Ok(())
    }

    /// Record how many runs worker `index` produced. Each slot is written
    /// exactly once, by its own worker.
    pub(crate) fn publish_run_count(&self, index: usize, count: usize) -> PzResult<()> {
        let slot = self
            .run_counts
            .get(index)
            .ok_or_else(|| PzError::Internal(format!("no run-count slot for worker {index}")))?;
        slot.set(count)
            .map_err(|_| PzError::Internal(format!("run count for worker {index} published twice")))
    }

    /// Wait until every worker has published its run count.
    pub(crate) fn wait_for_publication(&self) -> PzResult<()> {
        self.barrier.wait().map(|_| ())
    }

    fn run_count(&self, index: usize) -> PzResult<usize> {
        self.run_counts
            .get(index)
            .and_then(|slot| slot.get().copied())
            .ok_or_else(|| PzError::Internal(format!("run count for worker {index} missing")))
    }

    /// Output offset of worker `index`: the sum of all lower workers' counts.
    ///
    /// Only meaningful after the barrier.
    pub(crate) fn output_offset(&self, index: usize) -> PzResult<usize> {
        (0..index).try_fold(0usize, |acc, j| Ok(acc + self.run_count(j)?))
    }

    /// Copy a worker's runs into its reserved slice of the shared output.
    ///
    /// Returns the offset the runs were written at.
    pub(crate) fn place_runs(&self, index: usize, runs: &[Run]) -> PzResult<usize> {
        let mut sink = self
            .output
            .lock()
            .map_err(|_| PzError::Sync("output mutex poisoned".into()))?;
        let offset = self.output_offset(index)?;
        let end = offset + runs.len();
        if end > sink.runs.len() {
            return Err(PzError::BufferTooSmall {
                needed: end,
                capacity: sink.runs.len(),
            });
        }
        sink.runs[offset..end].copy_from_slice(runs);
        *sink.count += runs.len();
        Ok(offset)
    }

    /// Output sub-range of every worker, in worker order.
    pub(crate) fn output_ranges(&self) -> PzResult<Vec<Range<usize>>> {
        let mut ranges = Vec::with_capacity(self.workers);
        let mut offset = 0;
        for i in 0..self.workers {
            let count = self.run_count(i)?;
            ranges.push(offset..offset + count);
            offset += count;
        }
        Ok(ranges)
    }

    /// Record a worker failure and release everyone waiting at the barrier.
    ///
    /// The first root cause wins; a later `Aborted` never replaces it.
    pub(crate) fn signal_error(&self, err: PzError) {
        {
            let mut guard = self.error_capture.lock().unwrap_or_else(|p| p.into_inner());
            match guard.as_ref() {
                None => *guard = Some(err.clone()),
                Some(PzError::Aborted) if err != PzError::Aborted => *guard = Some(err.clone()),
                Some(_) => {}
            }
        }
        if err != PzError::Aborted {
            error!("pzip worker failed: {err}");
        }
        self.barrier.abort();
    }

    /// The captured failure, if any worker failed.
    pub(crate) fn first_error(&self) -> Option<PzError> {
        self.error_capture
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
