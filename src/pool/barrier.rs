//! Abortable phase barrier.
//!
//! `std::sync::Barrier` has no way to release waiters when a participant
//! dies, so a failed worker would leave the rest blocked forever. This
//! barrier adds [`PhaseBarrier::abort`]: every current and future waiter
//! returns [`PzError::Aborted`] instead of blocking.

use std::sync::{Condvar, Mutex, MutexGuard};

use crate::{PzError, PzResult};

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

/// A reusable barrier for `parties` threads that can be aborted.
#[derive(Debug)]
pub(crate) struct PhaseBarrier {
    parties: usize,
    state: Mutex<BarrierState>,
    cvar: Condvar,
}

impl PhaseBarrier {
    pub(crate) fn new(parties: usize) -> Self {
        Self {
            parties,
            state: Mutex::new(BarrierState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            cvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        // The state is a pair of counters and a flag; a panic while holding
        // the lock cannot leave it half-updated.
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Block until all parties have arrived.
    ///
    /// Returns `Ok(true)` for exactly one caller per generation (the last to
    /// arrive), `Ok(false)` for the rest, and `Err(PzError::Aborted)` once
    /// the barrier has been aborted.
    pub(crate) fn wait(&self) -> PzResult<bool> {
        let mut state = self.lock();
        if state.aborted {
            return Err(PzError::Aborted);
        }

        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.cvar.notify_all();
            return Ok(true);
        }

        let generation = state.generation;
        while state.generation == generation && !state.aborted {
            state = self.cvar.wait(state).unwrap_or_else(|p| p.into_inner());
        }
        if state.generation == generation {
            return Err(PzError::Aborted);
        }
        Ok(false)
    }

    /// Release every waiter with an error and fail all later waits.
    pub(crate) fn abort(&self) {
        let mut state = self.lock();
        if !state.aborted {
            state.aborted = true;
            self.cvar.notify_all();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_aborted(&self) -> bool {
        self.lock().aborted
    }
}
