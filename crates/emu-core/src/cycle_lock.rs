//! Cycle lock: the handshake between a clock driver and a processor.
//!
//! The processor brackets every bus access it performs with
//! [`CycleLock::enter_cycle`]; the returned guard ends the cycle when it is
//! dropped. The driver grants cycles one at a time with
//! [`ClockDriver::unlock`] and waits for the processor to finish each one
//! with [`Grant::wait_for_lock`].
//!
//! # Protocol
//!
//! The channel lock is a single slot that moves through four phases:
//!
//! ```text
//! Idle --unlock--> Granted --enter--> InCycle --exit--> Done --wait--> Idle
//! ```
//!
//! Only the driver moves `Idle -> Granted` and `Done -> Idle`; only the
//! processor moves `Granted -> InCycle -> Done`. Exactly one bus cycle
//! happens between two driver ticks, and every effect of cycle N is visible
//! before tick N+1 is granted.
//!
//! Either side can stop the lock. A stopped lock fails every blocking call
//! with [`Halted`], so neither thread is left waiting on a peer that has
//! gone away.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// The lock was stopped while a caller was waiting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cycle lock halted")]
pub struct Halted;

/// Proof that a cycle was entered.
///
/// Only a successful [`CycleLock::acquire`] produces one and only
/// [`CycleLock::release`] consumes it, so a cycle cannot be exited without
/// having been entered.
#[derive(Debug)]
#[must_use = "a permit must be released to end its cycle"]
pub struct Permit {
    _private: (),
}

/// Per-cycle synchronisation used by a processor.
pub trait CycleLock {
    /// Wait for the right to perform one bus cycle and count it.
    fn acquire(&self) -> Result<Permit, Halted>;

    /// Finish the cycle started by `permit`.
    fn release(&self, permit: Permit);

    /// Cycles entered since the last reset.
    fn cycle_count(&self) -> u64;

    fn reset_cycle_count(&self);

    /// Stop the lock from the processor side. The default does nothing.
    fn halt(&self) {}

    /// Enter a cycle. Dropping the guard exits it.
    fn enter_cycle(&self) -> Result<CycleGuard<'_, Self>, Halted>
    where
        Self: Sized,
    {
        let permit = self.acquire()?;
        Ok(CycleGuard {
            lock: self,
            permit: Some(permit),
        })
    }
}

/// An entered cycle. Dropping it exits the cycle.
#[must_use = "dropping the guard immediately ends the cycle"]
#[derive(Debug)]
pub struct CycleGuard<'a, L: CycleLock> {
    lock: &'a L,
    permit: Option<Permit>,
}

impl<L: CycleLock> Drop for CycleGuard<'_, L> {
    fn drop(&mut self) {
        if let Some(permit) = self.permit.take() {
            self.lock.release(permit);
        }
    }
}

// ============================================================================
// Always-open lock
// ============================================================================

/// A lock that never blocks.
///
/// For tests and free-running execution. Cycles are still counted so cycle
/// assertions keep their meaning.
#[derive(Debug, Default)]
pub struct AlwaysOpen {
    cycles: AtomicU64,
}

impl AlwaysOpen {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CycleLock for AlwaysOpen {
    fn acquire(&self) -> Result<Permit, Halted> {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        Ok(Permit { _private: () })
    }

    fn release(&self, _permit: Permit) {}

    fn cycle_count(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    fn reset_cycle_count(&self) {
        self.cycles.store(0, Ordering::Relaxed);
    }
}

// ============================================================================
// Channel lock
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Driver holds the turn.
    Idle,
    /// Driver granted a cycle; processor has not started it.
    Granted,
    /// Processor is performing its bus access.
    InCycle,
    /// Processor finished; driver has not collected the turn back.
    Done,
}

#[derive(Debug)]
struct Handoff {
    phase: Phase,
    stopped: bool,
    cycles: u64,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<Handoff>,
    changed: Condvar,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, Handoff> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the phase is `wanted`, or fail once the lock is stopped.
    ///
    /// A cycle that already finished can still be collected after a stop.
    fn wait_for(&self, wanted: Phase) -> Result<MutexGuard<'_, Handoff>, Halted> {
        let guard = self
            .changed
            .wait_while(self.state(), |h| h.phase != wanted && !h.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        let finished = wanted == Phase::Done && guard.phase == Phase::Done;
        if finished || !guard.stopped {
            Ok(guard)
        } else {
            Err(Halted)
        }
    }

    fn advance(&self, mut guard: MutexGuard<'_, Handoff>, phase: Phase) {
        guard.phase = phase;
        drop(guard);
        self.changed.notify_all();
    }

    fn stop(&self) {
        self.state().stopped = true;
        self.changed.notify_all();
    }
}

/// Create a connected channel lock.
///
/// The [`ProcessorLock`] goes to the processor; the [`ClockDriver`] stays
/// with whoever paces the clock.
#[must_use]
pub fn channel() -> (ProcessorLock, ClockDriver) {
    let shared = Arc::new(Shared {
        state: Mutex::new(Handoff {
            phase: Phase::Idle,
            stopped: false,
            cycles: 0,
        }),
        changed: Condvar::new(),
    });
    (
        ProcessorLock {
            shared: Arc::clone(&shared),
        },
        ClockDriver { shared },
    )
}

/// Processor end of a channel lock.
#[derive(Debug)]
pub struct ProcessorLock {
    shared: Arc<Shared>,
}

impl CycleLock for ProcessorLock {
    fn acquire(&self) -> Result<Permit, Halted> {
        let mut state = self.shared.wait_for(Phase::Granted)?;
        state.cycles += 1;
        self.shared.advance(state, Phase::InCycle);
        Ok(Permit { _private: () })
    }

    fn release(&self, _permit: Permit) {
        let state = self.shared.state();
        if state.phase == Phase::InCycle {
            self.shared.advance(state, Phase::Done);
        }
    }

    fn cycle_count(&self) -> u64 {
        self.shared.state().cycles
    }

    fn reset_cycle_count(&self) {
        self.shared.state().cycles = 0;
    }

    fn halt(&self) {
        self.shared.stop();
    }
}

impl Drop for ProcessorLock {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

/// Driver end of a channel lock.
#[derive(Debug)]
pub struct ClockDriver {
    shared: Arc<Shared>,
}

impl ClockDriver {
    /// Grant the processor one cycle.
    ///
    /// The driver stays borrowed until the grant is waited on, so a second
    /// cycle cannot be granted while one is outstanding.
    pub fn unlock(&mut self) -> Result<Grant<'_>, Halted> {
        let state = self.shared.wait_for(Phase::Idle)?;
        self.shared.advance(state, Phase::Granted);
        Ok(Grant {
            driver: self,
            collected: false,
        })
    }

    /// Grant one cycle and wait for the processor to finish it.
    pub fn tick(&mut self) -> Result<(), Halted> {
        self.unlock()?.wait_for_lock()
    }

    /// Stop the lock. A processor waiting for a cycle gets [`Halted`].
    pub fn stop(&self) {
        self.shared.stop();
    }

    /// Re-arm a stopped lock so the driver can grant cycles again.
    pub fn restart(&mut self) {
        let mut state = self.shared.state();
        if state.stopped {
            state.stopped = false;
            self.shared.advance(state, Phase::Idle);
        }
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.state().stopped
    }

    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.shared.state().cycles
    }

    pub fn reset_cycle_count(&self) {
        self.shared.state().cycles = 0;
    }

    fn collect(&self) -> Result<(), Halted> {
        let state = self.shared.wait_for(Phase::Done)?;
        self.shared.advance(state, Phase::Idle);
        Ok(())
    }
}

impl Drop for ClockDriver {
    fn drop(&mut self) {
        self.shared.stop();
    }
}

/// A cycle granted by [`ClockDriver::unlock`].
///
/// Dropping a grant without waiting still waits for the processor, so the
/// driver never runs ahead of it.
#[must_use = "wait_for_lock() must follow unlock()"]
#[derive(Debug)]
pub struct Grant<'a> {
    driver: &'a ClockDriver,
    collected: bool,
}

impl Grant<'_> {
    /// Block until the processor has finished the granted cycle.
    pub fn wait_for_lock(mut self) -> Result<(), Halted> {
        self.collected = true;
        self.driver.collect()
    }
}

impl Drop for Grant<'_> {
    fn drop(&mut self) {
        if !self.collected {
            let _ = self.driver.collect();
        }
    }
}
