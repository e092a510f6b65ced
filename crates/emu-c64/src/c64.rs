//! The system root: processor, memory and the clock that paces them.

use std::thread;
use std::time::{Duration, Instant};

use emu_core::cycle_lock::{self, ClockDriver};
use emu_core::{MasterClock, ProcessorLock};
use mos_6502::{BusEvent, Mos6502, Registers};

use crate::memory::C64Memory;
use crate::{C64Config, C64Error};

/// Cycles granted between two pacing checks.
const PACE_BATCH: u64 = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Stop after this many cycles. `None` runs until the processor fails.
    pub cycles: Option<u64>,
    /// Hold the cycle rate to the model's clock instead of running flat out.
    pub paced: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub elapsed: Duration,
}

/// A Commodore 64 reduced to its processor and memory map.
///
/// The processor runs on its own thread during [`run`](Self::run) and
/// waits on the cycle lock before every bus access. The calling thread
/// drives the clock and never touches memory while the processor runs.
#[derive(Debug)]
pub struct C64 {
    cpu: Mos6502<ProcessorLock>,
    memory: C64Memory,
    driver: ClockDriver,
    clock: MasterClock,
}

impl C64 {
    /// Build the machine. The reset sequence runs on the first cycles of
    /// the first [`run`](Self::run).
    #[must_use]
    pub fn new(config: C64Config) -> Self {
        let (lock, driver) = cycle_lock::channel();
        let mut cpu = Mos6502::with_lock(lock);
        cpu.reset();
        log::info!(
            "C64 {:?} at {} Hz",
            config.model,
            config.model.frequency_hz()
        );
        Self {
            cpu,
            memory: C64Memory::new(config.roms),
            driver,
            clock: config.model.clock(),
        }
    }

    /// Run until the cycle budget is spent or the processor stops.
    ///
    /// A budget that ends inside an instruction suspends it; the next run
    /// finishes it, so several runs add up to one run of the same total.
    ///
    /// Returns the processor's error if it stopped on its own.
    pub fn run(&mut self, options: RunOptions) -> Result<RunSummary, C64Error> {
        self.driver.restart();
        self.driver.reset_cycle_count();

        let Self {
            cpu,
            memory,
            driver,
            clock,
        } = self;
        let clock = *clock;
        let started = Instant::now();

        let joined = thread::scope(|s| {
            let processor = s.spawn(|| cpu.run(memory));
            drive(driver, clock, options, started);
            driver.stop();
            processor.join()
        });

        let summary = RunSummary {
            cycles: self.driver.cycle_count(),
            elapsed: started.elapsed(),
        };
        log::info!(
            "stopped after {} cycles in {:.3?}",
            summary.cycles,
            summary.elapsed
        );

        match joined {
            Ok(Ok(())) => Ok(summary),
            Ok(Err(err)) => Err(err.into()),
            Err(_) => Err(C64Error::ProcessorPanicked),
        }
    }

    /// Observe every bus access the processor makes.
    pub fn set_trace(&mut self, hook: impl FnMut(&BusEvent) + Send + 'static) {
        self.cpu.set_trace(hook);
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.cpu.regs
    }

    #[must_use]
    pub fn memory(&self) -> &C64Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut C64Memory {
        &mut self.memory
    }

    #[must_use]
    pub fn clock(&self) -> MasterClock {
        self.clock
    }

    /// Hex dump of `[start, end)` as the processor sees it.
    #[must_use]
    pub fn dump(&self, start: u16, end: u32) -> String {
        self.memory.dump(start, end)
    }
}

/// Tick the clock until the budget is spent or the lock stops. When
/// paced, sleep after each batch until wall time catches up.
fn drive(driver: &mut ClockDriver, clock: MasterClock, options: RunOptions, started: Instant) {
    let mut ticks = 0u64;
    while options.cycles.is_none_or(|limit| ticks < limit) {
        if driver.tick().is_err() {
            break;
        }
        ticks += 1;

        if options.paced && ticks % PACE_BATCH == 0 {
            let due = clock.duration_of(ticks);
            let now = started.elapsed();
            if let Some(ahead) = due.checked_sub(now) {
                thread::sleep(ahead);
            }
        }
    }
}
