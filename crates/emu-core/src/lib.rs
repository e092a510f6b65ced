//! Core traits and types for cycle-accurate emulation.
//!
//! One bus access is one cycle. A processor performs its accesses inside a
//! [`CycleLock`], and whoever holds the other end of that lock decides when
//! each of those cycles is allowed to happen.

mod bus;
mod clock;
pub mod cycle_lock;
mod memory;
mod observable;

pub use bus::Bus;
pub use clock::MasterClock;
pub use cycle_lock::{AlwaysOpen, ClockDriver, CycleGuard, CycleLock, Halted, ProcessorLock};
pub use memory::Memory;
pub use observable::{Observable, Value};
