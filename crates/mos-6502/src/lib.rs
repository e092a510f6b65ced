//! Cycle-accurate MOS 6502/6510 processor.
//!
//! One bus access is one cycle, and every cycle goes through a
//! [`CycleLock`](emu_core::CycleLock). With
//! [`AlwaysOpen`](emu_core::AlwaysOpen) the processor runs flat out; with
//! the processor end of [`emu_core::cycle_lock::channel`] an external
//! driver single-steps it one bus cycle at a time.

mod access;
pub mod addressing;
mod alu;
mod cpu;
mod decode;
mod error;
mod execute;
pub mod flags;
mod registers;
mod stack;

pub use access::{AccessKind, BANK_CONTROL, BusEvent, TraceHook};
pub use addressing::Mode;
pub use cpu::{IRQ_VECTOR, Mos6502, NMI_VECTOR, RESET_VECTOR};
pub use decode::{Instruction, Kind, Operation, decode};
pub use error::CpuError;
pub use flags::Status;
pub use registers::{Registers, STACK_PAGE};
