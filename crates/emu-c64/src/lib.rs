//! Commodore 64 system root.
//!
//! The 6510 processor, its port-driven memory map and a clock driver that
//! paces it against the model's cycle rate. Video, sound and the CIAs are
//! not emulated; `$D000-$DFFF` with I/O mapped in is a plain register area.

mod c64;
pub mod config;
mod error;
pub mod memory;

pub use c64::{C64, RunOptions, RunSummary};
pub use config::{C64Config, C64Model, RomKind, RomSet};
pub use error::{C64Error, ConfigError};
pub use memory::{BankState, C64Memory, CharWindow};
