//! Hardware stack in page 1.

use emu_core::{Bus, CycleLock};

use crate::{CpuError, Mos6502};

impl<L: CycleLock> Mos6502<L> {
    /// Store `value` at `$0100 + S`, then decrement S. S is left alone if
    /// the access fails.
    pub fn push<B: Bus>(&mut self, bus: &mut B, value: u8, lock_to_cycle: bool) -> Result<(), CpuError> {
        let mut after = self.regs;
        let address = after.push();
        self.accessed_write(bus, address, value, lock_to_cycle)?;
        self.regs.s = after.s;
        Ok(())
    }

    /// Increment S, then load from `$0100 + S`.
    pub fn pop<B: Bus>(&mut self, bus: &mut B, lock_to_cycle: bool) -> Result<u8, CpuError> {
        let mut after = self.regs;
        let address = after.pop();
        let value = self.accessed_read(bus, address, lock_to_cycle)?;
        self.regs.s = after.s;
        Ok(value)
    }
}
