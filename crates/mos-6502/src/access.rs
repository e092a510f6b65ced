//! Bus access layer.
//!
//! Every memory access the processor makes goes through here. Accounted
//! accesses bracket the raw access with the cycle lock; raw accesses are
//! for callers already inside an accounted cycle.

use emu_core::{Bus, CycleLock};

use crate::{CpuError, Mos6502};

/// The 6510 I/O port byte that selects the memory banks.
pub const BANK_CONTROL: u16 = 0x0001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

/// One raw bus access, as seen by a trace hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusEvent {
    /// Cycle count of the lock when the access happened.
    pub cycle: u64,
    pub address: u16,
    pub value: u8,
    pub kind: AccessKind,
}

pub type TraceHook = Box<dyn FnMut(&BusEvent) + Send>;

/// Raw access plus the two side channels: the trace hook and the bank
/// refresh after a write to [`BANK_CONTROL`].
#[derive(Default)]
pub(crate) struct BusPort {
    trace: Option<TraceHook>,
}

impl BusPort {
    pub(crate) fn set_trace(&mut self, hook: TraceHook) {
        self.trace = Some(hook);
    }

    pub(crate) fn clear_trace(&mut self) {
        self.trace = None;
    }

    pub(crate) fn is_tracing(&self) -> bool {
        self.trace.is_some()
    }

    pub(crate) fn read<B: Bus, L: CycleLock>(
        &mut self,
        bus: &mut B,
        address: u16,
        lock: &L,
        traced: bool,
    ) -> u8 {
        let value = bus.read(address);
        if traced {
            self.emit(lock, address, value, AccessKind::Read);
        }
        value
    }

    pub(crate) fn write<B: Bus, L: CycleLock>(
        &mut self,
        bus: &mut B,
        address: u16,
        value: u8,
        lock: &L,
        traced: bool,
    ) {
        bus.write(address, value);
        if address == BANK_CONTROL {
            bus.refresh_banks();
        }
        if traced {
            self.emit(lock, address, value, AccessKind::Write);
        }
    }

    fn emit<L: CycleLock>(&mut self, lock: &L, address: u16, value: u8, kind: AccessKind) {
        if let Some(trace) = self.trace.as_mut() {
            trace(&BusEvent {
                cycle: lock.cycle_count(),
                address,
                value,
                kind,
            });
        }
    }
}

impl<L: CycleLock> Mos6502<L> {
    /// Read without cycle accounting.
    pub fn read<B: Bus>(&mut self, bus: &mut B, address: u16) -> u8 {
        self.port.read(bus, address, &self.lock, true)
    }

    /// Write without cycle accounting.
    pub fn write<B: Bus>(&mut self, bus: &mut B, address: u16, value: u8) {
        self.port.write(bus, address, value, &self.lock, true);
    }

    /// Count one accounted cycle. True if it repeats a cycle of a resumed
    /// instruction, which takes neither the lock nor a trace event.
    fn replays_cycle(&mut self) -> bool {
        if self.replay == 0 {
            return false;
        }
        self.replay -= 1;
        self.progress += 1;
        true
    }

    /// Read one byte, taking one bus cycle when `lock_to_cycle` is set.
    pub fn accessed_read<B: Bus>(
        &mut self,
        bus: &mut B,
        address: u16,
        lock_to_cycle: bool,
    ) -> Result<u8, CpuError> {
        if !lock_to_cycle {
            return Ok(self.port.read(bus, address, &self.lock, true));
        }
        if self.replays_cycle() {
            return Ok(self.port.read(bus, address, &self.lock, false));
        }
        let _cycle = self.lock.enter_cycle()?;
        self.progress += 1;
        Ok(self.port.read(bus, address, &self.lock, true))
    }

    /// Write one byte, taking one bus cycle when `lock_to_cycle` is set.
    pub fn accessed_write<B: Bus>(
        &mut self,
        bus: &mut B,
        address: u16,
        value: u8,
        lock_to_cycle: bool,
    ) -> Result<(), CpuError> {
        if !lock_to_cycle {
            self.port.write(bus, address, value, &self.lock, true);
            return Ok(());
        }
        if self.replays_cycle() {
            self.port.write(bus, address, value, &self.lock, false);
            return Ok(());
        }
        let _cycle = self.lock.enter_cycle()?;
        self.progress += 1;
        self.port.write(bus, address, value, &self.lock, true);
        Ok(())
    }

    /// `(byte(hi) << 8) | byte(lo)`. Two cycles, high byte first.
    pub fn read_word<B: Bus>(&mut self, bus: &mut B, hi: u16, lo: u16) -> Result<u16, CpuError> {
        let high = self.accessed_read(bus, hi, true)?;
        let low = self.accessed_read(bus, lo, true)?;
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Little-endian word at `address`. With `emulate_page_bug`, a pointer
    /// on the last byte of a page takes its high byte from the start of
    /// the same page.
    pub fn read_word_at<B: Bus>(
        &mut self,
        bus: &mut B,
        address: u16,
        emulate_page_bug: bool,
    ) -> Result<u16, CpuError> {
        let hi = if emulate_page_bug && address & 0x00FF == 0x00FF {
            address & 0xFF00
        } else {
            address.wrapping_add(1)
        };
        self.read_word(bus, hi, address)
    }

    /// Byte at PC, then PC + 1.
    pub fn next_code_byte<B: Bus>(&mut self, bus: &mut B) -> Result<u8, CpuError> {
        let value = self.accessed_read(bus, self.regs.pc, true)?;
        self.regs.pc = self.regs.pc.wrapping_add(1);
        Ok(value)
    }

    /// Word at PC, high byte first. PC moves past each byte as it is
    /// read, ending at PC + 2.
    pub fn next_code_word<B: Bus>(&mut self, bus: &mut B) -> Result<u16, CpuError> {
        let pc = self.regs.pc;
        let high = self.accessed_read(bus, pc.wrapping_add(1), true)?;
        self.regs.pc = pc.wrapping_add(1);
        let low = self.accessed_read(bus, pc, true)?;
        self.regs.pc = pc.wrapping_add(2);
        Ok(u16::from_le_bytes([low, high]))
    }

    /// Accounted read whose value the chip discards.
    pub(crate) fn dummy_read<B: Bus>(&mut self, bus: &mut B, address: u16) -> Result<(), CpuError> {
        self.accessed_read(bus, address, true).map(drop)
    }
}
