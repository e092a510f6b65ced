//! Addressing mode resolution.
//!
//! The free functions are pure: they take operand bytes the engine has
//! already fetched and cost no cycles. The indirect modes read pointers
//! through the bus and are methods on the processor.

use emu_core::{Bus, CycleLock};

use crate::{CpuError, Mos6502, Registers};

/// Addressing modes of the documented instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Implied,
    Accumulator,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($nnnn)`.
    Indirect,
    /// `($nn,X)`.
    IndexedIndirect,
    /// `($nn),Y`.
    IndirectIndexed,
    Relative,
}

impl Mode {
    /// Operand bytes following the opcode.
    #[must_use]
    pub const fn operand_len(self) -> u16 {
        match self {
            Mode::Implied | Mode::Accumulator => 0,
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => 2,
            _ => 1,
        }
    }
}

/// Implied-mode instructions have no operand address.
#[must_use]
pub const fn implied() -> u16 {
    0
}

/// Operand of accumulator-mode instructions.
#[must_use]
pub const fn accumulator(regs: &Registers) -> u8 {
    regs.a
}

#[must_use]
pub const fn absolute(operand: u16) -> u16 {
    operand
}

/// `operand + index`, wrapping at `$FFFF`.
#[must_use]
pub const fn indexed(operand: u16, index: u8) -> u16 {
    operand.wrapping_add(index as u16)
}

#[must_use]
pub const fn zeropage(operand: u8) -> u16 {
    operand as u16
}

/// `operand + index` kept inside page zero.
#[must_use]
pub const fn zeropage_indexed(operand: u8, index: u8) -> u16 {
    operand.wrapping_add(index) as u16
}

/// Branch target: `pc + offset`, where `pc` already points past the
/// offset byte.
#[must_use]
pub const fn relative(pc: u16, offset: u8) -> u16 {
    pc.wrapping_add_signed(offset as i8 as i16)
}

impl<L: CycleLock> Mos6502<L> {
    /// `JMP ($nnnn)`: the word at `pointer`, page bug active. Two cycles.
    pub fn absolute_indirect<B: Bus>(&mut self, bus: &mut B, pointer: u16) -> Result<u16, CpuError> {
        self.read_word_at(bus, pointer, true)
    }

    /// `($nn,X)`: the word at `(pointer + X) mod 256`. Two cycles.
    pub fn indexed_indirect<B: Bus>(&mut self, bus: &mut B, pointer: u8) -> Result<u16, CpuError> {
        let address = zeropage_indexed(pointer, self.regs.x);
        self.read_word_at(bus, address, true)
    }

    /// `($nn),Y`: the word at `pointer` plus Y. Two cycles.
    pub fn indirect_indexed<B: Bus>(&mut self, bus: &mut B, pointer: u8) -> Result<u16, CpuError> {
        let base = self.read_word_at(bus, zeropage(pointer), true)?;
        Ok(indexed(base, self.regs.y))
    }

    /// Doubly indirect form: the word at `pointer` plus Y is itself a
    /// pointer, and the word stored there is the result. Four cycles.
    pub fn indirect_indexed_deref<B: Bus>(
        &mut self,
        bus: &mut B,
        pointer: u16,
        emulate_page_bug: bool,
    ) -> Result<u16, CpuError> {
        let base = self.read_word_at(bus, pointer, emulate_page_bug)?;
        self.read_word_at(bus, indexed(base, self.regs.y), emulate_page_bug)
    }
}
