//! Execution of a fetched opcode.
//!
//! Addressing is resolved here with the chip's dummy accesses, so every
//! documented instruction costs its datasheet cycle count. The operation
//! itself is a pure handler from [`Kind`].

use emu_core::{Bus, CycleLock};

use crate::addressing::{self, Mode};
use crate::cpu::IRQ_VECTOR;
use crate::decode::{Instruction, Kind, Operation, decode};
use crate::flags::I;
use crate::{CpuError, Mos6502, Status};

impl<L: CycleLock> Mos6502<L> {
    pub(crate) fn execute<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> Result<(), CpuError> {
        let unsupported = CpuError::UnsupportedOpcode {
            opcode,
            pc: self.regs.pc.wrapping_sub(1),
        };
        let Some(Instruction { op, mode }) = decode(opcode) else {
            return Err(unsupported);
        };

        match op.kind() {
            Kind::Read(handler) => {
                let value = if mode == Mode::Immediate {
                    self.next_code_byte(bus)?
                } else {
                    let address = self.operand_address(bus, mode, false, unsupported)?;
                    self.accessed_read(bus, address, true)?
                };
                handler(&mut self.regs, value);
            }
            Kind::Store(handler) => {
                let address = self.operand_address(bus, mode, true, unsupported)?;
                let value = handler(&self.regs);
                self.accessed_write(bus, address, value, true)?;
            }
            Kind::Modify(handler) => {
                if mode == Mode::Accumulator {
                    self.dummy_read(bus, self.regs.pc)?;
                    let value = addressing::accumulator(&self.regs);
                    self.regs.a = handler(&mut self.regs, value);
                } else {
                    let address = self.operand_address(bus, mode, true, unsupported)?;
                    let value = self.accessed_read(bus, address, true)?;
                    self.accessed_write(bus, address, value, true)?;
                    let result = handler(&mut self.regs, value);
                    self.accessed_write(bus, address, result, true)?;
                }
            }
            Kind::Implied(handler) => {
                self.dummy_read(bus, self.regs.pc)?;
                handler(&mut self.regs);
            }
            Kind::Branch(taken) => self.branch(bus, taken(&self.regs))?,
            Kind::Control => self.control(bus, op, mode, unsupported)?,
        }
        Ok(())
    }

    /// Fetch the operand bytes for `mode` and resolve the effective
    /// address. `always_fix` forces the un-carried dummy read of indexed
    /// modes, as stores and read-modify-write instructions do.
    fn operand_address<B: Bus>(
        &mut self,
        bus: &mut B,
        mode: Mode,
        always_fix: bool,
        unsupported: CpuError,
    ) -> Result<u16, CpuError> {
        match mode {
            Mode::ZeroPage => Ok(addressing::zeropage(self.next_code_byte(bus)?)),
            Mode::ZeroPageX | Mode::ZeroPageY => {
                let operand = self.next_code_byte(bus)?;
                self.dummy_read(bus, addressing::zeropage(operand))?;
                let index = if mode == Mode::ZeroPageX {
                    self.regs.x
                } else {
                    self.regs.y
                };
                Ok(addressing::zeropage_indexed(operand, index))
            }
            Mode::Absolute => Ok(addressing::absolute(self.next_code_word(bus)?)),
            Mode::AbsoluteX | Mode::AbsoluteY => {
                let base = self.next_code_word(bus)?;
                let index = if mode == Mode::AbsoluteX {
                    self.regs.x
                } else {
                    self.regs.y
                };
                let address = addressing::indexed(base, index);
                self.fix_page(bus, base, address, always_fix)?;
                Ok(address)
            }
            Mode::IndexedIndirect => {
                let pointer = self.next_code_byte(bus)?;
                self.dummy_read(bus, addressing::zeropage(pointer))?;
                self.indexed_indirect(bus, pointer)
            }
            Mode::IndirectIndexed => {
                let pointer = self.next_code_byte(bus)?;
                let address = self.indirect_indexed(bus, pointer)?;
                let base = address.wrapping_sub(u16::from(self.regs.y));
                self.fix_page(bus, base, address, always_fix)?;
                Ok(address)
            }
            Mode::Indirect => {
                let pointer = self.next_code_word(bus)?;
                self.absolute_indirect(bus, pointer)
            }
            Mode::Implied | Mode::Accumulator | Mode::Immediate | Mode::Relative => {
                Err(unsupported)
            }
        }
    }

    /// Indexing reads the address before the carry into the high byte
    /// first, whenever the carry happens or `always` is set.
    fn fix_page<B: Bus>(
        &mut self,
        bus: &mut B,
        base: u16,
        address: u16,
        always: bool,
    ) -> Result<(), CpuError> {
        if always || base & 0xFF00 != address & 0xFF00 {
            self.dummy_read(bus, (base & 0xFF00) | (address & 0x00FF))?;
        }
        Ok(())
    }

    /// Two cycles not taken, three taken, four across a page.
    fn branch<B: Bus>(&mut self, bus: &mut B, taken: bool) -> Result<(), CpuError> {
        let offset = self.next_code_byte(bus)?;
        if !taken {
            return Ok(());
        }

        let pc = self.regs.pc;
        let target = addressing::relative(pc, offset);
        self.dummy_read(bus, pc)?;
        if pc & 0xFF00 != target & 0xFF00 {
            self.dummy_read(bus, (pc & 0xFF00) | (target & 0x00FF))?;
        }
        self.regs.pc = target;
        Ok(())
    }

    fn control<B: Bus>(
        &mut self,
        bus: &mut B,
        op: Operation,
        mode: Mode,
        unsupported: CpuError,
    ) -> Result<(), CpuError> {
        match op {
            Operation::Brk => {
                // Padding byte after the opcode.
                self.next_code_byte(bus)?;
                self.push(bus, self.regs.pch(), true)?;
                self.push(bus, self.regs.pcl(), true)?;
                self.push(bus, self.regs.p.to_byte_brk(), true)?;
                self.regs.p.set(I);
                self.regs.pc = self.read_word(bus, IRQ_VECTOR + 1, IRQ_VECTOR)?;
            }
            Operation::Jmp => {
                self.regs.pc = if mode == Mode::Indirect {
                    self.operand_address(bus, mode, false, unsupported)?
                } else {
                    self.next_code_word(bus)?
                };
            }
            Operation::Jsr => {
                let lo = self.next_code_byte(bus)?;
                self.dummy_read(bus, self.regs.stack_addr())?;
                self.push(bus, self.regs.pch(), true)?;
                self.push(bus, self.regs.pcl(), true)?;
                let hi = self.accessed_read(bus, self.regs.pc, true)?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            Operation::Rts => {
                self.dummy_read(bus, self.regs.pc)?;
                self.dummy_read(bus, self.regs.stack_addr())?;
                let lo = self.pop(bus, true)?;
                let hi = self.pop(bus, true)?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
                self.dummy_read(bus, self.regs.pc)?;
                self.regs.pc = self.regs.pc.wrapping_add(1);
            }
            Operation::Rti => {
                self.dummy_read(bus, self.regs.pc)?;
                self.dummy_read(bus, self.regs.stack_addr())?;
                self.regs.p = Status::from_byte(self.pop(bus, true)?);
                let lo = self.pop(bus, true)?;
                let hi = self.pop(bus, true)?;
                self.regs.pc = u16::from_le_bytes([lo, hi]);
            }
            Operation::Pha => {
                self.dummy_read(bus, self.regs.pc)?;
                self.push(bus, self.regs.a, true)?;
            }
            Operation::Php => {
                self.dummy_read(bus, self.regs.pc)?;
                self.push(bus, self.regs.p.to_byte_brk(), true)?;
            }
            Operation::Pla => {
                self.dummy_read(bus, self.regs.pc)?;
                self.dummy_read(bus, self.regs.stack_addr())?;
                let value = self.pop(bus, true)?;
                self.regs.a = value;
                self.regs.p.update_nz(value);
            }
            Operation::Plp => {
                self.dummy_read(bus, self.regs.pc)?;
                self.dummy_read(bus, self.regs.stack_addr())?;
                self.regs.p = Status::from_byte(self.pop(bus, true)?);
            }
            _ => return Err(unsupported),
        }
        Ok(())
    }
}
