//! Opcode table for the documented instruction set.

use crate::Registers;
use crate::addressing::Mode;
use crate::alu;
use crate::flags::{C, N, V, Z};

/// The 56 documented mnemonics.
#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

/// How the engine drives an operation over the bus.
///
/// The first five carry the pure handler; `Control` operations move the
/// program counter or the stack in ways a handler cannot.
#[derive(Clone, Copy)]
pub enum Kind {
    /// Consumes an operand.
    Read(fn(&mut Registers, u8)),
    /// Produces a value to store.
    Store(fn(&Registers) -> u8),
    /// Read-modify-write on memory or the accumulator.
    Modify(fn(&mut Registers, u8) -> u8),
    Implied(fn(&mut Registers)),
    /// Conditional branch; the handler says whether it is taken.
    Branch(fn(&Registers) -> bool),
    Control,
}

impl Operation {
    #[must_use]
    #[rustfmt::skip]
    pub fn kind(self) -> Kind {
        use Operation as Op;
        match self {
            Op::Adc => Kind::Read(alu::adc),
            Op::And => Kind::Read(alu::and),
            Op::Bit => Kind::Read(alu::bit),
            Op::Cmp => Kind::Read(alu::cmp),
            Op::Cpx => Kind::Read(alu::cpx),
            Op::Cpy => Kind::Read(alu::cpy),
            Op::Eor => Kind::Read(alu::eor),
            Op::Lda => Kind::Read(alu::lda),
            Op::Ldx => Kind::Read(alu::ldx),
            Op::Ldy => Kind::Read(alu::ldy),
            Op::Ora => Kind::Read(alu::ora),
            Op::Sbc => Kind::Read(alu::sbc),

            Op::Sta => Kind::Store(alu::sta),
            Op::Stx => Kind::Store(alu::stx),
            Op::Sty => Kind::Store(alu::sty),

            Op::Asl => Kind::Modify(alu::asl),
            Op::Lsr => Kind::Modify(alu::lsr),
            Op::Rol => Kind::Modify(alu::rol),
            Op::Ror => Kind::Modify(alu::ror),
            Op::Inc => Kind::Modify(alu::inc),
            Op::Dec => Kind::Modify(alu::dec),

            Op::Clc => Kind::Implied(alu::clc),
            Op::Cld => Kind::Implied(alu::cld),
            Op::Cli => Kind::Implied(alu::cli),
            Op::Clv => Kind::Implied(alu::clv),
            Op::Sec => Kind::Implied(alu::sec),
            Op::Sed => Kind::Implied(alu::sed),
            Op::Sei => Kind::Implied(alu::sei),
            Op::Dex => Kind::Implied(alu::dex),
            Op::Dey => Kind::Implied(alu::dey),
            Op::Inx => Kind::Implied(alu::inx),
            Op::Iny => Kind::Implied(alu::iny),
            Op::Nop => Kind::Implied(alu::nop),
            Op::Tax => Kind::Implied(alu::tax),
            Op::Tay => Kind::Implied(alu::tay),
            Op::Tsx => Kind::Implied(alu::tsx),
            Op::Txa => Kind::Implied(alu::txa),
            Op::Txs => Kind::Implied(alu::txs),
            Op::Tya => Kind::Implied(alu::tya),

            Op::Bcc => Kind::Branch(|r| !r.p.is_set(C)),
            Op::Bcs => Kind::Branch(|r| r.p.is_set(C)),
            Op::Bne => Kind::Branch(|r| !r.p.is_set(Z)),
            Op::Beq => Kind::Branch(|r| r.p.is_set(Z)),
            Op::Bpl => Kind::Branch(|r| !r.p.is_set(N)),
            Op::Bmi => Kind::Branch(|r| r.p.is_set(N)),
            Op::Bvc => Kind::Branch(|r| !r.p.is_set(V)),
            Op::Bvs => Kind::Branch(|r| r.p.is_set(V)),

            Op::Brk | Op::Jmp | Op::Jsr | Op::Rti | Op::Rts
            | Op::Pha | Op::Php | Op::Pla | Op::Plp => Kind::Control,
        }
    }
}

/// A decoded opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Operation,
    pub mode: Mode,
}

/// Decode an opcode. Undocumented opcodes give `None`.
#[must_use]
#[rustfmt::skip]
pub fn decode(opcode: u8) -> Option<Instruction> {
    use Mode::{
        Absolute as Abs, AbsoluteX as AbsX, AbsoluteY as AbsY, Accumulator as Acc,
        Immediate as Imm, Implied as Imp, IndexedIndirect as IndX, Indirect as Ind,
        IndirectIndexed as IndY, Relative as Rel, ZeroPage as Zp, ZeroPageX as ZpX,
        ZeroPageY as ZpY,
    };
    use Operation as Op;

    let (op, mode) = match opcode {
        0x00 => (Op::Brk, Imp),  0x01 => (Op::Ora, IndX), 0x05 => (Op::Ora, Zp),
        0x06 => (Op::Asl, Zp),   0x08 => (Op::Php, Imp),  0x09 => (Op::Ora, Imm),
        0x0A => (Op::Asl, Acc),  0x0D => (Op::Ora, Abs),  0x0E => (Op::Asl, Abs),

        0x10 => (Op::Bpl, Rel),  0x11 => (Op::Ora, IndY), 0x15 => (Op::Ora, ZpX),
        0x16 => (Op::Asl, ZpX),  0x18 => (Op::Clc, Imp),  0x19 => (Op::Ora, AbsY),
        0x1D => (Op::Ora, AbsX), 0x1E => (Op::Asl, AbsX),

        0x20 => (Op::Jsr, Abs),  0x21 => (Op::And, IndX), 0x24 => (Op::Bit, Zp),
        0x25 => (Op::And, Zp),   0x26 => (Op::Rol, Zp),   0x28 => (Op::Plp, Imp),
        0x29 => (Op::And, Imm),  0x2A => (Op::Rol, Acc),  0x2C => (Op::Bit, Abs),
        0x2D => (Op::And, Abs),  0x2E => (Op::Rol, Abs),

        0x30 => (Op::Bmi, Rel),  0x31 => (Op::And, IndY), 0x35 => (Op::And, ZpX),
        0x36 => (Op::Rol, ZpX),  0x38 => (Op::Sec, Imp),  0x39 => (Op::And, AbsY),
        0x3D => (Op::And, AbsX), 0x3E => (Op::Rol, AbsX),

        0x40 => (Op::Rti, Imp),  0x41 => (Op::Eor, IndX), 0x45 => (Op::Eor, Zp),
        0x46 => (Op::Lsr, Zp),   0x48 => (Op::Pha, Imp),  0x49 => (Op::Eor, Imm),
        0x4A => (Op::Lsr, Acc),  0x4C => (Op::Jmp, Abs),  0x4D => (Op::Eor, Abs),
        0x4E => (Op::Lsr, Abs),

        0x50 => (Op::Bvc, Rel),  0x51 => (Op::Eor, IndY), 0x55 => (Op::Eor, ZpX),
        0x56 => (Op::Lsr, ZpX),  0x58 => (Op::Cli, Imp),  0x59 => (Op::Eor, AbsY),
        0x5D => (Op::Eor, AbsX), 0x5E => (Op::Lsr, AbsX),

        0x60 => (Op::Rts, Imp),  0x61 => (Op::Adc, IndX), 0x65 => (Op::Adc, Zp),
        0x66 => (Op::Ror, Zp),   0x68 => (Op::Pla, Imp),  0x69 => (Op::Adc, Imm),
        0x6A => (Op::Ror, Acc),  0x6C => (Op::Jmp, Ind),  0x6D => (Op::Adc, Abs),
        0x6E => (Op::Ror, Abs),

        0x70 => (Op::Bvs, Rel),  0x71 => (Op::Adc, IndY), 0x75 => (Op::Adc, ZpX),
        0x76 => (Op::Ror, ZpX),  0x78 => (Op::Sei, Imp),  0x79 => (Op::Adc, AbsY),
        0x7D => (Op::Adc, AbsX), 0x7E => (Op::Ror, AbsX),

        0x81 => (Op::Sta, IndX), 0x84 => (Op::Sty, Zp),   0x85 => (Op::Sta, Zp),
        0x86 => (Op::Stx, Zp),   0x88 => (Op::Dey, Imp),  0x8A => (Op::Txa, Imp),
        0x8C => (Op::Sty, Abs),  0x8D => (Op::Sta, Abs),  0x8E => (Op::Stx, Abs),

        0x90 => (Op::Bcc, Rel),  0x91 => (Op::Sta, IndY), 0x94 => (Op::Sty, ZpX),
        0x95 => (Op::Sta, ZpX),  0x96 => (Op::Stx, ZpY),  0x98 => (Op::Tya, Imp),
        0x99 => (Op::Sta, AbsY), 0x9A => (Op::Txs, Imp),  0x9D => (Op::Sta, AbsX),

        0xA0 => (Op::Ldy, Imm),  0xA1 => (Op::Lda, IndX), 0xA2 => (Op::Ldx, Imm),
        0xA4 => (Op::Ldy, Zp),   0xA5 => (Op::Lda, Zp),   0xA6 => (Op::Ldx, Zp),
        0xA8 => (Op::Tay, Imp),  0xA9 => (Op::Lda, Imm),  0xAA => (Op::Tax, Imp),
        0xAC => (Op::Ldy, Abs),  0xAD => (Op::Lda, Abs),  0xAE => (Op::Ldx, Abs),

        0xB0 => (Op::Bcs, Rel),  0xB1 => (Op::Lda, IndY), 0xB4 => (Op::Ldy, ZpX),
        0xB5 => (Op::Lda, ZpX),  0xB6 => (Op::Ldx, ZpY),  0xB8 => (Op::Clv, Imp),
        0xB9 => (Op::Lda, AbsY), 0xBA => (Op::Tsx, Imp),  0xBC => (Op::Ldy, AbsX),
        0xBD => (Op::Lda, AbsX), 0xBE => (Op::Ldx, AbsY),

        0xC0 => (Op::Cpy, Imm),  0xC1 => (Op::Cmp, IndX), 0xC4 => (Op::Cpy, Zp),
        0xC5 => (Op::Cmp, Zp),   0xC6 => (Op::Dec, Zp),   0xC8 => (Op::Iny, Imp),
        0xC9 => (Op::Cmp, Imm),  0xCA => (Op::Dex, Imp),  0xCC => (Op::Cpy, Abs),
        0xCD => (Op::Cmp, Abs),  0xCE => (Op::Dec, Abs),

        0xD0 => (Op::Bne, Rel),  0xD1 => (Op::Cmp, IndY), 0xD5 => (Op::Cmp, ZpX),
        0xD6 => (Op::Dec, ZpX),  0xD8 => (Op::Cld, Imp),  0xD9 => (Op::Cmp, AbsY),
        0xDD => (Op::Cmp, AbsX), 0xDE => (Op::Dec, AbsX),

        0xE0 => (Op::Cpx, Imm),  0xE1 => (Op::Sbc, IndX), 0xE4 => (Op::Cpx, Zp),
        0xE5 => (Op::Sbc, Zp),   0xE6 => (Op::Inc, Zp),   0xE8 => (Op::Inx, Imp),
        0xE9 => (Op::Sbc, Imm),  0xEA => (Op::Nop, Imp),  0xEC => (Op::Cpx, Abs),
        0xED => (Op::Sbc, Abs),  0xEE => (Op::Inc, Abs),

        0xF0 => (Op::Beq, Rel),  0xF1 => (Op::Sbc, IndY), 0xF5 => (Op::Sbc, ZpX),
        0xF6 => (Op::Inc, ZpX),  0xF8 => (Op::Sed, Imp),  0xF9 => (Op::Sbc, AbsY),
        0xFD => (Op::Sbc, AbsX), 0xFE => (Op::Inc, AbsX),

        _ => return None,
    };
    Some(Instruction { op, mode })
}
