//! Per-operation handlers.
//!
//! Every handler is a plain function over the register file. The engine
//! has already resolved the operand and paid for its bus cycles.

use crate::Registers;
use crate::flags::{C, D, I, N, V, Z};

fn carry(regs: &Registers) -> u8 {
    u8::from(regs.p.is_set(C))
}

// Loads and logic

pub fn lda(regs: &mut Registers, value: u8) {
    regs.a = value;
    regs.p.update_nz(value);
}

pub fn ldx(regs: &mut Registers, value: u8) {
    regs.x = value;
    regs.p.update_nz(value);
}

pub fn ldy(regs: &mut Registers, value: u8) {
    regs.y = value;
    regs.p.update_nz(value);
}

pub fn ora(regs: &mut Registers, value: u8) {
    lda(regs, regs.a | value);
}

pub fn and(regs: &mut Registers, value: u8) {
    lda(regs, regs.a & value);
}

pub fn eor(regs: &mut Registers, value: u8) {
    lda(regs, regs.a ^ value);
}

pub fn bit(regs: &mut Registers, value: u8) {
    regs.p.set_if(Z, regs.a & value == 0);
    regs.p.set_if(N, value & N != 0);
    regs.p.set_if(V, value & V != 0);
}

// Arithmetic

pub fn adc(regs: &mut Registers, value: u8) {
    if regs.p.is_set(D) {
        adc_decimal(regs, value);
    } else {
        adc_binary(regs, value);
    }
}

fn adc_binary(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let sum = u16::from(a) + u16::from(value) + u16::from(carry(regs));
    let result = sum as u8;

    regs.p.set_if(C, sum > 0xFF);
    regs.p.set_if(V, (a ^ result) & (value ^ result) & 0x80 != 0);
    lda(regs, result);
}

/// NMOS decimal add: Z follows the binary sum, N and V the intermediate
/// high nibble.
fn adc_decimal(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let c = carry(regs);

    let mut lo = (a & 0x0F) + (value & 0x0F) + c;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = (a >> 4) + (value >> 4) + u8::from(lo > 0x0F);

    let binary = a.wrapping_add(value).wrapping_add(c);
    let intermediate = hi << 4;
    regs.p.set_if(Z, binary == 0);
    regs.p.set_if(N, intermediate & 0x80 != 0);
    regs.p.set_if(V, (a ^ intermediate) & !(a ^ value) & 0x80 != 0);

    if hi > 9 {
        hi += 6;
    }
    regs.p.set_if(C, hi > 0x0F);
    regs.a = (hi << 4) | (lo & 0x0F);
}

pub fn sbc(regs: &mut Registers, value: u8) {
    if regs.p.is_set(D) {
        sbc_decimal(regs, value);
    } else {
        adc_binary(regs, !value);
    }
}

/// NMOS decimal subtract: all flags follow the binary difference.
fn sbc_decimal(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let borrow = i16::from(1 - carry(regs));

    let binary = i16::from(a) - i16::from(value) - borrow;
    let result = binary as u8;
    regs.p.set_if(C, binary >= 0);
    regs.p.update_nz(result);
    regs.p.set_if(V, (a ^ result) & (a ^ value) & 0x80 != 0);

    let mut lo = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
    let mut hi = i16::from(a >> 4) - i16::from(value >> 4);
    if lo < 0 {
        lo -= 6;
        hi -= 1;
    }
    if hi < 0 {
        hi -= 6;
    }
    regs.a = ((hi << 4) as u8) | ((lo & 0x0F) as u8);
}

fn compare(regs: &mut Registers, register: u8, value: u8) {
    regs.p.set_if(C, register >= value);
    regs.p.update_nz(register.wrapping_sub(value));
}

pub fn cmp(regs: &mut Registers, value: u8) {
    compare(regs, regs.a, value);
}

pub fn cpx(regs: &mut Registers, value: u8) {
    compare(regs, regs.x, value);
}

pub fn cpy(regs: &mut Registers, value: u8) {
    compare(regs, regs.y, value);
}

// Stores

pub fn sta(regs: &Registers) -> u8 {
    regs.a
}

pub fn stx(regs: &Registers) -> u8 {
    regs.x
}

pub fn sty(regs: &Registers) -> u8 {
    regs.y
}

// Read-modify-write

pub fn asl(regs: &mut Registers, value: u8) -> u8 {
    let result = value << 1;
    regs.p.set_if(C, value & 0x80 != 0);
    regs.p.update_nz(result);
    result
}

pub fn lsr(regs: &mut Registers, value: u8) -> u8 {
    let result = value >> 1;
    regs.p.set_if(C, value & 0x01 != 0);
    regs.p.update_nz(result);
    result
}

pub fn rol(regs: &mut Registers, value: u8) -> u8 {
    let result = (value << 1) | carry(regs);
    regs.p.set_if(C, value & 0x80 != 0);
    regs.p.update_nz(result);
    result
}

pub fn ror(regs: &mut Registers, value: u8) -> u8 {
    let result = (value >> 1) | (carry(regs) << 7);
    regs.p.set_if(C, value & 0x01 != 0);
    regs.p.update_nz(result);
    result
}

pub fn inc(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_add(1);
    regs.p.update_nz(result);
    result
}

pub fn dec(regs: &mut Registers, value: u8) -> u8 {
    let result = value.wrapping_sub(1);
    regs.p.update_nz(result);
    result
}

// Implied

pub fn clc(regs: &mut Registers) {
    regs.p.clear(C);
}

pub fn cld(regs: &mut Registers) {
    regs.p.clear(D);
}

pub fn cli(regs: &mut Registers) {
    regs.p.clear(I);
}

pub fn clv(regs: &mut Registers) {
    regs.p.clear(V);
}

pub fn sec(regs: &mut Registers) {
    regs.p.set(C);
}

pub fn sed(regs: &mut Registers) {
    regs.p.set(D);
}

pub fn sei(regs: &mut Registers) {
    regs.p.set(I);
}

pub fn inx(regs: &mut Registers) {
    ldx(regs, regs.x.wrapping_add(1));
}

pub fn iny(regs: &mut Registers) {
    ldy(regs, regs.y.wrapping_add(1));
}

pub fn dex(regs: &mut Registers) {
    ldx(regs, regs.x.wrapping_sub(1));
}

pub fn dey(regs: &mut Registers) {
    ldy(regs, regs.y.wrapping_sub(1));
}

pub fn tax(regs: &mut Registers) {
    ldx(regs, regs.a);
}

pub fn tay(regs: &mut Registers) {
    ldy(regs, regs.a);
}

pub fn txa(regs: &mut Registers) {
    lda(regs, regs.x);
}

pub fn tya(regs: &mut Registers) {
    lda(regs, regs.y);
}

pub fn tsx(regs: &mut Registers) {
    ldx(regs, regs.s);
}

/// The one transfer that leaves the flags alone.
pub fn txs(regs: &mut Registers) {
    regs.s = regs.x;
}

pub fn nop(_regs: &mut Registers) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn regs_with(a: u8, p: u8) -> Registers {
        Registers {
            a,
            p: crate::Status(p),
            ..Registers::new()
        }
    }

    #[test]
    fn adc_binary_sets_carry_and_overflow() {
        let mut regs = regs_with(0x50, 0);
        adc(&mut regs, 0x50);
        assert_eq!(regs.a, 0xA0);
        assert!(regs.p.is_set(V) && regs.p.is_set(N) && !regs.p.is_set(C));

        let mut regs = regs_with(0xFF, C);
        adc(&mut regs, 0x00);
        assert_eq!(regs.a, 0x00);
        assert!(regs.p.is_set(C) && regs.p.is_set(Z) && !regs.p.is_set(V));
    }

    #[test]
    fn sbc_binary_borrows() {
        let mut regs = regs_with(0x00, C);
        sbc(&mut regs, 0x01);
        assert_eq!(regs.a, 0xFF);
        assert!(!regs.p.is_set(C) && regs.p.is_set(N));

        let mut regs = regs_with(0x80, C);
        sbc(&mut regs, 0x01);
        assert_eq!(regs.a, 0x7F);
        assert!(regs.p.is_set(V) && regs.p.is_set(C));
    }

    #[test]
    fn decimal_add_and_subtract() {
        let mut regs = regs_with(0x19, D);
        adc(&mut regs, 0x28);
        assert_eq!(regs.a, 0x47);
        assert!(!regs.p.is_set(C));

        let mut regs = regs_with(0x99, D);
        adc(&mut regs, 0x01);
        assert_eq!(regs.a, 0x00);
        assert!(regs.p.is_set(C));

        let mut regs = regs_with(0x50, D | C);
        sbc(&mut regs, 0x25);
        assert_eq!(regs.a, 0x25);
        assert!(regs.p.is_set(C));

        let mut regs = regs_with(0x00, D | C);
        sbc(&mut regs, 0x01);
        assert_eq!(regs.a, 0x99);
        assert!(!regs.p.is_set(C));
    }

    #[test]
    fn compare_orders_unsigned() {
        let mut regs = regs_with(0x40, 0);
        cmp(&mut regs, 0x40);
        assert!(regs.p.is_set(C) && regs.p.is_set(Z));
        cmp(&mut regs, 0x41);
        assert!(!regs.p.is_set(C) && regs.p.is_set(N));
        cmp(&mut regs, 0x3F);
        assert!(regs.p.is_set(C) && !regs.p.is_set(Z));
    }

    #[test]
    fn bit_copies_operand_bits() {
        let mut regs = regs_with(0x01, 0);
        bit(&mut regs, 0xC0);
        assert!(regs.p.is_set(N) && regs.p.is_set(V) && regs.p.is_set(Z));
    }

    #[test]
    fn rotates_go_through_carry() {
        let mut regs = regs_with(0, C);
        assert_eq!(rol(&mut regs, 0x80), 0x01);
        assert!(regs.p.is_set(C));
        assert_eq!(ror(&mut regs, 0x00), 0x80);
        assert!(!regs.p.is_set(C) && regs.p.is_set(N));
        assert_eq!(asl(&mut regs, 0x81), 0x02);
        assert!(regs.p.is_set(C));
        assert_eq!(lsr(&mut regs, 0x01), 0x00);
        assert!(regs.p.is_set(C) && regs.p.is_set(Z));
    }

    #[test]
    fn txs_leaves_flags() {
        let mut regs = regs_with(0, 0);
        regs.x = 0x00;
        txs(&mut regs);
        assert_eq!(regs.s, 0x00);
        assert!(!regs.p.is_set(Z));
        tsx(&mut regs);
        assert!(regs.p.is_set(Z));
    }
}
