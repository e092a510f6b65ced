//! Indirect addressing against hand-built pointer fixtures.

use emu_core::{CycleLock, Memory};
use mos_6502::Mos6502;

fn cycles(cpu: &Mos6502) -> u64 {
    cpu.lock().cycle_count()
}

#[test]
fn indexed_indirect_reads_pointer_at_zp_plus_x() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.load(0x0024, &[0x74, 0x20]);
    cpu.regs.x = 0x04;

    assert_eq!(cpu.indexed_indirect(&mut mem, 0x20).unwrap(), 0x2074);
    assert_eq!(cycles(&cpu), 2);
}

#[test]
fn indexed_indirect_wraps_in_page_zero() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    // $F0 + $0F = $FF: low byte at $FF, high byte wraps to $00.
    mem.set(0x00FF, 0x34);
    mem.set(0x0000, 0x12);
    mem.set(0x0100, 0x99);
    cpu.regs.x = 0x0F;

    assert_eq!(cpu.indexed_indirect(&mut mem, 0xF0).unwrap(), 0x1234);

    // $F0 + $20 wraps to $10.
    mem.load(0x0010, &[0xCD, 0xAB]);
    cpu.regs.x = 0x20;
    assert_eq!(cpu.indexed_indirect(&mut mem, 0xF0).unwrap(), 0xABCD);
}

#[test]
fn indirect_indexed_adds_y_after_the_pointer() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.load(0x0086, &[0x28, 0x40]);
    cpu.regs.y = 0x10;

    assert_eq!(cpu.indirect_indexed(&mut mem, 0x86).unwrap(), 0x4038);
    assert_eq!(cycles(&cpu), 2);

    // The sum may carry into the next page, and wraps at the top.
    mem.load(0x0090, &[0xFF, 0xFF]);
    cpu.regs.y = 0x02;
    assert_eq!(cpu.indirect_indexed(&mut mem, 0x90).unwrap(), 0x0001);
}

#[test]
fn indirect_indexed_pointer_at_ff_uses_zero_page_bug() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.set(0x00FF, 0x00);
    mem.set(0x0000, 0x30);
    mem.set(0x0100, 0x40);
    cpu.regs.y = 0x05;

    assert_eq!(cpu.indirect_indexed(&mut mem, 0xFF).unwrap(), 0x3005);
}

#[test]
fn doubly_indirect_form_costs_four_cycles() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.load(0x0080, &[0x00, 0x20]);
    mem.load(0x2010, &[0xEF, 0xBE]);
    cpu.regs.y = 0x10;

    assert_eq!(
        cpu.indirect_indexed_deref(&mut mem, 0x0080, true).unwrap(),
        0xBEEF
    );
    assert_eq!(cycles(&cpu), 4);
}

#[test]
fn absolute_indirect_has_the_page_bug() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.set(0x30FF, 0x80);
    mem.set(0x3000, 0x50);
    mem.set(0x3100, 0x40);

    assert_eq!(cpu.absolute_indirect(&mut mem, 0x30FF).unwrap(), 0x5080);
    assert_eq!(cycles(&cpu), 2);
}
