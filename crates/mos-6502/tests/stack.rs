//! Stack push/pop through the bus.

use emu_core::cycle_lock;
use emu_core::{CycleLock, Halted, Memory};
use mos_6502::{CpuError, Mos6502};

#[test]
fn push_stores_then_decrements() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    assert_eq!(cpu.regs.s, 0xFF);

    cpu.push(&mut mem, 0xAB, true).unwrap();
    assert_eq!(cpu.regs.s, 0xFE);
    assert_eq!(mem.get(0x01FF), 0xAB);
    assert_eq!(cpu.lock().cycle_count(), 1);
}

#[test]
fn push_at_bottom_wraps() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    cpu.regs.s = 0x00;

    cpu.push(&mut mem, 0x11, false).unwrap();
    assert_eq!(cpu.regs.s, 0xFF);
    assert_eq!(mem.get(0x0100), 0x11);
    assert_eq!(cpu.lock().cycle_count(), 0);
}

#[test]
fn pop_increments_then_loads() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    mem.set(0x01FF, 0x5A);
    mem.set(0x0100, 0xA5);
    cpu.regs.s = 0xFE;

    assert_eq!(cpu.pop(&mut mem, true).unwrap(), 0x5A);
    assert_eq!(cpu.regs.s, 0xFF);
    assert_eq!(cpu.pop(&mut mem, true).unwrap(), 0xA5);
    assert_eq!(cpu.regs.s, 0x00);
}

#[test]
fn every_value_survives_a_push_pop() {
    let mut mem = Memory::new();
    let mut cpu = Mos6502::new();
    for start in 0..=u8::MAX {
        cpu.regs.s = start;
        let value = start ^ 0x5A;
        cpu.push(&mut mem, value, true).unwrap();
        assert_eq!(cpu.pop(&mut mem, true).unwrap(), value);
        assert_eq!(cpu.regs.s, start);
    }
}

#[test]
fn halted_push_and_pop_leave_s_alone() {
    let mut mem = Memory::new();
    let (lock, driver) = cycle_lock::channel();
    let mut cpu = Mos6502::with_lock(lock);
    driver.stop();

    cpu.regs.s = 0x80;
    assert_eq!(
        cpu.push(&mut mem, 0xAB, true),
        Err(CpuError::Halted(Halted))
    );
    assert_eq!(cpu.regs.s, 0x80);
    assert_eq!(mem.get(0x0180), 0x00);

    assert_eq!(cpu.pop(&mut mem, true), Err(CpuError::Halted(Halted)));
    assert_eq!(cpu.regs.s, 0x80);
}
