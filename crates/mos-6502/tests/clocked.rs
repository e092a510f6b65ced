//! The processor on its own thread, single-stepped by a clock driver.

use std::thread;

use emu_core::cycle_lock::{self, ClockDriver};
use emu_core::{CycleLock, Memory};
use mos_6502::{BusEvent, CpuError, Mos6502};

type ClockedCpu = Mos6502<emu_core::ProcessorLock>;

/// Run the processor on a scoped thread for exactly `ticks` cycles.
fn run_for(cpu: &mut ClockedCpu, mem: &mut Memory, driver: &mut ClockDriver, ticks: u64) {
    driver.restart();
    let result = thread::scope(|s| {
        let processor = s.spawn(|| cpu.run(mem));
        for _ in 0..ticks {
            driver.tick().unwrap();
        }
        driver.stop();
        processor.join().unwrap()
    });
    assert_eq!(result, Ok(()));
}

fn clocked() -> (ClockedCpu, ClockDriver) {
    let (lock, driver) = cycle_lock::channel();
    (Mos6502::with_lock(lock), driver)
}

#[test]
fn n_ticks_run_n_cycles() {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(
        0x0000,
        &[
            0xA9, 0x01, // LDA #$01
            0xA2, 0x02, // LDX #$02
            0xE8, // INX
            0xEA, // NOP
        ],
    );

    run_for(&mut cpu, &mut mem, &mut driver, 8);

    assert_eq!(driver.cycle_count(), 8);
    assert_eq!(cpu.regs.pc, 0x0006);
    assert_eq!((cpu.regs.a, cpu.regs.x), (0x01, 0x03));
    assert!(cpu.is_instruction_complete());
}

#[test]
fn every_tick_is_one_cycle_mid_instruction() {
    for ticks in 1..=6 {
        let mut mem = Memory::new();
        let (mut cpu, mut driver) = clocked();
        mem.load(0x0000, &[0xEE, 0x00, 0x30]); // INC $3000, six cycles

        run_for(&mut cpu, &mut mem, &mut driver, ticks);
        assert_eq!(cpu.lock().cycle_count(), ticks);
        assert_eq!(cpu.is_suspended(), ticks < 6);
        assert_eq!(mem.get(0x3000), u8::from(ticks == 6), "after {ticks} ticks");
    }
}

#[test]
fn halt_mid_instruction_keeps_partial_progress() {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0xAD, 0x00, 0x30]); // LDA $3000
    mem.set(0x3000, 0x99);

    // Opcode and one operand byte.
    run_for(&mut cpu, &mut mem, &mut driver, 2);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.a, 0x00);
    assert!(cpu.is_suspended());
    assert!(!cpu.is_instruction_complete());

    run_for(&mut cpu, &mut mem, &mut driver, 2);
    assert_eq!(cpu.regs.pc, 0x0003);
    assert_eq!(cpu.regs.a, 0x99);
    assert_eq!(driver.cycle_count(), 4);
    assert!(cpu.is_instruction_complete());
}

#[test]
fn halted_instruction_resumes_where_it_stopped() {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0x20, 0x00, 0x40]); // JSR $4000
    mem.load(0x4000, &[0xA9, 0x77]); // LDA #$77

    // Three of JSR's six cycles, then stop before the pushes.
    run_for(&mut cpu, &mut mem, &mut driver, 3);
    assert_eq!(cpu.regs.pc, 0x0002);
    assert_eq!(cpu.regs.s, 0xFF);
    assert!(cpu.is_suspended());

    // The last three JSR cycles, then the LDA.
    run_for(&mut cpu, &mut mem, &mut driver, 5);
    assert_eq!(cpu.regs.pc, 0x4002);
    assert_eq!(cpu.regs.a, 0x77);
    assert_eq!(cpu.regs.s, 0xFD);
    assert_eq!((mem.get(0x01FF), mem.get(0x01FE)), (0x00, 0x02));
    assert_eq!(driver.cycle_count(), 8);
    assert!(cpu.is_instruction_complete());
}

#[test]
fn nmi_while_suspended_waits_for_the_instruction() {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0xAD, 0x00, 0x30]); // LDA $3000
    mem.set(0x3000, 0x99);
    mem.load(mos_6502::NMI_VECTOR, &[0x00, 0x50]);

    run_for(&mut cpu, &mut mem, &mut driver, 2);
    cpu.nmi();

    // The rest of the LDA, then the seven-cycle NMI sequence.
    run_for(&mut cpu, &mut mem, &mut driver, 2 + 7);
    assert_eq!(cpu.regs.a, 0x99);
    assert_eq!(cpu.regs.pc, 0x5000);
    assert_eq!((mem.get(0x01FF), mem.get(0x01FE)), (0x00, 0x03));
}

/// INX; JMP $0000, five cycles a loop, run in the given slices.
fn run_loop_in_slices(slices: &[u64]) -> (ClockedCpu, u64) {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0xE8, 0x4C, 0x00, 0x00]);
    for &ticks in slices {
        run_for(&mut cpu, &mut mem, &mut driver, ticks);
    }
    let cycles = driver.cycle_count();
    (cpu, cycles)
}

#[test]
fn split_budget_matches_single_budget() {
    let (whole, whole_cycles) = run_loop_in_slices(&[34]);
    // Six loops, INX, then two cycles into the JMP.
    assert_eq!(whole_cycles, 34);
    assert_eq!((whole.regs.x, whole.regs.pc), (7, 0x0003));
    assert!(whole.is_suspended());

    for slices in [&[20, 14][..], &[1; 34][..], &[3, 3, 7, 1, 20][..]] {
        let (split, split_cycles) = run_loop_in_slices(slices);
        assert_eq!(split_cycles, whole_cycles, "{slices:?}");
        assert_eq!(split.regs, whole.regs, "{slices:?}");
        assert_eq!(split.is_suspended(), whole.is_suspended(), "{slices:?}");
    }
}

#[test]
fn replayed_cycles_are_not_traced_twice() {
    use std::sync::{Arc, Mutex};

    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0x8D, 0x00, 0x30]); // STA $3000
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    cpu.set_trace(move |event: &BusEvent| sink.lock().unwrap().push(event.address));

    run_for(&mut cpu, &mut mem, &mut driver, 2);
    run_for(&mut cpu, &mut mem, &mut driver, 2);

    assert_eq!(*seen.lock().unwrap(), [0x0000, 0x0002, 0x0001, 0x3000]);
}

#[test]
fn processor_error_wakes_the_driver() {
    let mut mem = Memory::new();
    let (mut cpu, mut driver) = clocked();
    mem.load(0x0000, &[0xEA, 0x02]);

    let result = thread::scope(|s| {
        let processor = s.spawn(|| cpu.run(&mut mem));
        let mut ticks = 0;
        while driver.tick().is_ok() {
            ticks += 1;
        }
        (ticks, processor.join().unwrap())
    });

    assert_eq!(
        result,
        (3, Err(CpuError::UnsupportedOpcode { opcode: 0x02, pc: 0x0001 }))
    );
    assert!(driver.is_stopped());
}
