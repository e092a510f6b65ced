//! The processor: register file, execution state and its cycle lock.

use std::fmt;

use emu_core::{AlwaysOpen, Bus, CycleLock, Observable, Value};

use crate::access::{BusEvent, BusPort};
use crate::flags::{B, C, D, I, N, V, Z};
use crate::{CpuError, Registers};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    /// Reset sequence pending.
    Reset,
    /// Next step fetches an opcode (or services an interrupt).
    Fetch,
    /// Opcode fetched; next step runs the rest of the instruction.
    Execute(u8),
}

/// A 6502/6510 processor.
///
/// Every bus access the processor makes takes one cycle through `L`.
/// With [`AlwaysOpen`] it free-runs; with a
/// [`ProcessorLock`](emu_core::ProcessorLock) each cycle waits for the
/// clock driver.
pub struct Mos6502<L: CycleLock = AlwaysOpen> {
    pub regs: Registers,
    pub(crate) state: State,
    pub(crate) lock: L,
    pub(crate) port: BusPort,
    /// Registers at the start of the current instruction.
    checkpoint: Registers,
    /// How the current instruction started.
    entry: Entry,
    /// Accounted cycles since the checkpoint.
    pub(crate) progress: u32,
    /// Accounted cycles still to repeat without the lock.
    pub(crate) replay: u32,
    /// Cycles done by an instruction the lock halted part way through.
    suspended: Option<u32>,
    nmi_pending: bool,
    irq_pending: bool,
}

/// What a Fetch step starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Opcode,
    Nmi,
    Irq,
}

impl Default for Mos6502<AlwaysOpen> {
    fn default() -> Self {
        Self::new()
    }
}

impl Mos6502<AlwaysOpen> {
    /// A free-running processor.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lock(AlwaysOpen::new())
    }
}

impl<L: CycleLock> Mos6502<L> {
    /// A processor at power-on: in Fetch, `pc = 0`, `s = $FF`.
    pub fn with_lock(lock: L) -> Self {
        Self {
            regs: Registers::new(),
            state: State::Fetch,
            lock,
            port: BusPort::default(),
            checkpoint: Registers::new(),
            entry: Entry::Opcode,
            progress: 0,
            replay: 0,
            suspended: None,
            nmi_pending: false,
            irq_pending: false,
        }
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// True between instructions.
    #[must_use]
    pub fn is_instruction_complete(&self) -> bool {
        self.state == State::Fetch && self.suspended.is_none()
    }

    /// True when the lock halted part way through an instruction.
    #[must_use]
    pub fn is_suspended(&self) -> bool {
        self.suspended.is_some()
    }

    /// Arm the reset sequence. It runs on the next [`step`](Self::step)
    /// and discards any suspended instruction.
    pub fn reset(&mut self) {
        self.state = State::Reset;
        self.suspended = None;
        self.replay = 0;
        self.nmi_pending = false;
        self.irq_pending = false;
    }

    /// Signal a non-maskable interrupt, serviced before the next opcode.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Request an IRQ. Returns false, and drops the request, while the
    /// I flag masks it.
    pub fn interrupt(&mut self) -> bool {
        if self.regs.p.is_set(I) {
            return false;
        }
        self.irq_pending = true;
        true
    }

    /// Observe every raw bus access.
    pub fn set_trace(&mut self, hook: impl FnMut(&BusEvent) + Send + 'static) {
        self.port.set_trace(Box::new(hook));
    }

    pub fn clear_trace(&mut self) {
        self.port.clear_trace();
    }

    /// Advance one engine state: a reset or interrupt sequence, an opcode
    /// fetch, or the rest of an instruction.
    ///
    /// If the lock halts part way through an instruction, the registers
    /// keep the progress made so far and the instruction is suspended. The
    /// next step restores the registers from the start of the instruction
    /// and repeats the cycles already done without the lock or the trace
    /// hook, so a run split by halts takes the same cycles as one unbroken
    /// run. Any other error rolls the registers back to the start of the
    /// instruction.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        let resumed = self.suspended.take().map(|done| {
            self.regs = self.checkpoint;
            self.replay = done;
            self.entry
        });

        let result = match self.state {
            State::Reset => {
                self.begin_instruction();
                self.reset_sequence(bus)
            }
            State::Fetch => {
                self.begin_instruction();
                self.fetch(bus, resumed)
            }
            State::Execute(opcode) => {
                self.state = State::Fetch;
                self.execute(bus, opcode)
            }
        };

        if let Err(err) = result {
            if matches!(err, CpuError::Halted(_)) && self.progress > 0 {
                self.suspended = Some(self.progress);
            } else {
                self.regs = self.checkpoint;
                self.unpick_entry();
            }
            self.replay = 0;
            if self.state != State::Reset {
                self.state = State::Fetch;
            }
        }
        result
    }

    /// Put back an interrupt request taken by a Fetch step that never
    /// got its first cycle.
    fn unpick_entry(&mut self) {
        if self.progress == 0 && self.state == State::Fetch {
            match std::mem::replace(&mut self.entry, Entry::Opcode) {
                Entry::Nmi => self.nmi_pending = true,
                Entry::Irq => self.irq_pending = true,
                Entry::Opcode => {}
            }
        }
    }

    fn begin_instruction(&mut self) {
        self.checkpoint = self.regs;
        self.progress = 0;
    }

    /// Step until the lock halts or an instruction fails.
    ///
    /// A halt is the normal way to stop and returns `Ok`. Any other error
    /// halts the lock, so a waiting driver wakes up, and is returned.
    pub fn run<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        log::info!("processor running from ${:04X}", self.regs.pc);
        loop {
            match self.step(bus) {
                Ok(()) => {}
                Err(CpuError::Halted(_)) => {
                    log::info!(
                        "processor halted at ${:04X} after {} cycles",
                        self.regs.pc,
                        self.lock.cycle_count()
                    );
                    return Ok(());
                }
                Err(err) => {
                    log::error!("processor stopped: {err}");
                    self.lock.halt();
                    return Err(err);
                }
            }
        }
    }

    /// Service a pending interrupt or fetch the next opcode. A resumed
    /// instruction starts the way it did before it was suspended.
    fn fetch<B: Bus>(&mut self, bus: &mut B, resumed: Option<Entry>) -> Result<(), CpuError> {
        self.entry = match resumed {
            Some(entry) => entry,
            None => self.next_entry(),
        };
        match self.entry {
            Entry::Nmi => self.interrupt_sequence(bus, NMI_VECTOR),
            Entry::Irq => self.interrupt_sequence(bus, IRQ_VECTOR),
            Entry::Opcode => {
                let opcode = self.next_code_byte(bus)?;
                self.state = State::Execute(opcode);
                Ok(())
            }
        }
    }

    /// NMI first, then an unmasked IRQ. A masked IRQ is dropped.
    fn next_entry(&mut self) -> Entry {
        if std::mem::take(&mut self.nmi_pending) {
            Entry::Nmi
        } else if std::mem::take(&mut self.irq_pending) && !self.regs.p.is_set(I) {
            Entry::Irq
        } else {
            Entry::Opcode
        }
    }

    /// Seven cycles: two idle reads, three stack reads while S drops by
    /// three, then the reset vector.
    fn reset_sequence<B: Bus>(&mut self, bus: &mut B) -> Result<(), CpuError> {
        self.dummy_read(bus, self.regs.pc)?;
        self.dummy_read(bus, self.regs.pc)?;
        for _ in 0..3 {
            self.dummy_read(bus, self.regs.stack_addr())?;
            self.regs.s = self.regs.s.wrapping_sub(1);
        }
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, RESET_VECTOR + 1, RESET_VECTOR)?;
        self.state = State::Fetch;
        log::debug!("reset: pc=${:04X}", self.regs.pc);
        Ok(())
    }

    /// Seven cycles: two idle reads, push PC and P (B clear), vector.
    fn interrupt_sequence<B: Bus>(&mut self, bus: &mut B, vector: u16) -> Result<(), CpuError> {
        self.dummy_read(bus, self.regs.pc)?;
        self.dummy_read(bus, self.regs.pc)?;
        self.push(bus, self.regs.pch(), true)?;
        self.push(bus, self.regs.pcl(), true)?;
        self.push(bus, self.regs.p.to_byte_irq(), true)?;
        self.regs.p.set(I);
        self.regs.pc = self.read_word(bus, vector + 1, vector)?;
        Ok(())
    }
}

impl<L: CycleLock> fmt::Debug for Mos6502<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mos6502")
            .field("regs", &self.regs)
            .field("state", &self.state)
            .field("suspended", &self.suspended)
            .field("cycles", &self.lock.cycle_count())
            .field("tracing", &self.port.is_tracing())
            .finish_non_exhaustive()
    }
}

impl<L: CycleLock> Observable for Mos6502<L> {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" => Some(self.regs.s.into()),
            "p" => Some(self.regs.p.to_byte().into()),
            "flags.c" => Some(self.regs.p.is_set(C).into()),
            "flags.z" => Some(self.regs.p.is_set(Z).into()),
            "flags.i" => Some(self.regs.p.is_set(I).into()),
            "flags.d" => Some(self.regs.p.is_set(D).into()),
            "flags.b" => Some(self.regs.p.is_set(B).into()),
            "flags.v" => Some(self.regs.p.is_set(V).into()),
            "flags.n" => Some(self.regs.p.is_set(N).into()),
            "cycles" => Some(self.lock.cycle_count().into()),
            "state" => Some(
                match self.state {
                    State::Reset => "reset",
                    State::Fetch if self.suspended.is_some() => "suspended",
                    State::Fetch => "fetch",
                    State::Execute(_) => "execute",
                }
                .into(),
            ),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc", "a", "x", "y", "s", "p", "flags.c", "flags.z", "flags.i", "flags.d", "flags.b",
            "flags.v", "flags.n", "cycles", "state",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::Memory;

    #[test]
    fn lda_immediate_takes_two_steps_and_two_cycles() {
        let mut cpu = Mos6502::new();
        let mut mem = Memory::new();
        mem.load(0x0000, &[0xA9, 0x42]);

        cpu.step(&mut mem).unwrap();
        assert_eq!(cpu.query("state"), Some(Value::from("execute")));
        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.a, 0x42);
        assert_eq!(cpu.regs.pc, 0x0002);
        assert_eq!(cpu.lock().cycle_count(), 2);
        assert!(cpu.is_instruction_complete());
    }

    #[test]
    fn reset_loads_the_vector_in_seven_cycles() {
        let mut cpu = Mos6502::new();
        let mut mem = Memory::new();
        mem.load(RESET_VECTOR, &[0x00, 0xE0]);

        cpu.reset();
        assert_eq!(cpu.query("state"), Some(Value::from("reset")));
        cpu.step(&mut mem).unwrap();

        assert_eq!(cpu.regs.pc, 0xE000);
        assert_eq!(cpu.regs.s, 0xFC);
        assert!(cpu.regs.p.is_set(I));
        assert_eq!(cpu.lock().cycle_count(), 7);
        assert_eq!(mem.get(0x01FF), 0, "reset must not write the stack");
    }

    #[test]
    fn undocumented_opcode_is_reported() {
        let mut cpu = Mos6502::new();
        let mut mem = Memory::new();
        mem.load(0x0400, &[0x02]);
        cpu.regs.pc = 0x0400;

        cpu.step(&mut mem).unwrap();
        assert_eq!(
            cpu.step(&mut mem),
            Err(CpuError::UnsupportedOpcode {
                opcode: 0x02,
                pc: 0x0400
            })
        );
        assert_eq!(
            cpu.run(&mut mem),
            Err(CpuError::UnsupportedOpcode {
                opcode: 0x02,
                pc: 0x0400
            }),
            "pc is left on the failing opcode"
        );
        assert_eq!(cpu.regs.pc, 0x0400);
    }

    #[test]
    fn masked_irq_is_refused() {
        let mut cpu = Mos6502::new();
        cpu.regs.p.set(I);
        assert!(!cpu.interrupt());
        cpu.regs.p.clear(I);
        assert!(cpu.interrupt());
    }

    #[test]
    fn query_paths_all_answer() {
        let cpu = Mos6502::new();
        for path in cpu.query_paths() {
            assert!(cpu.query(path).is_some(), "{path}");
        }
        assert_eq!(cpu.query("nope"), None);
    }
}
