//! Programmer-visible register file.

use std::fmt;

use crate::Status;

/// Base of the hardware stack page.
pub const STACK_PAGE: u16 = 0x0100;

/// The 6502 register set.
///
/// `s` is an offset into page 1 and wraps modulo 256 in both directions.
/// The program counter is one `u16`, so its high and low byte views can
/// never disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub pc: u16,
    pub s: u8,
    pub p: Status,
    pub a: u8,
    pub x: u8,
    pub y: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Power-on state: `s = $FF`, everything else zero apart from the
    /// unused status bit.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pc: 0,
            s: 0xFF,
            p: Status::new(),
            a: 0,
            x: 0,
            y: 0,
        }
    }

    #[must_use]
    pub const fn pch(&self) -> u8 {
        (self.pc >> 8) as u8
    }

    #[must_use]
    pub const fn pcl(&self) -> u8 {
        self.pc as u8
    }

    pub fn set_pch(&mut self, value: u8) {
        self.pc = (u16::from(value) << 8) | u16::from(self.pcl());
    }

    pub fn set_pcl(&mut self, value: u8) {
        self.pc = (self.pc & 0xFF00) | u16::from(value);
    }

    pub fn set_status_bit(&mut self, flag: u8, is_set: bool) {
        self.p.set_if(flag, is_set);
    }

    /// Address for a push. S is decremented after.
    pub fn push(&mut self) -> u16 {
        let addr = self.stack_addr();
        self.s = self.s.wrapping_sub(1);
        addr
    }

    /// Address for a pop. S is incremented before.
    pub fn pop(&mut self) -> u16 {
        self.s = self.s.wrapping_add(1);
        self.stack_addr()
    }

    /// Stack address S currently points at.
    #[must_use]
    pub const fn stack_addr(&self) -> u16 {
        STACK_PAGE | (self.s as u16)
    }

    /// Register dump, one register per line after the PC line.
    #[must_use]
    pub fn dump(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Registers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "PC: 0x{:04x}\tPCL: 0x{:02x}\tPCH: 0x{:02x}",
            self.pc,
            self.pcl(),
            self.pch()
        )?;
        writeln!(f, "S: 0x{:02x}", self.s)?;
        writeln!(f, "P: 0x{:02x}", self.p.to_byte())?;
        writeln!(f, "A: 0x{:02x}", self.a)?;
        writeln!(f, "X: 0x{:02x}", self.x)?;
        writeln!(f, "Y: 0x{:02x}", self.y)
    }
}
