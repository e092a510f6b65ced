//! C64 memory: 64K RAM with ROMs and I/O overlaid by the 6510 port.
//!
//! # Banking
//!
//! Bits 0-2 of `$0001` select what the processor sees in three windows:
//!
//! | HIRAM(1) | LORAM(0) | CHAREN(2) | $A000-$BFFF | $D000-$DFFF | $E000-$FFFF |
//! |----------|----------|-----------|-------------|-------------|-------------|
//! | 1        | 1        | 1         | BASIC       | I/O         | KERNAL      |
//! | 1        | 1        | 0         | BASIC       | Char ROM    | KERNAL      |
//! | 1        | 0        | 1 / 0     | RAM         | I/O / Char  | KERNAL      |
//! | 0        | 1        | 1 / 0     | RAM         | I/O / Char  | RAM         |
//! | 0        | 0        | x         | RAM         | RAM         | RAM         |
//!
//! ROMs are overlaid on reads only. Writes under a ROM land in RAM. The
//! I/O window is a separate 4K register area.

use emu_core::{Bus, Memory};
use mos_6502::BANK_CONTROL;

use crate::config::RomSet;

pub const LORAM: u8 = 0x01;
pub const HIRAM: u8 = 0x02;
pub const CHAREN: u8 = 0x04;

/// Power-on data direction register at `$0000`.
pub const DEFAULT_PORT_DDR: u8 = 0x2F;
/// Power-on port value at `$0001`: all ROMs and I/O visible.
pub const DEFAULT_PORT: u8 = 0x37;

const BASIC_START: u16 = 0xA000;
const BASIC_END: u16 = 0xBFFF;
const CHAR_START: u16 = 0xD000;
const CHAR_END: u16 = 0xDFFF;
const KERNAL_START: u16 = 0xE000;
const IO_SIZE: usize = 0x1000;

/// What the processor sees at `$D000-$DFFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharWindow {
    Ram,
    Io,
    CharRom,
}

/// The mapping selected by the port bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankState {
    pub basic: bool,
    pub kernal: bool,
    pub char_window: CharWindow,
}

impl BankState {
    /// Mapping for a port value. Only the low three bits matter.
    #[must_use]
    pub const fn from_port(port: u8) -> Self {
        let loram = port & LORAM != 0;
        let hiram = port & HIRAM != 0;
        let charen = port & CHAREN != 0;

        let char_window = if !loram && !hiram {
            CharWindow::Ram
        } else if charen {
            CharWindow::Io
        } else {
            CharWindow::CharRom
        };

        Self {
            basic: loram && hiram,
            kernal: hiram,
            char_window,
        }
    }
}

/// RAM, ROMs and the I/O area, as one processor bus.
#[derive(Debug, Clone)]
pub struct C64Memory {
    ram: Memory,
    roms: RomSet,
    io: Box<[u8; IO_SIZE]>,
    banks: BankState,
}

impl C64Memory {
    /// Zeroed RAM with the port at its power-on values.
    #[must_use]
    pub fn new(roms: RomSet) -> Self {
        let mut ram = Memory::new();
        ram.set(0x0000, DEFAULT_PORT_DDR);
        ram.set(BANK_CONTROL, DEFAULT_PORT);
        Self {
            ram,
            roms,
            io: Box::new([0; IO_SIZE]),
            banks: BankState::from_port(DEFAULT_PORT),
        }
    }

    #[must_use]
    pub fn banks(&self) -> BankState {
        self.banks
    }

    /// The RAM underneath every overlay.
    #[must_use]
    pub fn ram(&self) -> &Memory {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut Memory {
        &mut self.ram
    }

    /// The byte the processor would read at `address`.
    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        match address {
            BASIC_START..=BASIC_END if self.banks.basic => {
                self.roms.basic[usize::from(address - BASIC_START)]
            }
            CHAR_START..=CHAR_END => match self.banks.char_window {
                CharWindow::Ram => self.ram.get(address),
                CharWindow::Io => self.io[usize::from(address - CHAR_START)],
                CharWindow::CharRom => self.roms.chargen[usize::from(address - CHAR_START)],
            },
            KERNAL_START..=u16::MAX if self.banks.kernal => {
                self.roms.kernal[usize::from(address - KERNAL_START)]
            }
            _ => self.ram.get(address),
        }
    }

    /// The processor's view of the whole address space.
    #[must_use]
    pub fn visible(&self) -> Memory {
        let mut view = Memory::new();
        for address in 0..=u16::MAX {
            view.set(address, self.peek(address));
        }
        view
    }

    /// Hex dump of `[start, end)` as the processor sees it.
    #[must_use]
    pub fn dump(&self, start: u16, end: u32) -> String {
        self.visible().dump(start, end)
    }
}

impl Bus for C64Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.peek(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        if self.banks.char_window == CharWindow::Io && (CHAR_START..=CHAR_END).contains(&address) {
            self.io[usize::from(address - CHAR_START)] = value;
        } else {
            self.ram.set(address, value);
        }
    }

    fn refresh_banks(&mut self) {
        let banks = BankState::from_port(self.ram.get(BANK_CONTROL));
        if banks != self.banks {
            log::debug!(
                "bank switch: port=${:02X} basic={} kernal={} $D000={:?}",
                self.ram.get(BANK_CONTROL),
                banks.basic,
                banks.kernal,
                banks.char_window
            );
            self.banks = banks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_memory() -> C64Memory {
        let roms = RomSet::from_images(vec![0xBB; 8192], vec![0xEE; 8192], vec![0xCC; 4096])
            .unwrap();
        C64Memory::new(roms)
    }

    fn set_port(mem: &mut C64Memory, port: u8) {
        mem.write(BANK_CONTROL, port);
        mem.refresh_banks();
    }

    #[test]
    fn default_banking_sees_roms_and_io() {
        let mut mem = make_memory();
        assert_eq!(mem.read(0xA000), 0xBB);
        assert_eq!(mem.read(0xBFFF), 0xBB);
        assert_eq!(mem.read(0xC000), 0x00);
        assert_eq!(mem.read(0xE000), 0xEE);
        assert_eq!(mem.read(0xFFFF), 0xEE);
        assert_eq!(mem.banks().char_window, CharWindow::Io);
        assert_eq!(mem.read(0x0000), DEFAULT_PORT_DDR);
        assert_eq!(mem.read(0x0001), DEFAULT_PORT);
    }

    #[test]
    fn writes_under_rom_go_to_ram() {
        let mut mem = make_memory();
        mem.write(0xA000, 0x42);
        mem.write(0xE000, 0x43);
        assert_eq!(mem.read(0xA000), 0xBB);
        assert_eq!(mem.read(0xE000), 0xEE);

        set_port(&mut mem, 0x30);
        assert_eq!(mem.read(0xA000), 0x42);
        assert_eq!(mem.read(0xE000), 0x43);
    }

    #[test]
    fn all_ram_banking() {
        let mut mem = make_memory();
        set_port(&mut mem, 0x30);
        assert_eq!(mem.read(0xA000), 0x00);
        assert_eq!(mem.read(0xD000), 0x00);
        assert_eq!(mem.read(0xE000), 0x00);
        assert_eq!(mem.banks().char_window, CharWindow::Ram);
    }

    #[test]
    fn char_rom_visible_when_charen_clear() {
        let mut mem = make_memory();
        set_port(&mut mem, 0x33);
        assert_eq!(mem.read(0xD000), 0xCC);
        assert_eq!(mem.read(0xDFFF), 0xCC);
        assert_eq!(mem.read(0xA000), 0xBB);
    }

    #[test]
    fn io_area_is_separate_from_ram() {
        let mut mem = make_memory();
        mem.write(0xD020, 0x0E);
        assert_eq!(mem.read(0xD020), 0x0E);
        assert_eq!(mem.ram().get(0xD020), 0x00);

        set_port(&mut mem, 0x30);
        assert_eq!(mem.read(0xD020), 0x00);
        mem.write(0xD020, 0x01);

        set_port(&mut mem, 0x37);
        assert_eq!(mem.read(0xD020), 0x0E);
    }

    #[test]
    fn mapping_table() {
        // (port, basic, kernal, $D000)
        let table = [
            (0b111, true, true, CharWindow::Io),
            (0b011, true, true, CharWindow::CharRom),
            (0b110, false, true, CharWindow::Io),
            (0b010, false, true, CharWindow::CharRom),
            (0b101, false, false, CharWindow::Io),
            (0b001, false, false, CharWindow::CharRom),
            (0b100, false, false, CharWindow::Ram),
            (0b000, false, false, CharWindow::Ram),
        ];
        for (port, basic, kernal, char_window) in table {
            assert_eq!(
                BankState::from_port(port | 0xF8),
                BankState {
                    basic,
                    kernal,
                    char_window
                },
                "port {port:03b}"
            );
        }
    }

    #[test]
    fn banks_only_change_on_refresh() {
        let mut mem = make_memory();
        mem.write(BANK_CONTROL, 0x30);
        assert_eq!(mem.read(0xE000), 0xEE);
        mem.refresh_banks();
        assert_eq!(mem.read(0xE000), 0x00);
    }

    #[test]
    fn dump_shows_the_visible_bytes() {
        let mem = make_memory();
        let dump = mem.dump(0xE000, 0xE010);
        assert!(dump.starts_with("0xe000 ee ee"));
    }
}
