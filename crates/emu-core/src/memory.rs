//! Flat 64K address space.

use std::fmt::Write as _;

use crate::Bus;

/// Size of the 16-bit address space.
pub const ADDRESS_SPACE: usize = 0x10000;

const BYTES_PER_ROW: usize = 16;

/// A flat 64 KiB byte store.
///
/// Every index is a `u16`, so there is no out-of-range address: offsets that
/// run past `$FFFF` wrap to `$0000`. No cycle accounting happens here.
#[derive(Clone)]
pub struct Memory {
    bytes: Box<[u8; ADDRESS_SPACE]>,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Memory").finish_non_exhaustive()
    }
}

impl Memory {
    /// Zero-filled memory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; ADDRESS_SPACE]),
        }
    }

    #[must_use]
    pub fn get(&self, address: u16) -> u8 {
        self.bytes[address as usize]
    }

    pub fn set(&mut self, address: u16, value: u8) {
        self.bytes[address as usize] = value;
    }

    /// Copy `data` into memory starting at `offset`, wrapping at `$FFFF`.
    pub fn copy_to(&mut self, offset: u16, data: &[u8]) {
        let mut address = offset;
        for &byte in data {
            self.set(address, byte);
            address = address.wrapping_add(1);
        }
    }

    /// Same as [`copy_to`](Self::copy_to); reads better at load sites.
    pub fn load(&mut self, offset: u16, data: &[u8]) {
        self.copy_to(offset, data);
    }

    /// Hex and ASCII dump of `[start, end)`.
    ///
    /// Rows are 16 bytes wide and start on a 16-byte boundary, so the first
    /// row may begin before `start`. Bytes outside printable ASCII show as `.`.
    #[must_use]
    pub fn dump(&self, start: u16, end: u32) -> String {
        let end = (end as usize).min(ADDRESS_SPACE);
        let mut out = String::new();
        let mut row = start as usize - (start as usize % BYTES_PER_ROW);

        while row < end {
            let bytes = &self.bytes[row..row + BYTES_PER_ROW];
            let hex: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            let text: String = bytes
                .iter()
                .map(|&b| {
                    if b.is_ascii_graphic() || b == b' ' {
                        b as char
                    } else {
                        '.'
                    }
                })
                .collect();
            let _ = writeln!(out, "0x{row:04x} {} {text}", hex.join(" "));
            row += BYTES_PER_ROW;
        }

        out
    }

    /// The whole address space as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes[..]
    }
}

impl Bus for Memory {
    fn read(&mut self, address: u16) -> u8 {
        self.get(address)
    }

    fn write(&mut self, address: u16, value: u8) {
        self.set(address, value);
    }
}
