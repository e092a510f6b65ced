//! Memory and I/O bus interface.

/// Memory and I/O bus interface.
///
/// A processor reaches memory and bank-switched ROM through this trait. The
/// bus does no cycle accounting of its own: a read or write here is the raw
/// access, and the processor decides whether it counts as a bus cycle.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u16) -> u8;

    /// Write a byte to the given address.
    fn write(&mut self, address: u16, value: u8);

    /// Re-evaluate the memory mapping after the bank-control byte changed.
    ///
    /// Called by the processor after every write to its I/O port. Buses
    /// without banking keep the default no-op.
    fn refresh_banks(&mut self) {}
}
