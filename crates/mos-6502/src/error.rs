use emu_core::Halted;

/// Why the processor stopped stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CpuError {
    /// The opcode fetched at `pc` has no handler.
    #[error("unsupported opcode ${opcode:02X} at ${pc:04X}")]
    UnsupportedOpcode { opcode: u8, pc: u16 },

    /// The clock driver stopped the cycle lock.
    #[error(transparent)]
    Halted(#[from] Halted),
}
