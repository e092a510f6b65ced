use std::io;
use std::path::PathBuf;

use mos_6502::CpuError;

use crate::config::RomKind;

/// A problem with the machine configuration. Always fatal before the first
/// cycle.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{rom} ROM is {actual} bytes, expected {expected}")]
    RomSize {
        rom: RomKind,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum C64Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error("processor thread panicked")]
    ProcessorPanicked,
}
