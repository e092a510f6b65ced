//! Machine configuration: model and ROM images.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use emu_core::MasterClock;

use crate::ConfigError;

pub const BASIC_ROM_SIZE: usize = 0x2000;
pub const KERNAL_ROM_SIZE: usize = 0x2000;
pub const CHAR_ROM_SIZE: usize = 0x1000;

/// C64 model variant. Only the processor clock differs here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum C64Model {
    /// 985,248 Hz.
    #[default]
    Pal,
    /// 1,022,727 Hz.
    Ntsc,
}

impl C64Model {
    #[must_use]
    pub const fn frequency_hz(self) -> u64 {
        match self {
            C64Model::Pal => 985_248,
            C64Model::Ntsc => 1_022_727,
        }
    }

    #[must_use]
    pub const fn clock(self) -> MasterClock {
        MasterClock::new(self.frequency_hz())
    }
}

/// Which ROM an error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RomKind {
    Basic,
    Kernal,
    Character,
}

impl RomKind {
    #[must_use]
    pub const fn expected_size(self) -> usize {
        match self {
            RomKind::Basic => BASIC_ROM_SIZE,
            RomKind::Kernal => KERNAL_ROM_SIZE,
            RomKind::Character => CHAR_ROM_SIZE,
        }
    }
}

impl fmt::Display for RomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RomKind::Basic => "BASIC",
            RomKind::Kernal => "KERNAL",
            RomKind::Character => "character",
        })
    }
}

/// The three ROM images, validated to their exact sizes.
#[derive(Clone)]
pub struct RomSet {
    pub(crate) basic: Box<[u8]>,
    pub(crate) kernal: Box<[u8]>,
    pub(crate) chargen: Box<[u8]>,
}

impl fmt::Debug for RomSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RomSet").finish_non_exhaustive()
    }
}

impl RomSet {
    /// Read and validate the three images from disk.
    pub fn load(basic: &Path, kernal: &Path, chargen: &Path) -> Result<Self, ConfigError> {
        Self::from_images(read(basic)?, read(kernal)?, read(chargen)?)
    }

    pub fn from_images(basic: Vec<u8>, kernal: Vec<u8>, chargen: Vec<u8>) -> Result<Self, ConfigError> {
        Ok(Self {
            basic: checked(RomKind::Basic, basic)?,
            kernal: checked(RomKind::Kernal, kernal)?,
            chargen: checked(RomKind::Character, chargen)?,
        })
    }

    /// Zero-filled images.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            basic: vec![0; BASIC_ROM_SIZE].into_boxed_slice(),
            kernal: vec![0; KERNAL_ROM_SIZE].into_boxed_slice(),
            chargen: vec![0; CHAR_ROM_SIZE].into_boxed_slice(),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io {
        path: PathBuf::from(path),
        source,
    })?;
    log::debug!("read {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

fn checked(rom: RomKind, image: Vec<u8>) -> Result<Box<[u8]>, ConfigError> {
    let expected = rom.expected_size();
    if image.len() == expected {
        Ok(image.into_boxed_slice())
    } else {
        Err(ConfigError::RomSize {
            rom,
            expected,
            actual: image.len(),
        })
    }
}

/// Everything needed to build a [`C64`](crate::C64).
#[derive(Debug, Clone)]
pub struct C64Config {
    pub model: C64Model,
    pub roms: RomSet,
}
