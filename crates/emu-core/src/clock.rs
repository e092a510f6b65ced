//! Master clock configuration.

use std::time::Duration;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Master clock configuration for a system.
///
/// The driver thread paces the processor against this frequency: one tick
/// of the clock is one bus cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Cycle frequency in Hz (e.g., `985_248` for a PAL C64).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Wall-clock time that `cycles` cycles take on the real machine.
    #[must_use]
    pub fn duration_of(&self, cycles: u64) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(cycles) * NANOS_PER_SECOND / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Length of a single cycle.
    #[must_use]
    pub fn cycle_duration(&self) -> Duration {
        self.duration_of(1)
    }
}
