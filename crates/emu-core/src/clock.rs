//! Clock rates.

use crate::Ticks;

/// A fixed-frequency clock.
///
/// A machine has a CPU clock and a slower system clock that drives its
/// peripherals. The two are related by an integer ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasterClock {
    /// Frequency in Hz (e.g. `2_000_000` for the BBC Micro CPU).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Ticks per frame at the given frame rate (integer division).
    #[must_use]
    pub const fn ticks_per_frame(&self, frames_per_second: u64) -> Ticks {
        match self.frequency_hz.checked_div(frames_per_second) {
            Some(ticks) => Ticks::new(ticks),
            None => Ticks::ZERO,
        }
    }

    /// How many of this clock's ticks make one tick of `slower`.
    ///
    /// `None` when `slower` is stopped or not actually slower.
    #[must_use]
    pub const fn ratio_to(&self, slower: MasterClock) -> Option<u64> {
        match self.frequency_hz.checked_div(slower.frequency_hz) {
            Some(0) | None => None,
            Some(ratio) => Some(ratio),
        }
    }
}
