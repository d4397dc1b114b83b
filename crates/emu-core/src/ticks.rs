//! System-clock tick counts.

/// A count of system clock ticks.
///
/// Peripheral timers are advanced in these units. CPU cycles are plain
/// `u64` and are converted by the [`TimerManager`](crate::TimerManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ticks(u64);

impl Ticks {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(count: u64) -> Self {
        Self(count)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}
