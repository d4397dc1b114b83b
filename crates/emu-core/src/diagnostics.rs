//! Per-component log verbosity.
//!
//! Components receive a [`Diagnostics`] when they are built and log through
//! [`diag!`](crate::diag). Nothing consults a process-wide flag: two
//! machines in one process can run with different levels, and the `log`
//! facade still decides where messages finally go.

use log::{Level, LevelFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostics {
    level: LevelFilter,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(LevelFilter::Warn)
    }
}

impl Diagnostics {
    /// Nothing is logged.
    pub const QUIET: Self = Self::new(LevelFilter::Off);

    #[must_use]
    pub const fn new(level: LevelFilter) -> Self {
        Self { level }
    }

    #[must_use]
    pub const fn level(self) -> LevelFilter {
        self.level
    }

    #[must_use]
    pub fn enabled(self, level: Level) -> bool {
        level <= self.level
    }
}

/// Log through the `log` facade if the component's [`Diagnostics`] allow it.
///
/// ```
/// use emu_core::{Diagnostics, diag};
/// use log::Level;
///
/// let diagnostics = Diagnostics::default();
/// diag!(diagnostics, Level::Warn, "bbc::memory", "ignored write to {:#06X}", 0xFE08);
/// ```
#[macro_export]
macro_rules! diag {
    ($diagnostics:expr, $level:expr, $target:expr, $($arg:tt)+) => {{
        let level = $level;
        if $diagnostics.enabled(level) {
            $crate::__log::log!(target: $target, level, $($arg)+);
        }
    }};
}
