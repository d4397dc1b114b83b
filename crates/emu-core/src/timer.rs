//! System-clock timers and the CPU-to-system clock bridge.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use log::Level;

use crate::{Diagnostics, InterruptState, MasterClock, Ticks, diag};

/// A device that counts system clock ticks.
pub trait Timer {
    /// Registration key. Registering a second timer with the same name
    /// replaces the first.
    fn name(&self) -> &str;

    /// Advance by `ticks` system ticks and report the interrupt lines the
    /// device is asserting afterwards.
    fn system_tick(&mut self, ticks: Ticks) -> InterruptState;

    /// How many system ticks may pass before this timer must be ticked
    /// again. `None` means the timer has no deadline.
    fn available_system_ticks(&self) -> Option<Ticks>;
}

/// A timer shared between its owning device and the [`TimerManager`].
pub type SharedTimer = Rc<RefCell<dyn Timer>>;

/// Owns the system-clock timers and converts CPU cycles into system ticks.
///
/// CPU cycles that do not make up a whole system tick are carried over to
/// the next call, so the remainder is always below the clock ratio.
pub struct TimerManager {
    timers: BTreeMap<String, SharedTimer>,
    clock_ratio: u64,
    remainder: u64,
    diagnostics: Diagnostics,
}

impl TimerManager {
    /// Bridge `cpu_clock` to the slower `system_clock`. A ratio that does not
    /// come out to at least one falls back to 1:1.
    #[must_use]
    pub fn new(cpu_clock: MasterClock, system_clock: MasterClock, diagnostics: Diagnostics) -> Self {
        let clock_ratio = cpu_clock.ratio_to(system_clock).unwrap_or_else(|| {
            diag!(
                diagnostics,
                Level::Warn,
                "bbc::timer",
                "CPU clock {} Hz is not a multiple of system clock {} Hz, running 1:1",
                cpu_clock.frequency_hz,
                system_clock.frequency_hz
            );
            1
        });
        Self::with_ratio(clock_ratio, diagnostics)
    }

    #[must_use]
    pub fn with_ratio(clock_ratio: u64, diagnostics: Diagnostics) -> Self {
        Self {
            timers: BTreeMap::new(),
            clock_ratio: clock_ratio.max(1),
            remainder: 0,
            diagnostics,
        }
    }

    /// Register `timer` under its name. Returns the timer it replaced, if any.
    pub fn register_timer(&mut self, timer: SharedTimer) -> Option<SharedTimer> {
        let name = timer.borrow().name().to_owned();
        diag!(self.diagnostics, Level::Debug, "bbc::timer", "registered timer {name}");
        let replaced = self.timers.insert(name, timer);
        if let Some(old) = &replaced {
            diag!(
                self.diagnostics,
                Level::Warn,
                "bbc::timer",
                "timer {} replaced an earlier registration",
                old.borrow().name()
            );
        }
        replaced
    }

    #[must_use]
    pub fn timer(&self, name: &str) -> Option<SharedTimer> {
        self.timers.get(name).cloned()
    }

    pub fn timer_names(&self) -> impl Iterator<Item = &str> {
        self.timers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn clock_ratio(&self) -> u64 {
        self.clock_ratio
    }

    /// CPU cycles carried over from the last [`cpu_tick`](Self::cpu_tick).
    #[must_use]
    pub fn remainder(&self) -> u64 {
        self.remainder
    }

    /// Account for `cpu_cycles` executed by the CPU.
    ///
    /// Every timer sees the same number of whole system ticks. Timers are
    /// only called when at least one whole tick has elapsed.
    pub fn cpu_tick(&mut self, cpu_cycles: u64) -> InterruptState {
        let total = cpu_cycles + self.remainder;
        let ticks = total / self.clock_ratio;
        self.remainder = total % self.clock_ratio;

        if ticks == 0 || self.timers.is_empty() {
            return InterruptState::NONE;
        }
        self.timers
            .values()
            .map(|timer| timer.borrow_mut().system_tick(Ticks::new(ticks)))
            .sum()
    }

    /// CPU cycles that can run before the nearest timer deadline, or `None`
    /// when no timer has one.
    #[must_use]
    pub fn available_cpu_ticks(&self) -> Option<u64> {
        self.timers
            .values()
            .filter_map(|timer| timer.borrow().available_system_ticks())
            .min()
            .map(|ticks| ticks.get() * self.clock_ratio)
    }
}
