//! Holding the emulation to wall-clock time.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use emu_core::{Diagnostics, diag};
use log::Level;

const FRAME_LOG_TARGET: &str = "bbc::frame";
const SPEED_LOG_TARGET: &str = "bbc::speed";

/// Frames remembered by [`FrameDelayCalculator`]. The oldest only supplies
/// the start of the measured period.
const FRAME_HISTORY: usize = 6;

/// Wall-clock timestamps around one repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub before_repaint: Instant,
    pub after_repaint: Instant,
    pub after_wait: Instant,
}

/// Works out how long to wait so that the last few frames average out at
/// the target rate.
#[derive(Debug, Clone, Default)]
pub struct FrameDelayCalculator {
    history: VecDeque<FrameTiming>,
}

impl FrameDelayCalculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, timing: FrameTiming) {
        self.history.push_back(timing);
        if self.history.len() > FRAME_HISTORY {
            self.history.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Delay before the next frame, or `None` until two frames are known.
    ///
    /// The target is five frame periods measured from the end of the
    /// oldest remembered repaint.
    #[must_use]
    pub fn next_delay(&self, frames_per_second: u32, now: Instant) -> Option<Duration> {
        if self.history.len() < 2 || frames_per_second == 0 {
            return None;
        }
        let oldest = self.history.front()?;
        let target = Duration::from_secs(1) / frames_per_second * (FRAME_HISTORY as u32 - 1);
        let taken = now.saturating_duration_since(oldest.after_repaint);
        Some(target.saturating_sub(taken))
    }
}

/// Sleeps after each frame to hold a frame rate.
#[derive(Debug, Clone)]
pub struct FramePacer {
    frames_per_second: u32,
    calculator: FrameDelayCalculator,
    previous_delay: Duration,
    diagnostics: Diagnostics,
}

impl FramePacer {
    #[must_use]
    pub fn new(frames_per_second: u32, diagnostics: Diagnostics) -> Self {
        Self {
            frames_per_second,
            calculator: FrameDelayCalculator::new(),
            previous_delay: Duration::ZERO,
            diagnostics,
        }
    }

    /// How long to sleep at `now`. A delay longer than the previous one is
    /// halved so a single slow frame does not stall the next.
    pub fn plan(&mut self, now: Instant) -> Duration {
        let Some(asked) = self.calculator.next_delay(self.frames_per_second, now) else {
            return Duration::ZERO;
        };
        let actual = if self.previous_delay < asked { asked / 2 } else { asked };
        self.previous_delay = asked;
        diag!(
            self.diagnostics,
            Level::Debug,
            FRAME_LOG_TARGET,
            "sleeping {actual:?} (asked for {asked:?})"
        );
        actual
    }

    /// Sleep as planned and record the frame that ended at `repainted_at`.
    pub fn frame_completed(&mut self, repainted_at: Instant) {
        let delay = self.plan(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.record(FrameTiming {
            before_repaint: repainted_at,
            after_repaint: repainted_at,
            after_wait: Instant::now(),
        });
    }

    pub fn record(&mut self, timing: FrameTiming) {
        self.calculator.add(timing);
    }
}

/// Counts work per wall-clock second and logs the total when the second
/// rolls over.
pub struct SpeedReporter {
    name: String,
    clock: Box<dyn Fn() -> u64 + Send>,
    current_second: u64,
    counter: u64,
    diagnostics: Diagnostics,
}

impl SpeedReporter {
    /// Reporter on the system clock.
    #[must_use]
    pub fn new(name: impl Into<String>, diagnostics: Diagnostics) -> Self {
        Self::with_clock(name, diagnostics, Box::new(unix_second))
    }

    /// Reporter whose notion of the current second comes from `clock`.
    #[must_use]
    pub fn with_clock(
        name: impl Into<String>,
        diagnostics: Diagnostics,
        clock: Box<dyn Fn() -> u64 + Send>,
    ) -> Self {
        let current_second = clock();
        Self {
            name: name.into(),
            clock,
            current_second,
            counter: 0,
            diagnostics,
        }
    }

    /// Add `amount`. Returns the previous second's total when a new second
    /// has started.
    pub fn increment(&mut self, amount: u64) -> Option<u64> {
        let now = (self.clock)();
        if now == self.current_second {
            self.counter += amount;
            return None;
        }
        let finished = std::mem::replace(&mut self.counter, amount);
        self.current_second = now;
        diag!(
            self.diagnostics,
            Level::Info,
            SPEED_LOG_TARGET,
            "{} performed {finished} in the previous second",
            self.name
        );
        Some(finished)
    }
}

fn unix_second() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}
