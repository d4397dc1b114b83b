//! Frame boundaries on the system clock.

use emu_core::{Diagnostics, InterruptState, MasterClock, Ticks, Timer, diag};
use log::Level;

pub const FRAME_TIMER_NAME: &str = "frame";

const LOG_TARGET: &str = "bbc::frame";

/// Called once per emulated frame.
pub type RepaintHook = Box<dyn FnMut()>;

/// Counts down one frame's worth of system ticks and calls the repaint hook
/// each time the count runs out.
///
/// The deadline is reported through [`Timer::available_system_ticks`], so
/// the processor never runs a batch past the end of a frame. Pacing against
/// wall-clock time is left to the run loop.
pub struct FrameTimer {
    ticks_per_frame: u64,
    countdown: i64,
    repaint: RepaintHook,
    frames: u64,
    frame_pending: bool,
    diagnostics: Diagnostics,
}

impl FrameTimer {
    #[must_use]
    pub fn new(
        system_clock: MasterClock,
        frames_per_second: u32,
        repaint: RepaintHook,
        diagnostics: Diagnostics,
    ) -> Self {
        let ticks_per_frame = system_clock
            .ticks_per_frame(u64::from(frames_per_second))
            .get()
            .max(1);
        Self {
            ticks_per_frame,
            countdown: ticks_per_frame as i64,
            repaint,
            frames: 0,
            frame_pending: false,
            diagnostics,
        }
    }

    #[must_use]
    pub fn ticks_per_frame(&self) -> u64 {
        self.ticks_per_frame
    }

    /// Frames completed since power-on.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// True once after each completed frame.
    pub fn take_frame_completed(&mut self) -> bool {
        std::mem::take(&mut self.frame_pending)
    }
}

impl Timer for FrameTimer {
    fn name(&self) -> &str {
        FRAME_TIMER_NAME
    }

    fn system_tick(&mut self, ticks: Ticks) -> InterruptState {
        self.countdown -= ticks.get() as i64;
        if self.countdown <= 0 {
            if self.countdown < 0 {
                diag!(
                    self.diagnostics,
                    Level::Warn,
                    LOG_TARGET,
                    "frame {} late by {} ticks",
                    self.frames,
                    -self.countdown
                );
            }
            (self.repaint)();
            self.frames += 1;
            self.frame_pending = true;
            // Lateness comes out of the next frame.
            self.countdown += self.ticks_per_frame as i64;
            if self.countdown <= 0 {
                self.countdown = self.ticks_per_frame as i64;
            }
        }
        InterruptState::NONE
    }

    fn available_system_ticks(&self) -> Option<Ticks> {
        Some(Ticks::new(self.countdown.max(0) as u64))
    }
}
