//! Running the machine on its own thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use emu_core::{Diagnostics, Observable, Value, diag};
use log::Level;
use mos_6502::CpuState;

use crate::config::Pacing;
use crate::pacing::FramePacer;
use crate::screen::VideoSnapshot;
use crate::{BbcConfig, BbcMicro, MachineError};

const LOG_TARGET: &str = "bbc::cpu";

/// Cooperative stop request, checked between batches.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A key event waiting to interrupt the CPU.
#[derive(Debug, Clone, Default)]
pub struct KeyInterrupt(Arc<AtomicBool>);

impl KeyInterrupt {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume the pending key, if any.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Everything the run loop needs besides the machine.
#[derive(Debug, Clone)]
pub struct RunControls {
    pub stop: StopSignal,
    pub key: KeyInterrupt,
    pub video: VideoSnapshot,
    pub pacing: Pacing,
    pub cycle_limit: Option<u64>,
    pub diagnostics: Diagnostics,
}

impl RunControls {
    #[must_use]
    pub fn new(pacing: Pacing, diagnostics: Diagnostics) -> Self {
        Self {
            stop: StopSignal::new(),
            key: KeyInterrupt::new(),
            video: VideoSnapshot::new(),
            pacing,
            cycle_limit: None,
            diagnostics,
        }
    }
}

/// Machine state when the run loop ended normally.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub state: CpuState,
    pub frames: u64,
    pub system_via: Vec<(&'static str, Value)>,
    pub user_via: Vec<(&'static str, Value)>,
}

impl RunSummary {
    fn of(machine: &BbcMicro) -> Self {
        let memory = machine.memory();
        Self {
            state: *machine.state(),
            frames: machine.frames(),
            system_via: snapshot(memory.system_via()),
            user_via: snapshot(memory.user_via()),
        }
    }
}

fn snapshot(component: &impl Observable) -> Vec<(&'static str, Value)> {
    component
        .query_paths()
        .iter()
        .filter_map(|&path| component.query(path).map(|value| (path, value)))
        .collect()
}

/// Run batches until stopped, out of cycles, or failed.
///
/// The key flag is consumed once per batch. Video RAM is copied to the
/// snapshot after every frame and once more on exit.
///
/// # Errors
///
/// The first fatal machine error.
pub fn run(machine: &mut BbcMicro, controls: &RunControls) -> Result<RunSummary, MachineError> {
    let mut pacer = match controls.pacing {
        Pacing::RealTime { frames_per_second } => Some(FramePacer::new(frames_per_second, controls.diagnostics)),
        Pacing::Unlimited => None,
    };
    let result = loop {
        if controls.stop.is_stopped() {
            diag!(controls.diagnostics, Level::Info, LOG_TARGET, "stopped at {} cycles", machine.cycles());
            break Ok(());
        }
        if controls.cycle_limit.is_some_and(|limit| machine.cycles() >= limit) {
            break Ok(());
        }
        let batch = match machine.run_batch(controls.key.take()) {
            Ok(batch) => batch,
            Err(err) => break Err(err),
        };
        if batch.frame_completed {
            controls.video.refresh(machine.video_ram());
            if let Some(pacer) = pacer.as_mut() {
                pacer.frame_completed(Instant::now());
            }
        }
    };
    controls.video.refresh(machine.video_ram());
    match result {
        Ok(()) => Ok(RunSummary::of(machine)),
        Err(err) => {
            diag!(controls.diagnostics, Level::Error, LOG_TARGET, "emulation stopped: {err}");
            Err(err)
        }
    }
}

/// A machine running on a background thread.
pub struct EmulatorHandle {
    stop: StopSignal,
    key: KeyInterrupt,
    video: VideoSnapshot,
    thread: JoinHandle<Result<RunSummary, MachineError>>,
}

impl EmulatorHandle {
    /// Build the machine on a new thread and start running it.
    ///
    /// # Errors
    ///
    /// The thread could not be started. Build and run errors come back
    /// from [`join`](Self::join).
    pub fn spawn<F>(config: BbcConfig, repaint: F) -> Result<Self, MachineError>
    where
        F: FnMut() + Send + 'static,
    {
        let mut controls = RunControls::new(config.pacing, config.diagnostics);
        controls.cycle_limit = config.cycle_limit;
        let stop = controls.stop.clone();
        let key = controls.key.clone();
        let video = controls.video.clone();

        let thread = thread::Builder::new()
            .name("bbc-micro".into())
            .spawn(move || {
                let mut machine = BbcMicro::new(config, Box::new(repaint))?;
                run(&mut machine, &controls)
            })
            .map_err(|err| MachineError::EmulationThread(err.to_string()))?;

        Ok(Self {
            stop,
            key,
            video,
            thread,
        })
    }

    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    #[must_use]
    pub fn key_interrupt(&self) -> KeyInterrupt {
        self.key.clone()
    }

    #[must_use]
    pub fn video(&self) -> VideoSnapshot {
        self.video.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the run loop to end.
    ///
    /// # Errors
    ///
    /// The error that ended the loop, or a panic on the emulation thread.
    pub fn join(self) -> Result<RunSummary, MachineError> {
        self.thread
            .join()
            .map_err(|_| MachineError::EmulationThread("emulation thread panicked".into()))?
    }
}
