//! BBC Micro Model B emulator core.
//!
//! The 6502 runs at 2 MHz. The VIAs and the frame timer run on a 1 MHz
//! system clock and are ticked between batches of instructions. A batch
//! lasts until the nearest timer deadline, and the interrupt lines the
//! timers report are latched into the CPU at the end of each batch.
//!
//! Sound, video rendering, the keyboard matrix and storage are not
//! emulated. Video RAM is exposed as a [`VideoSnapshot`] and a key press
//! is delivered as an interrupt through [`KeyInterrupt`].

pub mod config;
mod error;
pub mod frame_timer;
mod handle;
mod machine;
pub mod memory;
pub mod pacing;
pub mod screen;
mod watch;

pub use config::{BbcConfig, MemoryWatch, PagedRom, Pacing};
pub use error::MachineError;
pub use frame_timer::{FrameTimer, RepaintHook};
pub use handle::{EmulatorHandle, KeyInterrupt, RunControls, RunSummary, StopSignal, run};
pub use machine::{Batch, BbcMicro};
pub use memory::MemoryMap;
pub use pacing::{FrameDelayCalculator, FramePacer, SpeedReporter};
pub use screen::VideoSnapshot;
pub use watch::WatchedBus;
