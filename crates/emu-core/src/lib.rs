//! Core traits and types shared by the emulated chips.
//!
//! The CPU runs on its own clock. Peripherals tick on a slower system
//! clock, and everything that crosses that boundary goes through the
//! [`TimerManager`], which also merges the interrupt lines.

mod bus;
mod clock;
mod cpu;
mod diagnostics;
mod interrupt;
mod observable;
mod ticks;
mod timer;

pub use bus::{Bus, BusError, STACK_BASE, SimpleBus, stack_address};
pub use clock::MasterClock;
pub use cpu::Cpu;
pub use diagnostics::Diagnostics;
pub use interrupt::InterruptState;
pub use observable::{Observable, Value};
pub use ticks::Ticks;
pub use timer::{SharedTimer, Timer, TimerManager};

#[doc(hidden)]
pub use log as __log;
