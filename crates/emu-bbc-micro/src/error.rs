//! Machine-level errors.

use emu_core::BusError;
use mos_6502::{CpuError, TableError};
use thiserror::Error;

/// Anything that stops the machine from being built or from running.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error(transparent)]
    Cpu(#[from] CpuError),

    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("invalid instruction table")]
    Table(#[from] TableError),

    #[error("{name} is {actual} bytes, expected {expected}")]
    RomSize {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("paged ROM bank {0:#X} does not exist (banks are 0-F)")]
    MissingBank(u8),

    #[error("emulation thread: {0}")]
    EmulationThread(String),
}
