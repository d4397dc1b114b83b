//! CPU errors.

use emu_core::BusError;
use thiserror::Error;

use crate::{AddressingMode, Mnemonic};

/// Failure inside a single operation, before the CPU adds its context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Fault {
    #[error(transparent)]
    Bus(#[from] BusError),

    #[error("{mode:?} addressing is not implemented for {context}")]
    UnimplementedAddressing {
        mode: AddressingMode,
        context: &'static str,
    },
}

/// A condition that stops the CPU.
///
/// Every variant carries the program counter and cycle count at the point
/// of failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuError {
    #[error("illegal opcode {opcode:#04X} at {pc:#06X} after {cycles} cycles")]
    IllegalOpcode { opcode: u8, pc: u16, cycles: u64 },

    #[error("program counter stuck at {pc:#06X} after {cycles} cycles")]
    StuckProgramCounter { pc: u16, cycles: u64 },

    #[error("fetch at {pc:#06X} failed after {cycles} cycles")]
    Fetch {
        pc: u16,
        cycles: u64,
        #[source]
        source: BusError,
    },

    #[error("{mnemonic} ({opcode:#04X}) at {pc:#06X} failed after {cycles} cycles")]
    Execution {
        pc: u16,
        opcode: u8,
        mnemonic: Mnemonic,
        cycles: u64,
        #[source]
        source: Fault,
    },

    #[error("interrupt entry at {pc:#06X} failed after {cycles} cycles")]
    InterruptEntry {
        pc: u16,
        cycles: u64,
        #[source]
        source: BusError,
    },

    #[error("reading the reset vector failed")]
    Reset(#[source] BusError),

    #[error("no trap within {steps} steps (pc {pc:#06X})")]
    StepLimit { steps: u64, pc: u16 },
}

impl CpuError {
    /// Program counter at the point of failure, when there is one.
    #[must_use]
    pub fn pc(&self) -> Option<u16> {
        match self {
            Self::IllegalOpcode { pc, .. }
            | Self::StuckProgramCounter { pc, .. }
            | Self::Fetch { pc, .. }
            | Self::Execution { pc, .. }
            | Self::InterruptEntry { pc, .. }
            | Self::StepLimit { pc, .. } => Some(*pc),
            Self::Reset(_) => None,
        }
    }
}

/// The opcode table failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("opcode {opcode:#04X} defined twice ({first} and {second})")]
    DuplicateOpcode {
        opcode: u8,
        first: Mnemonic,
        second: Mnemonic,
    },

    #[error("instruction table has {actual} opcodes, expected {expected}")]
    Cardinality { expected: usize, actual: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illegal_opcode_message() {
        let err = CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0xC0DE,
            cycles: 1234,
        };
        assert_eq!(err.to_string(), "illegal opcode 0x02 at 0xC0DE after 1234 cycles");
        assert_eq!(err.pc(), Some(0xC0DE));
    }

    #[test]
    fn test_execution_error_keeps_source() {
        use std::error::Error as _;

        let err = CpuError::Execution {
            pc: 0x0200,
            opcode: 0x8D,
            mnemonic: Mnemonic::Sta,
            cycles: 10,
            source: Fault::Bus(BusError::ReadOnly {
                region: "OS ROM".into(),
                address: 0xC000,
            }),
        };
        assert_eq!(err.to_string(), "STA (0x8D) at 0x0200 failed after 10 cycles");
        assert_eq!(
            err.source().map(ToString::to_string),
            Some("cannot write to OS ROM at 0xC000".to_string())
        );
    }
}
