//! NMOS 6502 CPU core.
//!
//! The core is instruction-stepped: [`Mos6502::step`](emu_core::Cpu::step)
//! takes a [`CpuState`] by reference and returns the next one. Opcodes are
//! decoded through an [`InstructionTable`] that is validated when the core
//! is built. All 151 documented opcodes are implemented, including NMOS
//! decimal mode and the `JMP ($xxFF)` page-wrap bug.
//!
//! Cycle counts follow the documented base timings. Taken branches cost one
//! extra cycle, plus one more when the target is on another page. The extra
//! cycle for indexed reads that cross a page is not modelled.

mod addressing;
mod cpu;
mod error;
pub mod flags;
mod instructions;
mod operations;
mod registers;
mod state;

pub use addressing::{AddressingMode, position_using, read_using};
pub use cpu::{INTERRUPT_CYCLES, IRQ_VECTOR, Mos6502, NMI_VECTOR, RESET_VECTOR};
pub use error::{CpuError, Fault, TableError};
pub use flags::Status;
pub use instructions::{Instruction, InstructionTable, Mnemonic, OFFICIAL_OPCODE_COUNT, Operation};
pub use registers::Registers;
pub use state::CpuState;
