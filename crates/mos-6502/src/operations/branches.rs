//! Conditional branches.
//!
//! A branch costs its base 2 cycles when not taken, 3 when taken, and 4
//! when the target lies on a different page from the next instruction.

use emu_core::Bus;

use crate::flags::{C, N, V, Z};
use crate::{CpuState, Fault, Instruction, read_using};

fn branch_if(
    instruction: &Instruction,
    state: CpuState,
    bus: &mut dyn Bus,
    condition: bool,
) -> Result<CpuState, Fault> {
    let offset = read_using(instruction.mode, &state, bus)? as i8;
    let mut next = state.advanced(instruction);
    if condition {
        let from = next.regs.pc;
        let target = from.wrapping_add_signed(i16::from(offset));
        let penalty = if from & 0xFF00 == target & 0xFF00 { 1 } else { 2 };
        next.regs.pc = target;
        next = next.charged(penalty);
    }
    Ok(next)
}

pub(crate) fn bcc(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, !state.regs.p.is_set(C))
}

pub(crate) fn bcs(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, state.regs.p.is_set(C))
}

pub(crate) fn beq(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, state.regs.p.is_set(Z))
}

pub(crate) fn bne(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, !state.regs.p.is_set(Z))
}

pub(crate) fn bmi(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, state.regs.p.is_set(N))
}

pub(crate) fn bpl(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, !state.regs.p.is_set(N))
}

pub(crate) fn bvc(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, !state.regs.p.is_set(V))
}

pub(crate) fn bvs(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    branch_if(instruction, state, bus, state.regs.p.is_set(V))
}
