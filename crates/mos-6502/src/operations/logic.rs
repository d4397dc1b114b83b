//! AND, ORA, EOR, BIT.

use emu_core::Bus;

use super::with_read;
use crate::flags::{N, V, Z};
use crate::{CpuState, Fault, Instruction};

pub(crate) fn and(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.a &= value;
        state.regs.p.update_nz(state.regs.a);
    })
}

pub(crate) fn ora(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.a |= value;
        state.regs.p.update_nz(state.regs.a);
    })
}

pub(crate) fn eor(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.a ^= value;
        state.regs.p.update_nz(state.regs.a);
    })
}

/// Z from `A & M`, N and V copied from bits 7 and 6 of M.
pub(crate) fn bit(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        let zero = state.regs.a & value == 0;
        state.regs.p.set_if(Z, zero);
        state.regs.p.set_if(N, value & 0x80 != 0);
        state.regs.p.set_if(V, value & 0x40 != 0);
    })
}
