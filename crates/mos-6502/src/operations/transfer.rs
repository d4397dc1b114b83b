//! Register transfers.

use emu_core::Bus;

use super::implied;
use crate::{CpuState, Fault, Instruction};

pub(crate) fn tax(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.x = state.regs.a;
        state.regs.p.update_nz(state.regs.x);
    })
}

pub(crate) fn tay(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.y = state.regs.a;
        state.regs.p.update_nz(state.regs.y);
    })
}

pub(crate) fn txa(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.a = state.regs.x;
        state.regs.p.update_nz(state.regs.a);
    })
}

pub(crate) fn tya(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.a = state.regs.y;
        state.regs.p.update_nz(state.regs.a);
    })
}

pub(crate) fn tsx(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.x = state.regs.s;
        state.regs.p.update_nz(state.regs.x);
    })
}

/// The only transfer that leaves the flags alone.
pub(crate) fn txs(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.s = state.regs.x)
}
