//! Flag set/clear instructions.

use emu_core::Bus;

use super::implied;
use crate::flags::{C, D, I, V};
use crate::{CpuState, Fault, Instruction};

pub(crate) fn clc(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.clear(C))
}

pub(crate) fn sec(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.set(C))
}

pub(crate) fn cli(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.clear(I))
}

pub(crate) fn sei(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.set(I))
}

pub(crate) fn cld(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.clear(D))
}

pub(crate) fn sed(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.set(D))
}

pub(crate) fn clv(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| state.regs.p.clear(V))
}
