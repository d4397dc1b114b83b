//! PHA, PHP, PLA, PLP.

use emu_core::Bus;

use crate::{CpuState, Fault, Instruction};

pub(crate) fn pha(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.push();
    bus.write_byte_to_stack(slot, state.regs.a)?;
    Ok(state.advanced(instruction))
}

/// Pushes the status with B and the unused bit set.
pub(crate) fn php(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.push();
    bus.write_byte_to_stack(slot, state.regs.p.to_byte_brk())?;
    Ok(state.advanced(instruction))
}

pub(crate) fn pla(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.pop();
    state.regs.a = bus.read_from_stack(slot)?;
    state.regs.p.update_nz(state.regs.a);
    Ok(state.advanced(instruction))
}

pub(crate) fn plp(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.pop();
    let pulled = bus.read_from_stack(slot)?;
    state.regs.p = state.regs.p.with_pulled(pulled);
    Ok(state.advanced(instruction))
}
