//! LDA, LDX, LDY, STA, STX, STY.

use emu_core::Bus;

use super::{with_position, with_read};
use crate::{CpuState, Fault, Instruction};

pub(crate) fn lda(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.a = value;
        state.regs.p.update_nz(value);
    })
}

pub(crate) fn ldx(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.x = value;
        state.regs.p.update_nz(value);
    })
}

pub(crate) fn ldy(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        state.regs.y = value;
        state.regs.p.update_nz(value);
    })
}

pub(crate) fn sta(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_position(instruction, state, bus, |state, bus, address| {
        bus.write(u32::from(address), state.regs.a)
    })
}

pub(crate) fn stx(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_position(instruction, state, bus, |state, bus, address| {
        bus.write(u32::from(address), state.regs.x)
    })
}

pub(crate) fn sty(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_position(instruction, state, bus, |state, bus, address| {
        bus.write(u32::from(address), state.regs.y)
    })
}
