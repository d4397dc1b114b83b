//! JMP, JSR, RTS, RTI, BRK, NOP.

use emu_core::Bus;

use super::implied;
use crate::flags::I;
use crate::{CpuState, Fault, Instruction, position_using};

pub(crate) fn jmp(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    state.regs.pc = position_using(instruction.mode, &state, bus)?;
    Ok(state.charged(instruction.cycles))
}

/// Pushes the address of the last byte of the JSR, which RTS increments.
pub(crate) fn jsr(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let target = position_using(instruction.mode, &state, bus)?;
    let return_address = state.regs.pc.wrapping_add(2);
    let slot = state.regs.push_word();
    bus.write_u16_to_stack(slot, return_address)?;
    state.regs.pc = target;
    Ok(state.charged(instruction.cycles))
}

pub(crate) fn rts(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.pop_word();
    state.regs.pc = bus.read_u16_from_stack(slot)?.wrapping_add(1);
    Ok(state.charged(instruction.cycles))
}

pub(crate) fn rti(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let slot = state.regs.pop();
    let pulled = bus.read_from_stack(slot)?;
    state.regs.p = state.regs.p.with_pulled(pulled);
    let slot = state.regs.pop_word();
    state.regs.pc = bus.read_u16_from_stack(slot)?;
    Ok(state.charged(instruction.cycles))
}

/// Software interrupt. Skips the padding byte after the opcode, so the
/// pushed return address is PC + 2.
pub(crate) fn brk(instruction: &Instruction, mut state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    let return_address = state.regs.pc.wrapping_add(2);
    let slot = state.regs.push_word();
    bus.write_u16_to_stack(slot, return_address)?;
    let slot = state.regs.push();
    bus.write_byte_to_stack(slot, state.regs.p.to_byte_brk())?;
    state.regs.p.set(I);
    state.regs.pc = bus.read_u16(state.break_location)?;
    Ok(state.charged(instruction.cycles))
}

pub(crate) fn nop(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |_| {})
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::B;
    use crate::operations::test_support::{run, run_on};
    use emu_core::SimpleBus;

    #[test]
    fn test_jmp_absolute() {
        let (state, _) = run(&[0x4C, 0x34, 0x12], |_| {});
        assert_eq!(state.regs.pc, 0x1234);
        assert_eq!(state.cycle_count, 3);
    }

    #[test]
    fn test_jsr_pushes_last_byte_address() {
        let (state, bus) = run(&[0x20, 0x00, 0x30], |state| state.regs.s = 0xFF);
        assert_eq!(state.regs.pc, 0x3000);
        assert_eq!(state.regs.s, 0xFD);
        assert_eq!(bus.peek(0x01FF), 0x02);
        assert_eq!(bus.peek(0x01FE), 0x02);
    }

    #[test]
    fn test_rts_returns_after_jsr() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x60]);
        bus.poke(0x01FE, 0x02);
        bus.poke(0x01FF, 0x12);
        let state = run_on(&mut bus, |state| state.regs.s = 0xFD).unwrap();
        assert_eq!(state.regs.pc, 0x1203);
        assert_eq!(state.regs.s, 0xFF);
    }

    #[test]
    fn test_brk_pushes_pc_plus_two_and_sets_i() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x00, 0xEA]);
        bus.load(0xFFFE, &[0x00, 0x80]);
        let state = run_on(&mut bus, |state| {
            state.regs.s = 0xFF;
            state.regs.p.clear(I);
        })
        .unwrap();
        assert_eq!(state.regs.pc, 0x8000);
        assert!(state.regs.p.is_set(I));
        assert_eq!(bus.peek(0x01FF), 0x02);
        assert_eq!(bus.peek(0x01FE), 0x02);
        assert_eq!(bus.peek(0x01FD) & B, B);
        assert_eq!(state.regs.s, 0xFC);
        assert_eq!(state.cycle_count, 7);
    }

    #[test]
    fn test_brk_uses_break_location() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x00]);
        bus.load(0x0300, &[0x34, 0x12]);
        let state = run_on(&mut bus, |state| state.break_location = 0x0300).unwrap();
        assert_eq!(state.regs.pc, 0x1234);
    }
}
