//! ASL, LSR, ROL, ROR on the accumulator or memory.

use emu_core::Bus;

use super::modify;
use crate::flags::C;
use crate::{CpuState, Fault, Instruction, Status};

pub(crate) fn asl(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        p.set_if(C, value & 0x80 != 0);
        finish(p, value << 1)
    })
}

pub(crate) fn lsr(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        p.set_if(C, value & 0x01 != 0);
        finish(p, value >> 1)
    })
}

pub(crate) fn rol(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        let carry_in = p.carry_bit();
        p.set_if(C, value & 0x80 != 0);
        finish(p, (value << 1) | carry_in)
    })
}

pub(crate) fn ror(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        let carry_in = p.carry_bit() << 7;
        p.set_if(C, value & 0x01 != 0);
        finish(p, (value >> 1) | carry_in)
    })
}

fn finish(p: &mut Status, result: u8) -> u8 {
    p.update_nz(result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{N, Z};
    use crate::operations::test_support::run;

    #[test]
    fn test_asl_accumulator() {
        let (state, _) = run(&[0x0A], |state| state.regs.a = 0x81);
        assert_eq!(state.regs.a, 0x02);
        assert!(state.regs.p.is_set(C));
        assert_eq!(state.regs.pc, 0x0201);
        assert_eq!(state.cycle_count, 2);
    }

    #[test]
    fn test_lsr_memory() {
        let (state, bus) = run(&[0x4E, 0x00, 0x30], |_| {});
        assert_eq!(bus.peek(0x3000), 0x00);
        assert!(state.regs.p.is_set(Z));
        assert!(!state.regs.p.is_set(C));
        assert_eq!(state.cycle_count, 6);
    }

    #[test]
    fn test_rotates_move_carry_through() {
        let (state, _) = run(&[0x2A], |state| {
            state.regs.a = 0x80;
            state.regs.p.set(C);
        });
        assert_eq!(state.regs.a, 0x01);
        assert!(state.regs.p.is_set(C));

        let (state, _) = run(&[0x6A], |state| {
            state.regs.a = 0x01;
            state.regs.p.set(C);
        });
        assert_eq!(state.regs.a, 0x80);
        assert!(state.regs.p.is_set(C));
        assert!(state.regs.p.is_set(N));
    }
}
