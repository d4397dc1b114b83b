//! CMP, CPX, CPY.

use emu_core::Bus;

use super::with_read;
use crate::flags::C;
use crate::{CpuState, Fault, Instruction, Status};

/// C when `register >= operand`, Z when equal, N from bit 7 of the
/// difference.
pub(crate) fn compare(p: &mut Status, register: u8, operand: u8) {
    p.set_if(C, register >= operand);
    p.update_nz(register.wrapping_sub(operand));
}

pub(crate) fn cmp(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        compare(&mut state.regs.p, state.regs.a, value);
    })
}

pub(crate) fn cpx(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        compare(&mut state.regs.p, state.regs.x, value);
    })
}

pub(crate) fn cpy(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        compare(&mut state.regs.p, state.regs.y, value);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{N, Z};

    #[test]
    fn test_compare_equal() {
        let mut p = Status::new();
        compare(&mut p, 0x42, 0x42);
        assert!(p.is_set(Z));
        assert!(p.is_set(C));
        assert!(!p.is_set(N));
    }

    #[test]
    fn test_compare_less() {
        let mut p = Status::new();
        compare(&mut p, 0x10, 0x20);
        assert!(!p.is_set(Z));
        assert!(!p.is_set(C));
        assert!(p.is_set(N));
    }

    #[test]
    fn test_compare_greater() {
        let mut p = Status::new();
        compare(&mut p, 0x20, 0x10);
        assert!(!p.is_set(Z));
        assert!(p.is_set(C));
        assert!(!p.is_set(N));
    }

    #[test]
    fn test_negative_follows_difference_bit_seven() {
        let mut p = Status::new();
        compare(&mut p, 0x01, 0xFF);
        assert!(!p.is_set(C));
        assert!(!p.is_set(N), "0x01 - 0xFF = 0x02");
    }
}
