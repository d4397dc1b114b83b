//! ADC, SBC and the increments/decrements.

use emu_core::Bus;

use super::{implied, modify, with_read};
use crate::flags::{C, D, N, V, Z};
use crate::{CpuState, Fault, Instruction, Registers};

pub(crate) fn adc(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        if state.regs.p.is_set(D) {
            add_decimal(&mut state.regs, value);
        } else {
            add_binary(&mut state.regs, value);
        }
    })
}

pub(crate) fn sbc(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    with_read(instruction, state, bus, |state, value| {
        if state.regs.p.is_set(D) {
            subtract_decimal(&mut state.regs, value);
        } else {
            // SBC is ADC of the one's complement.
            add_binary(&mut state.regs, !value);
        }
    })
}

fn add_binary(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let sum = u16::from(a) + u16::from(value) + u16::from(regs.p.carry_bit());
    let result = sum as u8;

    regs.p.set_if(C, sum > 0xFF);
    regs.p.set_if(V, (a ^ result) & (value ^ result) & 0x80 != 0);
    regs.a = result;
    regs.p.update_nz(result);
}

/// NMOS BCD add. Z comes from the binary sum, N and V from the
/// intermediate high nibble before the final decimal adjust.
fn add_decimal(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let carry = regs.p.carry_bit();

    let mut lo = (a & 0x0F) + (value & 0x0F) + carry;
    if lo > 9 {
        lo += 6;
    }
    let mut hi = (a >> 4) + (value >> 4) + u8::from(lo > 0x0F);

    let binary = a.wrapping_add(value).wrapping_add(carry);
    let intermediate = hi << 4;
    regs.p.set_if(Z, binary == 0);
    regs.p.set_if(N, intermediate & 0x80 != 0);
    regs.p.set_if(V, (a ^ intermediate) & !(a ^ value) & 0x80 != 0);

    if hi > 9 {
        hi += 6;
    }
    regs.p.set_if(C, hi > 0x0F);
    regs.a = (hi << 4) | (lo & 0x0F);
}

/// NMOS BCD subtract. All flags come from the binary difference.
fn subtract_decimal(regs: &mut Registers, value: u8) {
    let a = regs.a;
    let borrow = i16::from(1 - regs.p.carry_bit());

    let binary = i16::from(a) - i16::from(value) - borrow;
    regs.p.set_if(C, binary >= 0);
    regs.p.set_if(Z, binary as u8 == 0);
    regs.p.set_if(N, binary & 0x80 != 0);
    regs.p.set_if(V, (i16::from(a) ^ binary) & (i16::from(a) ^ i16::from(value)) & 0x80 != 0);

    let mut lo = i16::from(a & 0x0F) - i16::from(value & 0x0F) - borrow;
    let mut hi = i16::from(a >> 4) - i16::from(value >> 4);
    if lo < 0 {
        lo -= 6;
        hi -= 1;
    }
    if hi < 0 {
        hi -= 6;
    }
    regs.a = ((hi << 4) as u8) | ((lo & 0x0F) as u8);
}

pub(crate) fn inc(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        let result = value.wrapping_add(1);
        p.update_nz(result);
        result
    })
}

pub(crate) fn dec(instruction: &Instruction, state: CpuState, bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    modify(instruction, state, bus, |p, value| {
        let result = value.wrapping_sub(1);
        p.update_nz(result);
        result
    })
}

pub(crate) fn inx(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.x = state.regs.x.wrapping_add(1);
        state.regs.p.update_nz(state.regs.x);
    })
}

pub(crate) fn iny(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.y = state.regs.y.wrapping_add(1);
        state.regs.p.update_nz(state.regs.y);
    })
}

pub(crate) fn dex(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.x = state.regs.x.wrapping_sub(1);
        state.regs.p.update_nz(state.regs.x);
    })
}

pub(crate) fn dey(instruction: &Instruction, state: CpuState, _bus: &mut dyn Bus) -> Result<CpuState, Fault> {
    implied(instruction, state, |state| {
        state.regs.y = state.regs.y.wrapping_sub(1);
        state.regs.p.update_nz(state.regs.y);
    })
}
