//! The value passed between steps.

use emu_core::{Observable, Value};

use crate::cpu::IRQ_VECTOR;
use crate::flags::{B, C, D, I, N, V, Z};
use crate::{Instruction, Registers};

/// Complete CPU state between two steps.
///
/// Steps take a state and return a new one, so a caller can keep the old
/// value for comparison or replay. Registers are `u8`, which makes the
/// 8-bit masking a type guarantee rather than something each operation has
/// to remember.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub regs: Registers,
    /// Vector used by BRK and IRQ.
    pub break_location: u16,
    /// Cycles since reset. Never decreases.
    pub cycle_count: u64,
    /// Level of the IRQ line as last reported by the machine.
    pub irq_pending: bool,
    /// Latched NMI edge, cleared when the NMI is taken.
    pub nmi_pending: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new()
    }
}

impl CpuState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            regs: Registers::new(),
            break_location: IRQ_VECTOR,
            cycle_count: 0,
            irq_pending: false,
            nmi_pending: false,
        }
    }

    /// Reset state with the program counter at `pc`.
    #[must_use]
    pub const fn at(pc: u16) -> Self {
        let mut state = Self::new();
        state.regs.pc = pc;
        state
    }

    /// Move past `instruction` and charge its base cycles.
    #[must_use]
    pub(crate) fn advanced(mut self, instruction: &Instruction) -> Self {
        self.regs.pc = self.regs.pc.wrapping_add(instruction.mode.length());
        self.charged(instruction.cycles)
    }

    #[must_use]
    pub(crate) fn charged(mut self, cycles: u8) -> Self {
        self.cycle_count += u64::from(cycles);
        self
    }

    /// True when an interrupt will be entered before the next fetch.
    #[must_use]
    pub const fn interrupt_due(&self) -> bool {
        self.nmi_pending || (self.irq_pending && !self.regs.p.is_set(I))
    }
}

impl Observable for CpuState {
    fn query(&self, path: &str) -> Option<Value> {
        let p = self.regs.p;
        match path {
            "pc" => Some(self.regs.pc.into()),
            "a" => Some(self.regs.a.into()),
            "x" => Some(self.regs.x.into()),
            "y" => Some(self.regs.y.into()),
            "s" | "sp" => Some(self.regs.s.into()),
            "p" | "status" => Some(p.0.into()),
            "flags.c" => Some(p.is_set(C).into()),
            "flags.z" => Some(p.is_set(Z).into()),
            "flags.i" => Some(p.is_set(I).into()),
            "flags.d" => Some(p.is_set(D).into()),
            "flags.b" => Some(p.is_set(B).into()),
            "flags.v" => Some(p.is_set(V).into()),
            "flags.n" => Some(p.is_set(N).into()),
            "cycles" => Some(self.cycle_count.into()),
            "irq_pending" => Some(self.irq_pending.into()),
            "nmi_pending" => Some(self.nmi_pending.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "pc",
            "a",
            "x",
            "y",
            "s",
            "p",
            "flags.c",
            "flags.z",
            "flags.i",
            "flags.d",
            "flags.b",
            "flags.v",
            "flags.n",
            "cycles",
            "irq_pending",
            "nmi_pending",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_uses_irq_vector() {
        let state = CpuState::at(0xD9CD);
        assert_eq!(state.regs.pc, 0xD9CD);
        assert_eq!(state.break_location, 0xFFFE);
        assert_eq!(state.cycle_count, 0);
    }

    #[test]
    fn test_irq_masked_nmi_not() {
        let mut state = CpuState::new();
        state.irq_pending = true;
        assert!(!state.interrupt_due(), "reset state has I set");
        state.regs.p.clear(I);
        assert!(state.interrupt_due());

        let mut state = CpuState::new();
        state.nmi_pending = true;
        assert!(state.interrupt_due());
    }

    #[test]
    fn test_observable_paths() {
        let mut state = CpuState::at(0x1234);
        state.regs.a = 0x42;
        state.cycle_count = 7;
        assert_eq!(state.query("pc"), Some(Value::U16(0x1234)));
        assert_eq!(state.query("a"), Some(Value::U8(0x42)));
        assert_eq!(state.query("flags.i"), Some(Value::Bool(true)));
        assert_eq!(state.query("cycles"), Some(Value::U64(7)));
        assert_eq!(state.query("bogus"), None);
    }
}
