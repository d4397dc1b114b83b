//! 6502 CPU registers.

use crate::Status;
use crate::flags::{I, U};

/// 6502 CPU register set.
///
/// - A: 8-bit accumulator
/// - X, Y: 8-bit index registers
/// - S: 8-bit stack pointer (stack is at $0100-$01FF)
/// - PC: 16-bit program counter
/// - P: processor status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    /// Stack pointer. Points at the next free slot.
    pub s: u8,
    pub pc: u16,
    pub p: Status,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// Registers after reset: S at $FD, I set, PC still to be loaded from
    /// the reset vector.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            s: 0xFD,
            pc: 0,
            p: Status(U | I),
        }
    }

    /// Slot for a one-byte push. Moves S down.
    pub fn push(&mut self) -> u8 {
        let slot = self.s;
        self.s = self.s.wrapping_sub(1);
        slot
    }

    /// Slot for a one-byte pull. Moves S up.
    pub fn pop(&mut self) -> u8 {
        self.s = self.s.wrapping_add(1);
        self.s
    }

    /// Slot of the high byte for a two-byte push. Moves S down by two.
    pub fn push_word(&mut self) -> u8 {
        let slot = self.s;
        self.s = self.s.wrapping_sub(2);
        slot
    }

    /// Slot of the low byte for a two-byte pull. Moves S up by two.
    pub fn pop_word(&mut self) -> u8 {
        let slot = self.s.wrapping_add(1);
        self.s = self.s.wrapping_add(2);
        slot
    }
}
