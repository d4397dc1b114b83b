//! Opcode decode table.

use std::fmt;

use emu_core::Bus;

use crate::AddressingMode::{
    Absolute, AbsoluteX, AbsoluteY, Immediate, Implied, IndexedIndirect, Indirect, IndirectIndexed,
    ZeroPage, ZeroPageX, ZeroPageY,
};
use crate::operations::{arithmetic, branches, compare, flags, flow, load_store, logic, shifts, stack, transfer};
use crate::{AddressingMode, CpuState, Fault, TableError};

/// Number of documented NMOS 6502 opcodes.
pub const OFFICIAL_OPCODE_COUNT: usize = 151;

/// Semantics of one opcode. Takes the state before the instruction and
/// returns the state after it.
pub type Operation = fn(&Instruction, CpuState, &mut dyn Bus) -> Result<CpuState, Fault>;

#[rustfmt::skip]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc,
    Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx, Iny, Jmp,
    Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
}

impl Mnemonic {
    /// Instructions that set the program counter themselves instead of
    /// stepping over their operand.
    #[must_use]
    pub const fn is_flow_control(self) -> bool {
        matches!(
            self,
            Self::Bcc
                | Self::Bcs
                | Self::Beq
                | Self::Bmi
                | Self::Bne
                | Self::Bpl
                | Self::Bvc
                | Self::Bvs
                | Self::Jmp
                | Self::Jsr
                | Self::Rts
                | Self::Rti
                | Self::Brk
        )
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{self:?}");
        f.pad(&name.to_ascii_uppercase())
    }
}

/// One decoded opcode.
#[derive(Debug, Clone, Copy)]
pub struct Instruction {
    pub opcode: u8,
    pub mnemonic: Mnemonic,
    pub mode: AddressingMode,
    /// Documented base cycle count.
    pub cycles: u8,
    pub operation: Operation,
}

const fn op(opcode: u8, mnemonic: Mnemonic, mode: AddressingMode, cycles: u8, operation: Operation) -> Instruction {
    Instruction {
        opcode,
        mnemonic,
        mode,
        cycles,
        operation,
    }
}

use Mnemonic::{
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs, Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec,
    Dex, Dey, Eor, Inc, Inx, Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp, Rol, Ror, Rti,
    Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay, Tsx, Txa, Txs, Tya,
};

#[rustfmt::skip]
const OFFICIAL: [Instruction; OFFICIAL_OPCODE_COUNT] = [
    // Load/store
    op(0xA9, Lda, Immediate, 2, load_store::lda),
    op(0xA5, Lda, ZeroPage, 3, load_store::lda),
    op(0xB5, Lda, ZeroPageX, 4, load_store::lda),
    op(0xAD, Lda, Absolute, 4, load_store::lda),
    op(0xBD, Lda, AbsoluteX, 4, load_store::lda),
    op(0xB9, Lda, AbsoluteY, 4, load_store::lda),
    op(0xA1, Lda, IndexedIndirect, 6, load_store::lda),
    op(0xB1, Lda, IndirectIndexed, 5, load_store::lda),
    op(0xA2, Ldx, Immediate, 2, load_store::ldx),
    op(0xA6, Ldx, ZeroPage, 3, load_store::ldx),
    op(0xB6, Ldx, ZeroPageY, 4, load_store::ldx),
    op(0xAE, Ldx, Absolute, 4, load_store::ldx),
    op(0xBE, Ldx, AbsoluteY, 4, load_store::ldx),
    op(0xA0, Ldy, Immediate, 2, load_store::ldy),
    op(0xA4, Ldy, ZeroPage, 3, load_store::ldy),
    op(0xB4, Ldy, ZeroPageX, 4, load_store::ldy),
    op(0xAC, Ldy, Absolute, 4, load_store::ldy),
    op(0xBC, Ldy, AbsoluteX, 4, load_store::ldy),
    op(0x85, Sta, ZeroPage, 3, load_store::sta),
    op(0x95, Sta, ZeroPageX, 4, load_store::sta),
    op(0x8D, Sta, Absolute, 4, load_store::sta),
    op(0x9D, Sta, AbsoluteX, 5, load_store::sta),
    op(0x99, Sta, AbsoluteY, 5, load_store::sta),
    op(0x81, Sta, IndexedIndirect, 6, load_store::sta),
    op(0x91, Sta, IndirectIndexed, 6, load_store::sta),
    op(0x86, Stx, ZeroPage, 3, load_store::stx),
    op(0x96, Stx, ZeroPageY, 4, load_store::stx),
    op(0x8E, Stx, Absolute, 4, load_store::stx),
    op(0x84, Sty, ZeroPage, 3, load_store::sty),
    op(0x94, Sty, ZeroPageX, 4, load_store::sty),
    op(0x8C, Sty, Absolute, 4, load_store::sty),

    // Register transfers
    op(0xAA, Tax, Implied, 2, transfer::tax),
    op(0xA8, Tay, Implied, 2, transfer::tay),
    op(0x8A, Txa, Implied, 2, transfer::txa),
    op(0x98, Tya, Implied, 2, transfer::tya),
    op(0xBA, Tsx, Implied, 2, transfer::tsx),
    op(0x9A, Txs, Implied, 2, transfer::txs),

    // Arithmetic
    op(0x69, Adc, Immediate, 2, arithmetic::adc),
    op(0x65, Adc, ZeroPage, 3, arithmetic::adc),
    op(0x75, Adc, ZeroPageX, 4, arithmetic::adc),
    op(0x6D, Adc, Absolute, 4, arithmetic::adc),
    op(0x7D, Adc, AbsoluteX, 4, arithmetic::adc),
    op(0x79, Adc, AbsoluteY, 4, arithmetic::adc),
    op(0x61, Adc, IndexedIndirect, 6, arithmetic::adc),
    op(0x71, Adc, IndirectIndexed, 5, arithmetic::adc),
    op(0xE9, Sbc, Immediate, 2, arithmetic::sbc),
    op(0xE5, Sbc, ZeroPage, 3, arithmetic::sbc),
    op(0xF5, Sbc, ZeroPageX, 4, arithmetic::sbc),
    op(0xED, Sbc, Absolute, 4, arithmetic::sbc),
    op(0xFD, Sbc, AbsoluteX, 4, arithmetic::sbc),
    op(0xF9, Sbc, AbsoluteY, 4, arithmetic::sbc),
    op(0xE1, Sbc, IndexedIndirect, 6, arithmetic::sbc),
    op(0xF1, Sbc, IndirectIndexed, 5, arithmetic::sbc),
    op(0xE6, Inc, ZeroPage, 5, arithmetic::inc),
    op(0xF6, Inc, ZeroPageX, 6, arithmetic::inc),
    op(0xEE, Inc, Absolute, 6, arithmetic::inc),
    op(0xFE, Inc, AbsoluteX, 7, arithmetic::inc),
    op(0xC6, Dec, ZeroPage, 5, arithmetic::dec),
    op(0xD6, Dec, ZeroPageX, 6, arithmetic::dec),
    op(0xCE, Dec, Absolute, 6, arithmetic::dec),
    op(0xDE, Dec, AbsoluteX, 7, arithmetic::dec),
    op(0xE8, Inx, Implied, 2, arithmetic::inx),
    op(0xC8, Iny, Implied, 2, arithmetic::iny),
    op(0xCA, Dex, Implied, 2, arithmetic::dex),
    op(0x88, Dey, Implied, 2, arithmetic::dey),

    // Logic
    op(0x29, And, Immediate, 2, logic::and),
    op(0x25, And, ZeroPage, 3, logic::and),
    op(0x35, And, ZeroPageX, 4, logic::and),
    op(0x2D, And, Absolute, 4, logic::and),
    op(0x3D, And, AbsoluteX, 4, logic::and),
    op(0x39, And, AbsoluteY, 4, logic::and),
    op(0x21, And, IndexedIndirect, 6, logic::and),
    op(0x31, And, IndirectIndexed, 5, logic::and),
    op(0x09, Ora, Immediate, 2, logic::ora),
    op(0x05, Ora, ZeroPage, 3, logic::ora),
    op(0x15, Ora, ZeroPageX, 4, logic::ora),
    op(0x0D, Ora, Absolute, 4, logic::ora),
    op(0x1D, Ora, AbsoluteX, 4, logic::ora),
    op(0x19, Ora, AbsoluteY, 4, logic::ora),
    op(0x01, Ora, IndexedIndirect, 6, logic::ora),
    op(0x11, Ora, IndirectIndexed, 5, logic::ora),
    op(0x49, Eor, Immediate, 2, logic::eor),
    op(0x45, Eor, ZeroPage, 3, logic::eor),
    op(0x55, Eor, ZeroPageX, 4, logic::eor),
    op(0x4D, Eor, Absolute, 4, logic::eor),
    op(0x5D, Eor, AbsoluteX, 4, logic::eor),
    op(0x59, Eor, AbsoluteY, 4, logic::eor),
    op(0x41, Eor, IndexedIndirect, 6, logic::eor),
    op(0x51, Eor, IndirectIndexed, 5, logic::eor),
    op(0x24, Bit, ZeroPage, 3, logic::bit),
    op(0x2C, Bit, Absolute, 4, logic::bit),

    // Shifts and rotates
    op(0x0A, Asl, Implied, 2, shifts::asl),
    op(0x06, Asl, ZeroPage, 5, shifts::asl),
    op(0x16, Asl, ZeroPageX, 6, shifts::asl),
    op(0x0E, Asl, Absolute, 6, shifts::asl),
    op(0x1E, Asl, AbsoluteX, 7, shifts::asl),
    op(0x4A, Lsr, Implied, 2, shifts::lsr),
    op(0x46, Lsr, ZeroPage, 5, shifts::lsr),
    op(0x56, Lsr, ZeroPageX, 6, shifts::lsr),
    op(0x4E, Lsr, Absolute, 6, shifts::lsr),
    op(0x5E, Lsr, AbsoluteX, 7, shifts::lsr),
    op(0x2A, Rol, Implied, 2, shifts::rol),
    op(0x26, Rol, ZeroPage, 5, shifts::rol),
    op(0x36, Rol, ZeroPageX, 6, shifts::rol),
    op(0x2E, Rol, Absolute, 6, shifts::rol),
    op(0x3E, Rol, AbsoluteX, 7, shifts::rol),
    op(0x6A, Ror, Implied, 2, shifts::ror),
    op(0x66, Ror, ZeroPage, 5, shifts::ror),
    op(0x76, Ror, ZeroPageX, 6, shifts::ror),
    op(0x6E, Ror, Absolute, 6, shifts::ror),
    op(0x7E, Ror, AbsoluteX, 7, shifts::ror),

    // Compares
    op(0xC9, Cmp, Immediate, 2, compare::cmp),
    op(0xC5, Cmp, ZeroPage, 3, compare::cmp),
    op(0xD5, Cmp, ZeroPageX, 4, compare::cmp),
    op(0xCD, Cmp, Absolute, 4, compare::cmp),
    op(0xDD, Cmp, AbsoluteX, 4, compare::cmp),
    op(0xD9, Cmp, AbsoluteY, 4, compare::cmp),
    op(0xC1, Cmp, IndexedIndirect, 6, compare::cmp),
    op(0xD1, Cmp, IndirectIndexed, 5, compare::cmp),
    op(0xE0, Cpx, Immediate, 2, compare::cpx),
    op(0xE4, Cpx, ZeroPage, 3, compare::cpx),
    op(0xEC, Cpx, Absolute, 4, compare::cpx),
    op(0xC0, Cpy, Immediate, 2, compare::cpy),
    op(0xC4, Cpy, ZeroPage, 3, compare::cpy),
    op(0xCC, Cpy, Absolute, 4, compare::cpy),

    // Branches
    op(0x90, Bcc, Immediate, 2, branches::bcc),
    op(0xB0, Bcs, Immediate, 2, branches::bcs),
    op(0xF0, Beq, Immediate, 2, branches::beq),
    op(0xD0, Bne, Immediate, 2, branches::bne),
    op(0x30, Bmi, Immediate, 2, branches::bmi),
    op(0x10, Bpl, Immediate, 2, branches::bpl),
    op(0x50, Bvc, Immediate, 2, branches::bvc),
    op(0x70, Bvs, Immediate, 2, branches::bvs),

    // Stack
    op(0x48, Pha, Implied, 3, stack::pha),
    op(0x08, Php, Implied, 3, stack::php),
    op(0x68, Pla, Implied, 4, stack::pla),
    op(0x28, Plp, Implied, 4, stack::plp),

    // Flow control
    op(0x4C, Jmp, Absolute, 3, flow::jmp),
    op(0x6C, Jmp, Indirect, 5, flow::jmp),
    op(0x20, Jsr, Absolute, 6, flow::jsr),
    op(0x60, Rts, Implied, 6, flow::rts),
    op(0x40, Rti, Implied, 6, flow::rti),
    op(0x00, Brk, Implied, 7, flow::brk),
    op(0xEA, Nop, Implied, 2, flow::nop),

    // Flags
    op(0x18, Clc, Implied, 2, flags::clc),
    op(0x38, Sec, Implied, 2, flags::sec),
    op(0x58, Cli, Implied, 2, flags::cli),
    op(0x78, Sei, Implied, 2, flags::sei),
    op(0xD8, Cld, Implied, 2, flags::cld),
    op(0xF8, Sed, Implied, 2, flags::sed),
    op(0xB8, Clv, Implied, 2, flags::clv),
];

/// Opcode to instruction lookup.
#[derive(Debug, Clone)]
pub struct InstructionTable {
    entries: [Option<Instruction>; 256],
    len: usize,
}

impl InstructionTable {
    /// The documented NMOS 6502 instruction set.
    pub fn official() -> Result<Self, TableError> {
        Self::from_definitions(&OFFICIAL, OFFICIAL_OPCODE_COUNT)
    }

    /// Build a table from `definitions`, which must hold exactly `expected`
    /// distinct opcodes.
    pub fn from_definitions(definitions: &[Instruction], expected: usize) -> Result<Self, TableError> {
        let mut entries: [Option<Instruction>; 256] = [None; 256];
        for definition in definitions {
            let slot = &mut entries[usize::from(definition.opcode)];
            if let Some(existing) = slot {
                return Err(TableError::DuplicateOpcode {
                    opcode: definition.opcode,
                    first: existing.mnemonic,
                    second: definition.mnemonic,
                });
            }
            *slot = Some(*definition);
        }
        if definitions.len() != expected {
            return Err(TableError::Cardinality {
                expected,
                actual: definitions.len(),
            });
        }
        Ok(Self {
            entries,
            len: definitions.len(),
        })
    }

    #[must_use]
    pub fn get(&self, opcode: u8) -> Option<&Instruction> {
        self.entries[usize::from(opcode)].as_ref()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.entries.iter().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
