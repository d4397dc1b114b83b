//! Addressing modes and operand resolution.

use emu_core::Bus;

use crate::{CpuState, Fault};

/// How an instruction finds its operand.
///
/// Branches use `Immediate`: the byte after the opcode is the signed
/// offset. Accumulator shifts use `Implied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    Implied,
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    /// `JMP ($nnnn)` only.
    Indirect,
    /// `($nn,X)`
    IndexedIndirect,
    /// `($nn),Y`
    IndirectIndexed,
}

impl AddressingMode {
    /// Instruction length in bytes, opcode included.
    #[must_use]
    pub const fn length(self) -> u16 {
        match self {
            Self::Implied => 1,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::IndexedIndirect
            | Self::IndirectIndexed => 2,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 3,
        }
    }
}

fn byte_at(bus: &mut dyn Bus, address: u16) -> Result<u8, Fault> {
    Ok(bus.read(u32::from(address))?)
}

/// Pointer stored in page zero. The high byte wraps within the page.
fn zero_page_pointer(bus: &mut dyn Bus, pointer: u8) -> Result<u16, Fault> {
    let lo = byte_at(bus, u16::from(pointer))?;
    let hi = byte_at(bus, u16::from(pointer.wrapping_add(1)))?;
    Ok(u16::from_le_bytes([lo, hi]))
}

/// Effective address of the operand of the instruction at `state.regs.pc`.
pub fn position_using(mode: AddressingMode, state: &CpuState, bus: &mut dyn Bus) -> Result<u16, Fault> {
    let regs = &state.regs;
    let operand = regs.pc.wrapping_add(1);
    match mode {
        AddressingMode::Immediate => Ok(operand),
        AddressingMode::ZeroPage => Ok(u16::from(byte_at(bus, operand)?)),
        AddressingMode::ZeroPageX => Ok(u16::from(byte_at(bus, operand)?.wrapping_add(regs.x))),
        AddressingMode::ZeroPageY => Ok(u16::from(byte_at(bus, operand)?.wrapping_add(regs.y))),
        AddressingMode::Absolute => Ok(bus.read_u16(operand)?),
        AddressingMode::AbsoluteX => Ok(bus.read_u16(operand)?.wrapping_add(u16::from(regs.x))),
        AddressingMode::AbsoluteY => Ok(bus.read_u16(operand)?.wrapping_add(u16::from(regs.y))),
        AddressingMode::Indirect => {
            // NMOS bug: the high byte is fetched from the start of the same
            // page when the pointer sits at $xxFF.
            let pointer = bus.read_u16(operand)?;
            let hi_address = (pointer & 0xFF00) | (pointer.wrapping_add(1) & 0x00FF);
            let lo = byte_at(bus, pointer)?;
            let hi = byte_at(bus, hi_address)?;
            Ok(u16::from_le_bytes([lo, hi]))
        }
        AddressingMode::IndexedIndirect => {
            let pointer = byte_at(bus, operand)?.wrapping_add(regs.x);
            zero_page_pointer(bus, pointer)
        }
        AddressingMode::IndirectIndexed => {
            let pointer = byte_at(bus, operand)?;
            Ok(zero_page_pointer(bus, pointer)?.wrapping_add(u16::from(regs.y)))
        }
        AddressingMode::Implied => Err(Fault::UnimplementedAddressing {
            mode,
            context: "operand position",
        }),
    }
}

/// Operand value of the instruction at `state.regs.pc`.
pub fn read_using(mode: AddressingMode, state: &CpuState, bus: &mut dyn Bus) -> Result<u8, Fault> {
    match mode {
        AddressingMode::Implied | AddressingMode::Indirect => Err(Fault::UnimplementedAddressing {
            mode,
            context: "operand read",
        }),
        _ => {
            let address = position_using(mode, state, bus)?;
            byte_at(bus, address)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::SimpleBus;

    fn state_with(x: u8, y: u8) -> CpuState {
        let mut state = CpuState::at(0x0200);
        state.regs.x = x;
        state.regs.y = y;
        state
    }

    #[test]
    fn test_immediate_is_byte_after_opcode() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xA9, 0x42]);
        let state = state_with(0, 0);
        assert_eq!(position_using(AddressingMode::Immediate, &state, &mut bus), Ok(0x0201));
        assert_eq!(read_using(AddressingMode::Immediate, &state, &mut bus), Ok(0x42));
    }

    #[test]
    fn test_zero_page_index_wraps() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xB5, 0xF0]);
        let state = state_with(0x20, 0x30);
        assert_eq!(position_using(AddressingMode::ZeroPageX, &state, &mut bus), Ok(0x0010));
        assert_eq!(position_using(AddressingMode::ZeroPageY, &state, &mut bus), Ok(0x0020));
    }

    #[test]
    fn test_absolute_index_crosses_page() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xBD, 0xF0, 0x12]);
        let state = state_with(0x20, 0xFF);
        assert_eq!(position_using(AddressingMode::Absolute, &state, &mut bus), Ok(0x12F0));
        assert_eq!(position_using(AddressingMode::AbsoluteX, &state, &mut bus), Ok(0x1310));
        assert_eq!(position_using(AddressingMode::AbsoluteY, &state, &mut bus), Ok(0x13EF));
    }

    #[test]
    fn test_absolute_index_wraps_at_top_of_memory() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xBD, 0xFF, 0xFF]);
        let state = state_with(0x02, 0);
        assert_eq!(position_using(AddressingMode::AbsoluteX, &state, &mut bus), Ok(0x0001));
    }

    #[test]
    fn test_indirect_page_wrap_bug() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x6C, 0xFF, 0x30]);
        bus.poke(0x30FF, 0x80);
        bus.poke(0x3000, 0x50);
        bus.poke(0x3100, 0x40);
        let state = state_with(0, 0);
        assert_eq!(position_using(AddressingMode::Indirect, &state, &mut bus), Ok(0x5080));
    }

    #[test]
    fn test_indexed_indirect_wraps_pointer_in_zero_page() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xA1, 0xFE]);
        bus.poke(0x00FF, 0x34);
        bus.poke(0x0000, 0x12);
        let state = state_with(0x01, 0);
        assert_eq!(position_using(AddressingMode::IndexedIndirect, &state, &mut bus), Ok(0x1234));
    }

    #[test]
    fn test_indirect_indexed_adds_y_after_dereference() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xB1, 0x10]);
        bus.poke(0x0010, 0xF0);
        bus.poke(0x0011, 0x12);
        bus.poke(0x1300, 0x99);
        let state = state_with(0, 0x10);
        assert_eq!(position_using(AddressingMode::IndirectIndexed, &state, &mut bus), Ok(0x1300));
        assert_eq!(read_using(AddressingMode::IndirectIndexed, &state, &mut bus), Ok(0x99));
    }

    #[test]
    fn test_implied_has_no_operand() {
        let mut bus = SimpleBus::new();
        let state = state_with(0, 0);
        assert!(matches!(
            read_using(AddressingMode::Implied, &state, &mut bus),
            Err(Fault::UnimplementedAddressing {
                mode: AddressingMode::Implied,
                ..
            })
        ));
    }

    #[test]
    fn test_lengths() {
        assert_eq!(AddressingMode::Implied.length(), 1);
        assert_eq!(AddressingMode::IndirectIndexed.length(), 2);
        assert_eq!(AddressingMode::Indirect.length(), 3);
    }
}
