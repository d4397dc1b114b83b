//! Memory and I/O bus interface.

use thiserror::Error;

/// First address of the hardware stack page.
pub const STACK_BASE: u16 = 0x0100;

/// Absolute address of a stack slot.
#[must_use]
pub const fn stack_address(sp: u8) -> u32 {
    STACK_BASE as u32 | sp as u32
}

/// A bus access that the addressed device refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("read out of range: {address:#06X}")]
    ReadOutOfRange { address: u32 },

    #[error("write out of range: {address:#06X} ({value:#04X})")]
    WriteOutOfRange { address: u32, value: u8 },

    #[error("cannot write to {region} at {address:#06X}")]
    ReadOnly { region: String, address: u32 },

    #[error("failing on ignored hardware: {name} at {address:#06X}")]
    IgnoredHardware { name: &'static str, address: u32 },
}

/// Memory and I/O bus interface.
///
/// Components access memory and peripherals through this trait. The bus
/// handles address decoding and routing to the appropriate device. Addresses
/// are `u32` so a decoder can reject anything outside its address space
/// instead of silently wrapping.
pub trait Bus {
    /// Read a byte from the given address.
    fn read(&mut self, address: u32) -> Result<u8, BusError>;

    /// Write a byte to the given address.
    fn write(&mut self, address: u32, value: u8) -> Result<(), BusError>;

    /// Little-endian word at `address`. The high byte comes from
    /// `address + 1`, wrapping at the top of memory.
    fn read_u16(&mut self, address: u16) -> Result<u16, BusError> {
        let lo = self.read(u32::from(address))?;
        let hi = self.read(u32::from(address.wrapping_add(1)))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    fn write_byte_to_stack(&mut self, sp: u8, value: u8) -> Result<(), BusError> {
        self.write(stack_address(sp), value)
    }

    fn read_from_stack(&mut self, sp: u8) -> Result<u8, BusError> {
        self.read(stack_address(sp))
    }

    /// Store a word the way the 6502 pushes one: high byte at `sp`, low byte
    /// at `sp - 1`. The caller moves the stack pointer down by two.
    fn write_u16_to_stack(&mut self, sp: u8, value: u16) -> Result<(), BusError> {
        let [lo, hi] = value.to_le_bytes();
        self.write_byte_to_stack(sp, hi)?;
        self.write_byte_to_stack(sp.wrapping_sub(1), lo)
    }

    /// Word whose low byte sits at `sp` and high byte at `sp + 1`, both
    /// wrapping within page one.
    fn read_u16_from_stack(&mut self, sp: u8) -> Result<u16, BusError> {
        let lo = self.read_from_stack(sp)?;
        let hi = self.read_from_stack(sp.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }
}

/// Flat 64 KiB of RAM. Used by CPU tests and test harnesses.
pub struct SimpleBus {
    memory: Vec<u8>,
}

impl Default for SimpleBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            memory: vec![0; 0x1_0000],
        }
    }

    /// Copy `data` into memory starting at `address`. Bytes past 0xFFFF are
    /// dropped.
    pub fn load(&mut self, address: u16, data: &[u8]) {
        let start = usize::from(address);
        let end = (start + data.len()).min(self.memory.len());
        self.memory[start..end].copy_from_slice(&data[..end - start]);
    }

    #[must_use]
    pub fn peek(&self, address: u16) -> u8 {
        self.memory[usize::from(address)]
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.memory[usize::from(address)] = value;
    }
}

impl Bus for SimpleBus {
    fn read(&mut self, address: u32) -> Result<u8, BusError> {
        self.memory
            .get(address as usize)
            .copied()
            .ok_or(BusError::ReadOutOfRange { address })
    }

    fn write(&mut self, address: u32, value: u8) -> Result<(), BusError> {
        let slot = self
            .memory
            .get_mut(address as usize)
            .ok_or(BusError::WriteOutOfRange { address, value })?;
        *slot = value;
        Ok(())
    }
}
