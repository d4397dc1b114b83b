//! 6502 processor status register (P).

/// Carry.
pub const C: u8 = 0x01;

/// Zero.
pub const Z: u8 = 0x02;

/// Interrupt disable. Masks IRQ, never NMI.
pub const I: u8 = 0x04;

/// Decimal mode for ADC/SBC.
pub const D: u8 = 0x08;

/// Break command. Only meaningful in a status byte on the stack: set when
/// BRK or PHP pushed it, clear when an IRQ or NMI did.
pub const B: u8 = 0x10;

/// Unused bit, always reads as 1.
pub const U: u8 = 0x20;

/// Overflow.
pub const V: u8 = 0x40;

/// Negative.
pub const N: u8 = 0x80;

/// Processor status register.
///
/// The B bit held here is never changed by the CPU itself. BRK and PHP
/// push it set, interrupts push it clear, and PLP/RTI leave it alone, so
/// whatever the caller put in survives a BRK/RTI round trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(pub u8);

impl Status {
    /// Status with only the unused bit set.
    #[must_use]
    pub const fn new() -> Self {
        Self(U)
    }

    /// Status from a raw byte, forcing the unused bit.
    #[must_use]
    pub const fn from_byte(value: u8) -> Self {
        Self(value | U)
    }

    /// Byte pushed by BRK and PHP.
    #[must_use]
    pub const fn to_byte_brk(self) -> u8 {
        self.0 | U | B
    }

    /// Byte pushed by IRQ and NMI entry.
    #[must_use]
    pub const fn to_byte_irq(self) -> u8 {
        (self.0 | U) & !B
    }

    /// Status after PLP or RTI pulled `value`: every flag comes from the
    /// stack except B, which keeps its current state.
    #[must_use]
    pub const fn with_pulled(self, value: u8) -> Self {
        Self(((value | U) & !B) | (self.0 & B))
    }

    #[must_use]
    pub const fn is_set(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    pub fn set(&mut self, flag: u8) {
        self.0 |= flag;
    }

    pub fn clear(&mut self, flag: u8) {
        self.0 &= !flag;
    }

    /// Set or clear a flag based on condition.
    pub fn set_if(&mut self, flag: u8, condition: bool) {
        if condition {
            self.set(flag);
        } else {
            self.clear(flag);
        }
    }

    /// Update N and Z flags based on a value.
    pub fn update_nz(&mut self, value: u8) {
        self.set_if(N, value & 0x80 != 0);
        self.set_if(Z, value == 0);
    }

    /// Carry as 0 or 1, for add/subtract/rotate.
    #[must_use]
    pub const fn carry_bit(self) -> u8 {
        self.0 & C
    }

    #[must_use]
    pub const fn carry(self) -> bool {
        self.is_set(C)
    }

    #[must_use]
    pub const fn zero(self) -> bool {
        self.is_set(Z)
    }

    #[must_use]
    pub const fn interrupt_disable(self) -> bool {
        self.is_set(I)
    }

    #[must_use]
    pub const fn decimal(self) -> bool {
        self.is_set(D)
    }

    #[must_use]
    pub const fn break_command(self) -> bool {
        self.is_set(B)
    }

    #[must_use]
    pub const fn overflow(self) -> bool {
        self.is_set(V)
    }

    #[must_use]
    pub const fn negative(self) -> bool {
        self.is_set(N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pushed_bytes_differ_only_in_break() {
        let status = Status::from_byte(C | N);
        assert_eq!(status.to_byte_brk(), C | N | U | B);
        assert_eq!(status.to_byte_irq(), C | N | U);
    }

    #[test]
    fn test_pulled_status_keeps_break() {
        let clear = Status::new().with_pulled(0xFF);
        assert_eq!(clear.0, 0xFF & !B);

        let set = Status(U | B).with_pulled(0x00);
        assert_eq!(set.0, U | B);
    }

    #[test]
    fn test_update_nz() {
        let mut status = Status::new();
        status.update_nz(0x00);
        assert!(status.is_set(Z));
        assert!(!status.is_set(N));
        status.update_nz(0x80);
        assert!(!status.is_set(Z));
        assert!(status.is_set(N));
    }

    #[test]
    fn test_named_accessors() {
        let status = Status::from_byte(C | D | V);
        assert!(status.carry() && status.decimal() && status.overflow());
        assert!(!status.zero() && !status.negative() && !status.interrupt_disable());
        assert!(!status.break_command());
    }
}
