//! Interrupt line state.

use core::iter::Sum;
use core::ops::{BitOr, BitOrAssign};

/// Requested interrupt lines.
///
/// Combines with `|`: a line is asserted if any source asserts it. The
/// default value asserts nothing, so folding an empty set of sources gives
/// no interrupt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InterruptState {
    /// Maskable interrupt request.
    pub irq: bool,
    /// Non-maskable interrupt request.
    pub nmi: bool,
}

impl InterruptState {
    pub const NONE: Self = Self {
        irq: false,
        nmi: false,
    };
    pub const IRQ: Self = Self {
        irq: true,
        nmi: false,
    };
    pub const NMI: Self = Self {
        irq: false,
        nmi: true,
    };
    pub const BOTH: Self = Self {
        irq: true,
        nmi: true,
    };

    /// IRQ asserted when `condition` holds.
    #[must_use]
    pub const fn irq_if(condition: bool) -> Self {
        Self {
            irq: condition,
            nmi: false,
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        !self.irq && !self.nmi
    }
}

impl BitOr for InterruptState {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            irq: self.irq || rhs.irq,
            nmi: self.nmi || rhs.nmi,
        }
    }
}

impl BitOrAssign for InterruptState {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

impl Sum for InterruptState {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::NONE, |merged, state| merged | state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_irq_and_nmi_merge_to_both() {
        assert_eq!(InterruptState::IRQ | InterruptState::NMI, InterruptState::BOTH);
    }

    #[test]
    fn test_none_is_identity() {
        for state in [
            InterruptState::NONE,
            InterruptState::IRQ,
            InterruptState::NMI,
            InterruptState::BOTH,
        ] {
            assert_eq!(state | InterruptState::NONE, state);
            assert_eq!(InterruptState::NONE | state, state);
        }
    }

    #[test]
    fn test_empty_sum_is_none() {
        let merged: InterruptState = std::iter::empty().sum();
        assert!(merged.is_none());
        assert_eq!(InterruptState::default(), InterruptState::NONE);
    }

    #[test]
    fn test_sum_folds_with_or() {
        let merged: InterruptState = [
            InterruptState::NONE,
            InterruptState::irq_if(true),
            InterruptState::NONE,
        ]
        .into_iter()
        .sum();
        assert_eq!(merged, InterruptState::IRQ);
    }
}
