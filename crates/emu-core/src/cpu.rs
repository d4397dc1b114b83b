//! CPU core trait.

use crate::Bus;

/// An instruction-stepped CPU core.
///
/// The core itself holds only immutable decode tables. All mutable CPU
/// state lives in [`Cpu::State`], which is passed in and handed back by
/// value on every step, so two runs from equal states over equal memory
/// produce equal states.
pub trait Cpu {
    /// Register file and pending-interrupt flags.
    type State: Copy + PartialEq;

    /// A fatal condition that stops execution.
    type Error: std::error::Error;

    /// State after power-on, with the program counter taken from the reset
    /// vector.
    fn reset(&self, bus: &mut dyn Bus) -> Result<Self::State, Self::Error>;

    /// Run one instruction, or enter a pending interrupt, and return the
    /// resulting state.
    fn step(&self, state: &Self::State, bus: &mut dyn Bus) -> Result<Self::State, Self::Error>;

    /// Program counter of `state`.
    ///
    /// Returns `u32` so CPUs with wider address buses fit the same trait.
    fn pc(state: &Self::State) -> u32;

    /// Cycles executed since reset.
    fn cycles(state: &Self::State) -> u64;
}
