//! Opcode semantics.
//!
//! Each public function here is an [`Operation`](crate::Operation). Most of
//! them are a narrow register-level function wrapped in one of the helpers
//! below, which resolve the operand, apply the function and step over the
//! instruction.

pub(crate) mod arithmetic;
pub(crate) mod branches;
pub(crate) mod compare;
pub(crate) mod flags;
pub(crate) mod flow;
pub(crate) mod load_store;
pub(crate) mod logic;
pub(crate) mod shifts;
pub(crate) mod stack;
pub(crate) mod transfer;

use emu_core::{Bus, BusError};

use crate::{AddressingMode, CpuState, Fault, Instruction, Status, position_using, read_using};

/// Read the operand, apply `apply`, step over the instruction.
pub(crate) fn with_read(
    instruction: &Instruction,
    mut state: CpuState,
    bus: &mut dyn Bus,
    apply: impl FnOnce(&mut CpuState, u8),
) -> Result<CpuState, Fault> {
    let value = read_using(instruction.mode, &state, bus)?;
    apply(&mut state, value);
    Ok(state.advanced(instruction))
}

/// Resolve the operand address, hand it to `apply`, step over the
/// instruction.
pub(crate) fn with_position(
    instruction: &Instruction,
    state: CpuState,
    bus: &mut dyn Bus,
    apply: impl FnOnce(&CpuState, &mut dyn Bus, u16) -> Result<(), BusError>,
) -> Result<CpuState, Fault> {
    let address = position_using(instruction.mode, &state, bus)?;
    apply(&state, bus, address)?;
    Ok(state.advanced(instruction))
}

/// Read-modify-write on the accumulator (implied mode) or on memory.
pub(crate) fn modify(
    instruction: &Instruction,
    mut state: CpuState,
    bus: &mut dyn Bus,
    apply: impl FnOnce(&mut Status, u8) -> u8,
) -> Result<CpuState, Fault> {
    if instruction.mode == AddressingMode::Implied {
        let a = state.regs.a;
        state.regs.a = apply(&mut state.regs.p, a);
    } else {
        let address = u32::from(position_using(instruction.mode, &state, bus)?);
        let value = bus.read(address)?;
        let result = apply(&mut state.regs.p, value);
        bus.write(address, result)?;
    }
    Ok(state.advanced(instruction))
}

/// Register-only instruction.
pub(crate) fn implied(
    instruction: &Instruction,
    mut state: CpuState,
    apply: impl FnOnce(&mut CpuState),
) -> Result<CpuState, Fault> {
    apply(&mut state);
    Ok(state.advanced(instruction))
}

#[cfg(test)]
pub(crate) mod test_support {
    use emu_core::SimpleBus;

    use crate::{CpuState, InstructionTable};

    /// Run the single instruction at $0200 built from `program`.
    pub(crate) fn run(program: &[u8], setup: impl FnOnce(&mut CpuState)) -> (CpuState, SimpleBus) {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, program);
        run_on(&mut bus, setup)
            .map(|state| (state, bus))
            .unwrap_or_else(|err| panic!("instruction failed: {err}"))
    }

    pub(crate) fn run_on(
        bus: &mut SimpleBus,
        setup: impl FnOnce(&mut CpuState),
    ) -> Result<CpuState, crate::Fault> {
        let table = InstructionTable::official().expect("official table");
        let mut state = CpuState::at(0x0200);
        setup(&mut state);
        let opcode = bus.peek(state.regs.pc);
        let instruction = table.get(opcode).expect("documented opcode");
        (instruction.operation)(instruction, state, bus)
    }
}
