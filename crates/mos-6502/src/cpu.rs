//! The stepping core.

use emu_core::{Bus, BusError, Cpu, Diagnostics, diag};
use log::Level;

use crate::flags::I;
use crate::{CpuError, CpuState, InstructionTable, Mnemonic, TableError};

/// Address of the reset vector.
pub const RESET_VECTOR: u16 = 0xFFFC;

/// Address of the IRQ/BRK vector.
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// Address of the NMI vector.
pub const NMI_VECTOR: u16 = 0xFFFA;

/// Cycles charged for entering an IRQ or NMI.
pub const INTERRUPT_CYCLES: u8 = 7;

const LOG_TARGET: &str = "bbc::cpu";

/// NMOS 6502.
///
/// Holds only the validated opcode table and the log level, so a single
/// core can step any number of independent [`CpuState`]s.
#[derive(Debug, Clone)]
pub struct Mos6502 {
    table: InstructionTable,
    diagnostics: Diagnostics,
}

impl Mos6502 {
    /// Core with the documented opcode table.
    ///
    /// # Errors
    ///
    /// Fails if the table has a duplicate or a missing opcode.
    pub fn new() -> Result<Self, TableError> {
        Ok(Self {
            table: InstructionTable::official()?,
            diagnostics: Diagnostics::default(),
        })
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    #[must_use]
    pub fn table(&self) -> &InstructionTable {
        &self.table
    }

    /// Step until an instruction leaves the program counter where it was,
    /// which is how test ROMs signal both success and failure. The trap is
    /// reported as [`CpuError::StuckProgramCounter`] carrying its address.
    ///
    /// # Errors
    ///
    /// [`CpuError::StuckProgramCounter`] on a jump or branch to itself, any
    /// step error, or [`CpuError::StepLimit`] after `max_steps` steps
    /// without a trap.
    pub fn run_until_trap(&self, state: CpuState, bus: &mut dyn Bus, max_steps: u64) -> Result<CpuState, CpuError> {
        let mut state = state;
        for _ in 0..max_steps {
            let next = self.step(&state, bus)?;
            if next.regs.pc == state.regs.pc && !state.interrupt_due() {
                return Err(CpuError::StuckProgramCounter {
                    pc: state.regs.pc,
                    cycles: state.cycle_count,
                });
            }
            state = next;
        }
        Err(CpuError::StepLimit {
            steps: max_steps,
            pc: state.regs.pc,
        })
    }

    /// Push PC and status, mask IRQ, jump through the vector. NMI wins when
    /// both are pending.
    fn enter_interrupt(&self, state: &CpuState, bus: &mut dyn Bus) -> Result<CpuState, CpuError> {
        let pc = state.regs.pc;
        let cycles = state.cycle_count;
        let failed = |source: BusError| CpuError::InterruptEntry { pc, cycles, source };

        let nmi = state.nmi_pending;
        let vector = if nmi { NMI_VECTOR } else { state.break_location };

        let mut next = *state;
        let slot = next.regs.push_word();
        bus.write_u16_to_stack(slot, pc).map_err(failed)?;
        let slot = next.regs.push();
        bus.write_byte_to_stack(slot, next.regs.p.to_byte_irq()).map_err(failed)?;
        next.regs.p.set(I);
        next.regs.pc = bus.read_u16(vector).map_err(failed)?;
        if nmi {
            next.nmi_pending = false;
        } else {
            next.irq_pending = false;
        }

        diag!(
            self.diagnostics,
            Level::Debug,
            LOG_TARGET,
            "{} at {pc:#06X} -> {:#06X}",
            if nmi { "NMI" } else { "IRQ" },
            next.regs.pc
        );
        Ok(next.charged(INTERRUPT_CYCLES))
    }
}

impl Cpu for Mos6502 {
    type State = CpuState;
    type Error = CpuError;

    fn reset(&self, bus: &mut dyn Bus) -> Result<CpuState, CpuError> {
        let pc = bus.read_u16(RESET_VECTOR).map_err(CpuError::Reset)?;
        diag!(self.diagnostics, Level::Info, LOG_TARGET, "reset to {pc:#06X}");
        Ok(CpuState::at(pc))
    }

    fn step(&self, state: &CpuState, bus: &mut dyn Bus) -> Result<CpuState, CpuError> {
        if state.interrupt_due() {
            return self.enter_interrupt(state, bus);
        }

        let pc = state.regs.pc;
        let cycles = state.cycle_count;
        let opcode = bus
            .read(u32::from(pc))
            .map_err(|source| CpuError::Fetch { pc, cycles, source })?;
        let instruction = self
            .table
            .get(opcode)
            .ok_or(CpuError::IllegalOpcode { opcode, pc, cycles })?;

        diag!(
            self.diagnostics,
            Level::Trace,
            LOG_TARGET,
            "{pc:04X}  {:02X}  {:<3} {:?}  A={:02X} X={:02X} Y={:02X} S={:02X} P={:02X} CYC={cycles}",
            opcode,
            instruction.mnemonic,
            instruction.mode,
            state.regs.a,
            state.regs.x,
            state.regs.y,
            state.regs.s,
            state.regs.p.0
        );

        let next = (instruction.operation)(instruction, *state, bus).map_err(|source| CpuError::Execution {
            pc,
            opcode,
            mnemonic: instruction.mnemonic,
            cycles,
            source,
        })?;

        if matches!(instruction.mnemonic, Mnemonic::Brk | Mnemonic::Rti) {
            diag!(
                self.diagnostics,
                Level::Debug,
                LOG_TARGET,
                "{} at {pc:#06X} -> {:#06X}",
                instruction.mnemonic,
                next.regs.pc
            );
        }
        Ok(next)
    }

    fn pc(state: &CpuState) -> u32 {
        u32::from(state.regs.pc)
    }

    fn cycles(state: &CpuState) -> u64 {
        state.cycle_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::B;
    use emu_core::SimpleBus;

    fn cpu() -> Mos6502 {
        Mos6502::new().expect("official table")
    }

    #[test]
    fn test_reset_reads_vector() {
        let mut bus = SimpleBus::new();
        bus.load(RESET_VECTOR, &[0xCD, 0xD9]);
        let state = cpu().reset(&mut bus).unwrap();
        assert_eq!(state.regs.pc, 0xD9CD);
        assert!(state.regs.p.is_set(I));
    }

    #[test]
    fn test_illegal_opcode_reports_context() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x02]);
        let mut state = CpuState::at(0x0200);
        state.cycle_count = 99;
        assert_eq!(
            cpu().step(&state, &mut bus),
            Err(CpuError::IllegalOpcode {
                opcode: 0x02,
                pc: 0x0200,
                cycles: 99
            })
        );
    }

    #[test]
    fn test_nmi_taken_even_when_masked() {
        let mut bus = SimpleBus::new();
        bus.load(NMI_VECTOR, &[0x00, 0x90]);
        let mut state = CpuState::at(0x1234);
        state.regs.s = 0xFF;
        state.nmi_pending = true;
        state.irq_pending = true;

        let next = cpu().step(&state, &mut bus).unwrap();
        assert_eq!(next.regs.pc, 0x9000);
        assert!(!next.nmi_pending);
        assert!(next.irq_pending);
        assert_eq!(next.cycle_count, 7);
        assert_eq!(bus.peek(0x01FF), 0x12);
        assert_eq!(bus.peek(0x01FE), 0x34);
        assert_eq!(bus.peek(0x01FD) & B, 0);
    }

    #[test]
    fn test_irq_waits_for_cli() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x58, 0xEA]);
        bus.load(IRQ_VECTOR, &[0x00, 0x80]);
        let mut state = CpuState::at(0x0200);
        state.irq_pending = true;

        let cpu = cpu();
        let state = cpu.step(&state, &mut bus).unwrap();
        assert_eq!(state.regs.pc, 0x0201, "CLI runs while I is set");
        let state = cpu.step(&state, &mut bus).unwrap();
        assert_eq!(state.regs.pc, 0x8000);
        assert!(state.regs.p.is_set(I));
        assert!(!state.irq_pending);
    }

    #[test]
    fn test_fetch_error_wraps_bus_error() {
        struct Broken;
        impl Bus for Broken {
            fn read(&mut self, address: u32) -> Result<u8, BusError> {
                Err(BusError::ReadOutOfRange { address })
            }
            fn write(&mut self, address: u32, value: u8) -> Result<(), BusError> {
                Err(BusError::WriteOutOfRange { address, value })
            }
        }

        let err = cpu().step(&CpuState::at(0x4000), &mut Broken).unwrap_err();
        assert!(matches!(err, CpuError::Fetch { pc: 0x4000, .. }));
    }

    #[test]
    fn test_run_until_trap_stops_on_jump_to_self() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xE8, 0xE8, 0x4C, 0x02, 0x02]);
        let err = cpu().run_until_trap(CpuState::at(0x0200), &mut bus, 100).unwrap_err();
        assert_eq!(err, CpuError::StuckProgramCounter { pc: 0x0202, cycles: 4 });
        assert_eq!(err.pc(), Some(0x0202));
        assert_eq!(err.to_string(), "program counter stuck at 0x0202 after 4 cycles");
    }

    #[test]
    fn test_jump_to_own_address_traps() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0x4C, 0x00, 0x02]);
        let err = cpu().run_until_trap(CpuState::at(0x0200), &mut bus, 100).unwrap_err();
        assert!(matches!(err, CpuError::StuckProgramCounter { pc: 0x0200, cycles: 0 }));
    }

    #[test]
    fn test_branch_to_self_traps() {
        // LDX #$00 ; BEQ *
        let mut bus = SimpleBus::new();
        bus.load(0x0300, &[0xA2, 0x00, 0xF0, 0xFE]);
        let err = cpu().run_until_trap(CpuState::at(0x0300), &mut bus, 100).unwrap_err();
        assert_eq!(err.pc(), Some(0x0302));
    }

    #[test]
    fn test_run_until_trap_gives_up() {
        let mut bus = SimpleBus::new();
        bus.load(0x0200, &[0xE8, 0x4C, 0x00, 0x02]);
        let err = cpu().run_until_trap(CpuState::at(0x0200), &mut bus, 10).unwrap_err();
        assert!(matches!(err, CpuError::StepLimit { steps: 10, .. }));
    }
}
