//! The assembled Model B and its batch-stepping processor loop.

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::{Cpu, Diagnostics, InterruptState, Observable, SharedTimer, TimerManager, Value, diag};
use log::{Level, LevelFilter};
use mos_6502::{CpuState, Mos6502};

use crate::frame_timer::{FrameTimer, RepaintHook};
use crate::memory::MemoryMap;
use crate::pacing::SpeedReporter;
use crate::watch::WatchedBus;
use crate::{BbcConfig, MachineError};

const LOG_TARGET: &str = "bbc::cpu";

/// What one call to [`BbcMicro::run_batch`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch {
    /// CPU cycles the batch was allowed before the nearest timer deadline.
    pub budget: u64,
    /// CPU cycles actually executed. At least `budget`, overshooting by
    /// part of the last instruction.
    pub cycles: u64,
    pub steps: u64,
    /// Interrupt lines applied to the CPU for the next batch.
    pub interrupts: InterruptState,
    pub frame_completed: bool,
}

/// A BBC Micro Model B: 6502, memory map, two VIAs and the frame timer.
///
/// Timers are shared through `Rc`, so the machine stays on the thread that
/// built it.
pub struct BbcMicro {
    cpu: Mos6502,
    state: CpuState,
    memory: WatchedBus<MemoryMap>,
    timers: TimerManager,
    frame_timer: Rc<RefCell<FrameTimer>>,
    default_batch_cycles: u64,
    speed: SpeedReporter,
    diagnostics: Diagnostics,
}

impl BbcMicro {
    /// Build the machine, run the power-on VIA setup and reset the CPU.
    ///
    /// # Errors
    ///
    /// Bad ROM images, a broken opcode table, or a reset vector that cannot
    /// be read.
    pub fn new(config: BbcConfig, repaint: RepaintHook) -> Result<Self, MachineError> {
        let diagnostics = config.diagnostics;

        let mut memory = MemoryMap::new(config.strict_hardware, diagnostics);
        memory.load_os_rom(&config.os_rom)?;
        for rom in &config.paged_roms {
            memory.register_bank(rom.bank, &rom.image)?;
        }
        memory.select_bank(config.selected_bank);
        memory.system_via_mut().power_on();
        memory.user_via_mut().power_on();

        let mut timers = TimerManager::new(config.cpu_clock, config.system_clock, diagnostics);
        timers.register_timer(memory.system_via().timer_handle());
        timers.register_timer(memory.user_via().timer_handle());
        let frame_timer = Rc::new(RefCell::new(FrameTimer::new(
            config.system_clock,
            config.frames_per_second,
            repaint,
            diagnostics,
        )));
        let shared: SharedTimer = frame_timer.clone();
        timers.register_timer(shared);

        let cpu_diagnostics = if config.trace_instructions {
            Diagnostics::new(LevelFilter::Trace)
        } else {
            diagnostics
        };
        let cpu = Mos6502::new()?.with_diagnostics(cpu_diagnostics);

        let mut memory = WatchedBus::new(memory, config.watches, diagnostics);
        let state = match config.entry_point {
            Some(pc) => {
                diag!(diagnostics, Level::Info, LOG_TARGET, "starting at {pc:#06X}");
                CpuState::at(pc)
            }
            None => cpu.reset(&mut memory)?,
        };

        Ok(Self {
            cpu,
            state,
            memory,
            timers,
            frame_timer,
            default_batch_cycles: config.default_batch_cycles.max(1),
            speed: SpeedReporter::new("CPU", diagnostics),
            diagnostics,
        })
    }

    /// Run instructions until the nearest timer deadline, then tick the
    /// timers and latch their interrupt lines into the CPU.
    ///
    /// A raised `key_pressed` forces the System VIA flags on and asserts
    /// IRQ alongside whatever the timers report.
    ///
    /// # Errors
    ///
    /// Any fatal CPU or bus error. The machine state is left as it was
    /// after the last successful step.
    pub fn run_batch(&mut self, key_pressed: bool) -> Result<Batch, MachineError> {
        let budget = self
            .timers
            .available_cpu_ticks()
            .unwrap_or(self.default_batch_cycles)
            .max(1);
        let start = self.state.cycle_count;
        let mut steps = 0;
        while self.state.cycle_count - start < budget {
            self.state = self.cpu.step(&self.state, &mut self.memory)?;
            steps += 1;
        }
        let cycles = self.state.cycle_count - start;

        let mut interrupts = self.timers.cpu_tick(cycles);
        if key_pressed {
            diag!(self.diagnostics, Level::Debug, LOG_TARGET, "key interrupt");
            self.memory.inner_mut().system_via_mut().enable_interrupt_externally();
            interrupts |= InterruptState::IRQ;
        }
        self.state.irq_pending = interrupts.irq;
        self.state.nmi_pending |= interrupts.nmi;

        self.speed.increment(cycles);
        let frame_completed = self.frame_timer.borrow_mut().take_frame_completed();
        Ok(Batch {
            budget,
            cycles,
            steps,
            interrupts,
            frame_completed,
        })
    }

    /// Run whole batches until at least `cycles` CPU cycles have passed.
    /// Returns the number of frames completed.
    ///
    /// # Errors
    ///
    /// See [`run_batch`](Self::run_batch).
    pub fn run_cycles(&mut self, cycles: u64) -> Result<u64, MachineError> {
        let target = self.state.cycle_count.saturating_add(cycles);
        let mut frames = 0;
        while self.state.cycle_count < target {
            if self.run_batch(false)?.frame_completed {
                frames += 1;
            }
        }
        Ok(frames)
    }

    #[must_use]
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    /// Replace the CPU state, e.g. to start a loaded program.
    pub fn set_state(&mut self, state: CpuState) {
        self.state = state;
    }

    #[must_use]
    pub fn cpu(&self) -> &Mos6502 {
        &self.cpu
    }

    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.state.cycle_count
    }

    #[must_use]
    pub fn memory(&self) -> &MemoryMap {
        self.memory.inner()
    }

    pub fn memory_mut(&mut self) -> &mut MemoryMap {
        self.memory.inner_mut()
    }

    #[must_use]
    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frame_timer.borrow().frames()
    }

    #[must_use]
    pub fn video_ram(&self) -> &[u8] {
        self.memory.inner().video_ram()
    }
}

impl Observable for BbcMicro {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "frames" => Some(self.frames().into()),
            "cycles" => Some(self.cycles().into()),
            _ => {
                if let Some(rest) = path.strip_prefix("cpu.") {
                    return self.state.query(rest);
                }
                self.memory.inner().query(path.strip_prefix("memory.")?)
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["frames", "cycles"]
    }
}

#[cfg(test)]
mod tests {
    use emu_core::Bus;

    use super::*;
    use crate::memory::ROM_SIZE;

    /// OS ROM whose reset vector points at `program`, placed at $C000.
    fn os_rom(program: &[u8]) -> Vec<u8> {
        let mut rom = vec![0xEA; ROM_SIZE];
        rom[..program.len()].copy_from_slice(program);
        rom[0x3FFC] = 0x00;
        rom[0x3FFD] = 0xC0;
        rom
    }

    fn machine(program: &[u8]) -> BbcMicro {
        let mut config = BbcConfig::new(os_rom(program));
        config.diagnostics = Diagnostics::QUIET;
        BbcMicro::new(config, Box::new(|| {})).unwrap()
    }

    #[test]
    fn test_reset_reads_os_vector() {
        let machine = machine(&[0x4C, 0x00, 0xC0]);
        assert_eq!(machine.state().regs.pc, 0xC000);
        assert_eq!(machine.cycles(), 0);
    }

    #[test]
    fn test_entry_point_overrides_reset() {
        let mut config = BbcConfig::new(os_rom(&[]));
        config.diagnostics = Diagnostics::QUIET;
        config.entry_point = Some(0x1900);
        let machine = BbcMicro::new(config, Box::new(|| {})).unwrap();
        assert_eq!(machine.state().regs.pc, 0x1900);
    }

    #[test]
    fn test_wrong_os_size_is_rejected() {
        let mut config = BbcConfig::new(vec![0; 10]);
        config.diagnostics = Diagnostics::QUIET;
        assert!(matches!(
            BbcMicro::new(config, Box::new(|| {})),
            Err(MachineError::RomSize { actual: 10, .. })
        ));
    }

    #[test]
    fn test_power_on_initialises_vias() {
        let mut machine = machine(&[0x4C, 0x00, 0xC0]);
        let memory = machine.memory_mut();
        assert_eq!(memory.read(0xFE40), Ok(0xFF), "ORB");
        assert_eq!(memory.read(0xFE43), Ok(0xFF), "DDRA");
        assert_eq!(memory.read(0xFE62), Ok(0x00), "DDRB");
    }

    #[test]
    fn test_timers_registered_by_name() {
        let machine = machine(&[0x4C, 0x00, 0xC0]);
        let names: Vec<_> = machine.timers().timer_names().collect();
        assert_eq!(names, vec!["frame", "system VIA", "user VIA"]);
    }

    #[test]
    fn test_observable_paths() {
        let machine = machine(&[0x4C, 0x00, 0xC0]);
        assert_eq!(machine.query("cpu.pc"), Some(Value::U16(0xC000)));
        assert_eq!(machine.query("memory.selected_bank"), Some(Value::U8(0xF)));
        assert_eq!(machine.query("frames"), Some(Value::U64(0)));
        assert_eq!(machine.query("nonsense"), None);
    }
}
