//! Batch stepping, frame timing and the key interrupt on a machine built
//! around a synthetic OS ROM.

use std::cell::Cell;
use std::rc::Rc;

use emu_bbc_micro::memory::ROM_SIZE;
use emu_bbc_micro::{BbcConfig, BbcMicro, MachineError, Pacing, RunControls, run};
use emu_core::{Diagnostics, Observable, Value};
use mos_6502::CpuError;

const IRQ_HANDLER: usize = 0x0100;

/// OS ROM with `program` at $C000 and `handler` at $C100, which the IRQ
/// vector points at.
fn os_rom(program: &[u8], handler: &[u8]) -> Vec<u8> {
    let mut rom = vec![0xEA; ROM_SIZE];
    rom[..program.len()].copy_from_slice(program);
    rom[IRQ_HANDLER..IRQ_HANDLER + handler.len()].copy_from_slice(handler);
    rom[0x3FFC..].copy_from_slice(&[0x00, 0xC0, 0x00, 0xC1]);
    rom
}

fn config(program: &[u8], handler: &[u8]) -> BbcConfig {
    let mut config = BbcConfig::new(os_rom(program, handler));
    config.diagnostics = Diagnostics::QUIET;
    config
}

fn counting_machine(config: BbcConfig) -> (BbcMicro, Rc<Cell<u32>>) {
    let repaints = Rc::new(Cell::new(0));
    let counter = Rc::clone(&repaints);
    let machine = BbcMicro::new(config, Box::new(move || counter.set(counter.get() + 1))).unwrap();
    (machine, repaints)
}

fn controls() -> RunControls {
    RunControls::new(Pacing::Unlimited, Diagnostics::QUIET)
}

/// JMP $C000
const SPIN: [u8; 3] = [0x4C, 0x00, 0xC0];

#[test]
fn test_batches_end_at_timer_deadlines() {
    let (mut machine, repaints) = counting_machine(config(&SPIN, &[]));
    let ticks_per_frame = 1_000_000 / 60;

    // Power-on starts both VIA timers at zero, so the first deadline is
    // one system tick away.
    let first = machine.run_batch(false).unwrap();
    assert_eq!(first.budget, 2);
    assert_eq!(first.cycles, 3);
    assert_eq!(first.steps, 1);
    assert!(!first.frame_completed);
    assert_eq!(machine.timers().remainder(), 1);

    // With the VIA timers expired, the frame timer sets the next deadline.
    let second = machine.run_batch(false).unwrap();
    assert_eq!(second.budget, (ticks_per_frame - 1) * 2);
    assert!(second.cycles >= second.budget);
    assert!(second.frame_completed);
    assert_eq!(repaints.get(), 1);
    assert_eq!(machine.frames(), 1);
}

#[test]
fn test_repaint_once_per_frame() {
    let (mut machine, repaints) = counting_machine(config(&SPIN, &[]));
    let frames = machine.run_cycles(1_990_000).unwrap();
    assert_eq!(frames, 60);
    assert_eq!(repaints.get(), 60);
    assert_eq!(machine.frames(), 60);
    assert!(machine.cycles() >= 1_990_000);
}

#[test]
fn test_key_interrupt_enters_irq_handler() {
    // CLI, then spin. The handler counts entries in $70 and spins with I set.
    let program = [0x58, 0x4C, 0x01, 0xC0];
    let handler = [0xE6, 0x70, 0x4C, 0x02, 0xC1];
    let (mut machine, _) = counting_machine(config(&program, &handler));

    machine.run_batch(false).unwrap();
    let batch = machine.run_batch(true).unwrap();
    assert!(batch.interrupts.irq);
    assert!(machine.state().irq_pending);
    assert_eq!(machine.query("memory.system_via.ifr"), Some(Value::U8(0xFF)));

    machine.run_batch(false).unwrap();
    assert_eq!(machine.memory().ram()[0x70], 1);
    assert_eq!(machine.query("cpu.flags.i"), Some(Value::Bool(true)));
    assert!((0xC102..=0xC104).contains(&machine.state().regs.pc));
    assert!(!machine.state().irq_pending, "VIA has no enabled sources");
}

#[test]
fn test_masked_key_interrupt_waits() {
    let (mut machine, _) = counting_machine(config(&SPIN, &[0xE6, 0x70, 0x40]));
    machine.run_batch(false).unwrap();
    machine.run_batch(true).unwrap();
    machine.run_batch(false).unwrap();
    assert_eq!(machine.memory().ram()[0x70], 0, "I is set after reset");
}

#[test]
fn test_run_consumes_key_and_honours_cycle_limit() {
    let program = [0x58, 0x4C, 0x01, 0xC0];
    let handler = [0xE6, 0x70, 0x4C, 0x02, 0xC1];
    let (mut machine, _) = counting_machine(config(&program, &handler));
    let mut controls = controls();
    controls.cycle_limit = Some(100_000);
    controls.key.raise();

    let summary = run(&mut machine, &controls).unwrap();
    assert!(!controls.key.is_raised());
    assert!(machine.cycles() >= 100_000);
    assert_eq!(machine.memory().ram()[0x70], 1);
    assert_eq!(summary.state, *machine.state());
    assert!(summary.frames >= 1);
    assert!(summary.system_via.iter().any(|(path, value)| *path == "ifr" && *value == Value::U8(0xFF)));
}

#[test]
fn test_stop_signal_ends_run_before_first_batch() {
    let (mut machine, _) = counting_machine(config(&SPIN, &[]));
    let controls = controls();
    controls.stop.stop();
    let summary = run(&mut machine, &controls).unwrap();
    assert_eq!(summary.state.cycle_count, 0);
    assert_eq!(summary.frames, 0);
}

#[test]
fn test_illegal_opcode_ends_run() {
    let (mut machine, _) = counting_machine(config(&[0xEA, 0x02], &[]));
    let err = run(&mut machine, &controls()).unwrap_err();
    assert!(matches!(
        err,
        MachineError::Cpu(CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0xC001,
            cycles: 2
        })
    ));
    assert_eq!(err.to_string(), "illegal opcode 0x02 at 0xC001 after 2 cycles");
}

#[test]
fn test_video_snapshot_follows_frames() {
    // LDA #'A' ; STA $7C00 ; spin
    let program = [0xA9, 0x41, 0x8D, 0x00, 0x7C, 0x4C, 0x05, 0xC0];
    let (mut machine, _) = counting_machine(config(&program, &[]));
    let mut controls = controls();
    controls.cycle_limit = Some(40_000);
    run(&mut machine, &controls).unwrap();
    let lines = controls.video.text_lines();
    assert!(lines[0].starts_with('A'));
}

#[test]
fn test_strict_hardware_failure_ends_run() {
    // LDA $FE08 (ACIA)
    let mut config = config(&[0xAD, 0x08, 0xFE], &[]);
    config.strict_hardware = true;
    let (mut machine, _) = counting_machine(config);
    let err = run(&mut machine, &controls()).unwrap_err();
    assert!(matches!(err, MachineError::Cpu(CpuError::Execution { pc: 0xC000, .. })));
}

#[test]
fn test_emulator_handle_runs_to_limit() {
    let mut config = config(&SPIN, &[]);
    config.pacing = Pacing::Unlimited;
    config.cycle_limit = Some(50_000);
    let handle = emu_bbc_micro::EmulatorHandle::spawn(config, || {}).unwrap();
    let summary = handle.join().unwrap();
    assert!(summary.state.cycle_count >= 50_000);
    assert_eq!(summary.state.regs.pc, 0xC000);
}

#[test]
fn test_emulator_handle_reports_build_errors() {
    let mut config = BbcConfig::new(vec![0; 5]);
    config.diagnostics = Diagnostics::QUIET;
    let handle = emu_bbc_micro::EmulatorHandle::spawn(config, || {}).unwrap();
    assert!(matches!(handle.join(), Err(MachineError::RomSize { actual: 5, .. })));
}
