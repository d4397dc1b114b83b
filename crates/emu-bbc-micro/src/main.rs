//! BBC Micro Model B emulator (headless).
//!
//! Usage: emu-bbc-micro --os roms/os12.rom --rom F=roms/basic2.rom [OPTIONS]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use emu_bbc_micro::config::{cycles_for_seconds, parse_hex_u16};
use emu_bbc_micro::{BbcConfig, EmulatorHandle, MemoryWatch, Pacing, RunSummary};
use emu_core::{Diagnostics, Observable};
use log::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "emu-bbc-micro", about = "BBC Micro Model B emulator (headless).")]
struct Args {
    /// OS ROM image (16 KiB).
    #[arg(long, value_name = "PATH")]
    os: PathBuf,

    /// Sideways ROM for a bank, as BANK=PATH with a hex bank number.
    #[arg(long = "rom", value_name = "BANK=PATH")]
    roms: Vec<String>,

    /// Fail on accesses to hardware that is not emulated.
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Run as fast as possible instead of at 60 frames per second.
    #[arg(long, default_value_t = false)]
    unlimited: bool,

    /// Emulated seconds to run before exiting. Runs until killed if absent.
    #[arg(long, value_name = "N")]
    seconds: Option<u64>,

    /// Start execution here instead of at the reset vector.
    #[arg(long, value_name = "ADDR", value_parser = parse_address)]
    entry: Option<u16>,

    /// Log accesses to a named range, as NAME=LOW-HIGH.
    #[arg(long = "watch", value_name = "NAME=LOW-HIGH")]
    watches: Vec<MemoryWatch>,

    /// Log every instruction.
    #[arg(long, default_value_t = false)]
    trace: bool,

    /// Log level for the emulator components.
    #[arg(long, value_name = "LEVEL", default_value_t = LevelFilter::Warn)]
    log_level: LevelFilter,

    /// Print the Mode 7 screen as text on exit.
    #[arg(long, default_value_t = false)]
    print_screen: bool,
}

fn parse_address(text: &str) -> Result<u16, String> {
    parse_hex_u16(text).ok_or_else(|| format!("not a hex address: {text}"))
}

fn read_rom(path: &Path, what: &str) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("cannot read {what} at {}", path.display()))
}

fn parse_rom_arg(arg: &str) -> Result<(u8, PathBuf)> {
    let Some((bank, path)) = arg.split_once('=') else {
        bail!("expected BANK=PATH, got {arg:?}");
    };
    let bank = u8::from_str_radix(bank.trim(), 16).with_context(|| format!("bad bank number in {arg:?}"))?;
    Ok((bank, PathBuf::from(path)))
}

fn build_config(args: Args) -> Result<BbcConfig> {
    let mut config = BbcConfig::new(read_rom(&args.os, "OS ROM")?);
    for arg in &args.roms {
        let (bank, path) = parse_rom_arg(arg)?;
        config = config.with_paged_rom(bank, read_rom(&path, "paged ROM")?);
    }
    config.strict_hardware = args.strict;
    if args.unlimited {
        config.pacing = Pacing::Unlimited;
    }
    config.cycle_limit = args.seconds.map(cycles_for_seconds);
    config.entry_point = args.entry;
    config.watches = args.watches;
    config.trace_instructions = args.trace;
    config.diagnostics = Diagnostics::new(args.log_level);
    Ok(config)
}

fn print_summary(summary: &RunSummary) {
    println!("Stopped after {} frames", summary.frames);
    let state = &summary.state;
    for path in state.query_paths() {
        if let Some(value) = state.query(path) {
            println!("  cpu.{path:<12} {value}");
        }
    }
    for (name, values) in [("system_via", &summary.system_via), ("user_via", &summary.user_via)] {
        for (path, value) in values {
            println!("  {name}.{path:<11} {value}");
        }
    }
}

fn run(args: Args) -> Result<()> {
    let print_screen = args.print_screen;
    let log_level = if args.trace { LevelFilter::Trace } else { args.log_level };
    env_logger::Builder::new().filter_level(log_level).init();

    let config = build_config(args)?;
    let handle = EmulatorHandle::spawn(config, || {}).context("cannot start the emulator")?;
    let video = handle.video();
    let summary = handle.join().context("emulation failed")?;

    print_summary(&summary);
    if print_screen {
        for line in video.text_lines() {
            println!("|{line}|");
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("fatal: {err:#}");
        std::process::exit(1);
    }
}
