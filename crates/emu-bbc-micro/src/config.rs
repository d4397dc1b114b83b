//! BBC Micro configuration: clocks, ROM images and run options.

use std::ops::RangeInclusive;
use std::str::FromStr;

use emu_core::{Diagnostics, MasterClock};
use thiserror::Error;

/// CPU clock of the Model B.
pub const CPU_CLOCK_HZ: u64 = 2_000_000;

/// Clock driving the VIAs and the frame timer.
pub const SYSTEM_CLOCK_HZ: u64 = 1_000_000;

/// Bank selected at power-on. BASIC normally lives here.
pub const DEFAULT_BANK: u8 = 0xF;

/// CPU cycles in `seconds` of emulated time, saturating at `u64::MAX`.
#[must_use]
pub const fn cycles_for_seconds(seconds: u64) -> u64 {
    seconds.saturating_mul(CPU_CLOCK_HZ)
}

/// How the run loop relates emulated time to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Run as fast as the host allows.
    Unlimited,
    /// Sleep after each frame to hold this frame rate.
    RealTime { frames_per_second: u32 },
}

/// A sideways ROM image and the bank it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedRom {
    pub bank: u8,
    pub image: Vec<u8>,
}

/// A named address range whose accesses are logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWatch {
    pub name: String,
    pub range: RangeInclusive<u16>,
}

impl MemoryWatch {
    #[must_use]
    pub fn new(name: impl Into<String>, range: RangeInclusive<u16>) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }

    #[must_use]
    pub fn matches(&self, address: u32) -> bool {
        u16::try_from(address).is_ok_and(|address| self.range.contains(&address))
    }
}

/// A watch specification that did not parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected NAME=LOW-HIGH with hex addresses, got {0:?}")]
pub struct WatchParseError(String);

/// Parses `NAME=LOW-HIGH`, e.g. `IRQ1V=0204-0205`. A `$` or `0x` prefix on
/// either address is accepted.
impl FromStr for MemoryWatch {
    type Err = WatchParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WatchParseError(s.to_owned());
        let (name, range) = s.split_once('=').ok_or_else(invalid)?;
        let (low, high) = range.split_once('-').ok_or_else(invalid)?;
        let low = parse_hex_u16(low).ok_or_else(invalid)?;
        let high = parse_hex_u16(high).ok_or_else(invalid)?;
        if name.is_empty() || low > high {
            return Err(invalid());
        }
        Ok(Self::new(name, low..=high))
    }
}

/// Hex address with an optional `$` or `0x` prefix.
#[must_use]
pub fn parse_hex_u16(text: &str) -> Option<u16> {
    let digits = text
        .trim()
        .trim_start_matches('$')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).ok()
}

/// Configuration for constructing a [`BbcMicro`](crate::BbcMicro).
#[derive(Debug, Clone)]
pub struct BbcConfig {
    /// OS ROM (16,384 bytes), mapped at $C000-$FFFF.
    pub os_rom: Vec<u8>,
    /// Sideways ROMs, mapped at $8000-$BFFF when selected.
    pub paged_roms: Vec<PagedRom>,
    /// Bank selected before the OS writes $FE30.
    pub selected_bank: u8,
    pub cpu_clock: MasterClock,
    pub system_clock: MasterClock,
    /// Frame rate of the frame timer (repaints per emulated second).
    pub frames_per_second: u32,
    /// Fail on accesses to unemulated hardware instead of reading 0.
    pub strict_hardware: bool,
    pub pacing: Pacing,
    /// CPU cycles per batch when no timer has a deadline.
    pub default_batch_cycles: u64,
    /// Start here instead of at the reset vector.
    pub entry_point: Option<u16>,
    /// Stop after this many CPU cycles.
    pub cycle_limit: Option<u64>,
    /// Log every instruction at trace level.
    pub trace_instructions: bool,
    pub watches: Vec<MemoryWatch>,
    pub diagnostics: Diagnostics,
}

impl BbcConfig {
    /// Model B defaults around the given OS ROM.
    #[must_use]
    pub fn new(os_rom: Vec<u8>) -> Self {
        Self {
            os_rom,
            paged_roms: Vec::new(),
            selected_bank: DEFAULT_BANK,
            cpu_clock: MasterClock::new(CPU_CLOCK_HZ),
            system_clock: MasterClock::new(SYSTEM_CLOCK_HZ),
            frames_per_second: 60,
            strict_hardware: false,
            pacing: Pacing::RealTime { frames_per_second: 60 },
            default_batch_cycles: 2_000,
            entry_point: None,
            cycle_limit: None,
            trace_instructions: false,
            watches: Vec::new(),
            diagnostics: Diagnostics::default(),
        }
    }

    #[must_use]
    pub fn with_paged_rom(mut self, bank: u8, image: Vec<u8>) -> Self {
        self.paged_roms.push(PagedRom { bank, image });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BbcConfig::new(vec![0; 0x4000]);
        assert_eq!(config.cpu_clock.frequency_hz, 2_000_000);
        assert_eq!(config.system_clock.frequency_hz, 1_000_000);
        assert_eq!(config.selected_bank, 0xF);
        assert_eq!(config.pacing, Pacing::RealTime { frames_per_second: 60 });
        assert!(!config.strict_hardware);
        assert_eq!(config.default_batch_cycles, 2_000);
        assert_eq!(config.cycle_limit, None);
    }

    #[test]
    fn test_parse_watch() {
        let watch: MemoryWatch = "IRQ1V=0204-0205".parse().unwrap();
        assert_eq!(watch, MemoryWatch::new("IRQ1V", 0x0204..=0x0205));
        assert!(watch.matches(0x0205));
        assert!(!watch.matches(0x0206));
        assert!(!watch.matches(0x1_0204));

        let watch: MemoryWatch = "SHEILA=$FE00-0xFEFF".parse().unwrap();
        assert_eq!(watch.range, 0xFE00..=0xFEFF);
    }

    #[test]
    fn test_parse_watch_rejects_garbage() {
        assert!("IRQ".parse::<MemoryWatch>().is_err());
        assert!("IRQ=FFFF".parse::<MemoryWatch>().is_err());
        assert!("IRQ=FFFF-0000".parse::<MemoryWatch>().is_err());
        assert!("=0000-0001".parse::<MemoryWatch>().is_err());
        assert!("X=GG-HH".parse::<MemoryWatch>().is_err());

        let err = "IRQ".parse::<MemoryWatch>().unwrap_err();
        assert_eq!(err.to_string(), "expected NAME=LOW-HIGH with hex addresses, got \"IRQ\"");
    }

    #[test]
    fn test_cycles_for_seconds() {
        assert_eq!(cycles_for_seconds(0), 0);
        assert_eq!(cycles_for_seconds(3), 6_000_000);
        assert_eq!(cycles_for_seconds(u64::MAX), u64::MAX);
    }
}
