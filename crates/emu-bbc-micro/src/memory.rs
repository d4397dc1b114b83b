//! BBC Micro address space.
//!
//! | Range         | Contents                                   |
//! |---------------|--------------------------------------------|
//! | $0000-$7FFF   | RAM (Mode 7 screen at $7C00-$7FFF)         |
//! | $8000-$BFFF   | Paged ROM, bank selected through $FE30     |
//! | $C000-$FFFF   | OS ROM                                     |
//! | $FC00-$FCFF   | FRED (not emulated)                        |
//! | $FD00-$FDFF   | JIM (not emulated)                         |
//! | $FE00-$FEFF   | SHEILA: VIAs at $FE40/$FE60, the rest not emulated |
//!
//! Hardware that is not emulated reads as 0 and ignores writes, with a
//! warning. In strict mode such an access fails instead.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use emu_core::{Bus, BusError, Diagnostics, Observable, Value, diag};
use log::Level;
use mos_via_6522::Via;

use crate::MachineError;

pub const RAM_SIZE: usize = 0x8000;
pub const ROM_SIZE: usize = 0x4000;
pub const PAGED_ROM_START: u32 = 0x8000;
pub const OS_ROM_START: u32 = 0xC000;
pub const BANK_SELECT: u32 = 0xFE30;
pub const SYSTEM_VIA_BASE: u16 = 0xFE40;
pub const USER_VIA_BASE: u16 = 0xFE60;
pub const SYSTEM_VIA_NAME: &str = "system VIA";
pub const USER_VIA_NAME: &str = "user VIA";

/// Mode 7 screen memory, 40 x 25 character cells.
pub const VIDEO_RAM: RangeInclusive<u16> = 0x7C00..=0x7FFF;

const SHEILA: RangeInclusive<u32> = 0xFE00..=0xFEFF;
const MAX_ADDRESS: u32 = 0xFFFF;
const LOG_TARGET: &str = "bbc::memory";

/// Unemulated devices, checked before the VIAs and ROMs.
const IGNORED_HARDWARE: [(RangeInclusive<u32>, &str); 8] = [
    (0xFE08..=0xFE09, "ACIA"),
    (0xFE10..=0xFE10, "serial ULA"),
    (0xFE20..=0xFE21, "video ULA"),
    (0xFEC0..=0xFEC2, "ADC"),
    (0xFEE0..=0xFEE0, "Tube"),
    (0xFEE5..=0xFEE5, "Tube"),
    (0xFC00..=0xFCFF, "FRED"),
    (0xFD00..=0xFDFF, "JIM"),
];

fn ignored_device(address: u32) -> Option<&'static str> {
    IGNORED_HARDWARE
        .iter()
        .find(|(range, _)| range.contains(&address))
        .map(|&(_, name)| name)
}

/// RAM, ROMs and memory-mapped I/O of a Model B.
pub struct MemoryMap {
    ram: Vec<u8>,
    os_rom: Vec<u8>,
    banks: BTreeMap<u8, Vec<u8>>,
    selected_bank: u8,
    system_via: Via,
    user_via: Via,
    strict: bool,
    diagnostics: Diagnostics,
}

impl MemoryMap {
    /// Empty RAM, a blank OS ROM, no paged ROMs and both VIAs at their
    /// standard addresses.
    #[must_use]
    pub fn new(strict: bool, diagnostics: Diagnostics) -> Self {
        Self {
            ram: vec![0; RAM_SIZE],
            os_rom: vec![0; ROM_SIZE],
            banks: BTreeMap::new(),
            selected_bank: crate::config::DEFAULT_BANK,
            system_via: Via::new(SYSTEM_VIA_NAME, SYSTEM_VIA_BASE, diagnostics),
            user_via: Via::new(USER_VIA_NAME, USER_VIA_BASE, diagnostics),
            strict,
            diagnostics,
        }
    }

    /// Install the OS ROM.
    ///
    /// # Errors
    ///
    /// The image must be exactly 16 KiB.
    pub fn load_os_rom(&mut self, image: &[u8]) -> Result<(), MachineError> {
        if image.len() != ROM_SIZE {
            return Err(MachineError::RomSize {
                name: "OS ROM".into(),
                expected: ROM_SIZE,
                actual: image.len(),
            });
        }
        self.os_rom.copy_from_slice(image);
        Ok(())
    }

    /// Install a paged ROM in `bank`, replacing any earlier image there.
    /// Images shorter than 16 KiB are mirrored through the window, as an
    /// 8 KiB chip is on the real board.
    ///
    /// # Errors
    ///
    /// `bank` must be 0-F and the image 1-16384 bytes long.
    pub fn register_bank(&mut self, bank: u8, image: &[u8]) -> Result<(), MachineError> {
        if bank > 0xF {
            return Err(MachineError::MissingBank(bank));
        }
        if image.is_empty() || image.len() > ROM_SIZE || ROM_SIZE % image.len() != 0 {
            return Err(MachineError::RomSize {
                name: format!("paged ROM {bank:X}"),
                expected: ROM_SIZE,
                actual: image.len(),
            });
        }
        let mirrored = image.iter().copied().cycle().take(ROM_SIZE).collect();
        diag!(self.diagnostics, Level::Info, LOG_TARGET, "paged ROM registered in bank {bank:X}");
        self.banks.insert(bank, mirrored);
        Ok(())
    }

    #[must_use]
    pub fn selected_bank(&self) -> u8 {
        self.selected_bank
    }

    /// Select the bank answering $8000-$BFFF without going through $FE30.
    pub fn select_bank(&mut self, bank: u8) {
        self.selected_bank = bank & 0x0F;
    }

    #[must_use]
    pub fn registered_banks(&self) -> Vec<u8> {
        self.banks.keys().copied().collect()
    }

    /// The Mode 7 screen.
    #[must_use]
    pub fn video_ram(&self) -> &[u8] {
        &self.ram[usize::from(*VIDEO_RAM.start())..=usize::from(*VIDEO_RAM.end())]
    }

    #[must_use]
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    /// Copy `data` into RAM at `address`. Used to place test programs.
    ///
    /// # Errors
    ///
    /// The data must fit below $8000.
    pub fn load_ram(&mut self, address: u16, data: &[u8]) -> Result<(), BusError> {
        let start = usize::from(address);
        let end = start + data.len();
        if end > RAM_SIZE {
            return Err(BusError::WriteOutOfRange {
                address: end as u32 - 1,
                value: data.last().copied().unwrap_or_default(),
            });
        }
        self.ram[start..end].copy_from_slice(data);
        Ok(())
    }

    #[must_use]
    pub fn system_via(&self) -> &Via {
        &self.system_via
    }

    pub fn system_via_mut(&mut self) -> &mut Via {
        &mut self.system_via
    }

    #[must_use]
    pub fn user_via(&self) -> &Via {
        &self.user_via
    }

    pub fn user_via_mut(&mut self) -> &mut Via {
        &mut self.user_via
    }

    /// Read a byte.
    ///
    /// # Errors
    ///
    /// Out-of-range addresses, and unemulated hardware in strict mode.
    pub fn get(&mut self, address: u32) -> Result<u8, BusError> {
        if address < PAGED_ROM_START {
            return Ok(self.ram[address as usize]);
        }
        if let Some(name) = ignored_device(address) {
            return self.ignored_read(name, address);
        }
        if self.system_via.decodes(address) {
            return Ok(self.system_via.get(via_offset(address, SYSTEM_VIA_BASE)));
        }
        if self.user_via.decodes(address) {
            return Ok(self.user_via.get(via_offset(address, USER_VIA_BASE)));
        }
        if SHEILA.contains(&address) {
            return self.ignored_read("SHEILA", address);
        }
        if (OS_ROM_START..=MAX_ADDRESS).contains(&address) {
            return Ok(self.os_rom[(address - OS_ROM_START) as usize]);
        }
        if (PAGED_ROM_START..OS_ROM_START).contains(&address) {
            return Ok(self.paged_read(address));
        }
        Err(BusError::ReadOutOfRange { address })
    }

    /// Write a byte.
    ///
    /// # Errors
    ///
    /// Writes to either ROM, out-of-range addresses, and unemulated
    /// hardware in strict mode.
    pub fn set(&mut self, address: u32, value: u8) -> Result<(), BusError> {
        if address < PAGED_ROM_START {
            self.ram[address as usize] = value;
            return Ok(());
        }
        if address == BANK_SELECT {
            self.selected_bank = value & 0x0F;
            diag!(self.diagnostics, Level::Debug, LOG_TARGET, "paged ROM bank {:X} selected", self.selected_bank);
            return Ok(());
        }
        if let Some(name) = ignored_device(address) {
            return self.ignored_write(name, address, value);
        }
        if self.system_via.decodes(address) {
            self.system_via.set(via_offset(address, SYSTEM_VIA_BASE), value);
            return Ok(());
        }
        if self.user_via.decodes(address) {
            self.user_via.set(via_offset(address, USER_VIA_BASE), value);
            return Ok(());
        }
        if SHEILA.contains(&address) {
            return self.ignored_write("SHEILA", address, value);
        }
        if (OS_ROM_START..=MAX_ADDRESS).contains(&address) {
            return Err(BusError::ReadOnly {
                region: "OS ROM".into(),
                address,
            });
        }
        if (PAGED_ROM_START..OS_ROM_START).contains(&address) {
            return Err(BusError::ReadOnly {
                region: format!("page {:X}", self.selected_bank),
                address,
            });
        }
        Err(BusError::WriteOutOfRange { address, value })
    }

    fn paged_read(&self, address: u32) -> u8 {
        match self.banks.get(&self.selected_bank) {
            Some(image) => image[(address - PAGED_ROM_START) as usize],
            None => {
                diag!(
                    self.diagnostics,
                    Level::Debug,
                    LOG_TARGET,
                    "read {address:#06X} from empty bank {:X}",
                    self.selected_bank
                );
                0
            }
        }
    }

    fn ignored_read(&self, name: &'static str, address: u32) -> Result<u8, BusError> {
        diag!(self.diagnostics, Level::Warn, LOG_TARGET, "{name} ignored hardware read {address:#06X}");
        if self.strict {
            return Err(BusError::IgnoredHardware { name, address });
        }
        Ok(0)
    }

    fn ignored_write(&self, name: &'static str, address: u32, value: u8) -> Result<(), BusError> {
        diag!(
            self.diagnostics,
            Level::Warn,
            LOG_TARGET,
            "{name} ignored hardware write {address:#06X} ({value:#04X})"
        );
        if self.strict {
            return Err(BusError::IgnoredHardware { name, address });
        }
        Ok(())
    }
}

fn via_offset(address: u32, base: u16) -> u8 {
    (address - u32::from(base)) as u8
}

impl Bus for MemoryMap {
    fn read(&mut self, address: u32) -> Result<u8, BusError> {
        self.get(address)
    }

    fn write(&mut self, address: u32, value: u8) -> Result<(), BusError> {
        self.set(address, value)
    }
}

impl Observable for MemoryMap {
    fn query(&self, path: &str) -> Option<Value> {
        match path {
            "selected_bank" => Some(self.selected_bank.into()),
            "banks" => Some(Value::Array(self.banks.keys().map(|&bank| bank.into()).collect())),
            "strict" => Some(self.strict.into()),
            _ => {
                if let Some(rest) = path.strip_prefix("system_via.") {
                    return self.system_via.query(rest);
                }
                if let Some(rest) = path.strip_prefix("user_via.") {
                    return self.user_via.query(rest);
                }
                let address = crate::config::parse_hex_u16(path.strip_prefix("ram.")?)?;
                self.ram.get(usize::from(address)).map(|&byte| byte.into())
            }
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &["selected_bank", "banks", "strict"]
    }
}
