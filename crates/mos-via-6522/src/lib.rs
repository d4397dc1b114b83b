//! MOS 6522 Versatile Interface Adapter (VIA).
//!
//! One [`Via`] type serves every 6522 in a machine; the name and base
//! address are data. The timers and interrupt registers sit in a
//! [`ViaTimer`] shared with the machine's
//! [`TimerManager`](emu_core::TimerManager), which advances them at the
//! system clock rate.
//!
//! # Registers ($0-$F)
//!
//! | Reg | Name | Description                              |
//! |-----|------|------------------------------------------|
//! | $0  | ORB  | Port B data                              |
//! | $1  | ORA  | Port A data (same latch as $F)           |
//! | $2  | DDRB | Port B data direction                    |
//! | $3  | DDRA | Port A data direction                    |
//! | $4  | T1CL | Timer 1 counter low (read clears T1 IRQ) |
//! | $5  | T1CH | Timer 1 counter high (write starts T1)   |
//! | $6  | T1LL | Timer 1 latch low                        |
//! | $7  | T1LH | Timer 1 latch high                       |
//! | $8  | T2CL | Timer 2 counter low (read clears T2 IRQ) |
//! | $9  | T2CH | Timer 2 counter high (write starts T2)   |
//! | $A  | SR   | Shift register                           |
//! | $B  | ACR  | Auxiliary control register               |
//! | $C  | PCR  | Peripheral control register              |
//! | $D  | IFR  | Interrupt flag register                  |
//! | $E  | IER  | Interrupt enable register                |
//! | $F  | ORA  | Port A data (no handshake)               |
//!
//! Ports hold whatever was written; nothing is wired to them.

mod timer;

use std::cell::RefCell;
use std::rc::Rc;

use emu_core::{Diagnostics, Observable, SharedTimer, Value, diag};
use log::Level;

use timer::{IFR_T1, IFR_T2};
pub use timer::ViaTimer;

const LOG_TARGET: &str = "bbc::via";

/// Register offsets within a VIA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViaRegister {
    Orb,
    Ora,
    Ddrb,
    Ddra,
    T1CounterLow,
    T1CounterHigh,
    T1LatchLow,
    T1LatchHigh,
    T2CounterLow,
    T2CounterHigh,
    ShiftRegister,
    AuxiliaryControl,
    PeripheralControl,
    InterruptFlag,
    InterruptEnable,
    OraNoHandshake,
}

impl ViaRegister {
    pub const ALL: [Self; 16] = [
        Self::Orb,
        Self::Ora,
        Self::Ddrb,
        Self::Ddra,
        Self::T1CounterLow,
        Self::T1CounterHigh,
        Self::T1LatchLow,
        Self::T1LatchHigh,
        Self::T2CounterLow,
        Self::T2CounterHigh,
        Self::ShiftRegister,
        Self::AuxiliaryControl,
        Self::PeripheralControl,
        Self::InterruptFlag,
        Self::InterruptEnable,
        Self::OraNoHandshake,
    ];

    #[must_use]
    pub fn from_offset(offset: u8) -> Option<Self> {
        Self::ALL.get(usize::from(offset)).copied()
    }

    #[must_use]
    pub const fn offset(self) -> u8 {
        self as u8
    }
}

/// One 6522.
pub struct Via {
    name: String,
    base: u16,
    orb: u8,
    ora: u8,
    ddrb: u8,
    ddra: u8,
    sr: u8,
    pcr: u8,
    ca2: bool,
    cb2: bool,
    timer: Rc<RefCell<ViaTimer>>,
    diagnostics: Diagnostics,
}

impl Via {
    /// A VIA decoded at `base`. Its timer registers under `name`.
    #[must_use]
    pub fn new(name: impl Into<String>, base: u16, diagnostics: Diagnostics) -> Self {
        let name = name.into();
        Self {
            timer: Rc::new(RefCell::new(ViaTimer::new(name.clone()))),
            name,
            base,
            orb: 0,
            ora: 0,
            ddrb: 0,
            ddra: 0,
            sr: 0,
            pcr: 0,
            ca2: false,
            cb2: false,
            diagnostics,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn base(&self) -> u16 {
        self.base
    }

    /// True if `address` falls in this VIA's 16-byte window.
    #[must_use]
    pub fn decodes(&self, address: u32) -> bool {
        let base = u32::from(self.base);
        (base..base + 16).contains(&address)
    }

    /// The timer to hand to the [`TimerManager`](emu_core::TimerManager).
    #[must_use]
    pub fn timer_handle(&self) -> SharedTimer {
        self.timer.clone()
    }

    /// Read access to the timer state.
    #[must_use]
    pub fn timer(&self) -> std::cell::Ref<'_, ViaTimer> {
        self.timer.borrow()
    }

    #[must_use]
    pub fn ca2(&self) -> bool {
        self.ca2
    }

    #[must_use]
    pub fn cb2(&self) -> bool {
        self.cb2
    }

    /// Raise every interrupt flag, as a key press does on the System VIA.
    pub fn enable_interrupt_externally(&mut self) {
        diag!(self.diagnostics, Level::Debug, LOG_TARGET, "{}: IFR forced by external event", self.name);
        self.timer.borrow_mut().force_flags();
    }

    /// Register state the machine sets at power-on: zero in every register
    /// up to IER, then $FF in ORB and DDRA.
    pub fn power_on(&mut self) {
        for offset in 0x0..=0xE {
            self.set(offset, 0x00);
        }
        self.set(ViaRegister::Orb.offset(), 0xFF);
        self.set(ViaRegister::Ddra.offset(), 0xFF);
    }

    /// Read the register at `offset`. Some reads clear interrupt flags.
    pub fn get(&mut self, offset: u8) -> u8 {
        let Some(register) = ViaRegister::from_offset(offset) else {
            diag!(self.diagnostics, Level::Debug, LOG_TARGET, "{}: read of unknown offset {offset:#04X}", self.name);
            return 0;
        };
        let mut timer = self.timer.borrow_mut();
        let value = match register {
            ViaRegister::Orb => self.orb,
            ViaRegister::Ora | ViaRegister::OraNoHandshake => self.ora,
            ViaRegister::Ddrb => self.ddrb,
            ViaRegister::Ddra => self.ddra,
            ViaRegister::T1CounterLow => {
                timer.clear_flags(IFR_T1);
                timer.t1_counter().to_le_bytes()[0]
            }
            ViaRegister::T1CounterHigh => timer.t1_counter().to_le_bytes()[1],
            ViaRegister::T1LatchLow => timer.t1_latch().to_le_bytes()[0],
            ViaRegister::T1LatchHigh => timer.t1_latch().to_le_bytes()[1],
            ViaRegister::T2CounterLow => {
                timer.clear_flags(IFR_T2);
                timer.t2_counter().to_le_bytes()[0]
            }
            ViaRegister::T2CounterHigh => timer.t2_counter().to_le_bytes()[1],
            ViaRegister::ShiftRegister => self.sr,
            ViaRegister::AuxiliaryControl => timer.acr(),
            ViaRegister::PeripheralControl => self.pcr,
            ViaRegister::InterruptFlag => timer.ifr_register(),
            ViaRegister::InterruptEnable => timer.ier() | 0x80,
        };
        diag!(
            self.diagnostics,
            Level::Trace,
            LOG_TARGET,
            "{}: read {register:?} -> {value:#04X}",
            self.name
        );
        value
    }

    /// Write `value` to the register at `offset`.
    pub fn set(&mut self, offset: u8, value: u8) {
        let Some(register) = ViaRegister::from_offset(offset) else {
            diag!(
                self.diagnostics,
                Level::Debug,
                LOG_TARGET,
                "{}: write of {value:#04X} to unknown offset {offset:#04X} dropped",
                self.name
            );
            return;
        };
        diag!(
            self.diagnostics,
            Level::Trace,
            LOG_TARGET,
            "{}: write {register:?} <- {value:#04X}",
            self.name
        );
        let mut timer = self.timer.borrow_mut();
        match register {
            ViaRegister::Orb => self.orb = value,
            ViaRegister::Ora | ViaRegister::OraNoHandshake => self.ora = value,
            ViaRegister::Ddrb => self.ddrb = value,
            ViaRegister::Ddra => self.ddra = value,
            ViaRegister::T1CounterLow | ViaRegister::T1LatchLow => timer.set_t1_latch_low(value),
            ViaRegister::T1CounterHigh => timer.start_t1(value),
            ViaRegister::T1LatchHigh => timer.set_t1_latch_high(value),
            ViaRegister::T2CounterLow => timer.set_t2_latch_low(value),
            ViaRegister::T2CounterHigh => timer.start_t2(value),
            ViaRegister::ShiftRegister => self.sr = value,
            ViaRegister::AuxiliaryControl => timer.set_acr(value),
            ViaRegister::PeripheralControl => {
                self.pcr = value;
                // Manual output modes: 110 drives the line low, 111 high.
                self.ca2 = if value & 0x0E == 0x0C { false } else { value & 0x08 != 0 };
                self.cb2 = if value & 0xE0 == 0xC0 { false } else { value & 0x80 != 0 };
            }
            ViaRegister::InterruptFlag => timer.clear_flags(value),
            ViaRegister::InterruptEnable => timer.set_ier(value),
        }
    }
}

impl Observable for Via {
    fn query(&self, path: &str) -> Option<Value> {
        let timer = self.timer.borrow();
        match path {
            "name" => Some(self.name.as_str().into()),
            "orb" => Some(self.orb.into()),
            "ora" => Some(self.ora.into()),
            "ddrb" => Some(self.ddrb.into()),
            "ddra" => Some(self.ddra.into()),
            "t1.counter" => Some(timer.t1_counter().into()),
            "t1.latch" => Some(timer.t1_latch().into()),
            "t1.armed" => Some(timer.t1_armed().into()),
            "t2.counter" => Some(timer.t2_counter().into()),
            "t2.armed" => Some(timer.t2_armed().into()),
            "sr" => Some(self.sr.into()),
            "acr" => Some(timer.acr().into()),
            "pcr" => Some(self.pcr.into()),
            "ifr" => Some(timer.ifr_register().into()),
            "ier" => Some((timer.ier() | 0x80).into()),
            "ca2" => Some(self.ca2.into()),
            "cb2" => Some(self.cb2.into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "name",
            "orb",
            "ora",
            "ddrb",
            "ddra",
            "t1.counter",
            "t1.latch",
            "t1.armed",
            "t2.counter",
            "t2.armed",
            "sr",
            "acr",
            "pcr",
            "ifr",
            "ier",
            "ca2",
            "cb2",
        ]
    }
}
