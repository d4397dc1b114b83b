//! Logging of accesses to named address ranges.

use emu_core::{Bus, BusError, Diagnostics, diag};
use log::Level;

use crate::MemoryWatch;

const LOG_TARGET: &str = "bbc::watch";

/// A bus that logs every access falling inside one of its watches and
/// otherwise passes straight through.
pub struct WatchedBus<B> {
    inner: B,
    watches: Vec<MemoryWatch>,
    diagnostics: Diagnostics,
}

impl<B: Bus> WatchedBus<B> {
    #[must_use]
    pub fn new(inner: B, watches: Vec<MemoryWatch>, diagnostics: Diagnostics) -> Self {
        Self {
            inner,
            watches,
            diagnostics,
        }
    }

    #[must_use]
    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut B {
        &mut self.inner
    }

    #[must_use]
    pub fn watches(&self) -> &[MemoryWatch] {
        &self.watches
    }

    fn log(&self, access: &str, address: u32, value: u8) {
        if !self.diagnostics.enabled(Level::Debug) {
            return;
        }
        for watch in self.watches.iter().filter(|watch| watch.matches(address)) {
            diag!(
                self.diagnostics,
                Level::Debug,
                LOG_TARGET,
                "{} watched {access} at {address:#06X} value {value:#04X}",
                watch.name
            );
        }
    }
}

impl<B: Bus> Bus for WatchedBus<B> {
    fn read(&mut self, address: u32) -> Result<u8, BusError> {
        let value = self.inner.read(address)?;
        self.log("get", address, value);
        Ok(value)
    }

    fn write(&mut self, address: u32, value: u8) -> Result<(), BusError> {
        self.log("set", address, value);
        self.inner.write(address, value)
    }
}
