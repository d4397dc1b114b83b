//! Timer 1, Timer 2 and the interrupt registers.
//!
//! These live apart from the port registers because the [`TimerManager`]
//! ticks them while the CPU only reaches them through register accesses.
//!
//! [`TimerManager`]: emu_core::TimerManager

use emu_core::{InterruptState, Ticks, Timer};

pub(crate) const IFR_T2: u8 = 0x20;
pub(crate) const IFR_T1: u8 = 0x40;

/// ACR bit 6: Timer 1 reloads from the latch on underflow.
const ACR_T1_FREE_RUN: u8 = 0x40;

/// ACR bit 5: Timer 2 counts PB6 pulses instead of system ticks.
const ACR_T2_PULSE_COUNT: u8 = 0x20;

/// A down-counter that underflows after `counter + 1` ticks.
#[derive(Debug, Clone, Copy, Default)]
struct Countdown {
    /// Wider than 16 bits because a free-running reload is `latch + 1`.
    counter: u32,
    armed: bool,
}

impl Countdown {
    fn ticks_to_underflow(self) -> u64 {
        u64::from(self.counter) + 1
    }

    fn start(&mut self, value: u16) {
        self.counter = u32::from(value);
        self.armed = true;
    }

    /// Count down `ticks`. On each underflow the counter reloads with
    /// `reload + 1` when given, otherwise it disarms and wraps to $FFFF.
    /// Returns true if an armed underflow happened.
    fn run(&mut self, ticks: u64, reload: Option<u16>) -> bool {
        let mut fired = false;
        let mut remaining = ticks;
        while remaining >= self.ticks_to_underflow() {
            remaining -= self.ticks_to_underflow();
            fired |= self.armed;
            match reload {
                Some(latch) => self.counter = u32::from(latch) + 1,
                None => {
                    self.armed = false;
                    self.counter = 0xFFFF;
                }
            }
        }
        self.counter -= remaining as u32;
        fired
    }

    /// The reload after a free-running underflow of latch $FFFF is $10000,
    /// which reads as $FFFF like the underflowed counter it stands for.
    fn register_value(self) -> u16 {
        self.counter.min(0xFFFF) as u16
    }
}

/// The timing half of a 6522: T1, T2, IFR, IER and the ACR bits that
/// steer the timers.
#[derive(Debug, Clone)]
pub struct ViaTimer {
    name: String,
    t1: Countdown,
    t1_latch: u16,
    t2: Countdown,
    t2_latch_low: u8,
    acr: u8,
    ifr: u8,
    ier: u8,
}

impl ViaTimer {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            t1: Countdown::default(),
            t1_latch: 0,
            t2: Countdown::default(),
            t2_latch_low: 0,
            acr: 0,
            ifr: 0,
            ier: 0,
        }
    }

    #[must_use]
    pub fn t1_counter(&self) -> u16 {
        self.t1.register_value()
    }

    #[must_use]
    pub fn t1_latch(&self) -> u16 {
        self.t1_latch
    }

    #[must_use]
    pub fn t1_armed(&self) -> bool {
        self.t1.armed
    }

    #[must_use]
    pub fn t2_counter(&self) -> u16 {
        self.t2.register_value()
    }

    #[must_use]
    pub fn t2_armed(&self) -> bool {
        self.t2.armed
    }

    #[must_use]
    pub fn acr(&self) -> u8 {
        self.acr
    }

    /// Stored flags, without the computed bit 7.
    #[must_use]
    pub fn ifr(&self) -> u8 {
        self.ifr
    }

    #[must_use]
    pub fn ier(&self) -> u8 {
        self.ier
    }

    /// True while an enabled flag is raised.
    #[must_use]
    pub fn irq_active(&self) -> bool {
        self.ifr & self.ier & 0x7F != 0
    }

    pub(crate) fn set_acr(&mut self, value: u8) {
        self.acr = value;
    }

    pub(crate) fn set_t1_latch_low(&mut self, value: u8) {
        self.t1_latch = (self.t1_latch & 0xFF00) | u16::from(value);
    }

    pub(crate) fn set_t1_latch_high(&mut self, value: u8) {
        self.t1_latch = (self.t1_latch & 0x00FF) | (u16::from(value) << 8);
        self.clear_flags(IFR_T1);
    }

    /// Write to T1C-H: latch high byte, load the counter and start.
    pub(crate) fn start_t1(&mut self, high: u8) {
        self.set_t1_latch_high(high);
        self.t1.start(self.t1_latch);
    }

    pub(crate) fn set_t2_latch_low(&mut self, value: u8) {
        self.t2_latch_low = value;
    }

    /// Write to T2C-H: load the counter from `high` and the latched low
    /// byte, start one-shot.
    pub(crate) fn start_t2(&mut self, high: u8) {
        self.t2.start(u16::from_le_bytes([self.t2_latch_low, high]));
        self.clear_flags(IFR_T2);
    }

    /// Clear the flags set in `mask`. Bit 7 of the mask is ignored, and a
    /// forced bit 7 goes once no other flag is left.
    pub(crate) fn clear_flags(&mut self, mask: u8) {
        self.ifr &= !(mask & 0x7F);
        if self.ifr & 0x7F == 0 {
            self.ifr = 0;
        }
    }

    /// IFR as the CPU reads it: bit 7 is set when any enabled flag is
    /// raised, or while a forced bit 7 has flags behind it.
    pub(crate) fn ifr_register(&self) -> u8 {
        if self.ifr & 0x80 != 0 || self.irq_active() {
            self.ifr | 0x80
        } else {
            self.ifr & 0x7F
        }
    }

    pub(crate) fn set_ier(&mut self, value: u8) {
        if value & 0x80 != 0 {
            self.ier |= value & 0x7F;
        } else {
            self.ier &= !(value & 0x7F);
        }
    }

    pub(crate) fn force_flags(&mut self) {
        self.ifr = 0xFF;
    }

    fn t1_reload(&self) -> Option<u16> {
        (self.acr & ACR_T1_FREE_RUN != 0).then_some(self.t1_latch)
    }

    fn t2_counts_ticks(&self) -> bool {
        self.acr & ACR_T2_PULSE_COUNT == 0
    }
}

impl Timer for ViaTimer {
    fn name(&self) -> &str {
        &self.name
    }

    fn system_tick(&mut self, ticks: Ticks) -> InterruptState {
        let reload = self.t1_reload();
        if self.t1.run(ticks.get(), reload) {
            self.ifr |= IFR_T1;
        }
        if self.t2_counts_ticks() && self.t2.run(ticks.get(), None) {
            self.ifr |= IFR_T2;
        }
        InterruptState::irq_if(self.irq_active())
    }

    fn available_system_ticks(&self) -> Option<Ticks> {
        let t1 = self.t1.armed.then(|| self.t1.ticks_to_underflow());
        let t2 = (self.t2.armed && self.t2_counts_ticks()).then(|| self.t2.ticks_to_underflow());
        t1.into_iter().chain(t2).min().map(Ticks::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started_t1(counter: u16, acr: u8) -> ViaTimer {
        let mut timer = ViaTimer::new("test");
        timer.set_acr(acr);
        let [low, high] = counter.to_le_bytes();
        timer.set_t1_latch_low(low);
        timer.start_t1(high);
        timer
    }

    #[test]
    fn test_t1_underflows_after_counter_plus_one_ticks() {
        let mut timer = started_t1(3, 0);
        assert_eq!(timer.available_system_ticks(), Some(Ticks::new(4)));

        timer.system_tick(Ticks::new(3));
        assert_eq!(timer.t1_counter(), 0);
        assert_eq!(timer.ifr() & IFR_T1, 0);

        timer.system_tick(Ticks::new(1));
        assert_ne!(timer.ifr() & IFR_T1, 0);
        assert_eq!(timer.t1_counter(), 0xFFFF);
        assert!(!timer.t1_armed(), "one-shot disarms");
        assert_eq!(timer.available_system_ticks(), None);
    }

    #[test]
    fn test_t1_one_shot_fires_once() {
        let mut timer = started_t1(2, 0);
        timer.system_tick(Ticks::new(3));
        timer.clear_flags(IFR_T1);
        timer.system_tick(Ticks::new(0x2_0000));
        assert_eq!(timer.ifr() & IFR_T1, 0);
    }

    #[test]
    fn test_t1_free_run_period_is_latch_plus_two() {
        let mut timer = started_t1(2, ACR_T1_FREE_RUN);
        timer.system_tick(Ticks::new(3));
        assert_ne!(timer.ifr() & IFR_T1, 0);
        assert_eq!(timer.t1_counter(), 3, "reloaded with latch + 1");
        assert!(timer.t1_armed());

        timer.clear_flags(IFR_T1);
        timer.system_tick(Ticks::new(3));
        assert_eq!(timer.ifr() & IFR_T1, 0);
        timer.system_tick(Ticks::new(1));
        assert_ne!(timer.ifr() & IFR_T1, 0);
    }

    #[test]
    fn test_t2_is_one_shot() {
        let mut timer = ViaTimer::new("test");
        timer.set_t2_latch_low(3);
        timer.start_t2(0);
        assert_eq!(timer.t2_counter(), 3);
        timer.system_tick(Ticks::new(4));
        assert_ne!(timer.ifr() & IFR_T2, 0);
        assert!(!timer.t2_armed());
    }

    #[test]
    fn test_t2_pulse_counting_ignores_ticks() {
        let mut timer = ViaTimer::new("test");
        timer.set_acr(ACR_T2_PULSE_COUNT);
        timer.set_t2_latch_low(1);
        timer.start_t2(0);
        timer.system_tick(Ticks::new(10));
        assert_eq!(timer.t2_counter(), 1);
        assert_eq!(timer.available_system_ticks(), None);
    }

    #[test]
    fn test_irq_only_when_enabled() {
        let mut timer = started_t1(0, 0);
        assert_eq!(timer.system_tick(Ticks::new(1)), InterruptState::NONE);
        assert_eq!(timer.ifr_register() & 0x80, 0);

        timer.set_ier(0x80 | IFR_T1);
        assert_eq!(timer.system_tick(Ticks::ZERO), InterruptState::IRQ);
        assert_eq!(timer.ifr_register(), 0x80 | IFR_T1);
    }

    #[test]
    fn test_available_ticks_is_earliest_deadline() {
        let mut timer = started_t1(100, 0);
        timer.set_t2_latch_low(10);
        timer.start_t2(0);
        assert_eq!(timer.available_system_ticks(), Some(Ticks::new(11)));
    }

    #[test]
    fn test_forced_flags_set_bit_seven() {
        let mut timer = ViaTimer::new("test");
        timer.force_flags();
        assert_eq!(timer.ifr_register(), 0xFF);
        assert!(!timer.irq_active(), "nothing enabled");
    }

    #[test]
    fn test_forced_bit_seven_goes_with_last_flag() {
        let mut timer = ViaTimer::new("test");
        timer.force_flags();
        timer.clear_flags(0x80);
        assert_eq!(timer.ifr_register(), 0xFF, "bit 7 alone is not a clear");
        timer.clear_flags(0x3F);
        assert_eq!(timer.ifr_register(), 0x80 | IFR_T1);
        timer.clear_flags(IFR_T1);
        assert_eq!(timer.ifr_register(), 0x00);
    }

    #[test]
    fn test_t1_free_run_from_full_latch_reads_ffff() {
        let mut timer = started_t1(0xFFFF, ACR_T1_FREE_RUN);
        timer.system_tick(Ticks::new(0x1_0000));
        assert_ne!(timer.ifr() & IFR_T1, 0);
        assert_eq!(timer.t1_counter(), 0xFFFF);
        assert_eq!(timer.available_system_ticks(), Some(Ticks::new(0x1_0001)));

        timer.system_tick(Ticks::new(1));
        assert_eq!(timer.t1_counter(), 0xFFFF);
        timer.system_tick(Ticks::new(1));
        assert_eq!(timer.t1_counter(), 0xFFFE);
    }
}
