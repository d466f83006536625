//! Status LED indicator
//!
//! Patterns are expressed in mission ticks rather than wall-clock time;
//! at the nominal 1 ms tick the heartbeat reads as a short blip every
//! second and the fault pattern as a rapid flash.

use embedded_hal::digital::OutputPin;
use isobath_core::traits::Indicator;

// Pattern periods in ticks.
const OK_PERIOD: u32 = 1024;
const OK_ON: u32 = 32;
const WARNING_PERIOD: u32 = 256;
const ERROR_PERIOD: u32 = 64;

/// Single status LED driven by polled patterns.
pub struct LedIndicator<P> {
    led: P,
    ticks: u32,
}

impl<P: OutputPin> LedIndicator<P> {
    pub fn new(led: P) -> Self {
        Self { led, ticks: 0 }
    }

    fn set(&mut self, on: bool) {
        if on {
            let _ = self.led.set_high();
        } else {
            let _ = self.led.set_low();
        }
    }

    fn pattern(&mut self, period: u32, on_ticks: u32) {
        self.ticks = self.ticks.wrapping_add(1);
        let on = self.ticks % period < on_ticks;
        self.set(on);
    }
}

impl<P: OutputPin> Indicator for LedIndicator<P> {
    fn startup_sequence(&mut self) {
        self.ticks = 0;
        self.set(true);
    }

    fn ok_pattern(&mut self) {
        self.pattern(OK_PERIOD, OK_ON);
    }

    fn warning_pattern(&mut self) {
        self.pattern(WARNING_PERIOD, WARNING_PERIOD / 2);
    }

    fn error_pattern(&mut self) {
        self.pattern(ERROR_PERIOD, ERROR_PERIOD / 2);
    }

    fn mission_complete(&mut self) {
        self.set(true);
    }
}
