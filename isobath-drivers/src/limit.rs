//! Debounced limit switch input
//!
//! Mechanical switches bounce for a few milliseconds on contact. Since the
//! mission loop samples the switch once per tick, debouncing by consecutive
//! agreeing samples is enough; no timers involved.

use embedded_hal::digital::InputPin;
use isobath_core::traits::LimitSwitch;

/// GPIO limit switch debounced over consecutive samples.
pub struct DebouncedLimit<P> {
    pin: P,
    /// Switch pulls the line low when pressed (normally-open to ground)
    active_low: bool,
    /// Consecutive active samples required before reporting triggered
    threshold: u8,
    stable: u8,
}

impl<P: InputPin> DebouncedLimit<P> {
    pub fn new(pin: P, active_low: bool, threshold: u8) -> Self {
        Self {
            pin,
            active_low,
            threshold: threshold.max(1),
            stable: 0,
        }
    }

    fn raw_active(&mut self) -> bool {
        // A read error counts as inactive; a flaky line must never
        // fake an end-of-travel event.
        if self.active_low {
            self.pin.is_low().unwrap_or(false)
        } else {
            self.pin.is_high().unwrap_or(false)
        }
    }
}

impl<P: InputPin> LimitSwitch for DebouncedLimit<P> {
    fn is_triggered(&mut self) -> bool {
        if self.raw_active() {
            self.stable = self.stable.saturating_add(1);
        } else {
            self.stable = 0;
        }
        self.stable >= self.threshold
    }
}
