//! TMC2208 stepper front-end (legacy STEP/DIR mode)
//!
//! The TMC2208 is driven entirely over pins here: one pulse per microstep
//! on STEP, rotation sense on DIR, and the microstep resolution selected
//! by the MS1/MS2 strap pins.
//!
//! # MS pin truth table (TMC2208 datasheet, table 1.4)
//!
//! | Resolution | MS1 | MS2 |
//! |------------|-----|-----|
//! | 1/2        | L   | H   |
//! | 1/4        | H   | L   |
//! | 1/8        | L   | L   |
//! | 1/16       | H   | H   |
//!
//! Full stepping has no pin encoding on this part and is rejected.

use embedded_hal::digital::OutputPin;
use isobath_core::motion::{Direction, Resolution};
use isobath_core::traits::{StepOutput, UnsupportedResolution};

/// STEP/DIR/MS1/MS2 pin driver for TMC2208-class parts.
pub struct StepDirPins<STEP, DIR, MS1, MS2> {
    step: STEP,
    dir: DIR,
    ms1: MS1,
    ms2: MS2,
}

impl<STEP, DIR, MS1, MS2> StepDirPins<STEP, DIR, MS1, MS2>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS1: OutputPin,
    MS2: OutputPin,
{
    pub fn new(step: STEP, dir: DIR, ms1: MS1, ms2: MS2) -> Self {
        Self { step, dir, ms1, ms2 }
    }

    /// MS1/MS2 levels for a resolution, if the part supports it.
    fn ms_levels(resolution: Resolution) -> Option<(bool, bool)> {
        match resolution {
            Resolution::Full => None,
            Resolution::Half => Some((false, true)),
            Resolution::Quarter => Some((true, false)),
            Resolution::Eighth => Some((false, false)),
            Resolution::Sixteenth => Some((true, true)),
        }
    }

    fn set_level<P: OutputPin>(pin: &mut P, high: bool) {
        // Pin errors on push-pull GPIO are infallible in practice.
        if high {
            let _ = pin.set_high();
        } else {
            let _ = pin.set_low();
        }
    }
}

impl<STEP, DIR, MS1, MS2> StepOutput for StepDirPins<STEP, DIR, MS1, MS2>
where
    STEP: OutputPin,
    DIR: OutputPin,
    MS1: OutputPin,
    MS2: OutputPin,
{
    fn set_direction(&mut self, dir: Direction) {
        Self::set_level(&mut self.dir, dir == Direction::Clockwise);
    }

    fn step_pulse(&mut self) {
        // The TMC2208 latches on the rising edge; min high time is 100 ns,
        // which two consecutive GPIO writes already exceed.
        let _ = self.step.set_high();
        let _ = self.step.set_low();
    }

    fn apply_resolution(&mut self, resolution: Resolution) -> Result<(), UnsupportedResolution> {
        let (ms1, ms2) = Self::ms_levels(resolution).ok_or(UnsupportedResolution(resolution))?;
        Self::set_level(&mut self.ms1, ms1);
        Self::set_level(&mut self.ms2, ms2);
        Ok(())
    }
}
