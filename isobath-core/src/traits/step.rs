//! Step output trait
//!
//! Abstracts over stepper driver front-ends (STEP/DIR pin drivers such as
//! the TMC2208, PIO-based pulse generators, or a simulated tank model).

use crate::motion::{Direction, Resolution};

/// The driver cannot realize the requested microstep setting.
///
/// TMC2208-class drivers expose only half through sixteenth stepping on
/// their MS pins, so full-step is a legitimate rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnsupportedResolution(pub Resolution);

/// Trait for stepper pulse outputs
///
/// Implementations own the physical STEP/DIR/MS pins (or their simulated
/// equivalent). The motion core calls `step_pulse` exactly once per emitted
/// microstep; all ramp timing stays on the core side.
pub trait StepOutput {
    /// Latch the rotation direction for subsequent pulses.
    fn set_direction(&mut self, dir: Direction);

    /// Emit one step pulse.
    ///
    /// Must be non-blocking; a GPIO implementation is a high/low edge pair.
    fn step_pulse(&mut self);

    /// Configure the driver's microstep resolution.
    ///
    /// Only called while the axis is idle.
    fn apply_resolution(&mut self, resolution: Resolution) -> Result<(), UnsupportedResolution>;
}
