//! Motion-profile generation for the buoyancy stepper
//!
//! The ramp engine converts a commanded step count into a physically
//! bounded pulse train: velocity ramps up, cruises, and ramps back down
//! without recomputing a square root per step.

mod ramp;

pub use ramp::{Direction, MotionAxis, MotionError, MotionMode, RampState, Resolution};
