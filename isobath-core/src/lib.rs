//! Board-agnostic control core for the Isobath AUV firmware
//!
//! This crate contains all vehicle logic that does not depend on specific
//! hardware implementations:
//!
//! - Hardware abstraction traits (step output, limit switch, clock, logger)
//! - Trapezoidal motion-profile generator for the buoyancy stepper
//! - Actuator wrapper (homing protocol, mm <-> microstep mapping)
//! - Mission state machine (dive / resurface / surface sequencing)
//! - Configuration type definitions and validation
//! - Telemetry snapshot types

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod actuator;
pub mod config;
pub mod mission;
pub mod motion;
pub mod telemetry;
pub mod traits;
