//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in isobath-core for the vehicle's hardware:
//!
//! - Stepper front-end (TMC2208-class STEP/DIR/MS pin driver)
//! - Limit switch (debounced GPIO input)
//! - Indicator (status LED patterns)

#![no_std]
#![deny(unsafe_code)]

pub mod indicator;
pub mod limit;
pub mod stepper;
