//! Mission simulator building blocks
//!
//! Simulated hardware for running the control core on a host: a virtual
//! carriage shared between stepper and limit switch, fake sensors, and a
//! JSON-lines telemetry logger. The binary in `main.rs` wires these into a
//! full mission run.

pub mod logger;
pub mod rig;
