//! Mission state machine
//!
//! The vehicle's top-level behavior: calibrate, then cycle dive /
//! resurface / surface checkpoint until the mission clock runs out and
//! the log is handed off. One `tick` per loop iteration drives
//! everything; there are no threads and no blocking calls.

mod machine;

pub use machine::{Mission, MissionIo, MissionSetupError, MissionState};
