//! Telemetry snapshot types
//!
//! One `Telemetry` record is assembled per mission tick and handed to the
//! logger collaborator. Sensor-owned fields are filled by the sampler; the
//! core fills the time, state and actuator fields.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Read-only actuator snapshot, refreshed each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActuatorTelemetry {
    /// Carriage position derived from the step counter (mm from home)
    pub current_position_mm: f32,
    /// Commanded target position (mm from home)
    pub target_position_mm: f32,
    /// Instantaneous step rate (microsteps/s; 0 when idle)
    pub speed_sps: u32,
    /// Configured acceleration (microsteps/s^2)
    pub acceleration: u32,
    /// Raw limit switch state
    pub limit_state: bool,
    /// Whether the axis has a trusted home reference
    pub homed: bool,
}

/// One telemetry record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Telemetry {
    /// Timestamp of this record (monotonic ns)
    pub time_ns: i64,
    /// Time since the previous record (ns; 0 on the first record)
    pub delta_ns: i64,
    /// Mission state code (see `MissionState::code`)
    pub state: u8,
    /// Latched non-fatal warning flag
    pub warning: bool,

    // Sensor-owned fields, filled by the sampler.
    /// Battery bus voltage (V)
    pub battery_v: f32,
    /// External water temperature (degrees C)
    pub water_temp_c: f32,
    /// External pressure (mbar)
    pub pressure_mbar: f32,
    /// Fused orientation, roll/pitch/yaw (degrees)
    pub orientation_deg: [f32; 3],

    /// Buoyancy actuator snapshot
    pub buoyancy: ActuatorTelemetry,
}
