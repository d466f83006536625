//! Mission configuration
//!
//! Plain data validated once at mission construction; nothing here is
//! re-checked per tick. With the `serde` feature the whole tree
//! deserializes from a host-side config file.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::actuator::TankGeometry;
use crate::motion::Resolution;

/// Wall-clock mission length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MissionDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl MissionDuration {
    /// Total duration in nanoseconds.
    pub fn as_ns(&self) -> i64 {
        let s = ((self.days as i64 * 24 + self.hours as i64) * 60 + self.minutes as i64) * 60
            + self.seconds as i64;
        s * 1_000_000_000
    }
}

/// Ramp parameters for one mission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseRamp {
    /// Cruise speed (microsteps/s)
    pub max_speed: u32,
    /// Ramp-up rate (microsteps/s^2)
    pub acceleration: u32,
    /// Ramp-down rate (microsteps/s^2)
    pub deceleration: u32,
}

/// Configuration rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Mission duration is zero
    ZeroDuration,
    /// A phase ramp has a zero speed or rate
    ZeroRamp,
    /// Rod length or lead must be non-zero
    InvalidGeometry,
    /// Calibration timeout must be positive
    ZeroTimeout,
    /// Battery window is empty or inverted
    BatteryWindow,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            ConfigError::ZeroDuration => "mission duration is zero",
            ConfigError::ZeroRamp => "phase ramp has a zero speed or rate",
            ConfigError::InvalidGeometry => "tank geometry has a zero dimension",
            ConfigError::ZeroTimeout => "calibration timeout must be positive",
            ConfigError::BatteryWindow => "battery voltage window is inverted",
        };
        f.write_str(msg)
    }
}

/// Everything the mission needs to run, validated up front.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MissionConfig {
    /// Mission ends (log handed off) when this elapses
    pub duration: MissionDuration,
    /// Driver microstep setting, fixed for the whole mission
    pub resolution: Resolution,

    /// Ramp while filling the tank
    pub dive: PhaseRamp,
    /// Ramp while emptying the tank
    pub resurface: PhaseRamp,
    /// Ramp for trim moves at the surface
    pub surfaced: PhaseRamp,
    /// Creep speed toward the limit switch during calibration
    pub homing: PhaseRamp,

    /// Calibration gives up after this long without the switch closing (ns)
    pub calibration_timeout_ns: i64,

    /// Power-on check window (V)
    pub battery_min_v: f32,
    pub battery_max_v: f32,

    pub tank: TankGeometry,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            duration: MissionDuration {
                days: 0,
                hours: 0,
                minutes: 30,
                seconds: 0,
            },
            resolution: Resolution::Half,
            dive: PhaseRamp {
                max_speed: 7000,
                acceleration: 6000,
                deceleration: 6000,
            },
            resurface: PhaseRamp {
                max_speed: 7000,
                acceleration: 6000,
                deceleration: 6000,
            },
            surfaced: PhaseRamp {
                max_speed: 2000,
                acceleration: 4000,
                deceleration: 4000,
            },
            homing: PhaseRamp {
                max_speed: 1500,
                acceleration: 3000,
                deceleration: 3000,
            },
            calibration_timeout_ns: 10_000_000_000,
            battery_min_v: 9.0,
            battery_max_v: 12.6,
            tank: TankGeometry {
                rod_length_mm: 250,
                mm_per_rev: 8,
            },
        }
    }
}

impl MissionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration.as_ns() == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        for ramp in [&self.dive, &self.resurface, &self.surfaced, &self.homing] {
            if ramp.max_speed == 0 || ramp.acceleration == 0 || ramp.deceleration == 0 {
                return Err(ConfigError::ZeroRamp);
            }
        }
        if self.tank.rod_length_mm == 0 || self.tank.mm_per_rev == 0 {
            return Err(ConfigError::InvalidGeometry);
        }
        if self.calibration_timeout_ns <= 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.battery_min_v >= self.battery_max_v {
            return Err(ConfigError::BatteryWindow);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(MissionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_duration_conversion() {
        let d = MissionDuration {
            days: 1,
            hours: 2,
            minutes: 3,
            seconds: 4,
        };
        // 86400 + 7200 + 180 + 4 = 93784 s
        assert_eq!(d.as_ns(), 93_784_000_000_000);
        assert_eq!(MissionDuration::default().as_ns(), 0);
    }

    #[test]
    fn test_zero_duration_rejected() {
        let mut cfg = MissionConfig::default();
        cfg.duration = MissionDuration::default();
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDuration));
    }

    #[test]
    fn test_zero_ramp_rejected() {
        let mut cfg = MissionConfig::default();
        cfg.resurface.acceleration = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroRamp));
    }

    #[test]
    fn test_bad_geometry_rejected() {
        let mut cfg = MissionConfig::default();
        cfg.tank.mm_per_rev = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidGeometry));
    }

    #[test]
    fn test_inverted_battery_window_rejected() {
        let mut cfg = MissionConfig::default();
        cfg.battery_min_v = 13.0;
        assert_eq!(cfg.validate(), Err(ConfigError::BatteryWindow));
    }

    #[test]
    fn test_nonpositive_timeout_rejected() {
        let mut cfg = MissionConfig::default();
        cfg.calibration_timeout_ns = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
    }
}
