//! Buoyancy actuator
//!
//! Wraps a [`MotionAxis`] and a limit switch into a linear actuator with a
//! trusted home reference. The carriage rides a lead screw inside the
//! ballast tank; position 0 is the limit switch end (tank empty), full rod
//! travel is tank full.
//!
//! Homing is polled, never blocking: `start_homing` begins a constant-speed
//! creep toward the switch and `poll_homing` advances it one tick at a time
//! until the switch trips or the timeout expires.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::motion::{Direction, MotionAxis, MotionError, MotionMode, Resolution};
use crate::telemetry::ActuatorTelemetry;
use crate::traits::{LimitSwitch, StepOutput};

/// Rotation that drives the carriage toward the limit switch.
pub const HOME_DIRECTION: Direction = Direction::CounterClockwise;

/// Which vehicle actuator an axis drives; used in fault messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AxisRole {
    Buoyancy,
    Pitch,
}

impl AxisRole {
    pub fn name(self) -> &'static str {
        match self {
            AxisRole::Buoyancy => "buoyancy",
            AxisRole::Pitch => "pitch",
        }
    }
}

/// Lead-screw geometry of the ballast tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TankGeometry {
    /// Usable rod travel from the limit switch (mm)
    pub rod_length_mm: u32,
    /// Carriage travel per shaft revolution (mm)
    pub mm_per_rev: u32,
}

impl TankGeometry {
    /// Full rod travel in microsteps at the given resolution.
    pub fn travel_steps(&self, resolution: Resolution) -> u32 {
        self.rod_length_mm * resolution.microsteps_per_rev() / self.mm_per_rev
    }

    /// Convert millimetres from home to microsteps.
    pub fn steps_from_mm(&self, mm: u32, resolution: Resolution) -> i64 {
        mm as i64 * resolution.microsteps_per_rev() as i64 / self.mm_per_rev as i64
    }

    /// Convert a step counter value to millimetres from home.
    pub fn mm_from_steps(&self, steps: i64, resolution: Resolution) -> f32 {
        steps as f32 * self.mm_per_rev as f32 / resolution.microsteps_per_rev() as f32
    }
}

/// Result of one homing poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPoll {
    /// Still creeping toward the switch
    Busy,
    /// Switch tripped; position zeroed, home reference trusted
    Done,
    /// Switch never tripped within the timeout; axis stopped
    TimedOut,
}

/// Errors from actuator commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActuatorError {
    /// Position commands are meaningless without a home reference
    NotHomed,
    /// The underlying motion axis rejected the command
    Motion(MotionError),
}

impl From<MotionError> for ActuatorError {
    fn from(e: MotionError) -> Self {
        ActuatorError::Motion(e)
    }
}

/// A homed linear actuator over one stepper axis.
pub struct ActuatorAxis<S: StepOutput, L: LimitSwitch> {
    motion: MotionAxis<S>,
    limit: L,
    role: AxisRole,
    geometry: TankGeometry,

    homed: bool,
    /// Most recent raw switch sample
    limit_state: bool,
    /// Commanded absolute position (microsteps from home)
    target_step: i64,
    homing_started_ns: Option<i64>,
}

impl<S: StepOutput, L: LimitSwitch> ActuatorAxis<S, L> {
    pub fn new(
        driver: S,
        limit: L,
        role: AxisRole,
        geometry: TankGeometry,
        resolution: Resolution,
        max_speed: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> Result<Self, MotionError> {
        let motion = MotionAxis::new(driver, resolution, max_speed, acceleration, deceleration)?;
        Ok(Self {
            motion,
            limit,
            role,
            geometry,
            homed: false,
            limit_state: false,
            target_step: 0,
            homing_started_ns: None,
        })
    }

    pub fn role(&self) -> AxisRole {
        self.role
    }

    pub fn is_homed(&self) -> bool {
        self.homed
    }

    pub fn limit_state(&self) -> bool {
        self.limit_state
    }

    pub fn motion(&self) -> &MotionAxis<S> {
        &self.motion
    }

    /// Reconfigure the ramp for the next mission phase. Rejected mid-move.
    pub fn set_ramp(
        &mut self,
        max_speed: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> Result<(), MotionError> {
        self.motion.set_speed(max_speed)?;
        self.motion.set_acceleration(acceleration, Some(deceleration))
    }

    /// Begin homing: constant-speed creep toward the limit switch.
    ///
    /// Any previous home reference is invalidated. The creep runs at the
    /// currently configured speed; callers set a conservative ramp first.
    pub fn start_homing(&mut self, now_ns: i64) -> Result<(), MotionError> {
        self.motion.set_mode(MotionMode::Constant)?;
        self.motion.rotate_continuous(HOME_DIRECTION)?;
        self.homed = false;
        self.homing_started_ns = Some(now_ns);
        Ok(())
    }

    /// Advance a homing in progress.
    ///
    /// The switch is sampled before any pulses are emitted, so a switch
    /// already closed at the first poll homes without moving at all.
    pub fn poll_homing(&mut self, now_ns: i64, timeout_ns: i64) -> HomingPoll {
        let started = match self.homing_started_ns {
            Some(t) => t,
            // Not homing; report the standing reference.
            None if self.homed => return HomingPoll::Done,
            None => return HomingPoll::Busy,
        };

        self.limit_state = self.limit.is_triggered();
        if self.limit_state {
            self.motion.stop();
            self.motion.zero_position();
            self.homed = true;
            self.target_step = 0;
            self.homing_started_ns = None;
            return HomingPoll::Done;
        }

        if now_ns.saturating_sub(started) >= timeout_ns {
            self.motion.stop();
            self.homing_started_ns = None;
            return HomingPoll::TimedOut;
        }

        self.motion.update(now_ns);
        HomingPoll::Busy
    }

    /// Drive the carriage to full rod travel (fill the ballast tank).
    pub fn sink(&mut self) -> Result<(), ActuatorError> {
        let full = self.geometry.travel_steps(self.motion.resolution()) as i64;
        self.move_to(full)
    }

    /// Drive the carriage back to home (empty the ballast tank).
    pub fn rise(&mut self) -> Result<(), ActuatorError> {
        self.move_to(0)
    }

    fn move_to(&mut self, target: i64) -> Result<(), ActuatorError> {
        if !self.homed {
            return Err(ActuatorError::NotHomed);
        }
        self.motion.set_mode(MotionMode::Linear)?;

        let delta = target - self.motion.absolute_step();
        if delta == 0 {
            self.target_step = target;
            return Ok(());
        }
        let (steps, dir) = if delta > 0 {
            (delta as u32, Direction::Clockwise)
        } else {
            ((-delta) as u32, Direction::CounterClockwise)
        };
        self.motion.rotate_steps(steps, dir, None)?;
        self.target_step = target;
        Ok(())
    }

    /// Advance the pulse train; called once per mission tick.
    ///
    /// If the switch trips while travelling toward home outside a homing
    /// cycle, the carriage has physically reached the end of the rod: the
    /// move stops immediately and the position counter is re-zeroed there.
    pub fn update(&mut self, now_ns: i64) -> u32 {
        self.limit_state = self.limit.is_triggered();
        if self.limit_state
            && self.homing_started_ns.is_none()
            && !self.motion.is_idle()
            && self.motion.direction() == HOME_DIRECTION
        {
            self.motion.stop();
            self.motion.zero_position();
            return 0;
        }
        self.motion.update(now_ns)
    }

    /// Check if the last position command has completed.
    pub fn at_target(&self) -> bool {
        self.motion.is_idle() && self.motion.absolute_step() == self.target_step
    }

    /// Tank full: carriage parked at full rod travel.
    pub fn tank_full(&self) -> bool {
        self.homed
            && self.at_target()
            && self.target_step == self.geometry.travel_steps(self.motion.resolution()) as i64
    }

    /// Tank empty: carriage parked at home.
    pub fn tank_empty(&self) -> bool {
        self.homed && self.at_target() && self.target_step == 0
    }

    pub fn current_position_mm(&self) -> f32 {
        self.geometry
            .mm_from_steps(self.motion.absolute_step(), self.motion.resolution())
    }

    pub fn target_position_mm(&self) -> f32 {
        self.geometry
            .mm_from_steps(self.target_step, self.motion.resolution())
    }

    /// Graceful ramp-down of whatever is in flight.
    pub fn brake(&mut self) {
        self.motion.brake();
    }

    /// Hard stop; the home reference survives (position is still counted).
    pub fn stop(&mut self) {
        self.motion.stop();
        self.homing_started_ns = None;
    }

    /// Telemetry snapshot for the current tick.
    pub fn snapshot(&self) -> ActuatorTelemetry {
        ActuatorTelemetry {
            current_position_mm: self.current_position_mm(),
            target_position_mm: self.target_position_mm(),
            speed_sps: self.motion.current_speed_sps(),
            acceleration: self.motion.acceleration(),
            limit_state: self.limit_state,
            homed: self.homed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::UnsupportedResolution;

    #[derive(Default)]
    struct CountingOutput {
        pulses: u32,
    }

    impl StepOutput for CountingOutput {
        fn set_direction(&mut self, _dir: Direction) {}

        fn step_pulse(&mut self) {
            self.pulses += 1;
        }

        fn apply_resolution(&mut self, _r: Resolution) -> Result<(), UnsupportedResolution> {
            Ok(())
        }
    }

    /// Switch that closes after a fixed number of samples.
    struct SwitchAfter {
        samples_left: u32,
    }

    impl LimitSwitch for SwitchAfter {
        fn is_triggered(&mut self) -> bool {
            if self.samples_left == 0 {
                true
            } else {
                self.samples_left -= 1;
                false
            }
        }
    }

    const TANK: TankGeometry = TankGeometry {
        rod_length_mm: 250,
        mm_per_rev: 8,
    };

    fn tank_axis(switch_after: u32) -> ActuatorAxis<CountingOutput, SwitchAfter> {
        ActuatorAxis::new(
            CountingOutput::default(),
            SwitchAfter {
                samples_left: switch_after,
            },
            AxisRole::Buoyancy,
            TANK,
            Resolution::Half,
            7000,
            6000,
            6000,
        )
        .unwrap()
    }

    /// Home the axis, then poll the motion to idle after each command.
    fn homed_axis() -> ActuatorAxis<CountingOutput, SwitchAfter> {
        let mut ax = tank_axis(0);
        ax.start_homing(0).unwrap();
        assert_eq!(ax.poll_homing(0, 10_000_000_000), HomingPoll::Done);
        ax
    }

    fn run_to_target(ax: &mut ActuatorAxis<CountingOutput, SwitchAfter>) {
        let mut now = 0i64;
        for _ in 0..1_000_000 {
            now += 1_000_000;
            ax.update(now);
            if ax.at_target() {
                return;
            }
        }
        panic!("move did not complete");
    }

    #[test]
    fn test_geometry_full_travel_steps() {
        // 250 mm rod, 8 mm/rev, half stepping (400 usteps/rev) = 12500.
        assert_eq!(TANK.travel_steps(Resolution::Half), 12_500);
        assert_eq!(TANK.steps_from_mm(250, Resolution::Half), 12_500);
        assert_eq!(TANK.steps_from_mm(1, Resolution::Half), 50);
        assert_eq!(TANK.mm_from_steps(12_500, Resolution::Half), 250.0);
        assert_eq!(TANK.mm_from_steps(0, Resolution::Half), 0.0);
    }

    #[test]
    fn test_homing_completes_when_switch_trips() {
        let mut ax = tank_axis(5);
        ax.start_homing(0).unwrap();
        assert!(!ax.is_homed());

        let timeout = 10_000_000_000; // 10 s
        let mut now = 0i64;
        let mut polls = 0;
        loop {
            now += 1_000_000;
            polls += 1;
            match ax.poll_homing(now, timeout) {
                HomingPoll::Busy => {}
                HomingPoll::Done => break,
                HomingPoll::TimedOut => panic!("unexpected timeout"),
            }
        }
        // The switch closes on its 6th sample; the poll that sees it homes.
        assert_eq!(polls, 6);
        assert!(ax.is_homed());
        assert_eq!(ax.motion().absolute_step(), 0);
        assert!(ax.tank_empty());
    }

    #[test]
    fn test_homing_times_out() {
        let mut ax = tank_axis(u32::MAX);
        ax.start_homing(0).unwrap();

        let timeout = 2_000_000_000; // 2 s
        let mut now = 0i64;
        loop {
            now += 1_000_000;
            match ax.poll_homing(now, timeout) {
                HomingPoll::Busy => assert!(now < timeout),
                HomingPoll::TimedOut => break,
                HomingPoll::Done => panic!("switch never closes"),
            }
        }
        assert!(!ax.is_homed());
        assert!(ax.motion().is_idle());
    }

    #[test]
    fn test_position_commands_require_homing() {
        let mut ax = tank_axis(u32::MAX);
        assert_eq!(ax.sink(), Err(ActuatorError::NotHomed));
        assert_eq!(ax.rise(), Err(ActuatorError::NotHomed));
    }

    #[test]
    fn test_sink_fills_tank() {
        let mut ax = homed_axis();
        ax.sink().unwrap();
        assert!(!ax.at_target());
        run_to_target(&mut ax);
        assert_eq!(ax.motion().absolute_step(), 12_500);
        assert!(ax.tank_full());
        assert_eq!(ax.current_position_mm(), 250.0);
    }

    #[test]
    fn test_rise_returns_home() {
        let mut ax = homed_axis();
        ax.sink().unwrap();
        run_to_target(&mut ax);

        // Switch stays open on the way back; the bounded move lands on 0.
        ax.limit.samples_left = u32::MAX;
        ax.rise().unwrap();
        run_to_target(&mut ax);
        assert_eq!(ax.motion().absolute_step(), 0);
        assert!(ax.tank_empty());
    }

    #[test]
    fn test_command_rejected_mid_move() {
        let mut ax = homed_axis();
        ax.sink().unwrap();
        ax.update(1_000_000);
        assert_eq!(
            ax.rise(),
            Err(ActuatorError::Motion(MotionError::MoveInProgress))
        );
    }

    #[test]
    fn test_limit_trip_outside_homing_stops_and_rezeros() {
        let mut ax = homed_axis();
        ax.sink().unwrap();
        run_to_target(&mut ax);

        // The switch closes early on the way home (mechanical slip).
        ax.limit.samples_left = 3;
        ax.rise().unwrap();
        let mut now = 0i64;
        while !ax.motion().is_idle() {
            now += 1_000_000;
            ax.update(now);
        }
        assert_eq!(ax.motion().absolute_step(), 0);
        assert!(ax.at_target());
        assert!(ax.limit_state());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut ax = homed_axis();
        ax.sink().unwrap();
        run_to_target(&mut ax);
        let snap = ax.snapshot();
        assert_eq!(snap.current_position_mm, 250.0);
        assert_eq!(snap.target_position_mm, 250.0);
        assert_eq!(snap.speed_sps, 0);
        assert!(snap.homed);
    }

    #[test]
    fn test_rehoming_invalidates_reference() {
        let mut ax = homed_axis();
        ax.limit.samples_left = u32::MAX;
        ax.start_homing(0).unwrap();
        assert!(!ax.is_homed());
        assert_eq!(ax.sink(), Err(ActuatorError::NotHomed));
    }
}
