//! Trapezoidal velocity-ramp step generator
//!
//! Implements the classic stepper-ramp recurrence (D. Austin, "Generate
//! stepper-motor speed profiles in real time"): the inter-pulse interval is
//! updated with one integer division per step,
//!
//! ```text
//! c[n] = c[n-1] - (2*c[n-1] + rest) / (4*n + 1)
//! ```
//!
//! which converges on the cruise interval without any square roots in the
//! step path. The single square root per *move* (the initial interval) uses
//! `u64::isqrt`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::StepOutput;

/// Empirical correction for the discrete-step integration error of the
/// first interval, scaled so that `C0_NUM / sqrt(accel * 1e6)` yields
/// microseconds (0.956 * 1e6 * 1e3).
const C0_NUM: u64 = 956_000_000;

/// Microstep resolution of the driver (fraction of a full motor step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Resolution {
    Full,
    #[default]
    Half,
    Quarter,
    Eighth,
    Sixteenth,
}

impl Resolution {
    /// Microsteps per full motor step.
    pub fn multiplier(self) -> u32 {
        match self {
            Resolution::Full => 1,
            Resolution::Half => 2,
            Resolution::Quarter => 4,
            Resolution::Eighth => 8,
            Resolution::Sixteenth => 16,
        }
    }

    /// Microsteps per shaft revolution (200-step motor).
    pub fn microsteps_per_rev(self) -> u32 {
        200 * self.multiplier()
    }
}

/// Motor rotation direction; sign convention for the position counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Position counter increments
    Clockwise,
    /// Position counter decrements
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction.
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    fn step_delta(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Stepping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionMode {
    /// Fixed-interval stepping at the configured speed (used for homing)
    Constant,
    /// Trapezoidal accelerate/cruise/brake profile
    Linear,
}

/// Ramp phase of the current move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampState {
    /// No move in progress
    Idle,
    /// Interval shrinking toward the cruise interval
    Accelerating,
    /// At cruise speed
    Running,
    /// Interval growing back toward standstill
    Braking,
}

/// Errors from motion commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// A new move was requested while the axis is braking; callers must
    /// let the brake finish (or `stop()`) first
    BrakeInProgress,
    /// A bounded move is already active
    MoveInProgress,
    /// A continuous move is active in the opposite direction
    DirectionChange,
    /// Zero speed/acceleration/deceleration
    InvalidParameter,
    /// The driver rejected the microstep setting
    UnsupportedResolution,
}

/// One stepper axis: position/velocity state plus the pulse generator.
///
/// `update()` is polled from the mission loop; it emits as many pulses as
/// the elapsed wall-clock time permits and never blocks.
pub struct MotionAxis<S: StepOutput> {
    driver: S,

    resolution: Resolution,
    direction: Direction,
    mode: MotionMode,
    state: RampState,

    /// Cruise speed in microsteps/s
    max_speed: u32,
    /// Ramp-up rate in microsteps/s^2
    acceleration: u32,
    /// Ramp-down rate in microsteps/s^2
    deceleration: u32,

    /// Net signed position since the last homing; +/-1 per pulse
    absolute_step: i64,

    // Move-scoped counters.
    target_travel_steps: u32,
    current_travel_step: u32,
    accel_steps: u32,
    decel_steps: u32,

    /// Current inter-pulse interval (us); never below `run_interval_us`
    interval_us: u64,
    /// Cruise interval, 1e6 / max_speed (us)
    run_interval_us: u64,
    /// Division remainder carried between recurrence iterations
    rest_interval: i64,

    continuous_move: bool,
    on_finish: Option<fn()>,

    /// Deadline of the next pulse; armed lazily on the first `update()`
    /// after a move starts
    next_due_ns: Option<i64>,
}

impl<S: StepOutput> MotionAxis<S> {
    /// Create an axis bound to a step output.
    ///
    /// Speed and both ramp rates must be non-zero; invalid values are a
    /// configuration error at setup, never during a move.
    pub fn new(
        mut driver: S,
        resolution: Resolution,
        max_speed: u32,
        acceleration: u32,
        deceleration: u32,
    ) -> Result<Self, MotionError> {
        if max_speed == 0 || acceleration == 0 || deceleration == 0 {
            return Err(MotionError::InvalidParameter);
        }
        driver
            .apply_resolution(resolution)
            .map_err(|_| MotionError::UnsupportedResolution)?;
        driver.set_direction(Direction::Clockwise);

        Ok(Self {
            driver,
            resolution,
            direction: Direction::Clockwise,
            mode: MotionMode::Linear,
            state: RampState::Idle,
            max_speed,
            acceleration,
            deceleration,
            absolute_step: 0,
            target_travel_steps: 0,
            current_travel_step: 0,
            accel_steps: 0,
            decel_steps: 0,
            interval_us: (1_000_000 / max_speed as u64).max(1),
            run_interval_us: (1_000_000 / max_speed as u64).max(1),
            rest_interval: 0,
            continuous_move: false,
            on_finish: None,
            next_due_ns: None,
        })
    }

    /// Current ramp phase.
    pub fn state(&self) -> RampState {
        self.state
    }

    /// Check if no move is in progress.
    pub fn is_idle(&self) -> bool {
        self.state == RampState::Idle
    }

    pub fn mode(&self) -> MotionMode {
        self.mode
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn max_speed(&self) -> u32 {
        self.max_speed
    }

    pub fn acceleration(&self) -> u32 {
        self.acceleration
    }

    pub fn deceleration(&self) -> u32 {
        self.deceleration
    }

    /// Net signed position since the last homing (microsteps).
    pub fn absolute_step(&self) -> i64 {
        self.absolute_step
    }

    /// Declare the current physical position as the home reference.
    pub fn zero_position(&mut self) {
        self.absolute_step = 0;
    }

    /// Instantaneous step rate (microsteps/s; 0 when idle).
    pub fn current_speed_sps(&self) -> u32 {
        if self.state == RampState::Idle || self.interval_us == 0 {
            0
        } else {
            (1_000_000 / self.interval_us) as u32
        }
    }

    /// Set the stepping mode. Rejected mid-move.
    pub fn set_mode(&mut self, mode: MotionMode) -> Result<(), MotionError> {
        if self.state != RampState::Idle {
            return Err(MotionError::MoveInProgress);
        }
        self.mode = mode;
        Ok(())
    }

    /// Change the microstep resolution. Rejected mid-move.
    pub fn set_resolution(&mut self, resolution: Resolution) -> Result<(), MotionError> {
        if self.state != RampState::Idle {
            return Err(MotionError::MoveInProgress);
        }
        self.driver
            .apply_resolution(resolution)
            .map_err(|_| MotionError::UnsupportedResolution)?;
        self.resolution = resolution;
        Ok(())
    }

    /// Set the cruise speed in microsteps/s. Rejected mid-move.
    pub fn set_speed(&mut self, max_speed: u32) -> Result<(), MotionError> {
        if self.state != RampState::Idle {
            return Err(MotionError::MoveInProgress);
        }
        if max_speed == 0 {
            return Err(MotionError::InvalidParameter);
        }
        self.max_speed = max_speed;
        // Floor of 1 us keeps the pulse loop bounded even for absurd speeds.
        self.run_interval_us = (1_000_000 / max_speed as u64).max(1);
        Ok(())
    }

    /// Set ramp rates in microsteps/s^2. `deceleration = None` makes the
    /// profile symmetric. Rejected mid-move.
    pub fn set_acceleration(
        &mut self,
        acceleration: u32,
        deceleration: Option<u32>,
    ) -> Result<(), MotionError> {
        if self.state != RampState::Idle {
            return Err(MotionError::MoveInProgress);
        }
        let deceleration = deceleration.unwrap_or(acceleration);
        if acceleration == 0 || deceleration == 0 {
            return Err(MotionError::InvalidParameter);
        }
        self.acceleration = acceleration;
        self.deceleration = deceleration;
        Ok(())
    }

    /// Begin a bounded move of `steps` microsteps in `dir`.
    ///
    /// `on_finish` is invoked exactly once when the final step of the move
    /// is emitted, then cleared. A call while a continuous move runs in the
    /// same direction converts it to a bounded move ending `steps` past the
    /// current position, with no pulse loss.
    pub fn rotate_steps(
        &mut self,
        steps: u32,
        dir: Direction,
        on_finish: Option<fn()>,
    ) -> Result<(), MotionError> {
        match self.state {
            RampState::Braking => return Err(MotionError::BrakeInProgress),
            RampState::Idle => {}
            RampState::Accelerating | RampState::Running => {
                if !self.continuous_move {
                    return Err(MotionError::MoveInProgress);
                }
                if dir != self.direction {
                    return Err(MotionError::DirectionChange);
                }
                // Convert continuous -> bounded from the current position.
                self.continuous_move = false;
                self.target_travel_steps = self.current_travel_step.saturating_add(steps);
                self.decel_steps = self.braking_steps(self.max_speed);
                self.on_finish = on_finish;
                return Ok(());
            }
        }

        if steps == 0 {
            if let Some(f) = on_finish {
                f();
            }
            return Ok(());
        }

        self.begin_move(dir, steps, false);
        self.on_finish = on_finish;
        Ok(())
    }

    /// Begin an unbounded move; ended externally by `brake()`, `stop()`,
    /// or conversion through `rotate_steps`.
    pub fn rotate_continuous(&mut self, dir: Direction) -> Result<(), MotionError> {
        match self.state {
            RampState::Braking => return Err(MotionError::BrakeInProgress),
            RampState::Idle => {}
            RampState::Accelerating | RampState::Running => {
                if !self.continuous_move {
                    return Err(MotionError::MoveInProgress);
                }
                if dir != self.direction {
                    return Err(MotionError::DirectionChange);
                }
                return Ok(());
            }
        }

        self.begin_move(dir, 0, true);
        self.on_finish = None;
        Ok(())
    }

    /// Graceful cancel: ramp down from the current speed and stop.
    ///
    /// Safe from any state and idempotent; repeated calls while already
    /// braking leave the trajectory unchanged.
    pub fn brake(&mut self) {
        match self.state {
            RampState::Idle | RampState::Braking => {}
            RampState::Accelerating | RampState::Running => {
                let remaining = self.braking_steps(self.current_speed_sps()).max(1);
                self.continuous_move = false;
                self.target_travel_steps = self.current_travel_step.saturating_add(remaining);
                self.decel_steps = remaining;
                self.rest_interval = 0;
                self.state = RampState::Braking;
            }
        }
    }

    /// Synchronous cancel: Idle immediately, in-flight ramp state discarded.
    ///
    /// The pending `on_finish` callback is dropped un-invoked; the move was
    /// cancelled, not completed.
    pub fn stop(&mut self) {
        self.state = RampState::Idle;
        self.continuous_move = false;
        self.target_travel_steps = self.current_travel_step;
        self.next_due_ns = None;
        self.on_finish = None;
    }

    /// Advance the pulse train to `now_ns`.
    ///
    /// Emits as many pulses as the elapsed wall-clock time permits given
    /// the current interval and returns the count emitted. Never blocks.
    pub fn update(&mut self, now_ns: i64) -> u32 {
        if self.state == RampState::Idle {
            return 0;
        }

        // First poll after a move starts: the first pulse is due now.
        if self.next_due_ns.is_none() {
            self.next_due_ns = Some(now_ns);
        }

        let mut emitted = 0;
        while self.state != RampState::Idle {
            let due = match self.next_due_ns {
                Some(due) if now_ns >= due => due,
                _ => break,
            };
            self.step_once();
            emitted += 1;
            self.next_due_ns = Some(due + (self.interval_us as i64) * 1_000);
        }
        emitted
    }

    /// Steps needed to ramp down from `speed` at the configured
    /// deceleration, rounded.
    fn braking_steps(&self, speed: u32) -> u32 {
        let v = speed as u64;
        let d = self.deceleration as u64;
        ((v * v + d) / (2 * d)) as u32
    }

    fn begin_move(&mut self, dir: Direction, steps: u32, continuous: bool) {
        self.direction = dir;
        self.driver.set_direction(dir);
        self.continuous_move = continuous;
        self.target_travel_steps = steps;
        self.current_travel_step = 0;
        self.rest_interval = 0;
        self.next_due_ns = None;

        let v = self.max_speed as u64;
        let a = self.acceleration as u64;
        let d = self.deceleration as u64;
        self.accel_steps = ((v * v + a) / (2 * a)) as u32;
        self.decel_steps = ((v * v + d) / (2 * d)) as u32;

        // Move too short to reach cruise speed: re-derive a triangular
        // profile that still sums to exactly `steps`.
        if !continuous && self.accel_steps as u64 + self.decel_steps as u64 > steps as u64 {
            self.accel_steps = ((steps as u64 * d) / (a + d)) as u32;
            self.decel_steps = steps - self.accel_steps;
        }

        match self.mode {
            MotionMode::Constant => {
                self.interval_us = self.run_interval_us;
                self.state = RampState::Running;
            }
            MotionMode::Linear => {
                let c0 = C0_NUM / (a * 1_000_000).isqrt().max(1);
                if c0 <= self.run_interval_us || self.accel_steps == 0 {
                    // Already at (or faster than) cruise from the first step.
                    self.interval_us = self.run_interval_us;
                    self.state = RampState::Running;
                } else {
                    self.interval_us = c0;
                    self.state = RampState::Accelerating;
                }
            }
        }
    }

    /// Emit one pulse and advance the ramp bookkeeping.
    fn step_once(&mut self) {
        self.driver.step_pulse();
        self.absolute_step += self.direction.step_delta();
        self.current_travel_step = self.current_travel_step.saturating_add(1);

        if !self.continuous_move {
            let remaining = self
                .target_travel_steps
                .saturating_sub(self.current_travel_step);
            // Guard: a finished move goes Idle before the braking
            // recurrence could divide by a degenerate denominator.
            if remaining == 0 {
                self.finish_move();
                return;
            }
            if self.state != RampState::Braking && remaining <= self.decel_steps {
                self.state = RampState::Braking;
                self.rest_interval = 0;
            }
        }

        if self.mode == MotionMode::Constant {
            self.interval_us = self.run_interval_us;
            return;
        }

        match self.state {
            RampState::Accelerating => {
                let n = self.current_travel_step as i64;
                let num = 2 * self.interval_us as i64 + self.rest_interval;
                let den = 4 * n + 1;
                let next = self.interval_us as i64 - num / den;
                self.rest_interval = num % den;
                self.interval_us = next.max(0) as u64;

                if self.interval_us <= self.run_interval_us
                    || self.current_travel_step > self.accel_steps
                {
                    self.interval_us = self.run_interval_us;
                    self.rest_interval = 0;
                    self.state = RampState::Running;
                }
            }
            RampState::Running => {
                self.interval_us = self.run_interval_us;
            }
            RampState::Braking => {
                let remaining = self
                    .target_travel_steps
                    .saturating_sub(self.current_travel_step) as i64;
                let num = 2 * self.interval_us as i64 + self.rest_interval;
                let den = -4 * remaining + 1;
                let next = self.interval_us as i64 - num / den;
                self.rest_interval = num % den;
                // Floor: rounding must never push the axis past max_speed.
                self.interval_us = (next.max(0) as u64).max(self.run_interval_us);
            }
            RampState::Idle => {}
        }
    }

    fn finish_move(&mut self) {
        self.state = RampState::Idle;
        self.continuous_move = false;
        self.next_due_ns = None;
        if let Some(f) = self.on_finish.take() {
            f();
        }
    }
}
