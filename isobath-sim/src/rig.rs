//! Simulated vehicle hardware
//!
//! The carriage position is one shared counter: the stepper moves it, the
//! limit switch reads it. That coupling is the whole point — homing and
//! end-of-travel behavior fall out of the same number the motion core is
//! driving.

use std::cell::Cell;
use std::rc::Rc;

use log::{error, info, warn};

use isobath_core::motion::{Direction, Resolution};
use isobath_core::telemetry::Telemetry;
use isobath_core::traits::{
    Clock, ErrorSink, Indicator, LimitSwitch, SensorError, SensorSampler, Severity, StepOutput,
    UnsupportedResolution,
};

/// Manually advanced monotonic clock.
pub struct SimClock {
    now_ns: Cell<i64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            now_ns: Cell::new(0),
        }
    }

    pub fn advance(&self, ns: i64) {
        self.now_ns.set(self.now_ns.get() + ns);
    }
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SimClock {
    fn now_ns(&self) -> i64 {
        self.now_ns.get()
    }
}

/// Shared carriage position in microsteps above the home switch.
pub type Carriage = Rc<Cell<i64>>;

pub fn carriage_at(microsteps: i64) -> Carriage {
    Rc::new(Cell::new(microsteps))
}

/// Stepper front-end that moves the shared carriage.
pub struct SimStepper {
    carriage: Carriage,
    dir: i64,
}

impl SimStepper {
    pub fn new(carriage: Carriage) -> Self {
        Self { carriage, dir: 1 }
    }
}

impl StepOutput for SimStepper {
    fn set_direction(&mut self, dir: Direction) {
        self.dir = match dir {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        };
    }

    fn step_pulse(&mut self) {
        self.carriage.set(self.carriage.get() + self.dir);
    }

    fn apply_resolution(&mut self, _resolution: Resolution) -> Result<(), UnsupportedResolution> {
        Ok(())
    }
}

/// Limit switch closed whenever the carriage sits at (or below) home.
pub struct SimLimit {
    carriage: Carriage,
}

impl SimLimit {
    pub fn new(carriage: Carriage) -> Self {
        Self { carriage }
    }
}

impl LimitSwitch for SimLimit {
    fn is_triggered(&mut self) -> bool {
        self.carriage.get() <= 0
    }
}

/// Fake sensor suite.
///
/// Battery drains a little per sample; pressure tracks the carriage (tank
/// full reads deeper) so logged records show the dive happening.
pub struct SimSensors {
    carriage: Carriage,
    battery_v: f32,
    drain_v_per_sample: f32,
}

impl SimSensors {
    pub fn new(carriage: Carriage, battery_v: f32) -> Self {
        Self {
            carriage,
            battery_v,
            drain_v_per_sample: 0.0,
        }
    }

    /// Enable a per-sample battery drain (for exercising the warning latch).
    pub fn with_drain(mut self, volts_per_sample: f32) -> Self {
        self.drain_v_per_sample = volts_per_sample;
        self
    }
}

impl SensorSampler for SimSensors {
    fn init(&mut self) -> Result<(), SensorError> {
        Ok(())
    }

    fn sample_into(&mut self, telemetry: &mut Telemetry) {
        self.battery_v -= self.drain_v_per_sample;
        telemetry.battery_v = self.battery_v;
        telemetry.water_temp_c = 11.2;
        telemetry.pressure_mbar = 1013.0 + self.carriage.get() as f32 * 0.01;
        telemetry.orientation_deg = [0.0, 0.0, 0.0];
    }
}

/// Fault reports forwarded to the host log.
pub struct ConsoleSink;

impl ErrorSink for ConsoleSink {
    fn report(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!("{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Critical => error!("{}", message),
        }
    }
}

/// Indicator that narrates to the host log instead of blinking.
///
/// The repeating patterns are polled every tick; only one line per
/// thousand polls is emitted to keep the log readable.
#[derive(Default)]
pub struct ConsoleIndicator {
    pattern_ticks: u32,
}

impl ConsoleIndicator {
    fn throttled(&mut self) -> bool {
        self.pattern_ticks = self.pattern_ticks.wrapping_add(1);
        self.pattern_ticks % 1000 == 1
    }
}

impl Indicator for ConsoleIndicator {
    fn startup_sequence(&mut self) {
        info!("indicator: startup sequence");
    }

    fn ok_pattern(&mut self) {}

    fn warning_pattern(&mut self) {
        if self.throttled() {
            warn!("indicator: warning pattern");
        }
    }

    fn error_pattern(&mut self) {
        if self.throttled() {
            error!("indicator: fault pattern");
        }
    }

    fn mission_complete(&mut self) {
        info!("indicator: mission complete");
    }
}
