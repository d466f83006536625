//! Closed-enum mission automaton
//!
//! Transitions always run the exiting state's teardown before the entering
//! state's setup, and both are reported through the error sink so the log
//! carries the full state history. Two states are terminal: `SdTranslate`
//! (normal end, reached only through the mission timeout) and
//! `ErrorIndication` (unrecoverable fault).

use crate::actuator::{ActuatorAxis, ActuatorError, HomingPoll};
use crate::config::{ConfigError, MissionConfig, PhaseRamp};
use crate::motion::MotionError;
use crate::telemetry::Telemetry;
use crate::traits::{
    Clock, ErrorSink, Indicator, LimitSwitch, SensorSampler, Severity, StepOutput, TelemetryLogger,
};

/// Mission phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissionState {
    /// Sensor/logger bring-up and buoyancy calibration
    Initialization,
    /// Filling the ballast tank
    Diving,
    /// Emptying the ballast tank
    Resurfacing,
    /// Surface checkpoint between dive cycles
    Surfaced,
    /// Log handed off for SD translation; mission over
    SdTranslate,
    /// Unrecoverable fault; signalling forever
    ErrorIndication,
}

impl MissionState {
    pub fn name(self) -> &'static str {
        match self {
            MissionState::Initialization => "Initialization",
            MissionState::Diving => "Diving",
            MissionState::Resurfacing => "Resurfacing",
            MissionState::Surfaced => "Surfaced",
            MissionState::SdTranslate => "SD_translate",
            MissionState::ErrorIndication => "ErrorIndication",
        }
    }

    /// Compact code recorded in each telemetry record.
    pub fn code(self) -> u8 {
        match self {
            MissionState::Initialization => 0,
            MissionState::Diving => 1,
            MissionState::Resurfacing => 2,
            MissionState::Surfaced => 3,
            MissionState::SdTranslate => 4,
            MissionState::ErrorIndication => 5,
        }
    }

    /// Terminal states never transition out.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MissionState::SdTranslate | MissionState::ErrorIndication
        )
    }
}

/// Collaborators borrowed for the duration of one tick.
pub struct MissionIo<'a> {
    pub clock: &'a dyn Clock,
    pub sampler: &'a mut dyn SensorSampler,
    pub logger: &'a mut dyn TelemetryLogger,
    pub errors: &'a mut dyn ErrorSink,
    pub indicator: &'a mut dyn Indicator,
}

/// Mission construction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MissionSetupError {
    Config(ConfigError),
    Motion(MotionError),
}

impl From<ConfigError> for MissionSetupError {
    fn from(e: ConfigError) -> Self {
        MissionSetupError::Config(e)
    }
}

impl From<MotionError> for MissionSetupError {
    fn from(e: MotionError) -> Self {
        MissionSetupError::Motion(e)
    }
}

/// Format through a bounded stack buffer; overlong messages truncate.
fn report_fmt(errors: &mut dyn ErrorSink, severity: Severity, args: core::fmt::Arguments<'_>) {
    let mut buf: heapless::String<96> = heapless::String::new();
    let _ = core::fmt::write(&mut buf, args);
    errors.report(severity, buf.as_str());
}

/// The mission context: all run-state lives here, nothing is global.
pub struct Mission<S: StepOutput, L: LimitSwitch> {
    state: MissionState,
    config: MissionConfig,
    buoyancy: ActuatorAxis<S, L>,
    telemetry: Telemetry,

    /// Armed when Diving is first entered; the timeout counts from here
    mission_start_ns: Option<i64>,
    /// Latched non-fatal warning (low battery mid-mission)
    warning: bool,
    /// Cleared until the first tick runs Initialization's setup
    entered: bool,
}

impl<S: StepOutput, L: LimitSwitch> Mission<S, L> {
    /// Validate the config and build the mission around a buoyancy axis.
    ///
    /// The axis starts with the calibration ramp; each phase swaps in its
    /// own on entry.
    pub fn new(
        config: MissionConfig,
        buoyancy: ActuatorAxis<S, L>,
    ) -> Result<Self, MissionSetupError> {
        config.validate()?;
        Ok(Self {
            state: MissionState::Initialization,
            config,
            buoyancy,
            telemetry: Telemetry::default(),
            mission_start_ns: None,
            warning: false,
            entered: false,
        })
    }

    pub fn state(&self) -> MissionState {
        self.state
    }

    pub fn current_state_name(&self) -> &'static str {
        self.state.name()
    }

    /// Mission reached its normal end.
    pub fn is_complete(&self) -> bool {
        self.state == MissionState::SdTranslate
    }

    /// Mission is stuck signalling an unrecoverable fault.
    pub fn is_faulted(&self) -> bool {
        self.state == MissionState::ErrorIndication
    }

    pub fn warning(&self) -> bool {
        self.warning
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn buoyancy(&self) -> &ActuatorAxis<S, L> {
        &self.buoyancy
    }

    /// Run one mission tick.
    pub fn tick(&mut self, io: &mut MissionIo<'_>) {
        let now = io.clock.now_ns();

        if !self.entered {
            self.entered = true;
            report_fmt(
                io.errors,
                Severity::Info,
                format_args!("entering {}", self.state.name()),
            );
            if let Some(next) = self.enter(io, now) {
                self.transition(io, next, now);
                return;
            }
        }

        if let Some(next) = self.run(io, now) {
            self.transition(io, next, now);
        }
    }

    /// Exit-then-enter, chained until a state settles.
    fn transition(&mut self, io: &mut MissionIo<'_>, mut next: MissionState, now: i64) {
        loop {
            report_fmt(
                io.errors,
                Severity::Info,
                format_args!("leaving {}", self.state.name()),
            );
            self.state = next;
            report_fmt(
                io.errors,
                Severity::Info,
                format_args!("entering {}", self.state.name()),
            );
            match self.enter(io, now) {
                Some(n) => next = n,
                None => break,
            }
        }
    }

    /// One-shot setup on entry. Returns a state to chain into on failure
    /// (or, for degenerate phases, on immediate completion).
    fn enter(&mut self, io: &mut MissionIo<'_>, now: i64) -> Option<MissionState> {
        match self.state {
            MissionState::Initialization => {
                io.indicator.startup_sequence();

                if let Err(e) = io.sampler.init() {
                    report_fmt(
                        io.errors,
                        Severity::Critical,
                        format_args!("sensor init failed: {:?}", e),
                    );
                    return Some(MissionState::ErrorIndication);
                }
                if let Err(e) = io.logger.start() {
                    report_fmt(
                        io.errors,
                        Severity::Critical,
                        format_args!("log start failed: {:?}", e),
                    );
                    return Some(MissionState::ErrorIndication);
                }

                io.sampler.sample_into(&mut self.telemetry);
                let v = self.telemetry.battery_v;
                if v < self.config.battery_min_v || v > self.config.battery_max_v {
                    report_fmt(
                        io.errors,
                        Severity::Critical,
                        format_args!(
                            "battery {:.2} V outside {:.1}-{:.1} V",
                            v, self.config.battery_min_v, self.config.battery_max_v
                        ),
                    );
                    return Some(MissionState::ErrorIndication);
                }

                let setup = self
                    .apply_ramp(self.config.homing)
                    .and_then(|_| self.buoyancy.start_homing(now).map_err(ActuatorError::from));
                if let Err(e) = setup {
                    report_fmt(
                        io.errors,
                        Severity::Critical,
                        format_args!("buoyancy: calibration start failed: {:?}", e),
                    );
                    return Some(MissionState::ErrorIndication);
                }
                None
            }

            MissionState::Diving => {
                if self.mission_start_ns.is_none() {
                    self.mission_start_ns = Some(now);
                }
                let cmd = self
                    .apply_ramp(self.config.dive)
                    .and_then(|_| self.buoyancy.sink());
                self.command_failure_to_fault(io, cmd, "dive")
            }

            MissionState::Resurfacing => {
                let cmd = self
                    .apply_ramp(self.config.resurface)
                    .and_then(|_| self.buoyancy.rise());
                self.command_failure_to_fault(io, cmd, "resurface")
            }

            MissionState::Surfaced => {
                let cmd = self.apply_ramp(self.config.surfaced);
                self.command_failure_to_fault(io, cmd, "surface trim")
            }

            MissionState::SdTranslate => {
                self.buoyancy.stop();
                io.logger.close();
                io.indicator.mission_complete();
                io.errors.report(Severity::Info, "mission complete, log closed");
                None
            }

            MissionState::ErrorIndication => {
                self.buoyancy.stop();
                None
            }
        }
    }

    /// Per-tick behavior. Returns the next state when a transition is due.
    fn run(&mut self, io: &mut MissionIo<'_>, now: i64) -> Option<MissionState> {
        match self.state {
            MissionState::Initialization => {
                self.heartbeat(io);
                match self
                    .buoyancy
                    .poll_homing(now, self.config.calibration_timeout_ns)
                {
                    HomingPoll::Busy => None,
                    HomingPoll::Done => Some(MissionState::Diving),
                    HomingPoll::TimedOut => {
                        io.errors
                            .report(Severity::Critical, "buoyancy: calibration timed out");
                        Some(MissionState::ErrorIndication)
                    }
                }
            }

            MissionState::Diving => {
                if self.mission_elapsed(now) {
                    return Some(MissionState::SdTranslate);
                }
                if let Some(fault) = self.observe(io, now) {
                    return Some(fault);
                }
                self.buoyancy.update(now);
                self.heartbeat(io);
                if self.buoyancy.at_target() {
                    return Some(MissionState::Resurfacing);
                }
                None
            }

            MissionState::Resurfacing => {
                if self.mission_elapsed(now) {
                    return Some(MissionState::SdTranslate);
                }
                if let Some(fault) = self.observe(io, now) {
                    return Some(fault);
                }
                self.buoyancy.update(now);
                self.heartbeat(io);
                if self.buoyancy.at_target() {
                    // A rise cut short by the limit switch still empties the
                    // tank; anything else means another descent is due.
                    return Some(if self.buoyancy.tank_empty() {
                        MissionState::Surfaced
                    } else {
                        MissionState::Diving
                    });
                }
                None
            }

            MissionState::Surfaced => {
                if self.mission_elapsed(now) {
                    return Some(MissionState::SdTranslate);
                }
                if let Some(fault) = self.observe(io, now) {
                    return Some(fault);
                }
                self.heartbeat(io);
                // One checkpoint record at the surface, then the next
                // descent; the profile repeats until the clock runs out.
                Some(MissionState::Diving)
            }

            MissionState::SdTranslate => None,

            MissionState::ErrorIndication => {
                io.indicator.error_pattern();
                None
            }
        }
    }

    fn apply_ramp(&mut self, ramp: PhaseRamp) -> Result<(), ActuatorError> {
        self.buoyancy
            .set_ramp(ramp.max_speed, ramp.acceleration, ramp.deceleration)
            .map_err(ActuatorError::from)
    }

    fn command_failure_to_fault(
        &mut self,
        io: &mut MissionIo<'_>,
        result: Result<(), ActuatorError>,
        what: &str,
    ) -> Option<MissionState> {
        match result {
            Ok(()) => None,
            Err(e) => {
                report_fmt(
                    io.errors,
                    Severity::Critical,
                    format_args!("buoyancy: {} command failed: {:?}", what, e),
                );
                Some(MissionState::ErrorIndication)
            }
        }
    }

    fn mission_elapsed(&self, now: i64) -> bool {
        match self.mission_start_ns {
            Some(start) => now.saturating_sub(start) >= self.config.duration.as_ns(),
            None => false,
        }
    }

    fn heartbeat(&mut self, io: &mut MissionIo<'_>) {
        if self.warning {
            io.indicator.warning_pattern();
        } else {
            io.indicator.ok_pattern();
        }
    }

    /// Assemble and log one telemetry record.
    ///
    /// A failed log write is the one runtime condition that faults the
    /// mission: an unlogged mission is a lost mission.
    fn observe(&mut self, io: &mut MissionIo<'_>, now: i64) -> Option<MissionState> {
        let prev = self.telemetry.time_ns;
        io.sampler.sample_into(&mut self.telemetry);
        self.telemetry.time_ns = now;
        self.telemetry.delta_ns = if prev == 0 { 0 } else { now - prev };
        self.telemetry.state = self.state.code();

        if !self.warning && self.telemetry.battery_v < self.config.battery_min_v {
            self.warning = true;
            report_fmt(
                io.errors,
                Severity::Warning,
                format_args!("battery low: {:.2} V", self.telemetry.battery_v),
            );
        }
        self.telemetry.warning = self.warning;
        self.telemetry.buoyancy = self.buoyancy.snapshot();

        if let Err(e) = io.logger.write(&self.telemetry) {
            report_fmt(
                io.errors,
                Severity::Critical,
                format_args!("log write failed: {:?}", e),
            );
            return Some(MissionState::ErrorIndication);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actuator::{AxisRole, TankGeometry};
    use crate::config::MissionDuration;
    use crate::motion::{Direction, Resolution};
    use crate::traits::{LogError, SensorError, UnsupportedResolution};
    use core::cell::Cell;
    use std::rc::Rc;

    /// Simulated carriage: step pulses move a shared position counter, and
    /// the switch closes whenever the carriage sits at (or below) home.
    struct RigPins {
        pos: Rc<Cell<i64>>,
        dir: i64,
    }

    impl StepOutput for RigPins {
        fn set_direction(&mut self, dir: Direction) {
            self.dir = match dir {
                Direction::Clockwise => 1,
                Direction::CounterClockwise => -1,
            };
        }

        fn step_pulse(&mut self) {
            self.pos.set(self.pos.get() + self.dir);
        }

        fn apply_resolution(&mut self, _r: Resolution) -> Result<(), UnsupportedResolution> {
            Ok(())
        }
    }

    struct RigSwitch {
        pos: Rc<Cell<i64>>,
    }

    impl LimitSwitch for RigSwitch {
        fn is_triggered(&mut self) -> bool {
            self.pos.get() <= 0
        }
    }

    struct FakeClock {
        now: Cell<i64>,
    }

    impl Clock for FakeClock {
        fn now_ns(&self) -> i64 {
            self.now.get()
        }
    }

    struct FakeSampler {
        battery_v: f32,
        init_result: Result<(), SensorError>,
    }

    impl SensorSampler for FakeSampler {
        fn init(&mut self) -> Result<(), SensorError> {
            self.init_result
        }

        fn sample_into(&mut self, telemetry: &mut Telemetry) {
            telemetry.battery_v = self.battery_v;
            telemetry.water_temp_c = 12.5;
            telemetry.pressure_mbar = 1013.0;
        }
    }

    #[derive(Default)]
    struct FakeLogger {
        started: bool,
        closed: bool,
        records: Vec<Telemetry>,
        start_fails: bool,
        fail_writes_after: Option<usize>,
    }

    impl TelemetryLogger for FakeLogger {
        fn start(&mut self) -> Result<(), LogError> {
            if self.start_fails {
                return Err(LogError::NotStarted);
            }
            self.started = true;
            Ok(())
        }

        fn write(&mut self, telemetry: &Telemetry) -> Result<(), LogError> {
            if let Some(limit) = self.fail_writes_after {
                if self.records.len() >= limit {
                    return Err(LogError::WriteFailed);
                }
            }
            self.records.push(*telemetry);
            Ok(())
        }

        fn close(&mut self) {
            self.closed = true;
        }
    }

    #[derive(Default)]
    struct SpySink {
        events: Vec<(Severity, String)>,
    }

    impl ErrorSink for SpySink {
        fn report(&mut self, severity: Severity, message: &str) {
            self.events.push((severity, message.to_string()));
        }
    }

    #[derive(Default)]
    struct FakeIndicator {
        startups: u32,
        completions: u32,
        error_ticks: u32,
        warning_ticks: u32,
    }

    impl Indicator for FakeIndicator {
        fn startup_sequence(&mut self) {
            self.startups += 1;
        }
        fn ok_pattern(&mut self) {}
        fn warning_pattern(&mut self) {
            self.warning_ticks += 1;
        }
        fn error_pattern(&mut self) {
            self.error_ticks += 1;
        }
        fn mission_complete(&mut self) {
            self.completions += 1;
        }
    }

    struct Harness {
        clock: FakeClock,
        sampler: FakeSampler,
        logger: FakeLogger,
        sink: SpySink,
        indicator: FakeIndicator,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                clock: FakeClock { now: Cell::new(0) },
                sampler: FakeSampler {
                    battery_v: 11.5,
                    init_result: Ok(()),
                },
                logger: FakeLogger::default(),
                sink: SpySink::default(),
                indicator: FakeIndicator::default(),
            }
        }

        /// Advance 1 ms and run one tick.
        fn tick(&mut self, mission: &mut Mission<RigPins, RigSwitch>) {
            self.clock.now.set(self.clock.now.get() + 1_000_000);
            let mut io = MissionIo {
                clock: &self.clock,
                sampler: &mut self.sampler,
                logger: &mut self.logger,
                errors: &mut self.sink,
                indicator: &mut self.indicator,
            };
            mission.tick(&mut io);
        }

        fn saw(&self, needle: &str) -> bool {
            self.sink.events.iter().any(|(_, m)| m.contains(needle))
        }
    }

    fn test_config(duration_s: u32) -> MissionConfig {
        MissionConfig {
            duration: MissionDuration {
                seconds: duration_s,
                ..Default::default()
            },
            calibration_timeout_ns: 2_000_000_000,
            ..Default::default()
        }
    }

    /// Build a mission with the carriage parked `start_pos` microsteps
    /// above the home switch.
    fn mission(config: MissionConfig, start_pos: i64) -> Mission<RigPins, RigSwitch> {
        let pos = Rc::new(Cell::new(start_pos));
        let axis = ActuatorAxis::new(
            RigPins {
                pos: Rc::clone(&pos),
                dir: 1,
            },
            RigSwitch { pos },
            AxisRole::Buoyancy,
            config.tank,
            config.resolution,
            config.homing.max_speed,
            config.homing.acceleration,
            config.homing.deceleration,
        )
        .unwrap();
        Mission::new(config, axis).unwrap()
    }

    /// Tick until the mission reaches `state` or the bound trips.
    fn run_until(
        h: &mut Harness,
        m: &mut Mission<RigPins, RigSwitch>,
        state: MissionState,
        max_ticks: u32,
    ) {
        for _ in 0..max_ticks {
            if m.state() == state {
                return;
            }
            h.tick(m);
        }
        panic!("never reached {:?}, stuck in {:?}", state, m.state());
    }

    #[test]
    fn test_invalid_config_rejected_at_construction() {
        let mut cfg = test_config(10);
        cfg.dive.max_speed = 0;
        let pos = Rc::new(Cell::new(0i64));
        let axis = ActuatorAxis::new(
            RigPins {
                pos: Rc::clone(&pos),
                dir: 1,
            },
            RigSwitch { pos },
            AxisRole::Buoyancy,
            cfg.tank,
            cfg.resolution,
            1000,
            1000,
            1000,
        )
        .unwrap();
        assert!(matches!(
            Mission::new(cfg, axis),
            Err(MissionSetupError::Config(ConfigError::ZeroRamp))
        ));
    }

    #[test]
    fn test_full_mission_runs_to_completion() {
        let mut h = Harness::new();
        let mut m = mission(test_config(20), 50);

        run_until(&mut h, &mut m, MissionState::Diving, 200);
        assert!(h.logger.started);
        assert_eq!(h.indicator.startups, 1);

        run_until(&mut h, &mut m, MissionState::Resurfacing, 10_000);
        run_until(&mut h, &mut m, MissionState::Surfaced, 10_000);
        assert!(m.buoyancy().tank_empty());

        run_until(&mut h, &mut m, MissionState::SdTranslate, 30_000);
        assert!(m.is_complete());
        assert!(!m.is_faulted());
        assert!(h.logger.closed);
        assert_eq!(h.indicator.completions, 1);
        assert!(!h.logger.records.is_empty());

        // Terminal: further ticks change nothing.
        for _ in 0..10 {
            h.tick(&mut m);
        }
        assert_eq!(m.state(), MissionState::SdTranslate);
        assert_eq!(h.indicator.completions, 1);
    }

    #[test]
    fn test_exit_reported_before_enter() {
        let mut h = Harness::new();
        let mut m = mission(test_config(20), 10);
        run_until(&mut h, &mut m, MissionState::Diving, 100);

        let msgs: Vec<&str> = h.sink.events.iter().map(|(_, m)| m.as_str()).collect();
        let leave = msgs
            .iter()
            .position(|m| *m == "leaving Initialization")
            .unwrap();
        let enter = msgs.iter().position(|m| *m == "entering Diving").unwrap();
        assert!(leave < enter);
        // Initialization was entered before it was left.
        let first_enter = msgs
            .iter()
            .position(|m| *m == "entering Initialization")
            .unwrap();
        assert!(first_enter < leave);
    }

    #[test]
    fn test_calibration_timeout_faults() {
        let mut h = Harness::new();
        // Carriage parked far from the switch: the creep cannot reach it
        // within the 2 s calibration window.
        let mut m = mission(test_config(20), 10_000_000);
        run_until(&mut h, &mut m, MissionState::ErrorIndication, 5_000);
        assert!(m.is_faulted());
        assert!(h.saw("calibration timed out"));
        assert!(!h.logger.closed);

        // The fault pattern repeats on every further tick.
        let before = h.indicator.error_ticks;
        for _ in 0..5 {
            h.tick(&mut m);
        }
        assert_eq!(h.indicator.error_ticks, before + 5);
    }

    #[test]
    fn test_battery_out_of_window_faults_at_startup() {
        let mut h = Harness::new();
        h.sampler.battery_v = 5.0;
        let mut m = mission(test_config(20), 0);
        h.tick(&mut m);
        assert!(m.is_faulted());
        assert!(h.saw("battery 5.00 V outside"));
    }

    #[test]
    fn test_sensor_init_failure_faults() {
        let mut h = Harness::new();
        h.sampler.init_result = Err(SensorError::InitFailed);
        let mut m = mission(test_config(20), 0);
        h.tick(&mut m);
        assert!(m.is_faulted());
        assert!(h.saw("sensor init failed"));
    }

    #[test]
    fn test_log_start_failure_faults() {
        let mut h = Harness::new();
        h.logger.start_fails = true;
        let mut m = mission(test_config(20), 0);
        h.tick(&mut m);
        assert!(m.is_faulted());
        assert!(h.saw("log start failed"));
    }

    #[test]
    fn test_log_write_failure_faults_mid_mission() {
        let mut h = Harness::new();
        h.logger.fail_writes_after = Some(5);
        let mut m = mission(test_config(20), 1);
        run_until(&mut h, &mut m, MissionState::ErrorIndication, 1_000);
        assert!(h.saw("log write failed"));
        assert_eq!(h.logger.records.len(), 5);
        assert!(m.buoyancy().motion().is_idle());
    }

    #[test]
    fn test_timeout_ends_mission_from_diving() {
        let mut h = Harness::new();
        // 1 s mission with a huge tank: the dive cannot finish in time.
        let mut cfg = test_config(1);
        cfg.tank = TankGeometry {
            rod_length_mm: 100_000,
            mm_per_rev: 8,
        };
        let mut m = mission(cfg, 1);
        run_until(&mut h, &mut m, MissionState::Diving, 100);
        run_until(&mut h, &mut m, MissionState::SdTranslate, 2_000);
        assert!(m.is_complete());
        assert!(h.logger.closed);
    }

    #[test]
    fn test_low_battery_mid_mission_warns_but_continues() {
        let mut h = Harness::new();
        let mut m = mission(test_config(20), 1);
        run_until(&mut h, &mut m, MissionState::Diving, 100);

        h.sampler.battery_v = 8.0;
        for _ in 0..20 {
            h.tick(&mut m);
        }
        assert!(m.warning());
        assert!(!m.is_faulted());
        assert!(h.saw("battery low"));
        assert!(h.indicator.warning_ticks > 0);
        // The latch reports once, not per tick.
        let warnings = h
            .sink
            .events
            .iter()
            .filter(|(s, _)| *s == Severity::Warning)
            .count();
        assert_eq!(warnings, 1);
        assert!(h.logger.records.last().unwrap().warning);
    }

    #[test]
    fn test_telemetry_records_state_and_timing() {
        let mut h = Harness::new();
        let mut m = mission(test_config(20), 1);
        run_until(&mut h, &mut m, MissionState::Diving, 100);
        for _ in 0..5 {
            h.tick(&mut m);
        }
        let records = &h.logger.records;
        assert!(records.len() >= 2);
        let last = &records[records.len() - 1];
        let prev = &records[records.len() - 2];
        assert_eq!(last.state, MissionState::Diving.code());
        assert_eq!(last.delta_ns, last.time_ns - prev.time_ns);
        assert!(last.buoyancy.homed);
    }
}
