//! Collaborator traits consumed by the mission state machine
//!
//! Sensor sampling, telemetry logging, fault reporting and indication are
//! all external to this core; the mission only ever sees these interfaces.

use crate::telemetry::Telemetry;

/// Monotonic time source.
///
/// Nanosecond resolution since an arbitrary epoch; never goes backwards.
pub trait Clock {
    fn now_ns(&self) -> i64;
}

/// Debounced end-of-travel switch.
pub trait LimitSwitch {
    /// Sample the switch. `true` means the carriage is at the home end.
    ///
    /// Takes `&mut self` so implementations can advance debounce state.
    fn is_triggered(&mut self) -> bool;
}

/// Telemetry logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogError {
    /// `start` was never called or the backing store went away
    NotStarted,
    /// A write was attempted and failed
    WriteFailed,
    /// The backing store is full
    StorageFull,
}

/// Sensor subsystem failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// A sensor did not come up during initialization
    InitFailed,
    /// A previously healthy sensor stopped responding
    NotResponding,
}

/// Fault severity for the error sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Opaque sensor sampler.
///
/// The core never inspects what the sampler measures beyond the battery
/// voltage used for the power-on check; it forwards the filled struct to
/// the logger.
pub trait SensorSampler {
    /// One-shot initialization at mission start.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Fill the sensor-owned fields of the telemetry record.
    fn sample_into(&mut self, telemetry: &mut Telemetry);
}

/// Telemetry sink (SD logger on the vehicle, a file in simulation).
pub trait TelemetryLogger {
    /// Open the log for this mission.
    fn start(&mut self) -> Result<(), LogError>;

    /// Append one telemetry record.
    fn write(&mut self, telemetry: &Telemetry) -> Result<(), LogError>;

    /// Flush and close the log. Called once, on mission completion.
    fn close(&mut self);
}

/// Best-effort fault reporter. Must never block and never panic.
pub trait ErrorSink {
    fn report(&mut self, severity: Severity, message: &str);
}

/// Visual/audible indication. Best-effort, polled.
pub trait Indicator {
    /// Power-on sequence, played once during initialization.
    fn startup_sequence(&mut self);

    /// Nominal heartbeat pattern; called once per mission tick.
    fn ok_pattern(&mut self);

    /// Latched-warning pattern; replaces the heartbeat once `warning` sets.
    fn warning_pattern(&mut self);

    /// Unrecoverable-fault pattern; repeated forever in ErrorIndication.
    fn error_pattern(&mut self);

    /// Mission-complete signal, played when the log is handed off.
    fn mission_complete(&mut self);
}
