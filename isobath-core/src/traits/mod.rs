//! Hardware abstraction traits
//!
//! These traits define the boundary between the control core and the
//! hardware (or simulation) it runs against. The core never talks to a pin,
//! a bus, or a filesystem directly.

mod io;
mod step;

pub use io::{
    Clock, ErrorSink, Indicator, LimitSwitch, LogError, SensorError, SensorSampler, Severity,
    TelemetryLogger,
};
pub use step::{StepOutput, UnsupportedResolution};
