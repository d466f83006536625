//! Full-mission simulation
//!
//! Runs the control core against the simulated rig at a 1 ms tick:
//! calibration, dive, resurface, surface hold, and the timed mission end.
//!
//! ```text
//! isobath-sim [mission.toml]
//! ```
//!
//! Without an argument the built-in default mission (30 minutes, 250 mm
//! tank) runs. Telemetry lands in `mission_log.jsonl`.

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::info;

use isobath_core::actuator::{ActuatorAxis, AxisRole};
use isobath_core::config::MissionConfig;
use isobath_core::mission::{Mission, MissionIo};
use isobath_sim::logger::{init_logging, JsonlLogger};
use isobath_sim::rig::{
    carriage_at, ConsoleIndicator, ConsoleSink, SimClock, SimLimit, SimSensors, SimStepper,
};

const TICK_NS: i64 = 1_000_000;

fn load_config() -> Result<MissionConfig> {
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .wrap_err_with(|| format!("reading config {path}"))?;
            toml::from_str(&text).wrap_err_with(|| format!("parsing config {path}"))?
        }
        None => MissionConfig::default(),
    };
    config
        .validate()
        .map_err(|e| eyre!("invalid mission config: {e}"))?;
    Ok(config)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_logging(log::LevelFilter::Info)?;

    let config = load_config()?;
    info!(
        "mission: {} s, tank {} mm, {:?} stepping",
        config.duration.as_ns() / 1_000_000_000,
        config.tank.rod_length_mm,
        config.resolution
    );

    // Park the carriage 2 mm off the switch so calibration has work to do.
    let carriage = carriage_at(config.tank.steps_from_mm(2, config.resolution));

    let axis = ActuatorAxis::new(
        SimStepper::new(carriage.clone()),
        SimLimit::new(carriage.clone()),
        AxisRole::Buoyancy,
        config.tank,
        config.resolution,
        config.homing.max_speed,
        config.homing.acceleration,
        config.homing.deceleration,
    )
    .map_err(|e| eyre!("buoyancy axis setup failed: {e:?}"))?;

    let mut mission =
        Mission::new(config, axis).map_err(|e| eyre!("mission setup failed: {e:?}"))?;

    let clock = SimClock::new();
    let mut sensors = SimSensors::new(carriage, 11.8);
    let mut telemetry_log = JsonlLogger::new("mission_log.jsonl");
    let mut sink = ConsoleSink;
    let mut indicator = ConsoleIndicator::default();

    // Mission duration plus a minute of margin for calibration and the
    // final ramp-down.
    let tick_budget = config.duration.as_ns() / TICK_NS + 60_000;
    for _ in 0..tick_budget {
        clock.advance(TICK_NS);
        let mut io = MissionIo {
            clock: &clock,
            sampler: &mut sensors,
            logger: &mut telemetry_log,
            errors: &mut sink,
            indicator: &mut indicator,
        };
        mission.tick(&mut io);
        if mission.is_complete() || mission.is_faulted() {
            break;
        }
    }

    info!("final state: {}", mission.current_state_name());
    info!(
        "carriage at {:.1} mm, {} telemetry records in {}",
        mission.buoyancy().current_position_mm(),
        telemetry_log.records_written(),
        telemetry_log.path().display()
    );

    if mission.is_faulted() {
        return Err(eyre!("mission ended in fault indication"));
    }
    if !mission.is_complete() {
        return Err(eyre!("mission did not complete within the tick budget"));
    }
    Ok(())
}
