//! Host logging
//!
//! Two separate sinks: fern feeds the human-readable console log, and
//! `JsonlLogger` implements the core's `TelemetryLogger` trait by writing
//! one JSON object per line (the host stand-in for the vehicle's SD card).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use color_eyre::eyre::Result;
use colored::{ColoredString, Colorize};
use log::LevelFilter;

use isobath_core::telemetry::Telemetry;
use isobath_core::traits::{LogError, TelemetryLogger};

/// Initialise the console logger. Call once per process.
pub fn init_logging(min_level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                level_to_str(record.level()),
                message
            ))
        })
        .level(min_level)
        .chain(std::io::stdout())
        .apply()?;
    Ok(())
}

fn level_to_str(level: log::Level) -> ColoredString {
    match level {
        log::Level::Trace => "TRC".dimmed().italic(),
        log::Level::Debug => "DBG".dimmed(),
        log::Level::Info => "INF".normal(),
        log::Level::Warn => "WRN".yellow(),
        log::Level::Error => "ERR".red().bold(),
    }
}

/// Telemetry sink writing one JSON record per line.
pub struct JsonlLogger {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    records: u64,
}

impl JsonlLogger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            records: 0,
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn records_written(&self) -> u64 {
        self.records
    }
}

impl TelemetryLogger for JsonlLogger {
    fn start(&mut self) -> Result<(), LogError> {
        let file = File::create(&self.path).map_err(|_| LogError::NotStarted)?;
        self.file = Some(BufWriter::new(file));
        self.records = 0;
        Ok(())
    }

    fn write(&mut self, telemetry: &Telemetry) -> Result<(), LogError> {
        let file = self.file.as_mut().ok_or(LogError::NotStarted)?;
        serde_json::to_writer(&mut *file, telemetry).map_err(|_| LogError::WriteFailed)?;
        file.write_all(b"\n").map_err(|_| LogError::WriteFailed)?;
        self.records += 1;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
    }
}
