//! Simulator runner for netlists produced from edited schematics.
//!
//! The only backend is QSPICE. Its executable is found through
//! [`SimulatorConfig`]; command line switches are validated against a fixed
//! table before anything is spawned.

mod config;
mod qspice;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use config::{SimulatorConfig, QSPICE_EXE_ENV};
pub use qspice::{Qspice, QSPICE_SWITCHES};

#[derive(Debug, thiserror::Error)]
pub enum SimulatorError {
    #[error(
        "Simulator executable not found. Pass an explicit path or set the SPICEKIT_QSPICE_EXE environment variable."
    )]
    NotFound,

    #[error("Simulator executable {} does not exist", .0.display())]
    MissingExecutable(PathBuf),

    #[error("Invalid switch for {simulator}: {switch}")]
    InvalidSwitch {
        simulator: &'static str,
        switch: String,
    },

    #[error("Switch {0} requires a path")]
    MissingSwitchPath(String),

    #[error("Failed to run simulator: {0:#}")]
    Process(#[from] anyhow::Error),
}

/// What happened when a netlist was simulated.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Simulator exited with a zero status before the timeout
    pub success: bool,
    pub timed_out: bool,
    /// Where the simulator was asked to write its console log
    pub log_file: PathBuf,
    /// Captured console output, ANSI sequences removed
    pub output: String,
}

/// A circuit simulator that can be driven from the command line.
pub trait Simulator {
    /// Short name used in log and error messages
    fn name(&self) -> &'static str;

    /// Expand a switch name into its command line arguments, substituting
    /// `path` for any `<path>` placeholder.
    fn valid_switch(&self, switch: &str, path: Option<&str>) -> Result<Vec<String>, SimulatorError>;

    /// Simulate `netlist`, killing the simulator after `timeout`.
    fn run(
        &self,
        netlist: &Path,
        switches: &[String],
        timeout: Option<Duration>,
    ) -> Result<RunOutcome, SimulatorError>;
}
