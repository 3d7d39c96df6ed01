use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{error, info};
use spicekit_command_runner::ProcessRunner;

use crate::{RunOutcome, Simulator, SimulatorConfig, SimulatorError};

/// Placeholder replaced by the caller's path in switch templates.
const PATH_PLACEHOLDER: &str = "<path>";

/// Command line switches QSPICE accepts, with their argument templates.
pub const QSPICE_SWITCHES: &[(&str, &[&str])] = &[
    // Output data (.qraw) format
    ("ASCII", &["-ASCII"]),
    ("binary", &["-binary"]),
    // MOS1/2/3 charge models
    ("BSIM1", &["-BSIM1"]),
    ("Meyer", &["-Meyer"]),
    // Console output file
    ("o", &["-o", PATH_PLACEHOLDER]),
    // Encrypt .prot/.unprot sections or subcircuit bodies
    ("ProtectSelections", &["-ProtectSelections", PATH_PLACEHOLDER]),
    ("ProtectSubcircuits", &["-ProtectSubcircuits", PATH_PLACEHOLDER]),
    // Output data file
    ("r", &["-r", PATH_PLACEHOLDER]),
];

/// The QSPICE simulator, bound to a resolved executable.
#[derive(Debug, Clone)]
pub struct Qspice {
    executable: PathBuf,
}

impl Qspice {
    pub const RAW_EXTENSION: &'static str = "qraw";

    pub fn new(config: &SimulatorConfig) -> Result<Self, SimulatorError> {
        let executable = config.resolve().inspect_err(|e| {
            if matches!(e, SimulatorError::NotFound) {
                error!("Unable to find the QSPICE executable");
            }
        })?;
        Ok(Self { executable })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Console log written next to the netlist.
    pub fn log_file(netlist: &Path) -> PathBuf {
        netlist.with_extension("log")
    }

    /// Arguments passed after the executable:
    /// `-o <netlist>.log <netlist> <switches...>`.
    pub fn arguments(netlist: &Path, switches: &[String]) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            Self::log_file(netlist).to_string_lossy().into_owned(),
            netlist.to_string_lossy().into_owned(),
        ];
        args.extend(switches.iter().cloned());
        args
    }
}

impl Simulator for Qspice {
    fn name(&self) -> &'static str {
        "QSPICE"
    }

    fn valid_switch(&self, switch: &str, path: Option<&str>) -> Result<Vec<String>, SimulatorError> {
        let (_, template) = QSPICE_SWITCHES
            .iter()
            .find(|(name, _)| *name == switch)
            .ok_or_else(|| SimulatorError::InvalidSwitch {
                simulator: self.name(),
                switch: switch.to_string(),
            })?;

        template
            .iter()
            .map(|arg| {
                if arg.contains(PATH_PLACEHOLDER) {
                    let path =
                        path.ok_or_else(|| SimulatorError::MissingSwitchPath(switch.to_string()))?;
                    Ok(arg.replace(PATH_PLACEHOLDER, path))
                } else {
                    Ok(arg.to_string())
                }
            })
            .collect()
    }

    fn run(
        &self,
        netlist: &Path,
        switches: &[String],
        timeout: Option<Duration>,
    ) -> Result<RunOutcome, SimulatorError> {
        let log_file = Self::log_file(netlist);
        let mut runner = ProcessRunner::new(self.executable.to_string_lossy())
            .args(Self::arguments(netlist, switches));
        if let Some(timeout) = timeout {
            runner = runner.timeout(timeout);
        }
        info!("Running {}", runner.command_line());

        let outcome = runner.run()?;
        if outcome.timed_out {
            error!("Simulation of {} timed out", netlist.display());
        } else if !outcome.success {
            error!(
                "Simulation of {} failed with exit code {:?}",
                netlist.display(),
                outcome.exit_code
            );
        }

        Ok(RunOutcome {
            success: outcome.success,
            timed_out: outcome.timed_out,
            log_file,
            output: outcome.plain_as_string(),
        })
    }
}
