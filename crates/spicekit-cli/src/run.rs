use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use spicekit_sim::{Qspice, Simulator, SimulatorConfig};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Netlist to simulate
    #[arg(value_name = "NETLIST", value_hint = clap::ValueHint::FilePath)]
    pub netlist: PathBuf,

    /// Simulator switch, e.g. ASCII or r=out.qraw. May be repeated.
    #[arg(long = "switch", value_name = "NAME[=PATH]")]
    pub switches: Vec<String>,

    /// Kill the simulator after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// QSPICE executable; overrides SPICEKIT_QSPICE_EXE and the install search
    #[arg(long, value_name = "PATH", value_hint = clap::ValueHint::ExecutablePath)]
    pub exe: Option<PathBuf>,
}

pub fn execute(args: RunArgs) -> Result<()> {
    let mut config = SimulatorConfig::new();
    if let Some(exe) = &args.exe {
        config = config.with_executable(exe);
    }
    let simulator = Qspice::new(&config)?;

    let mut switches = Vec::new();
    for switch in &args.switches {
        let (name, path) = match switch.split_once('=') {
            Some((name, path)) => (name, Some(path)),
            None => (switch.as_str(), None),
        };
        switches.extend(simulator.valid_switch(name, path)?);
    }

    let timeout = args
        .timeout
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("Invalid timeout")?;

    let outcome = simulator.run(&args.netlist, &switches, timeout)?;
    print!("{}", outcome.output);

    let file_name = args.netlist.display().to_string();
    if outcome.timed_out {
        anyhow::bail!("{}: simulation timed out", file_name.red().bold());
    }
    if !outcome.success {
        anyhow::bail!("{}: simulation failed", file_name.red().bold());
    }
    eprintln!(
        "{} {} (log: {})",
        "Simulated".green().bold(),
        file_name,
        outcome.log_file.display()
    );
    Ok(())
}
