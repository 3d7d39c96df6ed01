use clap::{Parser, Subcommand};

mod edit;
mod run;
mod show;

#[derive(Parser)]
#[command(name = "spicekit")]
#[command(about = "Inspect and edit LTspice schematics, run QSPICE netlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the components and directives of a schematic
    #[command(alias = "s")]
    Show(show::ShowArgs),

    /// Set the value of a component
    SetValue(edit::SetValueArgs),

    /// Set (or add) a .param value
    SetParam(edit::SetParamArgs),

    /// Add simulation instructions
    Add(edit::AddArgs),

    /// Remove simulation instructions
    Remove(edit::RemoveArgs),

    /// Change the symbol a component is drawn with
    Model(edit::ModelArgs),

    /// Simulate a netlist with QSPICE
    Run(run::RunArgs),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show(args) => show::execute(args),
        Commands::SetValue(args) => edit::set_value(args),
        Commands::SetParam(args) => edit::set_param(args),
        Commands::Add(args) => edit::add(args),
        Commands::Remove(args) => edit::remove(args),
        Commands::Model(args) => edit::model(args),
        Commands::Run(args) => run::execute(args),
    }
}
