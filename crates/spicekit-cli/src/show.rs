use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use spicekit_asc::{AscEditor, Schematic};

#[derive(Args, Debug)]
pub struct ShowArgs {
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Only list components whose reference starts with one of these
    /// characters, e.g. "RC"
    #[arg(long, default_value = "*")]
    pub prefix: String,

    /// Print the schematic model as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: ShowArgs) -> Result<()> {
    let editor = AscEditor::open(&args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let mut schematic = editor.into_schematic();
    if args.prefix != "*" {
        let keep: Vec<String> = schematic
            .get_components(&args.prefix)
            .into_iter()
            .map(str::to_owned)
            .collect();
        schematic.components.retain(|reference, _| keep.contains(reference));
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&schematic)?);
    } else {
        print_summary(&schematic);
    }
    Ok(())
}

fn print_summary(schematic: &Schematic) {
    println!("{}", "Components".bold());
    for component in schematic.components.values() {
        println!(
            "  {:<10} {:<16} {}",
            component.reference,
            component.symbol,
            component.value().unwrap_or("-")
        );
    }

    println!("{}", "Directives".bold());
    for directive in &schematic.directives {
        if directive.is_comment() {
            println!("  {}", format!("; {}", directive.text).dimmed());
        } else {
            println!("  ! {}", directive.text);
        }
    }
}
