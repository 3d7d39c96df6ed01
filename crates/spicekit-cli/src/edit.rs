use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use log::debug;
use spicekit_asc::{AscEditor, SpiceValue};

/// Schematic to edit and where to write the result.
#[derive(Args, Debug)]
pub struct Target {
    /// Schematic (.asc) to edit
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: PathBuf,

    /// Write the edited schematic here instead of overwriting FILE
    #[arg(short, long, value_name = "OUT", value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

impl Target {
    fn open(&self) -> Result<AscEditor> {
        AscEditor::open(&self.file).with_context(|| format!("Failed to load {}", self.file.display()))
    }

    fn save(&self, editor: &AscEditor) -> Result<()> {
        let destination = self.output.as_deref().unwrap_or(&self.file);
        let written = editor
            .save(destination)
            .with_context(|| format!("Failed to save {}", destination.display()))?;
        eprintln!("{} {}", "Saved".green().bold(), written.display());
        Ok(())
    }
}

/// Numbers are written in engineering notation unless `raw` is set.
fn value_arg(value: &str, raw: bool) -> SpiceValue {
    match value.parse::<f64>() {
        Ok(number) if !raw && number.is_finite() => SpiceValue::Number(number),
        _ => SpiceValue::from(value),
    }
}

#[derive(Args, Debug)]
pub struct SetValueArgs {
    #[command(flatten)]
    pub target: Target,

    /// Reference designator, e.g. R1
    #[arg(value_name = "REF")]
    pub reference: String,

    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Store VALUE verbatim, even when it is a plain number
    #[arg(long)]
    pub raw: bool,
}

pub fn set_value(args: SetValueArgs) -> Result<()> {
    let mut editor = args.target.open()?;
    let value = value_arg(&args.value, args.raw);
    debug!("Setting {} to {value:?}", args.reference);
    editor.set_component_value(&args.reference, value)?;
    println!(
        "{} = {}",
        args.reference.bold(),
        editor.get_component_value(&args.reference)?
    );
    args.target.save(&editor)
}

#[derive(Args, Debug)]
pub struct SetParamArgs {
    #[command(flatten)]
    pub target: Target,

    #[arg(value_name = "NAME")]
    pub name: String,

    #[arg(value_name = "VALUE", allow_hyphen_values = true)]
    pub value: String,

    /// Store VALUE verbatim, even when it is a plain number
    #[arg(long)]
    pub raw: bool,
}

pub fn set_param(args: SetParamArgs) -> Result<()> {
    let mut editor = args.target.open()?;
    editor.set_parameter(&args.name, value_arg(&args.value, args.raw))?;
    println!(
        "{} = {}",
        args.name.bold(),
        editor.get_parameter(&args.name)?
    );
    args.target.save(&editor)
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[command(flatten)]
    pub target: Target,

    /// Instructions such as ".tran 10m"; analyses replace an existing one
    #[arg(value_name = "INSTR", required = true, allow_hyphen_values = true)]
    pub instructions: Vec<String>,
}

pub fn add(args: AddArgs) -> Result<()> {
    let mut editor = args.target.open()?;
    editor.add_instructions(&args.instructions)?;
    args.target.save(&editor)
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    #[command(flatten)]
    pub target: Target,

    /// Text to remove; every directive containing it is removed
    #[arg(value_name = "TEXT", allow_hyphen_values = true)]
    pub text: String,

    /// Treat TEXT as a case-insensitive regular expression anchored at the
    /// start of the directive
    #[arg(long)]
    pub regex: bool,
}

pub fn remove(args: RemoveArgs) -> Result<()> {
    let mut editor = args.target.open()?;
    let removed = if args.regex {
        editor.remove_instruction_matching(&args.text)?
    } else {
        editor.remove_instruction(&args.text)?
    };
    println!("Removed {removed} directive(s)");
    args.target.save(&editor)
}

#[derive(Args, Debug)]
pub struct ModelArgs {
    #[command(flatten)]
    pub target: Target,

    #[arg(value_name = "REF")]
    pub reference: String,

    /// New symbol name, e.g. res2 or OpAmps\\opamp2
    #[arg(value_name = "SYMBOL")]
    pub symbol: String,
}

pub fn model(args: ModelArgs) -> Result<()> {
    let mut editor = args.target.open()?;
    editor.set_element_model(&args.reference, &args.symbol)?;
    args.target.save(&editor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_arg() {
        assert_eq!(value_arg("11000", false).render(), "11k");
        assert_eq!(value_arg("1e-6", false).render(), "1u");
        assert_eq!(value_arg("11000", true).render(), "11000");
        assert_eq!(value_arg("4.7k", false).render(), "4.7k");
        assert_eq!(value_arg("{R*2}", false).render(), "{R*2}");
        assert_eq!(value_arg("inf", false).render(), "inf");
    }
}
