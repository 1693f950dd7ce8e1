//! `convert` command handler

use anyhow::{Context, Result};
use colored::*;
use vlinder::Config;
use vlinder::case::{CaseExporter, CaseLocation, ImportOptions, import_case};

use super::load_schema;
use crate::cli::ConvertArgs;

pub fn handle_convert_command(args: ConvertArgs, config: &Config) -> Result<()> {
    let from = args.from.unwrap_or(config.input_format);
    let to = args.to.unwrap_or(config.output_format);
    if from == to && args.out.is_none() {
        anyhow::bail!("Converting {} to {} in place would overwrite the case", from, to);
    }

    let delimiter = config.delimiter()?;
    let schema = load_schema(args.template.as_deref(), config)?;
    let options = ImportOptions { delimiter };

    let location = CaseLocation::new(&args.root, &args.name, from);
    let case = import_case(location, schema, &options)
        .with_context(|| format!("Failed to import case '{}'", args.name))?;

    let out = args.out.unwrap_or_else(|| args.root.join(&args.name));
    let written = CaseExporter::new(out, &args.name)
        .with_delimiter(delimiter)
        .export(&case.tables, to)
        .with_context(|| format!("Failed to export case '{}' as {}", args.name, to))?;

    println!(
        "Converted {} ({} -> {}) to: {}",
        args.name.bright_green().bold(),
        from,
        to,
        written.display().to_string().bright_green()
    );
    for diagnostic in case.diagnostics.entries() {
        println!("  {}", diagnostic.to_string().yellow());
    }
    Ok(())
}
