//! `import` command handler

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::*;
use vlinder::Config;
use vlinder::case::{CaseLocation, ImportOptions, ImportedCase, import_case};

use super::load_schema;
use crate::cli::ImportArgs;

pub fn handle_import_command(args: ImportArgs, config: &Config) -> Result<()> {
    let format = args.format.unwrap_or(config.input_format);
    let schema = load_schema(args.template.as_deref(), config)?;
    let options = ImportOptions {
        delimiter: config.delimiter()?,
    };

    let start = Instant::now();
    let location = CaseLocation::new(&args.root, &args.name, format);
    let case = import_case(location, schema, &options)
        .with_context(|| format!("Failed to import case '{}'", args.name))?;
    let elapsed = start.elapsed();

    if let Some(output_path) = args.output {
        let json = serde_json::to_string_pretty(&case.inputs)
            .context("Failed to serialize input mapping")?;
        fs::write(&output_path, json)
            .with_context(|| format!("Failed to write output to: {}", output_path.display()))?;
        println!(
            "Input mapping saved to: {}",
            output_path.display().to_string().bright_green()
        );
    }

    print_summary(&args.name, &case);
    println!("Import time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

/// Counts of the imported case and its warnings
pub fn print_summary(name: &str, case: &ImportedCase) {
    println!("Case: {}", name.bright_green().bold());

    let count = |key: &str| case.inputs.get(key).map_or(0, |a| a.len());
    println!("  {:<28}{}", "key outputs", count("key_outputs"));
    println!("  {:<28}{}", "themes", count("themes"));
    println!("  {:<28}{}", "decision makers options", count("decision_makers_options"));
    println!("  {:<28}{}", "scenarios", count("scenarios"));
    println!("  {:<28}{}", "fixed inputs", count("fixed_inputs"));
    println!("  {:<28}{}", "internal variable inputs", count("internal_variable_inputs"));
    println!("  {:<28}{}", "external variable inputs", count("external_variable_inputs"));

    let layers = case
        .inputs
        .numbers("hierarchy")
        .and_then(|h| h.into_iter().reduce(f64::max))
        .unwrap_or(0.0);
    println!(
        "  {:<28}{} in {} layer(s)",
        "dependencies",
        count("destination"),
        layers
    );
    println!("  {:<28}{}", "arrays", case.inputs.len());

    if case.diagnostics.is_empty() {
        println!("{}", "No warnings".green());
    } else {
        println!("{}", format!("{} warning(s):", case.diagnostics.len()).yellow());
        for diagnostic in case.diagnostics.entries() {
            println!("  {}", diagnostic.to_string().yellow());
        }
    }
}
