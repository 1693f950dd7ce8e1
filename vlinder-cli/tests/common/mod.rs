//! Fixture cases written to a temporary directory

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use vlinder::case::{CaseLocation, Format, ImportOptions, ImportedCase, Result, Schema, import_case};

pub const CASE_NAME: &str = "solar";

/// A solar panel investment: two options, two scenarios, a chain of
/// dependencies four layers deep
pub fn solar_tables() -> BTreeMap<&'static str, String> {
    let tables: [(&str, &str); 9] = [
        (
            "case_text_elements",
            "case_text_element;value\n\
             description;Solar panels for the depot roof\n",
        ),
        (
            "key_outputs",
            "key_output;theme;monetary;smaller_the_better;linear;automatic;start;end\n\
             npv;finance;1;0;1;1;;\n\
             payback;finance;0;1;1;0;0;10\n\
             co2;planet;0;1;1;1;;\n",
        ),
        (
            "decision_makers_options",
            "decision_makers_option;internal_variable_input;value\n\
             solar;investment;1000\n\
             solar;panel_count;20\n\
             none;investment;0\n\
             none;panel_count;0\n",
        ),
        (
            "scenarios",
            "scenario;external_variable_input;value\n\
             base;energy_price;0.3\n\
             high;energy_price;0.5\n",
        ),
        (
            "fixed_inputs",
            "fixed_input;value\n\
             yield_per_panel;400\n\
             lifetime;20\n",
        ),
        (
            "dependencies",
            "destination;argument_1;argument_2;operator\n\
             npv;savings;investment;-\n\
             savings;annual_savings;lifetime;*\n\
             annual_savings;production;energy_price;*\n\
             production;panel_count;yield_per_panel;*\n\
             payback;investment;annual_savings;/\n\
             co2;production;0.5;*\n",
        ),
        (
            "theme_weights",
            "theme;weight\n\
             finance;0.6\n\
             planet;0.4\n",
        ),
        (
            "key_output_weights",
            "key_output;weight\n\
             npv;0.5\n\
             payback;0.5\n\
             co2;1\n",
        ),
        (
            "scenario_weights",
            "scenario;weight\n\
             base;0.7\n\
             high;0.3\n",
        ),
    ];

    tables
        .into_iter()
        .map(|(name, content)| (name, content.to_string()))
        .collect()
}

/// Write `tables` as a CSV case under `root`
pub fn write_csv_case(root: &Path, tables: &BTreeMap<&'static str, String>) {
    let dir = root.join(CASE_NAME).join("csv");
    fs::create_dir_all(&dir).unwrap();
    for (name, content) in tables {
        fs::write(dir.join(format!("{}.csv", name)), content).unwrap();
    }
}

pub fn import(root: &Path, format: Format) -> Result<ImportedCase> {
    let schema = Arc::new(Schema::builtin().unwrap());
    let location = CaseLocation::new(root, CASE_NAME, format);
    import_case(location, schema, &ImportOptions::default())
}

/// Write the tables as CSV and import them
pub fn import_tables(tables: &BTreeMap<&'static str, String>) -> Result<ImportedCase> {
    let dir = tempfile::tempdir().unwrap();
    write_csv_case(dir.path(), tables);
    import(dir.path(), Format::Csv)
}

pub fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
