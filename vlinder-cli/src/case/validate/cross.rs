//! Checks that span several tables
//!
//! These run once every table has been loaded and passed its column checks.
//! The first failing check aborts the import.

use std::collections::BTreeSet;

use crate::case::diagnostics::{Diagnostics, WarningKind};
use crate::case::error::{ImportError, Result, fmt_names};
use crate::case::schema::tables;
use crate::case::table::{Table, TableSet};
use crate::case::value::Value;

/// Weight families: (name column, owning table, weight table)
const WEIGHT_FAMILIES: &[(&str, &str, &str)] = &[
    ("key_output", tables::KEY_OUTPUTS, tables::KEY_OUTPUT_WEIGHTS),
    ("theme", tables::KEY_OUTPUTS, tables::THEME_WEIGHTS),
    ("scenario", tables::SCENARIOS, tables::SCENARIO_WEIGHTS),
];

/// Run every cross-table check
pub fn validate_tables(set: &TableSet, diagnostics: &mut Diagnostics) -> Result<()> {
    // 1. Checks on weights
    for (column, owner, weights) in WEIGHT_FAMILIES {
        validate_weights(set, column, owner, weights)?;
    }

    // 2. Checks on inputs
    let ivi = labels(set, tables::DECISION_MAKERS_OPTIONS, "internal_variable_input")?;
    let evi = labels(set, tables::SCENARIOS, "external_variable_input")?;
    let fixed = labels(set, tables::FIXED_INPUTS, "fixed_input")?;

    validate_input_use_and_naming(set, &ivi, &evi, &fixed, diagnostics)?;
    validate_input_completeness(
        set.require(tables::DECISION_MAKERS_OPTIONS)?,
        "decision_makers_option",
        "internal_variable_input",
        &ivi,
    )?;
    validate_input_completeness(
        set.require(tables::SCENARIOS)?,
        "scenario",
        "external_variable_input",
        &evi,
    )?;

    // 3. Check on start and endpoints
    validate_start_and_endpoint(set.require(tables::KEY_OUTPUTS)?)
}

fn labels(set: &TableSet, name: &str, column: &str) -> Result<BTreeSet<String>> {
    Ok(set.require(name)?.labels(column))
}

/// Names in the owning table and in the weight table must be the same set
pub fn validate_weights(set: &TableSet, column: &str, owner: &str, weights: &str) -> Result<()> {
    let left = labels(set, owner, column)?;
    let right = labels(set, weights, column)?;

    let not_weighted: BTreeSet<&String> = left.difference(&right).collect();
    if !not_weighted.is_empty() {
        return Err(ImportError::template(format!(
            "{}(s) {} not present in sheet '{}'",
            column,
            fmt_names(not_weighted),
            weights
        )));
    }

    let only_weighted: BTreeSet<&String> = right.difference(&left).collect();
    if !only_weighted.is_empty() {
        return Err(ImportError::template(format!(
            "{}(s) {} only present in sheet '{}'",
            column,
            fmt_names(only_weighted),
            weights
        )));
    }

    Ok(())
}

/// Inputs must be used by the dependencies, arguments must be defined and
/// input names must not collide across input types
pub fn validate_input_use_and_naming(
    set: &TableSet,
    ivi: &BTreeSet<String>,
    evi: &BTreeSet<String>,
    fixed: &BTreeSet<String>,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let dependencies = set.require(tables::DEPENDENCIES)?;
    let arguments: Vec<&Value> = dependencies
        .column("argument_1")
        .into_iter()
        .chain(dependencies.column("argument_2"))
        .filter(|v| !v.is_missing())
        .collect();
    let all_arguments: BTreeSet<String> = arguments.iter().map(|v| v.label()).collect();

    // Are all inputs actually used in the dependencies?
    let unused: BTreeSet<&String> = ivi.difference(&all_arguments).collect();
    if !unused.is_empty() {
        return Err(ImportError::template(format!(
            "IVI(s) {} created, but not used in the dependencies.",
            fmt_names(unused)
        )));
    }
    let unused: BTreeSet<&String> = evi.difference(&all_arguments).collect();
    if !unused.is_empty() {
        return Err(ImportError::template(format!(
            "EVI(s) {} created, but not used in the dependencies.",
            fmt_names(unused)
        )));
    }
    let unused: BTreeSet<&String> = fixed.difference(&all_arguments).collect();
    if !unused.is_empty() {
        diagnostics.warn(
            WarningKind::UnusedFixedInput,
            format!(
                "Fixed input(s) {} created, but not used in the dependencies.",
                fmt_names(unused)
            ),
        );
    }

    // Are all names used in the dependencies defined?
    let mut all_names: BTreeSet<String> = dependencies.labels("destination");
    all_names.extend(ivi.iter().cloned());
    all_names.extend(evi.iter().cloned());
    all_names.extend(fixed.iter().cloned());

    let undefined: BTreeSet<String> = arguments
        .iter()
        .filter(|v| !v.is_numeric())
        .map(|v| v.label())
        .filter(|name| !all_names.contains(name))
        .collect();
    if !undefined.is_empty() {
        return Err(ImportError::template(format!(
            "Argument(s) {} used in dependencies, but not defined.",
            fmt_names(&undefined)
        )));
    }

    // Naming of IVI, EVI and fixed inputs should be unique
    let overlaps = [
        (ivi, evi, "IVI as well as EVI"),
        (ivi, fixed, "IVI as well as fixed input"),
        (evi, fixed, "EVI as well as fixed input"),
    ];
    for (left, right, description) in overlaps {
        let overlap: BTreeSet<&String> = left.intersection(right).collect();
        if !overlap.is_empty() {
            return Err(ImportError::template(format!(
                "Overlap for input(s) {}. They are used as {}.",
                fmt_names(overlap),
                description
            )));
        }
    }

    Ok(())
}

/// Every option (or scenario) must assign a value to every variable input
pub fn validate_input_completeness(
    table: &Table,
    key: &str,
    input_column: &str,
    full_set: &BTreeSet<String>,
) -> Result<()> {
    let input_name = if input_column.starts_with("external") {
        "external"
    } else {
        "internal"
    };

    let keys = table.column(key);
    let inputs = table.column(input_column);

    for instrument in table.labels(key) {
        let assigned: BTreeSet<String> = keys
            .iter()
            .zip(&inputs)
            .filter(|(k, v)| k.label() == instrument && !v.is_missing())
            .map(|(_, v)| v.label())
            .collect();

        let missing: BTreeSet<&String> = full_set.difference(&assigned).collect();
        if !missing.is_empty() {
            return Err(ImportError::template(format!(
                "{} variable input(s) {} do not have a value assigned for '{}'.",
                input_name,
                fmt_names(missing),
                instrument
            )));
        }
    }

    Ok(())
}

/// Automatic key outputs take no start/end point; manual ones need both
pub fn validate_start_and_endpoint(key_outputs: &Table) -> Result<()> {
    let mut automatic_with_bounds = BTreeSet::new();
    let mut manual_without_bounds = BTreeSet::new();

    for idx in 0..key_outputs.len() {
        let name = key_outputs
            .cell(idx, "key_output")
            .map(Value::label)
            .unwrap_or_default();
        let automatic = key_outputs.cell(idx, "automatic").and_then(Value::as_f64);
        let has_start = key_outputs.cell(idx, "start").is_some_and(|v| !v.is_missing());
        let has_end = key_outputs.cell(idx, "end").is_some_and(|v| !v.is_missing());

        match automatic {
            Some(flag) if flag == 1.0 && (has_start || has_end) => {
                automatic_with_bounds.insert(name);
            }
            Some(flag) if flag == 0.0 && !(has_start && has_end) => {
                manual_without_bounds.insert(name);
            }
            _ => {}
        }
    }

    if !automatic_with_bounds.is_empty() {
        return Err(ImportError::template(format!(
            "Key output(s) {} with automatic = 1, but also a start and/or endpoint",
            fmt_names(&automatic_with_bounds)
        )));
    }
    if !manual_without_bounds.is_empty() {
        return Err(ImportError::template(format!(
            "Key output(s) {} with automatic = 0 have missing start- and/or endpoint",
            fmt_names(&manual_without_bounds)
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_table(name: &str, columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut table = Table::new(name, columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            table.push_row(row.iter().map(|c| Value::from_text(c)).collect());
        }
        table
    }

    fn key_outputs(rows: &[&[&str]]) -> Table {
        make_table(
            tables::KEY_OUTPUTS,
            &[
                "key_output",
                "theme",
                "monetary",
                "smaller_the_better",
                "linear",
                "automatic",
                "start",
                "end",
            ],
            rows,
        )
    }

    #[test]
    fn test_weights_missing_in_weight_table() {
        let mut set = TableSet::new();
        set.insert(make_table(
            tables::SCENARIOS,
            &["scenario", "external_variable_input", "value"],
            &[&["base", "demand", "1"], &["boom", "demand", "2"]],
        ));
        set.insert(make_table(
            tables::SCENARIO_WEIGHTS,
            &["scenario", "weight"],
            &[&["base", "1"]],
        ));

        let err =
            validate_weights(&set, "scenario", tables::SCENARIOS, tables::SCENARIO_WEIGHTS)
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: scenario(s) {'boom'} not present in sheet 'scenario_weights'"
        );
    }

    #[test]
    fn test_weights_only_in_weight_table() {
        let mut set = TableSet::new();
        set.insert(make_table(
            tables::SCENARIOS,
            &["scenario", "external_variable_input", "value"],
            &[&["base", "demand", "1"]],
        ));
        set.insert(make_table(
            tables::SCENARIO_WEIGHTS,
            &["scenario", "weight"],
            &[&["base", "1"], &["ghost", "1"]],
        ));

        let err =
            validate_weights(&set, "scenario", tables::SCENARIOS, tables::SCENARIO_WEIGHTS)
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: scenario(s) {'ghost'} only present in sheet 'scenario_weights'"
        );
    }

    #[test]
    fn test_input_completeness_names_option_and_input() {
        let options = make_table(
            tables::DECISION_MAKERS_OPTIONS,
            &["decision_makers_option", "internal_variable_input", "value"],
            &[
                &["expand", "capacity", "10"],
                &["expand", "price", "3"],
                &["status_quo", "capacity", "5"],
            ],
        );
        let full: BTreeSet<String> = ["capacity", "price"].iter().map(|s| s.to_string()).collect();

        let err = validate_input_completeness(
            &options,
            "decision_makers_option",
            "internal_variable_input",
            &full,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: internal variable input(s) {'price'} do not have a value assigned for 'status_quo'."
        );
    }

    fn dependencies(rows: &[&[&str]]) -> Table {
        make_table(
            tables::DEPENDENCIES,
            &["destination", "argument_1", "argument_2", "operator"],
            rows,
        )
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unused_ivi_is_fatal() {
        let mut set = TableSet::new();
        set.insert(dependencies(&[&["revenue", "price", "volume", "*"]]));
        let mut diagnostics = Diagnostics::new();

        let err = validate_input_use_and_naming(
            &set,
            &names(&["price", "discount"]),
            &names(&["volume"]),
            &names(&[]),
            &mut diagnostics,
        )
        .unwrap_err();
        assert!(err.to_string().contains("IVI(s) {'discount'} created"));
    }

    #[test]
    fn test_unused_fixed_input_warns() {
        let mut set = TableSet::new();
        set.insert(dependencies(&[&["revenue", "price", "volume", "*"]]));
        let mut diagnostics = Diagnostics::new();

        validate_input_use_and_naming(
            &set,
            &names(&["price"]),
            &names(&["volume"]),
            &names(&["tax"]),
            &mut diagnostics,
        )
        .unwrap();
        assert!(diagnostics.has(WarningKind::UnusedFixedInput));
    }

    #[test]
    fn test_undefined_argument() {
        let mut set = TableSet::new();
        set.insert(dependencies(&[
            &["revenue", "price", "volume", "*"],
            &["profit", "revenue", "costs", "-"],
            &["margin", "profit", "100", "/"],
        ]));
        let mut diagnostics = Diagnostics::new();

        let err = validate_input_use_and_naming(
            &set,
            &names(&["price"]),
            &names(&["volume"]),
            &names(&[]),
            &mut diagnostics,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: Argument(s) {'costs'} used in dependencies, but not defined."
        );
    }

    #[test]
    fn test_input_overlap() {
        let mut set = TableSet::new();
        set.insert(dependencies(&[&["revenue", "price", "volume", "*"]]));
        let mut diagnostics = Diagnostics::new();

        let err = validate_input_use_and_naming(
            &set,
            &names(&["price"]),
            &names(&["volume"]),
            &names(&["price"]),
            &mut diagnostics,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: Overlap for input(s) {'price'}. They are used as IVI as well as fixed input."
        );
    }

    #[test]
    fn test_automatic_with_bounds() {
        let table = key_outputs(&[
            &["profit", "finance", "1", "0", "1", "1", "0", ""],
            &["co2", "planet", "0", "1", "1", "1", "", ""],
        ]);
        let err = validate_start_and_endpoint(&table).unwrap_err();
        assert!(err.to_string().contains("{'profit'} with automatic = 1"));
    }

    #[test]
    fn test_manual_without_bounds() {
        let table = key_outputs(&[
            &["profit", "finance", "1", "0", "1", "0", "0", "100"],
            &["co2", "planet", "0", "1", "1", "0", "", "10"],
        ]);
        let err = validate_start_and_endpoint(&table).unwrap_err();
        assert!(err.to_string().contains("{'co2'} with automatic = 0"));
    }
}
