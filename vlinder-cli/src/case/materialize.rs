//! Projection of validated tables into the compiled input mapping
//!
//! Tables are materialized in three passes so that every table can rely on
//! the arrays it needs: vector and pivot tables first, then weight tables
//! (which re-use the name arrays of their owning table), then the dependency
//! table (which needs the input names).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::error::{ImportError, Result};
use super::hierarchy::{DependencyRow, resolve_hierarchy};
use super::mapping::{Array, InputMapping};
use super::naming::{pluralize, vector_key};
use super::schema::{Schema, TableLayout, TableSchema};
use super::table::{Table, TableSet};
use super::value::Value;

/// Name arrays whose entries count as known inputs for the dependency table
const INPUT_KEYS: &[&str] = &[
    "fixed_inputs",
    "internal_variable_inputs",
    "external_variable_inputs",
];

/// Build the compiled mapping from a validated table set
pub fn materialize(schema: &Schema, tables: &TableSet) -> Result<InputMapping> {
    let mut mapping = InputMapping::new();

    let passes: [fn(&TableLayout) -> bool; 3] = [
        |layout| matches!(layout, TableLayout::Vector { .. } | TableLayout::Pivot { .. }),
        |layout| matches!(layout, TableLayout::Weights { .. }),
        |layout| matches!(layout, TableLayout::Dependencies),
    ];

    for in_pass in passes {
        for table_schema in schema.tables().iter().filter(|t| in_pass(&t.layout)) {
            let Some(table) = tables.get(&table_schema.name) else {
                continue;
            };
            materialize_table(&mut mapping, table_schema, table)?;
        }
    }

    Ok(mapping)
}

fn materialize_table(mapping: &mut InputMapping, schema: &TableSchema, table: &Table) -> Result<()> {
    match &schema.layout {
        TableLayout::Vector { entity } => {
            add_vectors(mapping, schema, table, entity);
            Ok(())
        }
        TableLayout::Pivot {
            row,
            variable,
            value,
        } => add_pivot(mapping, table, row, variable, value),
        TableLayout::Weights { .. } => add_weights(mapping, schema, table),
        TableLayout::Dependencies => add_dependencies(mapping, schema, table),
    }
}

/// One vector per column
pub fn add_vectors(mapping: &mut InputMapping, schema: &TableSchema, table: &Table, entity: &str) {
    for column in &schema.columns {
        let values: Vec<Value> = table.column(column).into_iter().cloned().collect();
        mapping.insert(vector_key(&table.name, entity, column), values);
    }
}

/// Pivot `(row, variable, value)` records into a matrix
///
/// Row and column labels are sorted, numerically when every label is a
/// number. Combinations without a declared value are 0.
pub fn add_pivot(
    mapping: &mut InputMapping,
    table: &Table,
    row: &str,
    variable: &str,
    value: &str,
) -> Result<()> {
    let row_labels = sorted_labels(table, row);
    let column_labels = sorted_labels(table, variable);

    let row_index: HashMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let column_index: HashMap<&str, usize> = column_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut matrix = vec![vec![0.0; column_labels.len()]; row_labels.len()];
    let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();

    for idx in 0..table.len() {
        let (Some(r), Some(c)) = (
            table.cell(idx, row).map(Value::label),
            table.cell(idx, variable).map(Value::label),
        ) else {
            continue;
        };
        let (Some(&ri), Some(&ci)) = (row_index.get(r.as_str()), column_index.get(c.as_str()))
        else {
            continue;
        };

        let cell = table.cell(idx, value).cloned().unwrap_or_default();
        let number = cell.as_f64().ok_or_else(|| {
            ImportError::template(format!(
                "Value '{}' for '{}' under '{}' in '{}' is not a number",
                cell, c, r, table.name
            ))
        })?;

        if !seen.insert((ri, ci)) {
            return Err(ImportError::template(format!(
                "Duplicate value for '{}' under '{}' in '{}'",
                c, r, table.name
            )));
        }
        matrix[ri][ci] = number;
    }

    mapping.insert(table.name.clone(), row_labels);
    mapping.insert(pluralize(variable), column_labels);
    mapping.insert(format!("{}_value", row), Array::Matrix(matrix));
    Ok(())
}

/// Distinct labels of a column; `"2"` sorts before `"10"` in numeric columns
fn sorted_labels(table: &Table, column: &str) -> Vec<String> {
    let mut labels: Vec<String> = table.labels(column).into_iter().collect();
    let numbers: Option<Vec<f64>> = labels.iter().map(|l| l.parse::<f64>().ok()).collect();
    if let Some(numbers) = numbers {
        let mut keyed: Vec<(f64, String)> = numbers.into_iter().zip(labels).collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
        labels = keyed.into_iter().map(|(_, label)| label).collect();
    }
    labels
}

/// Weights aligned with the canonical order of the entity names
///
/// The name array (`themes`, `scenarios`, ...) is taken from the owning table
/// when it was materialized before, otherwise from this weight table.
pub fn add_weights(mapping: &mut InputMapping, schema: &TableSchema, table: &Table) -> Result<()> {
    let (TableLayout::Weights { entity, weight }, Some(names_key)) =
        (&schema.layout, schema.layout.names_key())
    else {
        return Err(ImportError::template(format!(
            "'{}' is not a weight table",
            schema.name
        )));
    };

    if !mapping.contains_key(&names_key) {
        let names: Vec<Value> = table.column(entity).into_iter().cloned().collect();
        mapping.insert(names_key.clone(), names);
    }
    let canonical = mapping.labels(&names_key).unwrap_or_default();

    let mut by_name: BTreeMap<String, Value> = BTreeMap::new();
    for idx in 0..table.len() {
        let name = table.cell(idx, entity).map(Value::label).unwrap_or_default();
        let value = table.cell(idx, weight).cloned().unwrap_or_default();
        if by_name.insert(name.clone(), value).is_some() {
            return Err(ImportError::template(format!(
                "{} '{}' has more than one weight in '{}'",
                entity, name, table.name
            )));
        }
    }

    let ordered = canonical
        .iter()
        .map(|name| {
            by_name.get(name).cloned().ok_or_else(|| {
                ImportError::template(format!(
                    "{} '{}' has no weight in '{}'",
                    entity, name, table.name
                ))
            })
        })
        .collect::<Result<Vec<Value>>>()?;

    mapping.insert(format!("{}_{}", entity, weight), ordered);
    Ok(())
}

/// Dependency columns in evaluation order, plus `hierarchy` and `dependencies_order`
pub fn add_dependencies(
    mapping: &mut InputMapping,
    schema: &TableSchema,
    table: &Table,
) -> Result<()> {
    let known_inputs: HashSet<String> = INPUT_KEYS
        .iter()
        .filter_map(|key| mapping.labels(key))
        .flatten()
        .collect();

    let plan = resolve_hierarchy(DependencyRow::from_table(table), &known_inputs)?;

    for column in &schema.columns {
        let values = table.column(column);
        let sorted: Vec<Value> = plan.order.iter().map(|&row| values[row].clone()).collect();
        mapping.insert(column.clone(), sorted);
    }

    let hierarchy: Vec<f64> = plan
        .sorted_hierarchy()
        .into_iter()
        .map(f64::from)
        .collect();
    mapping.insert("hierarchy", hierarchy);

    let order: Vec<f64> = plan.order.iter().map(|&row| row as f64).collect();
    mapping.insert("dependencies_order", order);
    Ok(())
}
