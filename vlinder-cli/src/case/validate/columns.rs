//! Per-table column checks against the template

use std::collections::BTreeSet;

use crate::case::diagnostics::{Diagnostics, WarningKind};
use crate::case::error::{ImportError, Result, fmt_names};
use crate::case::schema::{TableSchema, tables};
use crate::case::table::Table;
use crate::case::value::Value;

/// Check a freshly loaded table against its schema entry
///
/// Missing template columns and empty mandatory cells are fatal. Columns the
/// template does not know are reported and dropped.
pub fn check_columns(
    mut table: Table,
    schema: &TableSchema,
    diagnostics: &mut Diagnostics,
) -> Result<Table> {
    let columns_with_missing = table.columns_with_missing();

    // 1. All template columns must be present
    let missing_cols: Vec<&str> = schema
        .columns
        .iter()
        .filter(|c| !table.has_column(c))
        .map(String::as_str)
        .collect();
    if !missing_cols.is_empty() {
        return Err(ImportError::template(format!(
            "column(s) '{}' are missing for '{}'",
            missing_cols.join(", "),
            schema.name
        )));
    }

    // 2. Unknown columns are dropped with a warning
    let extra_cols: Vec<String> = table
        .columns
        .iter()
        .filter(|c| !schema.columns.contains(c))
        .cloned()
        .collect();
    if !extra_cols.is_empty() {
        diagnostics.warn(
            WarningKind::ExtraColumns,
            format!(
                "column(s) '{}' are not used for '{}'",
                extra_cols.join(", "),
                schema.name
            ),
        );
        table.drop_columns(&extra_cols);
    }

    // 3. Mandatory fields must be filled in
    let empty_mandatory: BTreeSet<&String> = schema
        .mandatory
        .iter()
        .filter(|c| columns_with_missing.contains(c.as_str()))
        .collect();
    if !empty_mandatory.is_empty() {
        return Err(ImportError::template(format!(
            "Missing values in column(s) {} for table {}.",
            fmt_names(empty_mandatory),
            schema.name
        )));
    }

    if schema.name == tables::CASE_TEXT_ELEMENTS {
        check_case_text(&table, diagnostics);
    }

    Ok(table)
}

/// Warn when the case text element is empty, numeric or has no letters
pub fn check_case_text(table: &Table, diagnostics: &mut Diagnostics) {
    let has_text = match table.cell(0, "value") {
        Some(Value::Text(text)) => {
            !Value::from_text(text).is_numeric() && text.chars().any(char::is_alphabetic)
        }
        _ => false,
    };

    if !has_text {
        diagnostics.warn(WarningKind::MissingCaseText, "No case text element entered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::schema::Schema;

    fn fixed_inputs(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        let mut table = Table::new(
            tables::FIXED_INPUTS,
            columns.iter().map(|c| c.to_string()).collect(),
        );
        for row in rows {
            table.push_row(row);
        }
        table
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let schema = Schema::builtin().unwrap();
        let table = fixed_inputs(&["fixed_input"], vec![vec![Value::from("price")]]);
        let mut diagnostics = Diagnostics::new();

        let err = check_columns(table, schema.get(tables::FIXED_INPUTS).unwrap(), &mut diagnostics)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Template Error: column(s) 'value' are missing for 'fixed_inputs'"
        );
    }

    #[test]
    fn test_extra_column_is_dropped_with_warning() {
        let schema = Schema::builtin().unwrap();
        let table = fixed_inputs(
            &["fixed_input", "value", "comment"],
            vec![vec![Value::from("price"), Value::Number(1.0), Value::from("note")]],
        );
        let mut diagnostics = Diagnostics::new();

        let table =
            check_columns(table, schema.get(tables::FIXED_INPUTS).unwrap(), &mut diagnostics)
                .unwrap();
        assert_eq!(table.columns, vec!["fixed_input", "value"]);
        assert!(diagnostics.has(WarningKind::ExtraColumns));
        assert!(diagnostics.entries()[0].message.contains("'comment'"));
    }

    #[test]
    fn test_empty_mandatory_field_is_fatal() {
        let schema = Schema::builtin().unwrap();
        let table = fixed_inputs(
            &["fixed_input", "value"],
            vec![vec![Value::from("price"), Value::Missing]],
        );
        let mut diagnostics = Diagnostics::new();

        let err = check_columns(table, schema.get(tables::FIXED_INPUTS).unwrap(), &mut diagnostics)
            .unwrap_err();
        assert!(err.to_string().contains("Missing values in column(s) {'value'}"));
    }

    #[test]
    fn test_case_text_warnings() {
        let cases = [
            (Value::Missing, true),
            (Value::Number(12.0), true),
            (Value::from("1234"), true),
            (Value::from("---"), true),
            (Value::from("A brewery decides on its future"), false),
        ];

        for (value, warns) in cases {
            let mut table = Table::new(
                tables::CASE_TEXT_ELEMENTS,
                vec!["case_text_element".to_string(), "value".to_string()],
            );
            table.push_row(vec![Value::from("introduction"), value]);
            let mut diagnostics = Diagnostics::new();
            check_case_text(&table, &mut diagnostics);
            assert_eq!(diagnostics.has(WarningKind::MissingCaseText), warns);
        }
    }
}
