//! Per-table delimited text files (`<table>.csv`)

use std::path::Path;

use csv::ReaderBuilder;

use crate::case::error::Result;
use crate::case::table::Table;
use crate::case::value::Value;

/// Field separator used by case CSV files
pub const DEFAULT_DELIMITER: u8 = b';';

/// Read one table from a delimited file; the first record is the header
pub fn read_delimited_table(path: &Path, table: &str, delimiter: u8) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)?;

    let columns = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, header)| column_name(idx, header))
        .collect();
    let mut result = Table::new(table, columns);

    for record in reader.records() {
        let record = record?;
        let row: Vec<Value> = record.iter().map(Value::from_text).collect();

        // Skip blank lines
        if row.iter().all(Value::is_missing) {
            continue;
        }

        // Cells beyond the header get positional names so they are reported
        while result.columns.len() < row.len() {
            let idx = result.columns.len();
            result.add_column(column_name(idx, ""));
        }
        result.push_row(row);
    }

    log::debug!(
        "Read {} rows for '{}' from {}",
        result.len(),
        table,
        path.display()
    );
    Ok(result)
}

/// Header text as a column name; blank headers get a positional name
pub(crate) fn column_name(idx: usize, header: &str) -> String {
    let trimmed = header.trim();
    if trimmed.is_empty() {
        format!("Unnamed: {}", idx)
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_semicolon_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixed_inputs.csv");
        fs::write(&path, "fixed_input;value\nprice;2.5\n\nvolume;\n").unwrap();

        let table = read_delimited_table(&path, "fixed_inputs", DEFAULT_DELIMITER).unwrap();
        assert_eq!(table.columns, vec!["fixed_input", "value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "value"), Some(&Value::Number(2.5)));
        assert_eq!(table.cell(1, "value"), Some(&Value::Missing));
    }

    #[test]
    fn test_cells_without_header_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixed_inputs.csv");
        fs::write(&path, "fixed_input;value\ntax;0.21\nprice;2;oops\n").unwrap();

        let table = read_delimited_table(&path, "fixed_inputs", DEFAULT_DELIMITER).unwrap();
        assert_eq!(table.columns, vec!["fixed_input", "value", "Unnamed: 2"]);
        assert_eq!(table.cell(0, "Unnamed: 2"), Some(&Value::Missing));
        assert_eq!(table.cell(1, "Unnamed: 2"), Some(&Value::from("oops")));
    }

    #[test]
    fn test_blank_header_gets_positional_name() {
        assert_eq!(column_name(2, " "), "Unnamed: 2");
        assert_eq!(column_name(0, " value "), "value");
    }
}
