//! Workbook with one sheet per table

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};

use crate::case::error::{ImportError, Result};
use crate::case::schema::header_name;
use crate::case::table::Table;
use crate::case::value::Value;

pub type CaseWorkbook = Xlsx<BufReader<File>>;

pub fn open_case_workbook(path: &Path) -> Result<CaseWorkbook> {
    Ok(open_workbook(path)?)
}

/// Convert an Excel cell to a table value
fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Missing,
        Data::String(s) => Value::from_text(s),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) if f.is_nan() => Value::Missing,
        Data::Float(f) => Value::Number(*f),
        Data::Bool(b) => Value::from(*b),
        Data::DateTime(dt) => Value::Text(format!("{}", dt)),
        Data::DateTimeIso(s) => Value::Text(s.clone()),
        Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(_) => Value::Missing,
    }
}

/// Read the sheet named after `table`
pub fn read_sheet_table(workbook: &mut CaseWorkbook, path: &Path, table: &str) -> Result<Table> {
    if !workbook.sheet_names().iter().any(|s| s == table) {
        return Err(ImportError::MissingTable {
            table: table.to_string(),
            location: path.display().to_string(),
        });
    }

    let range = workbook.worksheet_range(table)?;
    let mut rows = range.rows();

    let columns: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let name = header_name(cell);
                if name.is_empty() {
                    format!("Unnamed: {}", idx)
                } else {
                    name
                }
            })
            .collect(),
        None => Vec::new(),
    };
    let mut result = Table::new(table, columns);

    for row in rows {
        let values: Vec<Value> = row.iter().map(cell_to_value).collect();
        // Skip empty rows
        if values.iter().all(Value::is_missing) {
            continue;
        }
        result.push_row(values);
    }

    Ok(result)
}
