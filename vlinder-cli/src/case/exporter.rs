//! Write a table set back to one of the storage encodings
//!
//! Output goes to `<output>/<format>/` using the same layout the loaders
//! read, so passing `<root>/<case>` as output makes the export importable
//! as that case.

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::{Map, Value as Json};

use super::error::Result;
use super::loader::{DocumentField, DocumentSchema, Format, TableDocument};
use super::table::{Table, TableSet};
use super::value::{Value, format_number};

const INDEX_FIELD: &str = "index";
const PANDAS_VERSION: &str = "1.4.0";

/// Writes the tables of one case
#[derive(Debug, Clone)]
pub struct CaseExporter {
    output: PathBuf,
    name: String,
    delimiter: u8,
}

impl CaseExporter {
    pub fn new(output: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            name: name.into(),
            delimiter: super::loader::DEFAULT_DELIMITER,
        }
    }

    /// Exporter writing to `<root>/<case>/<format>/`
    pub fn for_case(root: &Path, name: &str) -> Self {
        Self::new(root.join(name), name)
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Write all tables; returns the directory written to
    pub fn export(&self, tables: &TableSet, format: Format) -> Result<PathBuf> {
        let dir = self.output.join(format.extension());
        fs::create_dir_all(&dir)?;

        match format {
            Format::Csv => {
                for table in tables.iter() {
                    write_csv_table(&dir.join(format!("{}.csv", table.name)), table, self.delimiter)?;
                }
            }
            Format::Json => {
                for table in tables.iter() {
                    write_json_table(&dir.join(format!("{}.json", table.name)), table)?;
                }
            }
            Format::Xlsx => write_workbook(&dir.join(format!("{}.xlsx", self.name)), tables)?,
        }

        log::info!(
            "Exported {} table(s) of '{}' to {}",
            tables.len(),
            self.name,
            dir.display()
        );
        Ok(dir)
    }
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Missing => String::new(),
        Value::Number(n) => format_number(*n),
        Value::Text(s) => s.clone(),
    }
}

/// Write one table as a delimited file
pub fn write_csv_table(path: &Path, table: &Table, delimiter: u8) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)?;

    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(cell_text))?;
    }

    wtr.flush()?;
    log::debug!("Wrote {} row(s) to {}", table.len(), path.display());
    Ok(())
}

fn json_cell(value: &Value) -> Json {
    match value {
        Value::Missing => Json::Null,
        Value::Number(n) => serde_json::Number::from_f64(*n).map_or(Json::Null, Json::Number),
        Value::Text(s) => Json::String(s.clone()),
    }
}

fn field_type(table: &Table, column: &str) -> &'static str {
    let values = table.column(column);
    let present: Vec<&&Value> = values.iter().filter(|v| !v.is_missing()).collect();
    if !present.is_empty() && present.iter().all(|v| matches!(v, Value::Number(_))) {
        "number"
    } else {
        "string"
    }
}

/// A table as a pandas "table" orientation document
pub fn table_document(table: &Table) -> TableDocument {
    let mut fields = vec![DocumentField {
        name: INDEX_FIELD.to_string(),
        field_type: Some("integer".to_string()),
    }];
    fields.extend(table.columns.iter().map(|column| DocumentField {
        name: column.clone(),
        field_type: Some(field_type(table, column).to_string()),
    }));

    let data = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let mut record = Map::new();
            record.insert(INDEX_FIELD.to_string(), Json::from(idx));
            for (column, value) in table.columns.iter().zip(row) {
                record.insert(column.clone(), json_cell(value));
            }
            record
        })
        .collect();

    TableDocument {
        schema: DocumentSchema {
            fields,
            primary_key: vec![INDEX_FIELD.to_string()],
            pandas_version: Some(PANDAS_VERSION.to_string()),
        },
        data,
    }
}

/// Write one table as its own JSON document
pub fn write_json_table(path: &Path, table: &Table) -> Result<()> {
    let file = fs::File::create(path)?;
    serde_json::to_writer_pretty(file, &table_document(table))?;
    log::debug!("Wrote {} row(s) to {}", table.len(), path.display());
    Ok(())
}

/// Write all tables to one workbook, a sheet per table
pub fn write_workbook(path: &Path, tables: &TableSet) -> Result<()> {
    let mut workbook = Workbook::new();

    for table in tables.iter() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&table.name)?;

        for (col, name) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col as u16, name)?;
        }
        for (row_idx, row) in table.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col, value) in row.iter().enumerate() {
                write_value(worksheet, row_num, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    log::debug!("Wrote {} sheet(s) to {}", tables.len(), path.display());
    Ok(())
}

fn write_value(ws: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<()> {
    match value {
        Value::Missing => { /* Leave cell empty */ }
        Value::Number(n) => {
            ws.write_number(row, col, *n)?;
        }
        Value::Text(s) => {
            ws.write_string(row, col, s)?;
        }
    }
    Ok(())
}
