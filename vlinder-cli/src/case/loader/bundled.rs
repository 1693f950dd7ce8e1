//! JSON tables in pandas "table" orientation
//!
//! ```json
//! {"schema": {"fields": [{"name": "index"}, {"name": "fixed_input"}], "primaryKey": ["index"]},
//!  "data": [{"index": 0, "fixed_input": "price"}]}
//! ```
//!
//! A case is either one document per table (`<table>.json`) or a single
//! document (`<case>.json`) whose top-level keys are table names.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use crate::case::error::Result;
use crate::case::table::Table;
use crate::case::value::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct TableDocument {
    pub schema: DocumentSchema,
    pub data: Vec<Map<String, Json>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentSchema {
    pub fields: Vec<DocumentField>,
    #[serde(rename = "primaryKey", default)]
    pub primary_key: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pandas_version: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentField {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
}

/// Read a whole JSON file
pub fn read_json_file(path: &Path) -> Result<Json> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Read one table from its own JSON document
pub fn read_document_table(path: &Path, table: &str) -> Result<Table> {
    let json = read_json_file(path)?;
    table_from_json(json, table)
}

/// Convert a table document into a [`Table`]; primary-key fields are an
/// index, not data columns
pub fn table_from_json(json: Json, table: &str) -> Result<Table> {
    let document: TableDocument = serde_json::from_value(json)?;

    let columns: Vec<String> = document
        .schema
        .fields
        .iter()
        .map(|f| f.name.clone())
        .filter(|name| !document.schema.primary_key.contains(name))
        .collect();
    let mut result = Table::new(table, columns.clone());

    for record in &document.data {
        let row: Vec<Value> = columns
            .iter()
            .map(|c| record.get(c).map(Value::from_json).unwrap_or(Value::Missing))
            .collect();
        if row.iter().all(Value::is_missing) {
            continue;
        }
        result.push_row(row);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_orientation() {
        let doc = json!({
            "schema": {
                "fields": [
                    {"name": "index", "type": "integer"},
                    {"name": "fixed_input", "type": "string"},
                    {"name": "value", "type": "number"}
                ],
                "primaryKey": ["index"],
                "pandas_version": "1.4.0"
            },
            "data": [
                {"index": 0, "fixed_input": "price", "value": 2.0},
                {"index": 1, "fixed_input": "volume", "value": null}
            ]
        });

        let table = table_from_json(doc, "fixed_inputs").unwrap();
        assert_eq!(table.columns, vec!["fixed_input", "value"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(1, "value"), Some(&Value::Missing));
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let err = table_from_json(json!({"data": []}), "fixed_inputs").unwrap_err();
        assert!(matches!(err, crate::case::error::ImportError::Json(_)));
    }
}
