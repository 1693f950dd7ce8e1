//! In-memory representation of a loaded case table

use std::collections::{BTreeSet, HashSet};

use super::error::{ImportError, Result};
use super::value::Value;

/// A named table with ordered columns and rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    /// Append a column, filling it with missing values in existing rows
    pub fn add_column(&mut self, name: impl Into<String>) {
        self.columns.push(name.into());
        for row in &mut self.rows {
            row.push(Value::Missing);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cell at `row` for the named column
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All cells of a column, in row order (empty if the column is absent)
    pub fn column(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().map(|r| &r[idx]).collect(),
            None => Vec::new(),
        }
    }

    /// Distinct, non-missing labels of a column
    pub fn labels(&self, column: &str) -> BTreeSet<String> {
        self.column(column)
            .into_iter()
            .filter(|v| !v.is_missing())
            .map(Value::label)
            .collect()
    }

    /// Columns holding at least one missing value
    pub fn columns_with_missing(&self) -> HashSet<String> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.rows.iter().any(|r| r[*idx].is_missing()))
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Remove the given columns, keeping the order of the others
    pub fn drop_columns(&mut self, drop: &[String]) {
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !drop.contains(c))
            .map(|(i, _)| i)
            .collect();

        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            *row = keep.iter().map(|&i| std::mem::take(&mut row[i])).collect();
        }
    }
}

/// The tables of one case, in schema order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableSet {
    tables: Vec<Table>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table, replacing any previous table with the same name
    pub fn insert(&mut self, table: Table) {
        match self.tables.iter_mut().find(|t| t.name == table.name) {
            Some(existing) => *existing = table,
            None => self.tables.push(table),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// A table the checks rely on; its absence means the template lacks it
    pub fn require(&self, name: &str) -> Result<&Table> {
        self.get(name).ok_or_else(|| {
            ImportError::template(format!("Table '{}' is not part of the template", name))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
