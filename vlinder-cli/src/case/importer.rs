//! Case import pipeline
//!
//! `import_case` loads every template table, checks its columns, runs the
//! cross-table checks, materializes the arrays and adds derived weights.
//! Any failure aborts the whole import.

use std::sync::Arc;

use super::diagnostics::Diagnostics;
use super::error::Result;
use super::loader::{CaseLocation, DEFAULT_DELIMITER, TableSource};
use super::mapping::InputMapping;
use super::materialize::materialize;
use super::schema::Schema;
use super::table::TableSet;
use super::validate::{check_columns, validate_tables};
use super::weights::add_relative_weights;

/// Options for an import
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Field separator of CSV cases
    pub delimiter: u8,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Result of a successful import
#[derive(Debug, Clone)]
pub struct ImportedCase {
    /// Arrays for the evaluation engine
    pub inputs: InputMapping,
    /// Validated tables, extra columns removed
    pub tables: TableSet,
    /// Non-fatal findings
    pub diagnostics: Diagnostics,
}

/// Imports one case from one storage
pub struct CaseImporter {
    location: CaseLocation,
    schema: Arc<Schema>,
    source: TableSource,
}

impl CaseImporter {
    /// Open the case storage; the loader for its format is chosen here
    pub fn new(location: CaseLocation, schema: Arc<Schema>, options: &ImportOptions) -> Result<Self> {
        let source = TableSource::open(&location, options.delimiter)?;
        Ok(Self {
            location,
            schema,
            source,
        })
    }

    /// Load and check every template table
    pub fn load_tables(&mut self, diagnostics: &mut Diagnostics) -> Result<TableSet> {
        let mut tables = TableSet::new();
        for table_schema in self.schema.tables() {
            let raw = self.source.load(&table_schema.name)?;
            let table = check_columns(raw, table_schema, diagnostics)?;
            tables.insert(table);
        }
        Ok(tables)
    }

    /// Run the full import
    pub fn import_case(mut self) -> Result<ImportedCase> {
        log::info!(
            "Importing case '{}' ({}) from {}",
            self.location.name,
            self.location.format,
            self.source.describe()
        );

        let mut diagnostics = Diagnostics::new();
        let tables = self.load_tables(&mut diagnostics)?;
        validate_tables(&tables, &mut diagnostics)?;

        let mut inputs = materialize(&self.schema, &tables)?;
        add_relative_weights(&mut inputs)?;

        log::info!(
            "Imported case '{}': {} arrays, {} warning(s)",
            self.location.name,
            inputs.len(),
            diagnostics.len()
        );

        Ok(ImportedCase {
            inputs,
            tables,
            diagnostics,
        })
    }
}

/// Import a case with the given template
pub fn import_case(location: CaseLocation, schema: Arc<Schema>, options: &ImportOptions) -> Result<ImportedCase> {
    CaseImporter::new(location, schema, options)?.import_case()
}
