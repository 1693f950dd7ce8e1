//! Schema registry: accepted columns, mandatory fields and layout per table
//!
//! The reference template is read once. Its sheets (or `[[table]]` entries)
//! define, by column order, the exact columns accepted for each table.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use serde::Deserialize;

use super::error::{ImportError, Result};
use super::naming::{pluralize, singularize};

/// Names of the tables every case provides
pub mod tables {
    pub const CASE_TEXT_ELEMENTS: &str = "case_text_elements";
    pub const KEY_OUTPUTS: &str = "key_outputs";
    pub const DECISION_MAKERS_OPTIONS: &str = "decision_makers_options";
    pub const SCENARIOS: &str = "scenarios";
    pub const FIXED_INPUTS: &str = "fixed_inputs";
    pub const DEPENDENCIES: &str = "dependencies";
    pub const THEME_WEIGHTS: &str = "theme_weights";
    pub const KEY_OUTPUT_WEIGHTS: &str = "key_output_weights";
    pub const SCENARIO_WEIGHTS: &str = "scenario_weights";
}

/// Columns that may never hold an empty cell
const MANDATORY_FIELDS: &[(&str, &[&str])] = &[
    (
        tables::KEY_OUTPUTS,
        &["key_output", "theme", "monetary", "smaller_the_better", "linear", "automatic"],
    ),
    (
        tables::DECISION_MAKERS_OPTIONS,
        &["internal_variable_input", "decision_makers_option", "value"],
    ),
    (tables::SCENARIOS, &["external_variable_input", "scenario", "value"]),
    (tables::FIXED_INPUTS, &["fixed_input", "value"]),
    (
        tables::DEPENDENCIES,
        &["destination", "argument_1", "argument_2", "operator"],
    ),
    (tables::THEME_WEIGHTS, &["theme", "weight"]),
    (tables::KEY_OUTPUT_WEIGHTS, &["key_output", "weight"]),
    (tables::SCENARIO_WEIGHTS, &["scenario", "weight"]),
];

const BUILTIN_TEMPLATE: &str = include_str!("../../data/template.toml");

/// How a validated table is turned into arrays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableLayout {
    /// Every column becomes a vector; `entity` names the identifying column
    Vector { entity: String },
    /// Rows are pivoted into a matrix `[row label, variable label] -> value`
    Pivot {
        row: String,
        variable: String,
        value: String,
    },
    /// Weights re-ordered to the canonical order of `entity` names
    Weights { entity: String, weight: String },
    /// Dependency rows, ordered by hierarchy
    Dependencies,
}

impl TableLayout {
    /// Named rule for a table
    ///
    /// Known tables have a fixed rule. Any other table ending in `_weights`
    /// with two columns is a weight table; everything else is a vector table
    /// whose first column is the entity name.
    pub fn for_table(name: &str, columns: &[String]) -> Self {
        match name {
            tables::DECISION_MAKERS_OPTIONS => TableLayout::Pivot {
                row: "decision_makers_option".to_string(),
                variable: "internal_variable_input".to_string(),
                value: "value".to_string(),
            },
            tables::SCENARIOS => TableLayout::Pivot {
                row: "scenario".to_string(),
                variable: "external_variable_input".to_string(),
                value: "value".to_string(),
            },
            tables::DEPENDENCIES => TableLayout::Dependencies,
            tables::THEME_WEIGHTS => Self::weights("theme", columns),
            tables::KEY_OUTPUT_WEIGHTS => Self::weights("key_output", columns),
            tables::SCENARIO_WEIGHTS => Self::weights("scenario", columns),
            tables::KEY_OUTPUTS | tables::FIXED_INPUTS | tables::CASE_TEXT_ELEMENTS => {
                TableLayout::Vector {
                    entity: singularize(name),
                }
            }
            _ if name.ends_with("_weights") && columns.len() == 2 => TableLayout::Weights {
                entity: columns[0].clone(),
                weight: columns[1].clone(),
            },
            _ => TableLayout::Vector {
                entity: columns
                    .first()
                    .cloned()
                    .unwrap_or_else(|| singularize(name)),
            },
        }
    }

    fn weights(entity: &str, columns: &[String]) -> Self {
        let weight = columns
            .iter()
            .find(|c| c.as_str() != entity)
            .cloned()
            .unwrap_or_else(|| "weight".to_string());
        TableLayout::Weights {
            entity: entity.to_string(),
            weight,
        }
    }

    /// Key of the canonical name array for a weight table (`themes`, `scenarios`, ...)
    pub fn names_key(&self) -> Option<String> {
        match self {
            TableLayout::Weights { entity, .. } => Some(pluralize(entity)),
            _ => None,
        }
    }
}

/// Schema entry of a single table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub name: String,
    /// Accepted columns, in reference order
    pub columns: Vec<String>,
    /// Subset of `columns` that may not hold missing values
    pub mandatory: Vec<String>,
    pub layout: TableLayout,
}

impl TableSchema {
    pub fn new(name: &str, columns: Vec<String>) -> Self {
        let mandatory = MANDATORY_FIELDS
            .iter()
            .find(|(table, _)| *table == name)
            .map(|(_, fields)| fields.iter().map(|f| f.to_string()).collect())
            .unwrap_or_default();
        let layout = TableLayout::for_table(name, &columns);

        Self {
            name: name.to_string(),
            columns,
            mandatory,
            layout,
        }
    }
}

/// All table schemas of the reference template, in load order
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    tables: Vec<TableSchema>,
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(rename = "table", default)]
    tables: Vec<TemplateTable>,
}

#[derive(Debug, Deserialize)]
struct TemplateTable {
    name: String,
    columns: Vec<String>,
    #[serde(default)]
    mandatory: Option<Vec<String>>,
}

impl Schema {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    /// The template shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_TEMPLATE)
    }

    /// Load a template from disk, `.xlsx` workbook or `.toml` file
    pub fn load(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("xlsx") => Self::from_workbook(path),
            Some("toml") => Self::from_toml_str(&std::fs::read_to_string(path)?),
            _ => Err(ImportError::template(format!(
                "Unsupported template '{}', expected an .xlsx or .toml file",
                path.display()
            ))),
        }
    }

    /// Read the header row of every sheet of a reference workbook
    pub fn from_workbook(path: &Path) -> Result<Self> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;

        let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
        let mut tables = Vec::new();
        for sheet_name in sheet_names {
            let range = workbook.worksheet_range(&sheet_name)?;
            let columns: Vec<String> = range
                .rows()
                .next()
                .map(|header| {
                    header
                        .iter()
                        .map(header_name)
                        .filter(|name| !name.is_empty())
                        .collect()
                })
                .unwrap_or_default();
            tables.push(TableSchema::new(&sheet_name, columns));
        }

        log::debug!(
            "Loaded template with {} tables from {}",
            tables.len(),
            path.display()
        );
        Self::checked(tables)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: TemplateFile = toml::from_str(content)?;
        let tables = file
            .tables
            .into_iter()
            .map(|t| {
                let mut schema = TableSchema::new(&t.name, t.columns);
                if let Some(mandatory) = t.mandatory {
                    schema.mandatory = mandatory;
                }
                schema
            })
            .collect();
        Self::checked(tables)
    }

    fn checked(tables: Vec<TableSchema>) -> Result<Self> {
        if tables.is_empty() {
            return Err(ImportError::template("Template does not define any table"));
        }
        if let Some(empty) = tables.iter().find(|t| t.columns.is_empty()) {
            return Err(ImportError::template(format!(
                "Template table '{}' has no columns",
                empty.name
            )));
        }
        Ok(Self { tables })
    }

    pub fn get(&self, table: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == table)
    }

    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.name.as_str())
    }
}

/// Header cell as a column name
pub(crate) fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}
