//! Table loading from the supported storage encodings
//!
//! A case lives in `<root>/<case>/<format>/`:
//! - `csv`: one `<table>.csv` per table, `;` separated
//! - `json`: one `<table>.json` per table, or a single `<case>.json` with one
//!   section per table
//! - `xlsx`: `<case>.xlsx` with one sheet per table

mod bundled;
mod delimited;
mod workbook;

pub use bundled::{DocumentField, DocumentSchema, TableDocument};
pub use delimited::DEFAULT_DELIMITER;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

use super::error::{ImportError, Result};
use super::table::Table;
use workbook::CaseWorkbook;

/// Storage encoding of a case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Csv,
    Json,
    Xlsx,
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Csv, Format::Json, Format::Xlsx];

    /// Directory name and file extension of this format
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xlsx => "xlsx",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "xlsx" | "excel" => Ok(Format::Xlsx),
            other => Err(format!(
                "Unknown format '{}', expected one of csv, json, xlsx",
                other
            )),
        }
    }
}

/// Where a case is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseLocation {
    pub root: PathBuf,
    pub name: String,
    pub format: Format,
}

impl CaseLocation {
    pub fn new(root: impl Into<PathBuf>, name: impl Into<String>, format: Format) -> Self {
        Self {
            root: root.into(),
            name: name.into(),
            format,
        }
    }

    /// `<root>/<case>/<format>`
    pub fn dir(&self) -> PathBuf {
        self.root.join(&self.name).join(self.format.extension())
    }
}

/// A case storage, opened once and asked for tables by name
pub enum TableSource {
    /// One delimited file per table
    Csv { dir: PathBuf, delimiter: u8 },
    /// One JSON document per table
    Json { dir: PathBuf },
    /// A single JSON document with one section per table
    JsonBundle {
        path: PathBuf,
        sections: Map<String, Json>,
    },
    /// A workbook with one sheet per table
    Xlsx {
        path: PathBuf,
        workbook: Box<CaseWorkbook>,
    },
}

impl TableSource {
    /// Open the storage of a case
    ///
    /// Fails with a template error when the case directory does not exist.
    pub fn open(location: &CaseLocation, delimiter: u8) -> Result<Self> {
        let dir = location.dir();
        if !dir.is_dir() {
            return Err(ImportError::template(format!(
                "Incorrect path. Could not find '{}'",
                dir.display()
            )));
        }

        let source = match location.format {
            Format::Csv => TableSource::Csv { dir, delimiter },
            Format::Json => {
                let bundle = dir.join(format!("{}.json", location.name));
                if bundle.is_file() {
                    let sections = match bundled::read_json_file(&bundle)? {
                        Json::Object(map) => map,
                        _ => {
                            return Err(ImportError::template(format!(
                                "'{}' must contain one section per table",
                                bundle.display()
                            )));
                        }
                    };
                    TableSource::JsonBundle {
                        path: bundle,
                        sections,
                    }
                } else {
                    TableSource::Json { dir }
                }
            }
            Format::Xlsx => {
                let path = find_workbook(&dir, &location.name)?;
                let workbook = workbook::open_case_workbook(&path)?;
                TableSource::Xlsx {
                    path,
                    workbook: Box::new(workbook),
                }
            }
        };

        log::debug!("Opened {} storage at {}", location.format, source.describe());
        Ok(source)
    }

    /// Human-readable location of this storage
    pub fn describe(&self) -> String {
        match self {
            TableSource::Csv { dir, .. } | TableSource::Json { dir } => dir.display().to_string(),
            TableSource::JsonBundle { path, .. } | TableSource::Xlsx { path, .. } => {
                path.display().to_string()
            }
        }
    }

    /// Load one table by name
    pub fn load(&mut self, table: &str) -> Result<Table> {
        match self {
            TableSource::Csv { dir, delimiter } => {
                let path = dir.join(format!("{}.csv", table));
                ensure_file(&path, table)?;
                delimited::read_delimited_table(&path, table, *delimiter)
            }
            TableSource::Json { dir } => {
                let path = dir.join(format!("{}.json", table));
                ensure_file(&path, table)?;
                bundled::read_document_table(&path, table)
            }
            TableSource::JsonBundle { path, sections } => {
                let section = sections
                    .get(table)
                    .cloned()
                    .ok_or_else(|| ImportError::MissingTable {
                        table: table.to_string(),
                        location: path.display().to_string(),
                    })?;
                bundled::table_from_json(section, table)
            }
            TableSource::Xlsx { path, workbook } => {
                workbook::read_sheet_table(workbook, path, table)
            }
        }
    }
}

fn ensure_file(path: &Path, table: &str) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ImportError::MissingTable {
            table: table.to_string(),
            location: path.display().to_string(),
        })
    }
}

/// `<case>.xlsx`, or the only workbook in the directory
fn find_workbook(dir: &Path, name: &str) -> Result<PathBuf> {
    let expected = dir.join(format!("{}.xlsx", name));
    if expected.is_file() {
        return Ok(expected);
    }

    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("xlsx"))
        .collect();
    candidates.sort();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(ImportError::template(format!(
            "No workbook found in '{}'",
            dir.display()
        ))),
        _ => Err(ImportError::template(format!(
            "Expected '{}' in '{}', found several workbooks",
            expected.display(),
            dir.display()
        ))),
    }
}
