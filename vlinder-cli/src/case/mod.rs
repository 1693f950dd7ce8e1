//! Business-case import
//!
//! A case is a set of named tables described by a [`Schema`]. Importing it
//! loads every table from its storage, checks it against the template and
//! against the other tables, and compiles the result into an
//! [`InputMapping`] for the evaluation engine.

pub mod diagnostics;
pub mod error;
pub mod exporter;
pub mod hierarchy;
pub mod importer;
pub mod loader;
pub mod mapping;
pub mod materialize;
pub mod naming;
pub mod schema;
pub mod table;
pub mod validate;
pub mod value;
pub mod weights;

pub use diagnostics::{Diagnostic, Diagnostics, WarningKind};
pub use error::{ImportError, Result};
pub use exporter::CaseExporter;
pub use hierarchy::{DependencyGraph, DependencyRow, HierarchyPlan, resolve_hierarchy};
pub use importer::{CaseImporter, ImportOptions, ImportedCase, import_case};
pub use loader::{CaseLocation, Format, TableSource};
pub use mapping::{Array, InputMapping};
pub use schema::{Schema, TableLayout, TableSchema};
pub use table::{Table, TableSet};
pub use value::Value;
