//! Import of vlinder business cases
//!
//! A business case is a set of tables (key outputs, options, scenarios,
//! inputs, dependencies and weights) stored as CSV, JSON or an Excel
//! workbook. [`case::import_case`] validates such a case against its template
//! and compiles it into the array mapping used by the evaluation engine.
//!
//! ```no_run
//! use std::sync::Arc;
//! use vlinder::case::{CaseLocation, Format, ImportOptions, Schema, import_case};
//!
//! # fn main() -> vlinder::case::Result<()> {
//! let schema = Arc::new(Schema::builtin()?);
//! let location = CaseLocation::new("cases", "renewables", Format::Csv);
//! let case = import_case(location, schema, &ImportOptions::default())?;
//! println!("{:?}", case.inputs.labels("key_outputs"));
//! # Ok(())
//! # }
//! ```

pub mod case;
pub mod config;

pub use case::{CaseImporter, ImportError, ImportedCase, InputMapping, import_case};
pub use config::Config;
