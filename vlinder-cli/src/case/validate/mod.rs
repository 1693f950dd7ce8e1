//! Template checks on loaded tables
//!
//! `columns` checks each table on its own against its template entry.
//! `cross` checks the tables against each other once all are loaded.

mod columns;
mod cross;

pub use columns::{check_case_text, check_columns};
pub use cross::{
    validate_input_completeness, validate_input_use_and_naming, validate_start_and_endpoint,
    validate_tables, validate_weights,
};
