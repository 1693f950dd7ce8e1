//! Errors raised while importing a case

use std::collections::BTreeSet;

use thiserror::Error;

/// Result alias for the import pipeline
pub type Result<T> = std::result::Result<T, ImportError>;

/// Everything that can abort an import
///
/// `MissingTable` and `Template` are findings about the case itself. The
/// remaining variants are storage failures and are passed through unchanged.
#[derive(Debug, Error)]
pub enum ImportError {
    /// An expected table (file, section or sheet) is absent
    #[error("Sheet '{table}' is missing in '{location}'")]
    MissingTable { table: String, location: String },

    /// The case violates the template or is inconsistent across tables
    #[error("Template Error: {0}")]
    Template(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Xlsx(#[from] calamine::XlsxError),

    #[error(transparent)]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl ImportError {
    /// Shorthand for a [`ImportError::Template`]
    pub fn template(message: impl Into<String>) -> Self {
        ImportError::Template(message.into())
    }

    /// True for template violations (as opposed to storage failures)
    pub fn is_template(&self) -> bool {
        matches!(self, ImportError::Template(_))
    }

    pub fn is_missing_table(&self) -> bool {
        matches!(self, ImportError::MissingTable { .. })
    }
}

/// Render a name set as `{'a', 'b'}` for error messages
pub fn fmt_names<'a, I>(names: I) -> String
where
    I: IntoIterator<Item = &'a String>,
{
    let sorted: BTreeSet<&String> = names.into_iter().collect();
    let quoted: Vec<String> = sorted.iter().map(|n| format!("'{}'", n)).collect();
    format!("{{{}}}", quoted.join(", "))
}
