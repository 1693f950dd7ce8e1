//! User configuration
//!
//! Read from `~/.config/vlinder-cli/config.toml` when present. Every field
//! has a default, so a partial file (or none at all) is fine. Command-line
//! flags override what is configured here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::case::Format;
use crate::case::loader::DEFAULT_DELIMITER;

const APP_DIR: &str = "vlinder-cli";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template workbook or TOML file; the built-in template when unset
    pub template: Option<PathBuf>,
    /// Field separator of CSV cases, a single ASCII character
    pub csv_delimiter: char,
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Format read by `import` and `convert` when none is given
    pub input_format: Format,
    /// Format written by `convert` when none is given
    pub output_format: Format,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            template: None,
            csv_delimiter: DEFAULT_DELIMITER as char,
            log_level: "warn".to_string(),
            input_format: Format::Xlsx,
            output_format: Format::Json,
        }
    }
}

impl Config {
    /// Directory holding the configuration file
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    /// Default location of the configuration file
    pub fn default_path() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.delimiter()?;
        Ok(config)
    }

    /// The CSV delimiter as a byte
    pub fn delimiter(&self) -> Result<u8> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .with_context(|| {
                format!(
                    "CSV delimiter must be a single ASCII character, got '{}'",
                    self.csv_delimiter
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.delimiter().unwrap(), b';');
        assert_eq!(config.input_format, Format::Xlsx);
        assert!(config.template.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            csv_delimiter = ","
            output_format = "csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.delimiter().unwrap(), b',');
        assert_eq!(config.output_format, Format::Csv);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_rejects_non_ascii_delimiter() {
        let err = Config::from_toml_str("csv_delimiter = \"§\"").unwrap_err();
        assert!(err.to_string().contains("single ASCII character"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "template = \"/tmp/template.xlsx\"\nlog_level = \"debug\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.template, Some(PathBuf::from("/tmp/template.xlsx")));
        assert_eq!(config.log_level, "debug");
    }
}
