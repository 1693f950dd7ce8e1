//! Derived weights added after materialization

use std::collections::HashMap;

use super::error::{ImportError, Result};
use super::mapping::InputMapping;

/// Add `key_output_relative_weight`, aligned with `key_outputs`
///
/// A key output that is alone in its theme keeps its own weight. Otherwise
/// its weight is divided by the number of key outputs in the theme and
/// multiplied by the theme weight.
pub fn add_relative_weights(mapping: &mut InputMapping) -> Result<()> {
    let themes_of_outputs = require_labels(mapping, "key_output_theme")?;
    let output_weights = require_numbers(mapping, "key_output_weight")?;
    let themes = require_labels(mapping, "themes")?;
    let theme_weights = require_numbers(mapping, "theme_weight")?;

    let relative = relative_weights(&themes_of_outputs, &output_weights, &themes, &theme_weights)?;
    mapping.insert("key_output_relative_weight", relative);
    Ok(())
}

/// Relative weight per key output
pub fn relative_weights(
    themes_of_outputs: &[String],
    output_weights: &[f64],
    themes: &[String],
    theme_weights: &[f64],
) -> Result<Vec<f64>> {
    let mut theme_count: HashMap<&str, usize> = HashMap::new();
    for theme in themes_of_outputs {
        *theme_count.entry(theme.as_str()).or_default() += 1;
    }
    let theme_weight: HashMap<&str, f64> = themes
        .iter()
        .map(String::as_str)
        .zip(theme_weights.iter().copied())
        .collect();

    themes_of_outputs
        .iter()
        .zip(output_weights)
        .map(|(theme, &weight)| {
            let count = theme_count[theme.as_str()];
            if count == 1 {
                return Ok(weight);
            }
            let factor = theme_weight.get(theme.as_str()).ok_or_else(|| {
                ImportError::template(format!("theme(s) {{'{}'}} has no weight", theme))
            })?;
            Ok(weight / count as f64 * factor)
        })
        .collect()
}

fn require_labels(mapping: &InputMapping, key: &str) -> Result<Vec<String>> {
    mapping
        .labels(key)
        .ok_or_else(|| ImportError::template(format!("'{}' is missing from the case", key)))
}

fn require_numbers(mapping: &InputMapping, key: &str) -> Result<Vec<f64>> {
    mapping
        .numbers(key)
        .ok_or_else(|| ImportError::template(format!("'{}' must only contain numbers", key)))
}
