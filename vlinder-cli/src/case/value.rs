//! Cell values read from case tables

use serde::Serialize;

/// A single cell of a case table
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Empty cell, `NaN` or JSON `null`
    #[default]
    Missing,
    /// Numeric cell (booleans are stored as 1.0 / 0.0)
    Number(f64),
    /// Any other text
    Text(String),
}

/// Spellings that readers treat as an empty cell
const MISSING_MARKERS: &[&str] = &["", "nan", "NaN", "NA", "N/A", "null"];

impl Value {
    /// Parse a raw text cell (CSV field, JSON string)
    ///
    /// Numbers are recognised the way a spreadsheet would: `"3"` and `"0.25"`
    /// become [`Value::Number`], everything else stays text.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if !n.is_nan() => Value::Number(n),
            _ => Value::Text(raw.to_string()),
        }
    }

    /// Convert a JSON cell
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Bool(b) => Value::from(*b),
            serde_json::Value::Number(n) => match n.as_f64() {
                Some(f) if !f.is_nan() => Value::Number(f),
                _ => Value::Missing,
            },
            serde_json::Value::String(s) if s.is_empty() => Value::Missing,
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                Value::Text(json.to_string())
            }
        }
    }

    /// Check if this cell is empty
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Try to get as a number, parsing numeric text
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            Value::Missing => None,
        }
    }

    /// True when the cell holds a numeric literal (a number, or text that parses as one)
    pub fn is_numeric(&self) -> bool {
        self.as_f64().is_some()
    }

    /// Name used when matching cells against input names and destinations
    pub fn label(&self) -> String {
        match self {
            Value::Missing => String::new(),
            Value::Number(n) => format_number(*n),
            Value::Text(s) => s.clone(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Number(if b { 1.0 } else { 0.0 })
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Format a number, dropping the fractional part of whole numbers
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text() {
        assert_eq!(Value::from_text(""), Value::Missing);
        assert_eq!(Value::from_text("NaN"), Value::Missing);
        assert_eq!(Value::from_text("3"), Value::Number(3.0));
        assert_eq!(Value::from_text("0.25"), Value::Number(0.25));
        assert_eq!(Value::from_text("revenue"), Value::Text("revenue".to_string()));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Missing);
        assert_eq!(Value::from_json(&serde_json::json!(true)), Value::Number(1.0));
        assert_eq!(Value::from_json(&serde_json::json!(2.5)), Value::Number(2.5));
        assert_eq!(Value::from_json(&serde_json::json!("")), Value::Missing);
        assert_eq!(Value::from_json(&serde_json::json!("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn test_label_drops_fraction_of_whole_numbers() {
        assert_eq!(Value::Number(12.0).label(), "12");
        assert_eq!(Value::Number(0.5).label(), "0.5");
        assert_eq!(Value::Missing.label(), "");
    }

    #[test]
    fn test_numeric_text() {
        assert!(Value::Text(" 42 ".to_string()).is_numeric());
        assert!(!Value::Text("price".to_string()).is_numeric());
        assert!(!Value::Missing.is_numeric());
    }
}
