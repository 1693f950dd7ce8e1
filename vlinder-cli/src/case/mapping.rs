//! The compiled input mapping handed to the evaluation engine

use std::collections::BTreeMap;

use serde::Serialize;

use super::value::Value;

/// A named array of the compiled mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Array {
    /// Ordered vector of names or values
    Vector(Vec<Value>),
    /// Matrix indexed by `[row, column]`
    Matrix(Vec<Vec<f64>>),
}

impl Array {
    pub fn len(&self) -> usize {
        match self {
            Array::Vector(values) => values.len(),
            Array::Matrix(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape as (rows, columns); vectors have a single column
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Array::Vector(values) => (values.len(), 1),
            Array::Matrix(rows) => (rows.len(), rows.first().map_or(0, Vec::len)),
        }
    }
}

impl From<Vec<Value>> for Array {
    fn from(values: Vec<Value>) -> Self {
        Array::Vector(values)
    }
}

impl From<Vec<String>> for Array {
    fn from(names: Vec<String>) -> Self {
        Array::Vector(names.into_iter().map(Value::Text).collect())
    }
}

impl From<Vec<f64>> for Array {
    fn from(numbers: Vec<f64>) -> Self {
        Array::Vector(numbers.into_iter().map(Value::Number).collect())
    }
}

/// Name -> array mapping, keyed as described in the crate docs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InputMapping {
    arrays: BTreeMap<String, Array>,
}

impl InputMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, array: impl Into<Array>) {
        self.arrays.insert(key.into(), array.into());
    }

    pub fn get(&self, key: &str) -> Option<&Array> {
        self.arrays.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.arrays.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.arrays.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Array)> {
        self.arrays.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    /// A vector array
    pub fn vector(&self, key: &str) -> Option<&[Value]> {
        match self.arrays.get(key)? {
            Array::Vector(values) => Some(values),
            Array::Matrix(_) => None,
        }
    }

    /// A matrix array
    pub fn matrix(&self, key: &str) -> Option<&[Vec<f64>]> {
        match self.arrays.get(key)? {
            Array::Matrix(rows) => Some(rows),
            Array::Vector(_) => None,
        }
    }

    /// A vector as labels (names)
    pub fn labels(&self, key: &str) -> Option<Vec<String>> {
        self.vector(key)
            .map(|values| values.iter().map(Value::label).collect())
    }

    /// A vector as numbers; `None` if any entry is not numeric
    pub fn numbers(&self, key: &str) -> Option<Vec<f64>> {
        self.vector(key)?.iter().map(Value::as_f64).collect()
    }

    /// Compare with another mapping, allowing `tolerance` on numbers
    ///
    /// Non-numeric cells compare by label, so `"5"` read as text from one
    /// storage equals `5` read as a number from another.
    pub fn approx_eq(&self, other: &InputMapping, tolerance: f64) -> bool {
        if self.arrays.len() != other.arrays.len() {
            return false;
        }

        self.arrays.iter().all(|(key, left)| match (left, other.arrays.get(key)) {
            (Array::Vector(a), Some(Array::Vector(b))) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| match (x, y) {
                        (Value::Number(x), Value::Number(y)) => (x - y).abs() <= tolerance,
                        _ => x.label() == y.label(),
                    })
            }
            (Array::Matrix(a), Some(Array::Matrix(b))) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(ra, rb)| {
                        ra.len() == rb.len()
                            && ra.iter().zip(rb).all(|(x, y)| (x - y).abs() <= tolerance)
                    })
            }
            _ => false,
        })
    }
}
