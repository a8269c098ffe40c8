//! Immutable problem parameters read from a JSON document.
//!
//! A document is a mapping from names to numbers or rectangular numeric
//! arrays. Nested mappings are reached with dotted names (`"Costs.Van"`).
//! Arrays are indexed from 0.
//!
//! ```
//! use lp_modeling::params::ParameterStore;
//!
//! let params = ParameterStore::from_json_str(r#"{"Profit": [3, 5, 4], "NumProducts": 3}"#).unwrap();
//! assert_eq!(params.count("NumProducts").unwrap(), 3);
//! assert_eq!(params.vector("Profit").unwrap(), vec![3., 5., 4.]);
//! ```
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Rank of a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// a single number
    Scalar,
    /// a sequence of numbers
    Vector,
    /// a rectangular sequence of sequences of numbers
    Matrix,
    /// anything else (nested mapping, ragged or deeper array)
    Other,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Shape::Scalar => "scalar",
            Shape::Vector => "vector",
            Shape::Matrix => "matrix",
            Shape::Other => "non-numeric structure",
        })
    }
}

/// Load errors
#[derive(Debug, Error)]
pub enum ParameterError {
    /// The key is absent from the document
    #[error("parameter `{0}` is missing")]
    Missing(String),
    /// The value's rank differs from the caller's expectation
    #[error("parameter `{name}` should be a {expected}, found a {found}")]
    Shape {
        /// parameter name
        name: String,
        /// requested rank
        expected: Shape,
        /// rank present in the document
        found: Shape,
    },
    /// A non-numeric element appears, or a count is not a non-negative integer
    #[error("parameter `{name}` has a non-numeric or ill-typed element: {detail}")]
    Type {
        /// parameter name
        name: String,
        /// the offending element
        detail: String,
    },
    /// An array's length disagrees with a declared count
    #[error("parameter `{name}` should have dimensions {expected:?}, found {found:?}")]
    Dimensions {
        /// parameter name
        name: String,
        /// dimensions implied by the counts
        expected: Vec<usize>,
        /// dimensions present in the document
        found: Vec<usize>,
    },
    /// The document is not a JSON mapping
    #[error("invalid parameter document: {0}")]
    Document(String),
    /// The document could not be read
    #[error("cannot read parameter document: {0}")]
    Io(#[from] std::io::Error),
}

impl ParameterError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ParameterError::Missing(_) => "PARAMETER_MISSING",
            ParameterError::Shape { .. } | ParameterError::Dimensions { .. } => "PARAMETER_SHAPE",
            ParameterError::Type { .. } => "PARAMETER_TYPE",
            ParameterError::Document(_) => "PARAMETER_DOCUMENT",
            ParameterError::Io(_) => "PARAMETER_IO",
        }
    }
}

/// Read-only view over a parameter document
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    root: Map<String, Value>,
}

impl ParameterStore {
    /// Wrap an already-parsed document. It must be a mapping.
    pub fn from_value(value: Value) -> Result<Self, ParameterError> {
        match value {
            Value::Object(root) => {
                debug!(
                    component = "params",
                    operation = "load",
                    keys = root.len() as u64,
                    "Loaded parameter document"
                );
                Ok(ParameterStore { root })
            }
            other => Err(ParameterError::Document(format!(
                "expected a mapping at the top level, found {}",
                json_kind(&other)
            ))),
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(document: &str) -> Result<Self, ParameterError> {
        let value: Value =
            serde_json::from_str(document).map_err(|e| ParameterError::Document(e.to_string()))?;
        Self::from_value(value)
    }

    /// Parse a JSON document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ParameterError> {
        let value: Value = serde_json::from_reader(reader)
            .map_err(|e| ParameterError::Document(e.to_string()))?;
        Self::from_value(value)
    }

    /// Read and parse a JSON document from disk
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ParameterError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Whether `name` resolves to a value
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_ok()
    }

    /// Top level names, in document order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.root.keys().map(String::as_str)
    }

    /// A single number
    pub fn scalar(&self, name: &str) -> Result<f64, ParameterError> {
        let value = self.lookup(name)?;
        match value {
            Value::Number(_) => number(name, value),
            other => Err(self.shape_error(name, Shape::Scalar, other)),
        }
    }

    /// A scalar interpreted as a count, e.g. an array dimension
    pub fn count(&self, name: &str) -> Result<usize, ParameterError> {
        let value = self.scalar(name)?;
        if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
            return Err(ParameterError::Type {
                name: name.to_string(),
                detail: format!("{} is not a non-negative integer", value),
            });
        }
        Ok(value as usize)
    }

    /// A one dimensional array
    pub fn vector(&self, name: &str) -> Result<Vec<f64>, ParameterError> {
        match self.lookup(name)? {
            Value::Array(items) if items.iter().all(|v| !v.is_array()) => {
                items.iter().map(|item| number(name, item)).collect()
            }
            other => Err(self.shape_error(name, Shape::Vector, other)),
        }
    }

    /// A rectangular two dimensional array, row major
    pub fn matrix(&self, name: &str) -> Result<Vec<Vec<f64>>, ParameterError> {
        let value = self.lookup(name)?;
        let rows = match value {
            Value::Array(rows) if rows.iter().all(Value::is_array) => rows,
            other => return Err(self.shape_error(name, Shape::Matrix, other)),
        };
        let mut matrix = Vec::with_capacity(rows.len());
        for row in rows {
            let cells = row.as_array().map(Vec::as_slice).unwrap_or_default();
            if cells.iter().any(Value::is_array) {
                return Err(self.shape_error(name, Shape::Matrix, value));
            }
            let parsed = cells
                .iter()
                .map(|cell| number(name, cell))
                .collect::<Result<Vec<_>, _>>()?;
            matrix.push(parsed);
        }
        if let Some(first) = matrix.first() {
            let width = first.len();
            if matrix.iter().any(|row| row.len() != width) {
                return Err(ParameterError::Shape {
                    name: name.to_string(),
                    expected: Shape::Matrix,
                    found: Shape::Other,
                });
            }
        }
        Ok(matrix)
    }

    /// A vector of exactly `len` numbers
    pub fn vector_of_len(&self, name: &str, len: usize) -> Result<Vec<f64>, ParameterError> {
        let vector = self.vector(name)?;
        if vector.len() != len {
            return Err(ParameterError::Dimensions {
                name: name.to_string(),
                expected: vec![len],
                found: vec![vector.len()],
            });
        }
        Ok(vector)
    }

    /// A matrix of exactly `rows` × `cols` numbers
    pub fn matrix_of_dims(
        &self,
        name: &str,
        rows: usize,
        cols: usize,
    ) -> Result<Vec<Vec<f64>>, ParameterError> {
        let matrix = self.matrix(name)?;
        let found = vec![matrix.len(), matrix.first().map_or(0, Vec::len)];
        if found[0] != rows || (rows > 0 && found[1] != cols) {
            return Err(ParameterError::Dimensions {
                name: name.to_string(),
                expected: vec![rows, cols],
                found,
            });
        }
        Ok(matrix)
    }

    fn lookup(&self, name: &str) -> Result<&Value, ParameterError> {
        if let Some(value) = self.root.get(name) {
            return Ok(value);
        }
        let mut parts = name.split('.');
        let first = parts.next().unwrap_or_default();
        let mut current = self
            .root
            .get(first)
            .ok_or_else(|| ParameterError::Missing(name.to_string()))?;
        for part in parts {
            current = current
                .as_object()
                .and_then(|map| map.get(part))
                .ok_or_else(|| ParameterError::Missing(name.to_string()))?;
        }
        Ok(current)
    }

    fn shape_error(&self, name: &str, expected: Shape, found: &Value) -> ParameterError {
        let found = shape_of(found);
        // right rank, wrong element type
        if found == expected {
            return ParameterError::Type {
                name: name.to_string(),
                detail: "array elements must be numbers".to_string(),
            };
        }
        ParameterError::Shape {
            name: name.to_string(),
            expected,
            found,
        }
    }
}

fn number(name: &str, value: &Value) -> Result<f64, ParameterError> {
    value.as_f64().ok_or_else(|| ParameterError::Type {
        name: name.to_string(),
        detail: format!("expected a number, found {}", json_kind(value)),
    })
}

fn shape_of(value: &Value) -> Shape {
    match value {
        Value::Number(_) | Value::String(_) | Value::Bool(_) | Value::Null => Shape::Scalar,
        Value::Array(items) if items.iter().all(|v| !v.is_array()) => Shape::Vector,
        Value::Array(items)
            if items
                .iter()
                .all(|v| v.as_array().map_or(false, |r| r.iter().all(|c| !c.is_array()))) =>
        {
            Shape::Matrix
        }
        _ => Shape::Other,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::from_json_str(
            r#"{
                "NumProducts": 3,
                "Profit": [3, 5, 4],
                "ResourceRequirement": [[2, 3, 1], [4, 1, 2]],
                "Ragged": [[1, 2], [3]],
                "Labels": ["a", "b"],
                "Ratio": 0.4,
                "Costs": {"Van": 3, "Truck": 6}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn typed_lookups() {
        let params = store();
        assert_eq!(params.scalar("NumProducts").unwrap(), 3.);
        assert_eq!(params.count("NumProducts").unwrap(), 3);
        assert_eq!(params.vector("Profit").unwrap(), vec![3., 5., 4.]);
        assert_eq!(
            params.matrix("ResourceRequirement").unwrap(),
            vec![vec![2., 3., 1.], vec![4., 1., 2.]]
        );
    }

    #[test]
    fn dotted_names_reach_nested_mappings() {
        let params = store();
        assert_eq!(params.scalar("Costs.Truck").unwrap(), 6.);
        assert!(matches!(
            params.scalar("Costs.Bike"),
            Err(ParameterError::Missing(_))
        ));
    }

    #[test]
    fn missing_key() {
        let err = store().scalar("Budget").unwrap_err();
        assert_eq!(err.code(), "PARAMETER_MISSING");
    }

    #[test]
    fn rank_mismatch() {
        let params = store();
        assert!(matches!(
            params.scalar("Profit"),
            Err(ParameterError::Shape {
                expected: Shape::Scalar,
                found: Shape::Vector,
                ..
            })
        ));
        assert!(matches!(
            params.vector("ResourceRequirement"),
            Err(ParameterError::Shape {
                found: Shape::Matrix,
                ..
            })
        ));
        assert!(matches!(
            params.matrix("Ragged"),
            Err(ParameterError::Shape { .. })
        ));
    }

    #[test]
    fn non_numeric_elements() {
        let params = store();
        assert_eq!(params.vector("Labels").unwrap_err().code(), "PARAMETER_TYPE");
        assert_eq!(params.count("Ratio").unwrap_err().code(), "PARAMETER_TYPE");
    }

    #[test]
    fn document_must_be_a_mapping() {
        let err = ParameterStore::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.code(), "PARAMETER_DOCUMENT");
        let err = ParameterStore::from_json_str("{not json").unwrap_err();
        assert_eq!(err.code(), "PARAMETER_DOCUMENT");
    }

    #[test]
    fn empty_matrix_is_zero_by_zero() {
        let params = ParameterStore::from_json_str(r#"{"M": []}"#).unwrap();
        assert!(params.matrix("M").unwrap().is_empty());
        assert!(params.vector("M").unwrap().is_empty());
    }

    #[test]
    fn lengths_must_match_counts() {
        let params = store();
        assert_eq!(params.vector_of_len("Profit", 3).unwrap().len(), 3);
        let err = params.vector_of_len("Profit", 2).unwrap_err();
        assert_eq!(err.code(), "PARAMETER_SHAPE");
        assert!(params.matrix_of_dims("ResourceRequirement", 2, 3).is_ok());
        assert!(matches!(
            params.matrix_of_dims("ResourceRequirement", 3, 2),
            Err(ParameterError::Dimensions { .. })
        ));
    }
}
