//! The result document of a solve.
//!
//! ```json
//! {
//!   "status": "optimal",
//!   "objective": 28.8,
//!   "variables": {
//!     "open": 1.0,
//!     "Production": { "0": 0.0, "1": 1.6, "2": 5.2 },
//!     "Assign": { "0,0": 1.0, "0,1": 0.0 }
//!   }
//! }
//! ```
//!
//! Keys of `variables` follow variable registration order. When the status is
//! not `optimal`, `objective` is `null` and `variables` is empty.
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, ModelError};
use crate::model::Model;
use crate::solvers::Termination;
use crate::variable::{index_key, Registration};

/// Termination as written in a result document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// optimal
    Optimal,
    /// infeasible
    Infeasible,
    /// unbounded
    Unbounded,
    /// limit_reached
    LimitReached,
    /// error
    Error,
}

impl From<&Termination> for Status {
    fn from(termination: &Termination) -> Self {
        match termination {
            Termination::Optimal => Status::Optimal,
            Termination::Infeasible => Status::Infeasible,
            Termination::Unbounded => Status::Unbounded,
            Termination::LimitReached => Status::LimitReached,
            Termination::Error(_) => Status::Error,
        }
    }
}

/// Value of a singleton variable, or of every member of a family by index key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    /// `"x": 1.5`
    Scalar(f64),
    /// `"Production": { "0": 1.5, "1": 0.0 }`
    Family(IndexMap<String, f64>),
}

/// A serialized solve outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionDocument {
    /// termination token
    pub status: Status,
    /// back-end failure message, only for the `error` status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// objective value; `null` unless optimal
    pub objective: Option<f64>,
    /// values by variable or family name
    pub variables: IndexMap<String, VariableValue>,
}

impl SolutionDocument {
    /// Read the outcome of a solved model from its registry.
    /// Fails with [`ModelError::NoPrimal`] if the model has not been solved.
    pub fn from_model(model: &Model) -> Result<SolutionDocument, ModelError> {
        let termination = model.termination().ok_or_else(|| ModelError::NoPrimal {
            reason: "model has not been solved".to_string(),
        })?;
        let message = match termination {
            Termination::Error(message) => Some(message.clone()),
            _ => None,
        };
        let mut document = SolutionDocument {
            status: Status::from(termination),
            message,
            objective: None,
            variables: IndexMap::new(),
        };
        if !termination.is_optimal() {
            return Ok(document);
        }

        document.objective = model.objective_value();
        for registration in model.registrations() {
            match registration {
                Registration::Single(var) => {
                    let name = model
                        .variable(*var)
                        .map(|v| v.name.clone())
                        .ok_or(ModelError::CrossModel)?;
                    document
                        .variables
                        .insert(name, VariableValue::Scalar(model.primal(*var)?));
                }
                Registration::Family(family) => {
                    let mut values = IndexMap::with_capacity(family.len());
                    for (index, var) in family.iter() {
                        values.insert(index_key(&index), model.primal(var)?);
                    }
                    document
                        .variables
                        .insert(family.name().to_string(), VariableValue::Family(values));
                }
            }
        }
        Ok(document)
    }

    /// Value of a singleton variable
    pub fn value(&self, name: &str) -> Option<f64> {
        match self.variables.get(name)? {
            VariableValue::Scalar(value) => Some(*value),
            VariableValue::Family(_) => None,
        }
    }

    /// Value of a family member
    pub fn member_value(&self, family: &str, index: &[usize]) -> Option<f64> {
        match self.variables.get(family)? {
            VariableValue::Family(values) => values.get(&index_key(index)).copied(),
            VariableValue::Scalar(_) => None,
        }
    }

    /// Pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document written by [`SolutionDocument::to_json_string`]
    pub fn from_json_str(document: &str) -> Result<SolutionDocument, Error> {
        Ok(serde_json::from_str(document)?)
    }

    /// Write the document, replacing any existing file
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let mut text = self.to_json_string()?;
        text.push('\n');
        std::fs::write(path, text)?;
        debug!(
            component = "solution",
            operation = "write",
            path = %path.display(),
            variables = self.variables.len() as u64,
            "Wrote solution document"
        );
        Ok(())
    }

    /// Read a document from disk
    pub fn read_from_path(path: impl AsRef<Path>) -> Result<SolutionDocument, Error> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
