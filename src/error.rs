//! Error taxonomy of the modeling pipeline.
//!
//! Load errors live in [`ParameterError`](crate::params::ParameterError),
//! build, state and access errors in [`ModelError`]. Solve outcomes such as
//! infeasibility are not errors: they are reported as a
//! [`Termination`](crate::solvers::Termination).

use thiserror::Error;

use crate::params::ParameterError;

/// Namespace in which a name collision occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// variables, variable families and family members
    Variable,
    /// constraints
    Constraint,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Namespace::Variable => "variable",
            Namespace::Constraint => "constraint",
        })
    }
}

/// Errors raised while building, solving or reading a [`Model`](crate::model::Model)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A variable or constraint name is already taken
    #[error("{namespace} name `{name}` is already in use")]
    DuplicateName {
        /// where the collision happened
        namespace: Namespace,
        /// the offending name
        name: String,
    },
    /// Bounds are inverted, NaN, or incompatible with the domain
    #[error("invalid bounds for `{name}`: [{lower}, {upper}] {reason}")]
    InvalidBounds {
        /// variable or family name
        name: String,
        /// lower bound as given
        lower: f64,
        /// upper bound as given
        upper: f64,
        /// which rule was broken
        reason: &'static str,
    },
    /// An expression or family refers to a variable of another model
    #[error("expression refers to a variable that does not belong to this model")]
    CrossModel,
    /// Solve was requested before an objective was set
    #[error("model has no objective")]
    NoObjective,
    /// Solve was requested a second time
    #[error("model was already solved")]
    AlreadySolved,
    /// A mutation was attempted after solve
    #[error("model is frozen after solve; `{operation}` is not allowed")]
    ModelFrozen {
        /// the rejected builder operation
        operation: &'static str,
    },
    /// A primal value was requested while the model is not in the optimal state
    #[error("no primal value available: {reason}")]
    NoPrimal {
        /// why no value exists
        reason: String,
    },
    /// A family member was requested outside of the family's index domain
    #[error("index {index:?} is outside the domain {shape:?} of family `{family}`")]
    IndexOutOfRange {
        /// family name
        family: String,
        /// requested index
        index: Vec<usize>,
        /// declared index shape
        shape: Vec<usize>,
    },
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::DuplicateName { .. } => "MODEL_DUPLICATE_NAME",
            ModelError::InvalidBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::CrossModel => "EXPR_CROSS_MODEL",
            ModelError::NoObjective => "OBJECTIVE_MISSING",
            ModelError::AlreadySolved => "MODEL_ALREADY_SOLVED",
            ModelError::ModelFrozen { .. } => "MODEL_FROZEN",
            ModelError::NoPrimal { .. } => "SOLUTION_NO_PRIMAL",
            ModelError::IndexOutOfRange { .. } => "FAMILY_INDEX_OUT_OF_RANGE",
        }
    }
}

/// Failure of a solver back-end run. Converted into
/// [`Termination::Error`](crate::solvers::Termination::Error) by the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SolverError(pub String);

impl From<String> for SolverError {
    fn from(message: String) -> Self {
        SolverError(message)
    }
}

impl From<&str> for SolverError {
    fn from(message: &str) -> Self {
        SolverError(message.to_string())
    }
}

/// Any error of the load → build → solve → write pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// parameter document could not be read or queried
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    /// model construction failed
    #[error(transparent)]
    Model(#[from] ModelError),
    /// result document could not be encoded or parsed
    #[error("invalid solution document: {0}")]
    Encode(#[from] serde_json::Error),
    /// result document could not be written or read
    #[error("solution document I/O: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ModelError::CrossModel.code(), "EXPR_CROSS_MODEL");
        assert_eq!(ModelError::NoObjective.code(), "OBJECTIVE_MISSING");
        assert_eq!(ModelError::AlreadySolved.code(), "MODEL_ALREADY_SOLVED");
        assert_eq!(
            ModelError::ModelFrozen { operation: "add_var" }.code(),
            "MODEL_FROZEN"
        );
    }

    #[test]
    fn duplicate_name_mentions_namespace() {
        let err = ModelError::DuplicateName {
            namespace: Namespace::Constraint,
            name: "capacity".into(),
        };
        assert_eq!(
            err.to_string(),
            "constraint name `capacity` is already in use"
        );
    }
}
