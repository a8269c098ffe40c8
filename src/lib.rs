#![deny(missing_docs)]
//! A library to build linear and mixed-integer programs declaratively,
//! solve them in process or with external solvers, and write the primal
//! solution to a deterministic document.
//!
//! ```
//! use lp_modeling::prelude::*;
//!
//! let mut model = Model::new("two");
//! let x = model.add_var_family("x", 2, Domain::Continuous, None, Some(3.0)).unwrap();
//! model.add_constraint("sum", x[0] + x[1], Relation::LessEq, 4.0).unwrap();
//! model.set_objective(2.0 * x[0] + x[1], ObjectiveSense::Maximize).unwrap();
//! model.solve(&MicroLpSolver::new()).unwrap();
//!
//! let document = SolutionDocument::from_model(&model).unwrap();
//! assert_eq!(document.status, Status::Optimal);
//! assert!((document.member_value("x", &[0]).unwrap() - 3.0).abs() < 1e-9);
//! ```

pub mod constraint;
pub mod error;
pub mod expr;
pub mod ids;
pub mod instances;
pub mod lp_format;
pub mod model;
pub mod params;
pub mod problem;
pub mod solution;
pub mod solvers;
pub mod util;
pub mod variable;

/// The types needed to build, solve and serialize a model
pub mod prelude {
    pub use crate::constraint::Relation;
    pub use crate::error::{Error, ModelError};
    pub use crate::expr::{sum_over, AffineExpr};
    pub use crate::ids::VarId;
    pub use crate::model::{Model, ObjectiveSense};
    pub use crate::params::ParameterStore;
    pub use crate::solution::{SolutionDocument, Status};
    pub use crate::solvers::{MicroLpSolver, SolverTrait, Termination};
    pub use crate::variable::{Domain, VarFamily};
}
