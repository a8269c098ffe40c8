//! Word-problem instances, each a thin function from parameters to a [`Model`].
//!
//! Every instance follows the same data flow, which [`run`] performs end to end:
//! parameter document → [`ParameterStore`] → builder → [`Model::solve`] →
//! [`SolutionDocument`] → result document.
//!
//! The builders only use linear `<=`, `>=` and `=` rows. Relations the word
//! problems state differently are rewritten by the builder:
//!
//! * "strictly more `a` than `b`" on integers is `a >= b + 1` ([`fleet`]);
//! * "at least `r` times as many `a` as `b`" is `a - r·b >= 0` ([`wagons`]);
//! * "at most a fraction `p` of all vehicles are `a`" is `a <= p·(a + b)`, or
//!   equivalently `(1 - p)·a <= p·b` ([`buses`]).
use std::path::Path;

use tracing::info;

use crate::error::Error;
use crate::model::Model;
use crate::params::ParameterStore;
use crate::solution::SolutionDocument;
use crate::solvers::SolverTrait;

pub mod buses;
pub mod diet;
pub mod fleet;
pub mod production;
pub mod wagons;

/// Build `params` into a model, solve it with `solver` and read the outcome back
pub fn solve_document<B, S>(
    build: B,
    params: &ParameterStore,
    solver: &S,
) -> Result<SolutionDocument, Error>
where
    B: FnOnce(&ParameterStore) -> Result<Model, Error>,
    S: SolverTrait + ?Sized,
{
    let mut model = build(params)?;
    model.solve(solver)?;
    Ok(SolutionDocument::from_model(&model)?)
}

/// Load the parameter document at `params_path`, build, solve, and write the
/// result document to `output_path`
pub fn run<B, S>(
    build: B,
    params_path: impl AsRef<Path>,
    solver: &S,
    output_path: impl AsRef<Path>,
) -> Result<SolutionDocument, Error>
where
    B: FnOnce(&ParameterStore) -> Result<Model, Error>,
    S: SolverTrait + ?Sized,
{
    let params = ParameterStore::from_path(params_path.as_ref())?;
    let document = solve_document(build, &params, solver)?;
    document.write_to_path(output_path.as_ref())?;
    info!(
        component = "instances",
        operation = "run",
        input = %params_path.as_ref().display(),
        output = %output_path.as_ref().display(),
        status = ?document.status,
        "Instance solved"
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::Status;
    use crate::solvers::MicroLpSolver;

    #[test]
    fn run_writes_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("params.json");
        let output = dir.path().join("solution.json");
        std::fs::write(
            &input,
            r#"{"NumFoods": 2, "NumNutrients": 2, "Cost": [2, 3],
                "NutrientContent": [[1, 2], [3, 1]], "MinRequirement": [8, 9]}"#,
        )
        .unwrap();
        let document = run(diet::build, &input, &MicroLpSolver::new(), &output).unwrap();
        assert_eq!(document.status, Status::Optimal);
        assert_eq!(SolutionDocument::read_from_path(&output).unwrap(), document);
    }

    #[test]
    fn missing_parameter_stops_the_pipeline() {
        let params = ParameterStore::from_json_str(r#"{"NumFoods": 2}"#).unwrap();
        let err = solve_document(diet::build, &params, &MicroLpSolver::new()).unwrap_err();
        assert!(matches!(err, Error::Parameter(ref e) if e.code() == "PARAMETER_MISSING"));
    }
}
