//! Chains of back-ends. Each link is probed with a one-column problem and the
//! first one that runs handles the real problem. [AllSolvers] ends with the
//! in-process [MicroLpSolver], so it always finds a working back-end.

use tracing::debug;

use crate::error::SolverError;
use crate::problem::Problem;
#[cfg(feature = "cplex")]
use crate::solvers::cplex::Cplex;
use crate::solvers::{CbcSolver, GlpkSolver, GurobiSolver, MicroLpSolver, Solution};

use super::SolverTrait;

/// `SOLVER` if it can run here, `NEXT` otherwise
#[derive(Debug, Clone)]
pub struct AutoSolver<SOLVER, NEXT>(SOLVER, NEXT);

/// End of a chain: every run fails
#[derive(Debug, Clone, Default)]
pub struct NoSolver;

#[cfg(not(feature = "cplex"))]
type Cplex = NoSolver;

/// An [AutoSolver] that tries, in order: Gurobi, Cplex, Cbc, Glpk and MicroLp
pub type AllSolvers = AutoSolver<
    GurobiSolver,
    AutoSolver<
        Cplex,
        AutoSolver<CbcSolver, AutoSolver<GlpkSolver, AutoSolver<MicroLpSolver, NoSolver>>>,
    >,
>;

impl SolverTrait for NoSolver {
    fn run(&self, _problem: &Problem) -> Result<Solution, SolverError> {
        Err(SolverError("No solver available".to_string()))
    }
}

impl<A: Default, B: Default> Default for AutoSolver<A, B> {
    fn default() -> Self {
        AutoSolver(A::default(), B::default())
    }
}

impl<SOLVER: Default, NEXT: Default> AutoSolver<SOLVER, NEXT> {
    /// Chain of default-configured back-ends
    pub fn new() -> Self {
        Self::default()
    }
}

impl<SOLVER, NEXT> AutoSolver<SOLVER, NEXT> {
    /// Put `solver` in front of this chain
    pub fn with_solver<NewSolver>(self, solver: NewSolver) -> AutoSolver<NewSolver, Self> {
        AutoSolver(solver, self)
    }
}

impl<S: SolverTrait, T: SolverTrait> SolverTrait for AutoSolver<S, T> {
    fn run(&self, problem: &Problem) -> Result<Solution, SolverError> {
        // probing is cheap; the real problem may be large
        match self.0.run(&Problem::probe()) {
            Ok(_) => self.0.run(problem),
            Err(SolverError(reason)) => {
                debug!(
                    component = "solver",
                    operation = "probe",
                    reason = %reason,
                    "Solver unavailable; trying the next one"
                );
                self.1.run(problem)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::Termination;

    #[test]
    fn no_solver_fails() {
        assert!(NoSolver.run(&Problem::probe()).is_err());
    }

    #[test]
    fn falls_through_missing_programs() {
        let solver = AutoSolver::<NoSolver, NoSolver>::new()
            .with_solver(MicroLpSolver::new())
            .with_solver(CbcSolver::new().command_name("surely-not-an-installed-cbc".to_string()));
        let solution = solver.run(&Problem::probe()).unwrap();
        assert_eq!(solution.status, Termination::Optimal);
    }
}
