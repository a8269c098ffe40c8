//! Solver back-ends and the contract they share.
//!
//! The contract is narrow: a back-end receives a translated [`Problem`] and
//! returns a [`Solution`], i.e. a [`Termination`] and, on `optimal`, a
//! primal value per column.
//!
//! [`MicroLpSolver`] runs in-process and needs nothing installed. The other
//! solvers are external programs that must be available on your system: the
//! problem is written to a temporary .lp file, the program is invoked, and its
//! solution file is parsed. [`AllSolvers`] picks the first one that works.
//!
//! Time and node limits are passed through with [`WithMaxSeconds`] and
//! [`WithNodeLimit`]; cancellation beyond these is not available.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::error::{ModelError, SolverError};
use crate::ids::VarId;
use crate::problem::Problem;

pub use self::auto::*;
pub use self::cbc::*;
#[cfg(feature = "cplex")]
pub use self::cplex::*;
pub use self::glpk::*;
pub use self::gurobi::*;
pub use self::native::*;

pub mod auto;
pub mod cbc;
#[cfg(feature = "cplex")]
pub mod cplex;
pub mod glpk;
pub mod gurobi;
pub mod native;

/// Final classification of a solve
#[derive(Debug, PartialEq, Clone)]
pub enum Termination {
    /// an optimal solution was found
    Optimal,
    /// the constraints cannot be satisfied together
    Infeasible,
    /// the objective improves without bound
    Unbounded,
    /// a time or node limit stopped the search
    LimitReached,
    /// the back-end failed
    Error(String),
}

impl Termination {
    /// Lowercase token used in solution documents
    pub fn token(&self) -> &'static str {
        match self {
            Termination::Optimal => "optimal",
            Termination::Infeasible => "infeasible",
            Termination::Unbounded => "unbounded",
            Termination::LimitReached => "limit_reached",
            Termination::Error(_) => "error",
        }
    }

    /// Whether primal values are available
    pub fn is_optimal(&self) -> bool {
        *self == Termination::Optimal
    }
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Error(message) => write!(f, "error({})", message),
            other => f.write_str(other.token()),
        }
    }
}

/// What a back-end returns
#[derive(Debug, Clone)]
pub struct Solution {
    /// termination of the run
    pub status: Termination,
    /// values by column name; empty unless optimal
    pub results: HashMap<String, f64>,
    /// whether integer columns are guaranteed to hold integral values
    pub integral: bool,
}

impl Solution {
    /// A solution without integrality guarantee
    pub fn new(status: Termination, results: HashMap<String, f64>) -> Solution {
        Solution {
            status,
            results,
            integral: false,
        }
    }

    /// Value of `var`. Never fabricated: a non-optimal run has none.
    pub fn primal(&self, problem: &Problem, var: VarId) -> Result<f64, ModelError> {
        if !self.status.is_optimal() {
            return Err(ModelError::NoPrimal {
                reason: format!("termination is {}", self.status.token()),
            });
        }
        let column = problem.column(var).ok_or(ModelError::CrossModel)?;
        self.results
            .get(&column.name)
            .copied()
            .ok_or_else(|| ModelError::NoPrimal {
                reason: format!("back-end returned no value for column `{}`", column.name),
            })
    }
}

/// A solver back-end
pub trait SolverTrait {
    /// Solve a translated problem. `Err` only for failures of the back-end
    /// itself; infeasibility and the like are reported in the solution.
    fn run(&self, problem: &Problem) -> Result<Solution, SolverError>;
}

/// Solvers that write their result to a file that must be parsed
pub trait SolverWithSolutionParsing {
    /// Parse the solution file, then delete it
    fn read_solution(
        &self,
        temp_solution_file: &Path,
        problem: Option<&Problem>,
    ) -> Result<Solution, SolverError> {
        match File::open(temp_solution_file) {
            Ok(f) => {
                let res = self.read_specific_solution(&f, problem)?;
                let _ = fs::remove_file(temp_solution_file);
                Ok(res)
            }
            Err(e) => Err(SolverError(format!(
                "cannot open solution file {}: {}",
                temp_solution_file.display(),
                e
            ))),
        }
    }

    /// Solver-specific parsing of an opened solution file
    fn read_specific_solution(
        &self,
        f: &File,
        problem: Option<&Problem>,
    ) -> Result<Solution, SolverError>;
}

/// An external program reading a .lp file and writing a solution file
pub trait SolverProgram {
    /// Program to run
    fn command_name(&self) -> &str;

    /// Command line for the given problem and solution file paths
    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString>;

    /// Solution file to use instead of a fresh temporary one
    fn preferred_temp_solution_file(&self) -> Option<&Path> {
        None
    }

    /// Some programs only report the termination on standard output
    fn parse_stdout_status(&self, _stdout: &[u8]) -> Option<Termination> {
        None
    }

    /// Extension of the solution file
    fn solution_suffix(&self) -> Option<&str> {
        None
    }

    /// Whether integer columns of an optimal solution are exactly integral
    fn guarantees_integrality(&self) -> bool {
        false
    }
}

enum SolutionPath {
    Preferred(PathBuf),
    Temporary(tempfile::TempPath),
}

impl SolutionPath {
    fn path(&self) -> &Path {
        match self {
            SolutionPath::Preferred(path) => path,
            SolutionPath::Temporary(path) => path,
        }
    }
}

impl<T: SolverProgram + SolverWithSolutionParsing> SolverTrait for T {
    fn run(&self, problem: &Problem) -> Result<Solution, SolverError> {
        let command_name = self.command_name();
        // both temporary files are removed when dropped, on every exit path
        let file_model = problem
            .to_tmp_file()
            .map_err(|e| format!("unable to create {} problem file: {}", command_name, e))?;
        let solution_file = match self.preferred_temp_solution_file() {
            Some(path) => SolutionPath::Preferred(path.to_owned()),
            None => SolutionPath::Temporary(
                tempfile::Builder::new()
                    .prefix("lp_modeling_")
                    .suffix(self.solution_suffix().unwrap_or(".sol"))
                    .tempfile()
                    .map_err(|e| format!("unable to create solution file: {}", e))?
                    .into_temp_path(),
            ),
        };

        let arguments = self.arguments(file_model.path(), solution_file.path());
        debug!(
            component = "solver",
            operation = "spawn",
            command = command_name,
            columns = problem.columns.len() as u64,
            rows = problem.rows.len() as u64,
            "Running external solver"
        );
        let output = Command::new(command_name)
            .args(&arguments)
            .output()
            .map_err(|e| format!("error running the {} solver: {}", command_name, e))?;

        if !output.status.success() {
            return Err(SolverError(format!(
                "{} exited with {}: {}",
                command_name,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        match self.parse_stdout_status(&output.stdout) {
            Some(status) if !status.is_optimal() => Ok(Solution::new(status, HashMap::new())),
            _ => {
                let mut solution = self.read_solution(solution_file.path(), Some(problem))?;
                if !solution.status.is_optimal() {
                    solution.results.clear();
                }
                solution.integral = self.guarantees_integrality();
                Ok(solution)
            }
        }
    }
}

/// Solvers accepting a time limit, in seconds
pub trait WithMaxSeconds<T> {
    /// current time limit
    fn max_seconds(&self) -> Option<u32>;
    /// set the time limit
    fn with_max_seconds(&self, seconds: u32) -> T;
}

/// Solvers accepting a limit on explored branch-and-bound nodes
pub trait WithNodeLimit<T> {
    /// current node limit
    fn node_limit(&self) -> Option<u64>;
    /// set the node limit
    fn with_node_limit(&self, nodes: u64) -> T;
}

/// Solvers accepting a number of threads
pub trait WithNbThreads<T> {
    /// current number of threads
    fn nb_threads(&self) -> Option<u32>;
    /// set the number of threads
    fn with_nb_threads(&self, threads: u32) -> T;
}

pub(crate) fn warn_unsupported(solver: &str, option: &str) {
    warn!(
        component = "solver",
        operation = "configure",
        solver = solver,
        option = option,
        "Option not supported by this solver; ignored"
    );
}

pub(crate) fn buf_contains(haystack: &[u8], needle: &str) -> bool {
    let needle = needle.as_bytes();
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_lowercase() {
        assert_eq!(Termination::LimitReached.token(), "limit_reached");
        assert_eq!(Termination::Error("boom".into()).token(), "error");
        assert_eq!(Termination::Error("boom".into()).to_string(), "error(boom)");
    }

    #[test]
    fn no_primal_on_non_optimal_runs() {
        let problem = Problem::probe();
        let solution = Solution::new(
            Termination::Infeasible,
            [("x".to_string(), 1.0)].into_iter().collect(),
        );
        let var = VarId::new(crate::ids::ModelId::fresh(), 0);
        assert_eq!(
            solution.primal(&problem, var).unwrap_err().code(),
            "SOLUTION_NO_PRIMAL"
        );
    }

    #[test]
    fn finds_needles() {
        assert!(buf_contains(b"Optimal solution found", "solution"));
        assert!(!buf_contains(b"abc", "abcd"));
    }
}
