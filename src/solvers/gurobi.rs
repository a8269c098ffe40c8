//! Gurobi through its `gurobi_cl` command line tool.
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solvers::{
    buf_contains, Solution, SolverProgram, SolverWithSolutionParsing, Termination,
    WithMaxSeconds, WithNbThreads, WithNodeLimit,
};

/// Runs `gurobi_cl` and reads its `.sol` result file
#[derive(Debug, Clone)]
pub struct GurobiSolver {
    command_name: String,
    temp_solution_file: Option<PathBuf>,
    seconds: Option<u32>,
    nodes: Option<u64>,
    threads: Option<u32>,
}

impl Default for GurobiSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GurobiSolver {
    /// create a solver instance
    pub fn new() -> GurobiSolver {
        GurobiSolver {
            command_name: "gurobi_cl".to_string(),
            temp_solution_file: None,
            seconds: None,
            nodes: None,
            threads: None,
        }
    }

    /// set the name of the commandline gurobi executable to use
    pub fn command_name(&self, command_name: String) -> GurobiSolver {
        GurobiSolver {
            command_name,
            ..self.clone()
        }
    }

    /// write the solution to this file instead of a temporary one
    pub fn with_temp_solution_file(&self, temp_solution_file: String) -> GurobiSolver {
        GurobiSolver {
            temp_solution_file: Some(temp_solution_file.into()),
            ..self.clone()
        }
    }
}

impl SolverWithSolutionParsing for GurobiSolver {
    fn read_specific_solution(
        &self,
        f: &File,
        _problem: Option<&Problem>,
    ) -> Result<Solution, SolverError> {
        let mut vars_value: HashMap<_, _> = HashMap::new();
        let file = BufReader::new(f);

        for line in file.lines() {
            let l = line.map_err(|e| SolverError(e.to_string()))?;

            // comments, including the header
            if l.starts_with('#') || l.trim().is_empty() {
                continue;
            }

            let result_line: Vec<_> = l.split_whitespace().collect();
            if result_line.len() == 2 {
                let value = result_line[1]
                    .parse::<f64>()
                    .map_err(|e| SolverError(format!("Incorrect gurobi solution value: {}", e)))?;
                vars_value.insert(result_line[0].to_string(), value);
            } else {
                return Err(SolverError(format!(
                    "Incorrect gurobi solution format: {}",
                    l
                )));
            }
        }
        // gurobi writes a result file only when it has a solution
        Ok(Solution::new(Termination::Optimal, vars_value))
    }
}

impl WithMaxSeconds<GurobiSolver> for GurobiSolver {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> GurobiSolver {
        GurobiSolver {
            seconds: Some(seconds),
            ..(*self).clone()
        }
    }
}

impl WithNodeLimit<GurobiSolver> for GurobiSolver {
    fn node_limit(&self) -> Option<u64> {
        self.nodes
    }
    fn with_node_limit(&self, nodes: u64) -> GurobiSolver {
        GurobiSolver {
            nodes: Some(nodes),
            ..(*self).clone()
        }
    }
}

impl WithNbThreads<GurobiSolver> for GurobiSolver {
    fn nb_threads(&self) -> Option<u32> {
        self.threads
    }
    fn with_nb_threads(&self, threads: u32) -> GurobiSolver {
        GurobiSolver {
            threads: Some(threads),
            ..(*self).clone()
        }
    }
}

impl SolverProgram for GurobiSolver {
    fn command_name(&self) -> &str {
        &self.command_name
    }

    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString> {
        let mut args = Vec::new();
        for (name, value) in [
            ("TimeLimit=", self.max_seconds().map(u64::from)),
            ("NodeLimit=", self.node_limit()),
            ("Threads=", self.nb_threads().map(u64::from)),
        ] {
            if let Some(val) = value {
                args.push(OsString::from(format!("{}{}", name, val)));
            }
        }
        let mut result_file: OsString = "ResultFile=".into();
        result_file.push(solution_file.as_os_str());
        args.push(result_file);
        args.push(lp_file.into());
        args
    }

    fn preferred_temp_solution_file(&self) -> Option<&Path> {
        self.temp_solution_file.as_deref()
    }

    fn parse_stdout_status(&self, stdout: &[u8]) -> Option<Termination> {
        if buf_contains(stdout, "Optimal solution found") {
            Some(Termination::Optimal)
        } else if buf_contains(stdout, "Infeasible or unbounded") || buf_contains(stdout, "infeasible") {
            Some(Termination::Infeasible)
        } else if buf_contains(stdout, "nbounded") {
            Some(Termination::Unbounded)
        } else if buf_contains(stdout, "limit reached") {
            Some(Termination::LimitReached)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_end_with_the_problem() {
        let args = GurobiSolver::new()
            .with_max_seconds(60)
            .with_nb_threads(2)
            .arguments(Path::new("m.lp"), Path::new("m.sol"));
        assert_eq!(
            args,
            [
                OsString::from("TimeLimit=60"),
                OsString::from("Threads=2"),
                OsString::from("ResultFile=m.sol"),
                OsString::from("m.lp"),
            ]
        );
    }

    #[test]
    fn stdout_statuses() {
        let solver = GurobiSolver::new();
        assert_eq!(
            solver.parse_stdout_status(b"Optimal solution found (tolerance 1.00e-04)"),
            Some(Termination::Optimal)
        );
        assert_eq!(
            solver.parse_stdout_status(b"Model is infeasible"),
            Some(Termination::Infeasible)
        );
        assert_eq!(
            solver.parse_stdout_status(b"Model is unbounded"),
            Some(Termination::Unbounded)
        );
        assert_eq!(
            solver.parse_stdout_status(b"Time limit reached"),
            Some(Termination::LimitReached)
        );
    }
}
