//! The COIN-OR CBC solver
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solvers::{
    Solution, SolverProgram, SolverWithSolutionParsing, Termination, WithMaxSeconds,
    WithNbThreads, WithNodeLimit,
};

/// The open-source COIN-OR branch-and-cut solver, run as the `cbc` program
#[derive(Debug, Clone)]
pub struct CbcSolver {
    command_name: String,
    temp_solution_file: Option<PathBuf>,
    threads: Option<u32>,
    seconds: Option<u32>,
    nodes: Option<u64>,
}

impl Default for CbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl CbcSolver {
    /// create a solver instance
    pub fn new() -> CbcSolver {
        CbcSolver {
            command_name: "cbc".to_string(),
            temp_solution_file: None,
            threads: None,
            seconds: None,
            nodes: None,
        }
    }

    /// set the name of the commandline cbc executable to use
    pub fn command_name(&self, command_name: String) -> CbcSolver {
        CbcSolver {
            command_name,
            ..self.clone()
        }
    }

    /// write the solution to this file instead of a temporary one
    pub fn with_temp_solution_file(&self, temp_solution_file: String) -> CbcSolver {
        CbcSolver {
            temp_solution_file: Some(temp_solution_file.into()),
            ..self.clone()
        }
    }
}

fn incorrect_format(detail: &str) -> SolverError {
    SolverError(format!("Incorrect cbc solution format: {}", detail))
}

impl SolverWithSolutionParsing for CbcSolver {
    fn read_specific_solution(
        &self,
        f: &File,
        problem: Option<&Problem>,
    ) -> Result<Solution, SolverError> {
        let mut vars_value: HashMap<String, f64> = HashMap::new();

        // CBC only lists non-zero values
        if let Some(p) = problem {
            for column in &p.columns {
                vars_value.insert(column.name.clone(), 0.0);
            }
        }

        let mut file = BufReader::new(f);
        let mut buffer = String::new();
        file.read_line(&mut buffer)
            .map_err(|e| incorrect_format(&e.to_string()))?;

        let status = match buffer.split_whitespace().next() {
            Some("Optimal") => Termination::Optimal,
            // "Infeasible" or "Integer infeasible"
            Some("Infeasible") | Some("Integer") => Termination::Infeasible,
            Some("Unbounded") => Termination::Unbounded,
            // "Stopped on time", "on iterations", "on difficulties" or "on ctrl-c"
            Some("Stopped") => Termination::LimitReached,
            Some(other) => Termination::Error(format!("cbc status `{}`", other)),
            None => return Err(incorrect_format("empty file")),
        };
        for line in file.lines() {
            let l = line.map_err(|e| incorrect_format(&e.to_string()))?;
            let mut result_line: Vec<_> = l.split_whitespace().collect();
            if result_line.is_empty() {
                continue;
            }
            if result_line[0] == "**" {
                result_line.remove(0);
            };
            if result_line.len() == 4 {
                let value = result_line[2]
                    .parse::<f64>()
                    .map_err(|e| incorrect_format(&e.to_string()))?;
                vars_value.insert(result_line[1].to_string(), value);
            } else {
                return Err(incorrect_format(&l));
            }
        }
        Ok(Solution::new(status, vars_value))
    }
}

impl WithMaxSeconds<CbcSolver> for CbcSolver {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> CbcSolver {
        CbcSolver {
            seconds: Some(seconds),
            ..(*self).clone()
        }
    }
}

impl WithNodeLimit<CbcSolver> for CbcSolver {
    fn node_limit(&self) -> Option<u64> {
        self.nodes
    }
    fn with_node_limit(&self, nodes: u64) -> CbcSolver {
        CbcSolver {
            nodes: Some(nodes),
            ..(*self).clone()
        }
    }
}

impl WithNbThreads<CbcSolver> for CbcSolver {
    fn nb_threads(&self) -> Option<u32> {
        self.threads
    }
    fn with_nb_threads(&self, threads: u32) -> CbcSolver {
        CbcSolver {
            threads: Some(threads),
            ..(*self).clone()
        }
    }
}

impl SolverProgram for CbcSolver {
    fn command_name(&self) -> &str {
        &self.command_name
    }

    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString> {
        let mut args = vec![lp_file.as_os_str().to_owned()];
        for (name, value) in [
            ("seconds", self.max_seconds().map(u64::from)),
            ("maxNodes", self.node_limit()),
            ("threads", self.nb_threads().map(u64::from)),
        ] {
            if let Some(val) = value {
                args.push(name.into());
                args.push(val.to_string().into());
            }
        }
        args.extend_from_slice(&["solve".into(), "solution".into(), solution_file.into()]);
        args
    }

    fn preferred_temp_solution_file(&self) -> Option<&Path> {
        self.temp_solution_file.as_deref()
    }

    fn guarantees_integrality(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_carry_limits_once() {
        let solver = CbcSolver::new()
            .with_max_seconds(5)
            .with_node_limit(1000)
            .with_nb_threads(4);
        let args = solver.arguments(Path::new("p.lp"), Path::new("p.sol"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(
            args,
            [
                "p.lp", "seconds", "5", "maxNodes", "1000", "threads", "4", "solve", "solution",
                "p.sol"
            ]
        );
    }

    #[test]
    fn options_survive_renaming() {
        let solver = CbcSolver::new()
            .with_max_seconds(3)
            .command_name("/opt/cbc".to_string());
        assert_eq!(solver.max_seconds(), Some(3));
        assert_eq!(SolverProgram::command_name(&solver), "/opt/cbc");
    }
}
