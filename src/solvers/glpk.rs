//! The GNU Linear Programming Kit, run as the `glpsol` program
use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solvers::{
    buf_contains, warn_unsupported, Solution, SolverProgram, SolverWithSolutionParsing,
    Termination, WithMaxSeconds, WithNodeLimit,
};

/// The GLPK solver
#[derive(Debug, Clone)]
pub struct GlpkSolver {
    command_name: String,
    temp_solution_file: Option<PathBuf>,
    seconds: Option<u32>,
    nodes: Option<u64>,
}

impl Default for GlpkSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl GlpkSolver {
    /// create a solver instance
    pub fn new() -> GlpkSolver {
        GlpkSolver {
            command_name: "glpsol".to_string(),
            temp_solution_file: None,
            seconds: None,
            nodes: None,
        }
    }

    /// set the name of the commandline glpk executable to use
    pub fn command_name(&self, command_name: String) -> GlpkSolver {
        GlpkSolver {
            command_name,
            ..self.clone()
        }
    }

    /// write the solution to this file instead of a temporary one
    pub fn with_temp_solution_file(&self, temp_solution_file: String) -> GlpkSolver {
        GlpkSolver {
            temp_solution_file: Some(temp_solution_file.into()),
            ..self.clone()
        }
    }
}

fn incorrect_format(detail: &str) -> SolverError {
    SolverError(format!("Incorrect glpk solution format: {}", detail))
}

fn read_size(line: Option<std::io::Result<String>>) -> Result<usize, SolverError> {
    match line {
        Some(Ok(l)) => l
            .split_whitespace()
            .nth(1)
            .and_then(|value| value.parse::<usize>().ok())
            .ok_or_else(|| incorrect_format(&l)),
        _ => Err(incorrect_format("missing problem size")),
    }
}

fn parse_status(line: &str) -> Result<Termination, SolverError> {
    let status = line.get(12..).map(str::trim).unwrap_or_default();
    Ok(match status {
        "INTEGER OPTIMAL" | "OPTIMAL" => Termination::Optimal,
        "INFEASIBLE (FINAL)" | "INTEGER EMPTY" | "EMPTY" => Termination::Infeasible,
        "INTEGER UNDEFINED" | "UNBOUNDED" => Termination::Unbounded,
        // a feasible point was found before the time limit
        "INTEGER NON-OPTIMAL" | "FEASIBLE" => Termination::LimitReached,
        "UNDEFINED" => Termination::Error("glpk status UNDEFINED".to_string()),
        _ => return Err(incorrect_format("unknown solution status")),
    })
}

// Activity of a column record, i.e. the fields after `No.` and the name.
// LP reports put a status (`B`, `NL`, ...) before it, MIP reports a `*` on
// integer columns.
fn activity(fields: &[&str]) -> Option<f64> {
    fields
        .iter()
        .take(2)
        .find_map(|field| field.parse::<f64>().ok())
}

impl SolverWithSolutionParsing for GlpkSolver {
    fn read_specific_solution(
        &self,
        f: &File,
        _problem: Option<&Problem>,
    ) -> Result<Solution, SolverError> {
        let mut vars_value: HashMap<_, _> = HashMap::new();

        let file = BufReader::new(f);

        let mut iter = file.lines();
        let _rows = read_size(iter.nth(1))?;
        let col = read_size(iter.next())?;
        let status = match iter.nth(1) {
            Some(Ok(status_line)) => parse_status(&status_line)?,
            _ => return Err(incorrect_format("no solution status found")),
        };
        if !status.is_optimal() {
            return Ok(Solution::new(status, vars_value));
        }

        let mut lines = iter.map(|line| line.map_err(|e| incorrect_format(&e.to_string())));
        loop {
            match lines.next() {
                Some(line) => {
                    if line?.trim_start().starts_with("No. Column name") {
                        break;
                    }
                }
                None => return Err(incorrect_format("no column section")),
            }
        }
        // the dashed rule under the header
        lines.next();

        for _ in 0..col {
            let line = match lines.next() {
                Some(line) => line?,
                None => return Err(incorrect_format("not all columns are present")),
            };
            let mut fields: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            // a name too long for its field is printed alone, the record
            // continues on the next line
            if fields.len() == 2 {
                match lines.next() {
                    Some(rest) => fields.extend(rest?.split_whitespace().map(str::to_string)),
                    None => return Err(incorrect_format(&line)),
                }
            }
            if fields.len() < 3 {
                return Err(incorrect_format("column specification has too few fields"));
            }
            let rest: Vec<&str> = fields[2..].iter().map(String::as_str).collect();
            let value = activity(&rest).ok_or_else(|| incorrect_format(&line))?;
            vars_value.insert(fields[1].clone(), value);
        }
        Ok(Solution::new(status, vars_value))
    }
}

impl WithMaxSeconds<GlpkSolver> for GlpkSolver {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> GlpkSolver {
        GlpkSolver {
            seconds: Some(seconds),
            ..(*self).clone()
        }
    }
}

impl WithNodeLimit<GlpkSolver> for GlpkSolver {
    fn node_limit(&self) -> Option<u64> {
        self.nodes
    }
    fn with_node_limit(&self, nodes: u64) -> GlpkSolver {
        GlpkSolver {
            nodes: Some(nodes),
            ..(*self).clone()
        }
    }
}

impl SolverProgram for GlpkSolver {
    fn command_name(&self) -> &str {
        &self.command_name
    }

    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--lp".into(),
            lp_file.into(),
            "-o".into(),
            solution_file.into(),
        ];
        if let Some(seconds) = self.max_seconds() {
            args.push("--tmlim".into());
            args.push(seconds.to_string().into());
        }
        if self.nodes.is_some() {
            warn_unsupported("glpk", "node_limit");
        }
        args
    }

    fn preferred_temp_solution_file(&self) -> Option<&Path> {
        self.temp_solution_file.as_deref()
    }

    fn parse_stdout_status(&self, stdout: &[u8]) -> Option<Termination> {
        if buf_contains(stdout, "PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION")
            || buf_contains(stdout, "PROBLEM HAS NO INTEGER FEASIBLE SOLUTION")
        {
            Some(Termination::Infeasible)
        } else if buf_contains(stdout, "PROBLEM HAS UNBOUNDED SOLUTION") {
            Some(Termination::Unbounded)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines() {
        assert_eq!(
            parse_status("Status:     INTEGER OPTIMAL").unwrap(),
            Termination::Optimal
        );
        assert_eq!(
            parse_status("Status:     INFEASIBLE (FINAL)").unwrap(),
            Termination::Infeasible
        );
        assert_eq!(
            parse_status("Status:     INTEGER NON-OPTIMAL").unwrap(),
            Termination::LimitReached
        );
        assert!(parse_status("Status:").is_err());
    }

    #[test]
    fn activity_follows_status_or_marker() {
        assert_eq!(activity(&["B", "2", "0"]), Some(2.));
        assert_eq!(activity(&["*", "8", "0"]), Some(8.));
        assert_eq!(activity(&["1.5", "0"]), Some(1.5));
        assert_eq!(activity(&["NL", "NL"]), None);
    }

    #[test]
    fn time_limit_argument() {
        let args = GlpkSolver::new()
            .with_max_seconds(30)
            .arguments(Path::new("a.lp"), Path::new("a.sol"));
        assert_eq!(args[4], OsString::from("--tmlim"));
        assert_eq!(args[5], OsString::from("30"));
    }

    #[test]
    fn stdout_infeasibility() {
        let solver = GlpkSolver::new();
        assert_eq!(
            solver.parse_stdout_status(b"PROBLEM HAS NO PRIMAL FEASIBLE SOLUTION\n"),
            Some(Termination::Infeasible)
        );
        assert_eq!(solver.parse_stdout_status(b"OPTIMAL LP SOLUTION FOUND"), None);
    }
}
