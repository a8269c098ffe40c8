//! The IBM CPLEX optimizer.
//! You need to activate the "cplex" feature of this crate to use this solver.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs::File;
use std::path::Path;

use xml::reader::XmlEvent;
use xml::EventReader;

use crate::error::SolverError;
use crate::problem::Problem;
use crate::solvers::{
    buf_contains, Solution, SolverProgram, SolverWithSolutionParsing, Termination,
    WithMaxSeconds, WithNbThreads, WithNodeLimit,
};

/// Runs the interactive `cplex` shell with a command script and reads its XML solution
#[derive(Debug, Clone)]
pub struct Cplex {
    command: String,
    seconds: Option<u32>,
    nodes: Option<u64>,
    threads: Option<u32>,
}

impl Default for Cplex {
    fn default() -> Self {
        Self::with_command("cplex".into())
    }
}

impl Cplex {
    /// Use another `cplex` executable
    pub fn with_command(command: String) -> Self {
        Self {
            command,
            seconds: None,
            nodes: None,
            threads: None,
        }
    }
}

macro_rules! format_osstr {
    ($($parts:expr)*) => {{
        let mut s = OsString::new();
        $(s.push($parts);)*
        s
    }}
}

impl WithMaxSeconds<Cplex> for Cplex {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> Cplex {
        Cplex {
            seconds: Some(seconds),
            ..self.clone()
        }
    }
}

impl WithNodeLimit<Cplex> for Cplex {
    fn node_limit(&self) -> Option<u64> {
        self.nodes
    }
    fn with_node_limit(&self, nodes: u64) -> Cplex {
        Cplex {
            nodes: Some(nodes),
            ..self.clone()
        }
    }
}

impl WithNbThreads<Cplex> for Cplex {
    fn nb_threads(&self) -> Option<u32> {
        self.threads
    }
    fn with_nb_threads(&self, threads: u32) -> Cplex {
        Cplex {
            threads: Some(threads),
            ..self.clone()
        }
    }
}

impl SolverProgram for Cplex {
    fn command_name(&self) -> &str {
        &self.command
    }

    fn arguments(&self, lp_file: &Path, solution_file: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-c".into(), format_osstr!("READ \"" lp_file "\"")];
        if let Some(seconds) = self.seconds {
            args.push(format!("set timelimit {}", seconds).into());
        }
        if let Some(nodes) = self.nodes {
            args.push(format!("set mip limits nodes {}", nodes).into());
        }
        if let Some(threads) = self.threads {
            args.push(format!("set threads {}", threads).into());
        }
        args.push("optimize".into());
        args.push(format_osstr!("WRITE \"" solution_file "\""));
        args
    }

    fn parse_stdout_status(&self, stdout: &[u8]) -> Option<Termination> {
        if buf_contains(stdout, "No solution exists") {
            Some(Termination::Infeasible)
        } else if buf_contains(stdout, "Unbounded") {
            Some(Termination::Unbounded)
        } else if buf_contains(stdout, "limit exceeded, no integer solution") {
            Some(Termination::LimitReached)
        } else {
            None
        }
    }

    fn solution_suffix(&self) -> Option<&str> {
        Some(".sol")
    }
}

// solutionStatusValue codes of the CPLEX solution file
fn status_from_code(code: u32) -> Termination {
    match code {
        1 | 101 | 102 => Termination::Optimal,
        2 | 118 => Termination::Unbounded,
        3 | 103 => Termination::Infeasible,
        10..=12 | 104..=108 | 111..=114 => Termination::LimitReached,
        other => Termination::Error(format!("cplex solution status {}", other)),
    }
}

impl SolverWithSolutionParsing for Cplex {
    fn read_specific_solution(
        &self,
        f: &File,
        problem: Option<&Problem>,
    ) -> Result<Solution, SolverError> {
        let len = problem.map(|p| p.columns.len()).unwrap_or(0);
        let parser = EventReader::new(f);
        let mut solution = Solution::new(Termination::Optimal, HashMap::with_capacity(len));
        for e in parser {
            match e {
                Ok(XmlEvent::StartElement {
                    name, attributes, ..
                }) => match name.local_name.as_str() {
                    "header" => {
                        for attr in attributes {
                            if attr.name.local_name == "solutionStatusValue" {
                                let code = attr.value.parse().map_err(|e| {
                                    format!("invalid solution status {:?}: {}", attr.value, e)
                                })?;
                                solution.status = status_from_code(code);
                            }
                        }
                    }
                    "variable" => {
                        let mut name = None;
                        let mut value = None;
                        for attr in attributes {
                            match attr.name.local_name.as_str() {
                                "name" => name = Some(attr.value),
                                "value" => {
                                    let parsed = attr.value.parse().map_err(|e| {
                                        format!("invalid variable value for {:?}: {}", name, e)
                                    })?;
                                    value = Some(parsed)
                                }
                                _ => {}
                            };
                        }
                        if let (Some(name), Some(value)) = (name, value) {
                            solution.results.insert(name, value);
                        }
                    }
                    _ => {}
                },
                Err(e) => return Err(SolverError(format!("xml error: {}", e))),
                _ => {}
            }
        }
        Ok(solution)
    }
}
