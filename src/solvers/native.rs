//! An in-process solver backed by the `microlp` crate. Nothing needs to be
//! installed, which makes it the default back-end.
use std::collections::HashMap;

use microlp::{ComparisonOp, OptimizationDirection};
use tracing::debug;

use crate::constraint::Relation;
use crate::error::SolverError;
use crate::model::ObjectiveSense;
use crate::problem::{Column, Problem};
use crate::solvers::{
    warn_unsupported, Solution, SolverTrait, Termination, WithMaxSeconds, WithNbThreads,
    WithNodeLimit,
};
use crate::variable::Domain;

/// Simplex and branch-and-bound, in process. Integer columns of an optimal
/// solution are exactly integral.
///
/// Time, node and thread settings are accepted for interface parity, but the
/// engine cannot honor them: a warning is logged and the solve runs to
/// completion.
#[derive(Debug, Clone, Default)]
pub struct MicroLpSolver {
    seconds: Option<u32>,
    nodes: Option<u64>,
    threads: Option<u32>,
}

impl MicroLpSolver {
    /// create a solver instance
    pub fn new() -> MicroLpSolver {
        MicroLpSolver::default()
    }
}

impl WithMaxSeconds<MicroLpSolver> for MicroLpSolver {
    fn max_seconds(&self) -> Option<u32> {
        self.seconds
    }
    fn with_max_seconds(&self, seconds: u32) -> MicroLpSolver {
        MicroLpSolver {
            seconds: Some(seconds),
            ..self.clone()
        }
    }
}

impl WithNodeLimit<MicroLpSolver> for MicroLpSolver {
    fn node_limit(&self) -> Option<u64> {
        self.nodes
    }
    fn with_node_limit(&self, nodes: u64) -> MicroLpSolver {
        MicroLpSolver {
            nodes: Some(nodes),
            ..self.clone()
        }
    }
}

impl WithNbThreads<MicroLpSolver> for MicroLpSolver {
    fn nb_threads(&self) -> Option<u32> {
        self.threads
    }
    fn with_nb_threads(&self, threads: u32) -> MicroLpSolver {
        MicroLpSolver {
            threads: Some(threads),
            ..self.clone()
        }
    }
}

// the engine takes integer bounds as i32; only infinite bounds are clamped
fn integer_bound(column: &Column, value: f64) -> Result<i32, SolverError> {
    if value == f64::INFINITY {
        Ok(i32::MAX)
    } else if value == f64::NEG_INFINITY {
        Ok(i32::MIN)
    } else if value > f64::from(i32::MAX) || value < f64::from(i32::MIN) {
        Err(SolverError(format!(
            "integer bound {} of `{}` is outside the range microlp supports",
            value, column.name
        )))
    } else {
        Ok(value as i32)
    }
}

fn add_column(
    engine: &mut microlp::Problem,
    column: &Column,
    objective: f64,
) -> Result<microlp::Variable, SolverError> {
    let (low, up) = (column.lower_bound, column.upper_bound);
    Ok(match column.domain {
        Domain::Binary if low == 0.0 && up == 1.0 => engine.add_binary_var(objective),
        Domain::Binary | Domain::Integer => engine.add_integer_var(
            objective,
            (integer_bound(column, low)?, integer_bound(column, up)?),
        ),
        Domain::Continuous => engine.add_var(objective, (low, up)),
    })
}

// An integer column with an infinite bound is clamped to the i32 range; an
// optimum sitting on the clamp means the problem is really unbounded.
fn hits_clamp(column: &Column, value: f64) -> bool {
    column.is_integer()
        && ((column.upper_bound.is_infinite() && value >= i32::MAX as f64 - 0.5)
            || (column.lower_bound.is_infinite() && value <= i32::MIN as f64 + 0.5))
}

impl SolverTrait for MicroLpSolver {
    fn run(&self, problem: &Problem) -> Result<Solution, SolverError> {
        if self.seconds.is_some() {
            warn_unsupported("microlp", "max_seconds");
        }
        if self.nodes.is_some() {
            warn_unsupported("microlp", "node_limit");
        }
        if self.threads.is_some() {
            warn_unsupported("microlp", "nb_threads");
        }

        let direction = match problem.sense {
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
        };
        let mut engine = microlp::Problem::new(direction);

        let mut objective = vec![0.0; problem.columns.len()];
        for &(column, coeff) in &problem.objective {
            objective[column] += coeff;
        }
        let vars: Vec<microlp::Variable> = problem
            .columns
            .iter()
            .zip(&objective)
            .map(|(column, &coeff)| add_column(&mut engine, column, coeff))
            .collect::<Result<_, _>>()?;

        for row in &problem.rows {
            let op = match row.relation {
                Relation::LessEq => ComparisonOp::Le,
                Relation::GreaterEq => ComparisonOp::Ge,
                Relation::Equal => ComparisonOp::Eq,
            };
            let terms: Vec<(microlp::Variable, f64)> = row
                .terms
                .iter()
                .map(|&(column, coeff)| (vars[column], coeff))
                .collect();
            engine.add_constraint(terms, op, row.rhs);
        }

        debug!(
            component = "solver",
            operation = "run",
            solver = "microlp",
            columns = problem.columns.len() as u64,
            rows = problem.rows.len() as u64,
            "Solving in process"
        );

        let solved = match engine.solve() {
            Ok(solved) => solved,
            Err(microlp::Error::Infeasible) => {
                return Ok(Solution::new(Termination::Infeasible, HashMap::new()))
            }
            Err(microlp::Error::Unbounded) => {
                return Ok(Solution::new(Termination::Unbounded, HashMap::new()))
            }
            Err(microlp::Error::InternalError(message)) => return Err(SolverError(message)),
        };

        let mut results = HashMap::with_capacity(problem.columns.len());
        for (column, var) in problem.columns.iter().zip(&vars) {
            let value = *solved.var_value(*var);
            if hits_clamp(column, value) {
                return Ok(Solution::new(Termination::Unbounded, HashMap::new()));
            }
            let value = if column.is_integer() {
                value.round()
            } else {
                value
            };
            results.insert(column.name.clone(), value);
        }
        Ok(Solution {
            status: Termination::Optimal,
            results,
            integral: true,
        })
    }
}
