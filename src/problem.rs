//! The compiled, solver-facing form of a [`Model`].
//!
//! Translation fixes column order (variable registration order) and row
//! order (constraint insertion order), and gives every column and row a
//! name external solvers accept. Two translations of identically built
//! models are equal.
use tracing::debug;

use crate::error::ModelError;
use crate::ids::{ModelId, VarId};
use crate::model::{Model, ObjectiveSense};
use crate::constraint::Relation;
use crate::util::UniqueNameGenerator;
use crate::variable::Domain;

/// A variable as seen by a back-end
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// name used in .lp files and solution files
    pub name: String,
    /// continuous, integer or binary
    pub domain: Domain,
    /// -INFINITY if there is no lower bound
    pub lower_bound: f64,
    /// INFINITY if there is no upper bound
    pub upper_bound: f64,
}

impl Column {
    /// Whether the column is forced to take only integer values
    pub fn is_integer(&self) -> bool {
        self.domain.is_integer()
    }
}

/// A constraint as seen by a back-end: `Σ coeff·column relation rhs`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// name used in .lp files
    pub name: String,
    /// `(column, coefficient)` pairs, by column
    pub terms: Vec<(usize, f64)>,
    /// '<=' '=' or '>='
    pub relation: Relation,
    /// Right-hand side of the constraint
    pub rhs: f64,
}

/// A translated model
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// problem name
    pub name: String,
    /// Whether to maximize or minimize the objective
    pub sense: ObjectiveSense,
    /// objective `(column, coefficient)` pairs; the objective constant is not sent
    pub objective: Vec<(usize, f64)>,
    /// one per variable, in registration order
    pub columns: Vec<Column>,
    /// constraints with at least one term, in insertion order
    pub rows: Vec<Row>,
    model: ModelId,
    infeasible_row: Option<String>,
}

impl Problem {
    /// Compile `model`. Fails with [`ModelError::NoObjective`] when no
    /// objective has been set.
    pub fn translate(model: &Model) -> Result<Problem, ModelError> {
        let objective = model.objective().ok_or(ModelError::NoObjective)?;

        let mut column_names = UniqueNameGenerator::default();
        let columns: Vec<Column> = model
            .variables()
            .map(|(_, v)| Column {
                name: column_names.add_name(&v.name),
                domain: v.domain,
                lower_bound: v.lower_bound,
                upper_bound: v.upper_bound,
            })
            .collect();

        let mut row_names = UniqueNameGenerator::default();
        let mut rows = Vec::with_capacity(model.num_constraints());
        let mut infeasible_row = None;
        for constraint in model.constraints() {
            if constraint.is_trivial() {
                // a body without terms is a no-op, unless the constants contradict
                if !constraint.trivially_holds() && infeasible_row.is_none() {
                    infeasible_row = Some(constraint.name.clone());
                }
                continue;
            }
            rows.push(Row {
                name: row_names.add_name(&constraint.name),
                terms: constraint
                    .lhs
                    .terms()
                    .map(|(v, c)| (v.index(), *c))
                    .collect(),
                relation: constraint.relation,
                rhs: constraint.rhs,
            });
        }

        debug!(
            component = "solver",
            operation = "translate",
            columns = columns.len() as u64,
            rows = rows.len() as u64,
            skipped = (model.num_constraints() - rows.len()) as u64,
            "Translated model"
        );

        Ok(Problem {
            name: model.name().to_string(),
            sense: objective.sense,
            objective: objective
                .expr
                .terms()
                .map(|(v, c)| (v.index(), *c))
                .collect(),
            columns,
            rows,
            model: model.id(),
            infeasible_row,
        })
    }

    /// One variable in `[0, 1]`, minimized. Used to check that a back-end works.
    pub fn probe() -> Problem {
        Problem {
            name: "probe".to_string(),
            sense: ObjectiveSense::Minimize,
            objective: vec![(0, 1.0)],
            columns: vec![Column {
                name: "x".to_string(),
                domain: Domain::Continuous,
                lower_bound: 0.0,
                upper_bound: 1.0,
            }],
            rows: vec![],
            model: ModelId::fresh(),
            infeasible_row: None,
        }
    }

    /// Column of `var`, `None` if the variable is not part of this problem
    pub fn column(&self, var: VarId) -> Option<&Column> {
        if var.model() != self.model {
            return None;
        }
        self.columns.get(var.index())
    }

    /// Name of a constant constraint that cannot hold, if any. Such a problem
    /// is infeasible without consulting a back-end.
    pub fn infeasible_row(&self) -> Option<&str> {
        self.infeasible_row.as_deref()
    }

    /// Whether any column is integer or binary
    pub fn has_integer_columns(&self) -> bool {
        self.columns.iter().any(Column::is_integer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::AffineExpr;

    fn build() -> Model {
        let mut model = Model::new("shop");
        let p = model
            .add_var_family("Production", 2, Domain::Continuous, None, None)
            .unwrap();
        let b = model.add_var("open", Domain::Binary, None, None).unwrap();
        model
            .add_constraint("cap[0]", 2.0 * p[0] + p[1] + 1.0, Relation::LessEq, 10.0)
            .unwrap();
        model
            .add_constraint("noop", AffineExpr::zero(), Relation::GreaterEq, -1.0)
            .unwrap();
        model
            .set_objective(3.0 * p[0] + 5.0 * p[1] - b, ObjectiveSense::Maximize)
            .unwrap();
        model
    }

    #[test]
    fn columns_and_rows_follow_model_order() {
        let problem = Problem::translate(&build()).unwrap();
        let names: Vec<_> = problem.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Production_0", "Production_1", "open"]);
        assert_eq!(problem.rows.len(), 1);
        assert_eq!(problem.rows[0].name, "cap_0");
        assert_eq!(problem.rows[0].terms, vec![(0, 2.0), (1, 1.0)]);
        assert_eq!(problem.rows[0].rhs, 9.0);
        assert_eq!(problem.objective, vec![(0, 3.0), (1, 5.0), (2, -1.0)]);
        assert!(problem.infeasible_row().is_none());
        assert!(problem.has_integer_columns());
    }

    #[test]
    fn translation_is_deterministic() {
        let a = Problem::translate(&build()).unwrap();
        let b = Problem::translate(&build()).unwrap();
        assert_eq!(a.columns, b.columns);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.objective, b.objective);
    }

    #[test]
    fn missing_objective() {
        let model = Model::new("empty");
        assert_eq!(
            Problem::translate(&model).unwrap_err(),
            ModelError::NoObjective
        );
    }
}
