//! The model assembler: owns variables, constraints and the objective, and
//! drives the `Building → Solved` transition.
//!
//! ```
//! use lp_modeling::model::{Model, ObjectiveSense};
//! use lp_modeling::constraint::Relation;
//! use lp_modeling::variable::Domain;
//! use lp_modeling::solvers::{MicroLpSolver, Termination};
//!
//! let mut model = Model::new("tiny");
//! let x = model.add_var("x", Domain::Continuous, None, Some(4.0)).unwrap();
//! let y = model.add_var("y", Domain::Integer, None, None).unwrap();
//! model.add_constraint("budget", x + 2.0 * y, Relation::LessEq, 7.0).unwrap();
//! model.set_objective(x + y, ObjectiveSense::Maximize).unwrap();
//!
//! assert_eq!(model.solve(&MicroLpSolver::new()).unwrap(), Termination::Optimal);
//! assert!((model.objective_value().unwrap() - 5.0).abs() < 1e-6);
//! ```
use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::constraint::{Constraint, ConstraintStore, Relation};
use crate::error::{ModelError, SolverError};
use crate::expr::AffineExpr;
use crate::ids::{ConstraintId, ModelId, VarId};
use crate::problem::Problem;
use crate::solvers::{Solution, SolverTrait, Termination};
use crate::variable::{Domain, IndexShape, Registration, VarFamily, Variable, VariableRegistry};

/// Optimization sense
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub enum ObjectiveSense {
    /// min
    Minimize,
    /// max
    Maximize,
}

/// The single objective of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// expression to optimize, constant included
    pub expr: AffineExpr,
    /// minimize or maximize
    pub sense: ObjectiveSense,
}

/// What the solve produced
#[derive(Debug, Clone, PartialEq)]
struct Outcome {
    termination: Termination,
    // one value per variable, registration order; only on optimal
    assignment: Option<Vec<f64>>,
    objective_value: Option<f64>,
    unverified: Vec<VarId>,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Building,
    Solved(Outcome),
}

/// A linear or mixed-integer program under construction, then solved once.
///
/// Handles are bound to the model that created them, so a model cannot be
/// cloned: a copy would accept the handles of the original.
///
/// ```compile_fail
/// let model = lp_modeling::model::Model::new("single");
/// let copy = model.clone();
/// ```
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    name: String,
    variables: VariableRegistry,
    constraints: ConstraintStore,
    objective: Option<Objective>,
    state: State,
}

impl Model {
    /// An empty model
    pub fn new(name: impl Into<String>) -> Self {
        let id = ModelId::fresh();
        Model {
            id,
            name: name.into(),
            variables: VariableRegistry::new(id),
            constraints: ConstraintStore::new(id),
            objective: None,
            state: State::Building,
        }
    }

    /// Identity carried by this model's handles
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Model name, used as the problem name in .lp files
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a variable. Bounds default to `[0, +∞)`.
    pub fn add_var(
        &mut self,
        name: &str,
        domain: Domain,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<VarId, ModelError> {
        self.ensure_building("add_var")?;
        self.variables.add_var(name, domain, lower, upper)
    }

    /// Register a family of variables sharing `name` as prefix, one per index
    /// of `shape`. Members are named `name[i]` or `name[i,j,…]`.
    pub fn add_var_family(
        &mut self,
        name: &str,
        shape: impl Into<IndexShape>,
        domain: Domain,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<VarFamily, ModelError> {
        self.ensure_building("add_var_family")?;
        self.variables
            .add_var_family(name, shape.into(), domain, lower, upper)
    }

    /// Member of `family` at `index`
    pub fn var(&self, family: &VarFamily, index: &[usize]) -> Result<VarId, ModelError> {
        if family.members().iter().any(|v| v.model() != self.id) {
            return Err(ModelError::CrossModel);
        }
        family.at(index)
    }

    /// Record `lhs relation rhs`. A constant in `lhs` is moved to the right.
    pub fn add_constraint(
        &mut self,
        name: &str,
        lhs: impl Into<AffineExpr>,
        relation: Relation,
        rhs: f64,
    ) -> Result<ConstraintId, ModelError> {
        self.ensure_building("add_constraint")?;
        let lhs = lhs.into();
        self.check_expr(&lhs)?;
        self.constraints
            .push(Constraint::new(name, lhs, relation, rhs))
    }

    /// Set the objective, replacing any previous one
    pub fn set_objective(
        &mut self,
        expr: impl Into<AffineExpr>,
        sense: ObjectiveSense,
    ) -> Result<(), ModelError> {
        self.ensure_building("set_objective")?;
        let expr = expr.into();
        self.check_expr(&expr)?;
        if self.objective.is_some() {
            debug!(
                component = "model",
                operation = "set_objective",
                model = %self.name,
                "Replacing previous objective"
            );
        }
        self.objective = Some(Objective { expr, sense });
        Ok(())
    }

    fn ensure_building(&self, operation: &'static str) -> Result<(), ModelError> {
        match self.state {
            State::Building => Ok(()),
            State::Solved(_) => Err(ModelError::ModelFrozen { operation }),
        }
    }

    fn check_expr(&self, expr: &AffineExpr) -> Result<(), ModelError> {
        if expr.models().any(|m| m != self.id) {
            return Err(ModelError::CrossModel);
        }
        if expr.terms().any(|(v, _)| !self.variables.contains(*v)) {
            return Err(ModelError::CrossModel);
        }
        Ok(())
    }

    /// Registered variable
    pub fn variable(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id)
    }

    /// Variables in registration order
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> + '_ {
        self.variables.iter()
    }

    /// Singletons and families, in registration order
    pub fn registrations(&self) -> &[Registration] {
        self.variables.registrations()
    }

    /// Number of variables, family members included
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Recorded constraint
    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(id)
    }

    /// Constraints in insertion order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> + '_ {
        self.constraints.iter()
    }

    /// Number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Current objective
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Translate, hand to `solver`, and freeze the model.
    ///
    /// Infeasible, unbounded and limit outcomes are returned as a
    /// [`Termination`], as is a back-end failure (`Termination::Error`).
    pub fn solve<S: SolverTrait + ?Sized>(&mut self, solver: &S) -> Result<Termination, ModelError> {
        if matches!(self.state, State::Solved(_)) {
            return Err(ModelError::AlreadySolved);
        }
        let problem = Problem::translate(self)?;
        let solution = match problem.infeasible_row() {
            Some(row) => {
                debug!(
                    component = "model",
                    operation = "solve",
                    constraint = row,
                    "Constant constraint cannot hold; skipping the back-end"
                );
                Solution::new(Termination::Infeasible, HashMap::new())
            }
            None => solver
                .run(&problem)
                .unwrap_or_else(|SolverError(message)| {
                    Solution::new(Termination::Error(message), HashMap::new())
                }),
        };
        let outcome = self.outcome(&problem, solution);
        info!(
            component = "model",
            operation = "solve",
            model = %self.name,
            variables = self.variables.len() as u64,
            constraints = self.constraints.len() as u64,
            termination = outcome.termination.token(),
            "Solve finished"
        );
        let termination = outcome.termination.clone();
        self.state = State::Solved(outcome);
        Ok(termination)
    }

    fn outcome(&self, problem: &Problem, solution: Solution) -> Outcome {
        let not_optimal = |termination| Outcome {
            termination,
            assignment: None,
            objective_value: None,
            unverified: Vec::new(),
        };
        if solution.status != Termination::Optimal {
            return not_optimal(solution.status);
        }
        let mut assignment = Vec::with_capacity(self.variables.len());
        let mut unverified = Vec::new();
        for (id, variable) in self.variables.iter() {
            let value = match solution.primal(problem, id) {
                Ok(value) => value,
                Err(e) => {
                    return not_optimal(Termination::Error(format!(
                        "optimal run without a value for `{}`: {}",
                        variable.name, e
                    )))
                }
            };
            let value = if !variable.domain.is_integer() {
                value
            } else if solution.integral {
                value.round()
            } else {
                unverified.push(id);
                value
            };
            assignment.push(value);
        }
        if !unverified.is_empty() {
            warn!(
                component = "model",
                operation = "solve",
                count = unverified.len() as u64,
                "Integer values returned without integrality guarantee"
            );
        }
        let objective_value = self
            .objective
            .as_ref()
            .map(|o| o.expr.evaluate(|v| assignment[v.index()]));
        Outcome {
            termination: Termination::Optimal,
            assignment: Some(assignment),
            objective_value,
            unverified,
        }
    }

    /// Termination of the solve, `None` while building
    pub fn termination(&self) -> Option<&Termination> {
        match &self.state {
            State::Building => None,
            State::Solved(outcome) => Some(&outcome.termination),
        }
    }

    /// Whether `solve` has run
    pub fn is_solved(&self) -> bool {
        matches!(self.state, State::Solved(_))
    }

    /// Objective value, only after an optimal solve
    pub fn objective_value(&self) -> Option<f64> {
        match &self.state {
            State::Solved(outcome) => outcome.objective_value,
            State::Building => None,
        }
    }

    /// Value of `var` in the optimal assignment
    pub fn primal(&self, var: VarId) -> Result<f64, ModelError> {
        let assignment = self.assignment()?;
        if !self.variables.contains(var) {
            return Err(ModelError::CrossModel);
        }
        Ok(assignment[var.index()])
    }

    /// Value of an expression under the optimal assignment
    pub fn value_of(&self, expr: &AffineExpr) -> Result<f64, ModelError> {
        let assignment = self.assignment()?;
        self.check_expr(expr)?;
        Ok(expr.evaluate(|v| assignment[v.index()]))
    }

    /// Integer variables whose values were returned verbatim by a back-end
    /// that does not guarantee integrality
    pub fn unverified_integrality(&self) -> &[VarId] {
        match &self.state {
            State::Solved(outcome) => &outcome.unverified,
            State::Building => &[],
        }
    }

    pub(crate) fn assignment(&self) -> Result<&[f64], ModelError> {
        match &self.state {
            State::Building => Err(ModelError::NoPrimal {
                reason: "model has not been solved".to_string(),
            }),
            State::Solved(Outcome {
                assignment: Some(values),
                ..
            }) => Ok(values),
            State::Solved(outcome) => Err(ModelError::NoPrimal {
                reason: format!("termination is {}", outcome.termination.token()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solvers::MicroLpSolver;

    #[test]
    fn cross_model_expressions_are_rejected() {
        let mut a = Model::new("a");
        let mut b = Model::new("b");
        let x = a.add_var("x", Domain::Continuous, None, None).unwrap();
        let y = b.add_var("y", Domain::Continuous, None, None).unwrap();
        assert_eq!(
            b.add_constraint("mixed", x + y, Relation::LessEq, 1.0),
            Err(ModelError::CrossModel)
        );
        assert_eq!(
            b.set_objective(x, ObjectiveSense::Minimize),
            Err(ModelError::CrossModel)
        );
        let fam = a
            .add_var_family("f", 2, Domain::Continuous, None, None)
            .unwrap();
        assert_eq!(b.var(&fam, &[0]), Err(ModelError::CrossModel));
        assert_eq!(a.var(&fam, &[1]).unwrap(), fam[1]);
    }

    #[test]
    fn solve_requires_an_objective() {
        let mut model = Model::new("no-objective");
        model.add_var("x", Domain::Continuous, None, None).unwrap();
        assert_eq!(
            model.solve(&MicroLpSolver::new()),
            Err(ModelError::NoObjective)
        );
        assert!(!model.is_solved());
    }

    #[test]
    fn model_is_frozen_after_solve() {
        let mut model = Model::new("frozen");
        let x = model.add_var("x", Domain::Continuous, None, None).unwrap();
        model.set_objective(x, ObjectiveSense::Minimize).unwrap();
        model.solve(&MicroLpSolver::new()).unwrap();
        assert_eq!(
            model.add_var("y", Domain::Continuous, None, None),
            Err(ModelError::ModelFrozen { operation: "add_var" })
        );
        assert!(matches!(
            model.add_constraint("c", x, Relation::LessEq, 1.0),
            Err(ModelError::ModelFrozen { .. })
        ));
        assert_eq!(
            model.solve(&MicroLpSolver::new()),
            Err(ModelError::AlreadySolved)
        );
    }

    #[test]
    fn no_primal_before_or_without_optimum() {
        let mut model = Model::new("np");
        let x = model.add_var("x", Domain::Continuous, None, None).unwrap();
        assert_eq!(model.primal(x).unwrap_err().code(), "SOLUTION_NO_PRIMAL");
        model.add_constraint("low", x, Relation::LessEq, -1.0).unwrap();
        model.set_objective(x, ObjectiveSense::Minimize).unwrap();
        assert_eq!(
            model.solve(&MicroLpSolver::new()).unwrap(),
            Termination::Infeasible
        );
        assert_eq!(model.primal(x).unwrap_err().code(), "SOLUTION_NO_PRIMAL");
        assert_eq!(model.objective_value(), None);
    }

    #[test]
    fn violated_constant_constraint_is_infeasible() {
        let mut model = Model::new("constant");
        let x = model.add_var("x", Domain::Continuous, None, None).unwrap();
        model
            .add_constraint("fine", AffineExpr::zero(), Relation::LessEq, 3.0)
            .unwrap();
        model
            .add_constraint("broken", AffineExpr::zero(), Relation::LessEq, -3.0)
            .unwrap();
        model.set_objective(x, ObjectiveSense::Minimize).unwrap();
        assert_eq!(
            model.solve(&MicroLpSolver::new()).unwrap(),
            Termination::Infeasible
        );
    }

    #[test]
    fn objective_is_replaced_and_keeps_its_constant() {
        let mut model = Model::new("replace");
        let x = model
            .add_var("x", Domain::Continuous, None, Some(2.0))
            .unwrap();
        model.set_objective(x, ObjectiveSense::Minimize).unwrap();
        model
            .set_objective(x + 10.0, ObjectiveSense::Maximize)
            .unwrap();
        model.solve(&MicroLpSolver::new()).unwrap();
        assert!((model.objective_value().unwrap() - 12.0).abs() < 1e-9);
        assert!((model.value_of(&(3.0 * x)).unwrap() - 6.0).abs() < 1e-9);
    }
}
