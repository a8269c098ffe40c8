//! Linear relational constraints `lhs (≤ | ≥ | =) rhs`.
use std::collections::HashSet;

use crate::error::{ModelError, Namespace};
use crate::expr::AffineExpr;
use crate::ids::{ConstraintId, ModelId};

/// '<=' '=' or '>='
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// lhs ≤ rhs
    LessEq,
    /// lhs ≥ rhs
    GreaterEq,
    /// lhs = rhs
    Equal,
}

impl Relation {
    /// Whether `lhs relation rhs` holds for two numbers
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Relation::LessEq => lhs <= rhs,
            Relation::GreaterEq => lhs >= rhs,
            Relation::Equal => lhs == rhs,
        }
    }

    /// The operator as written in the .lp format
    pub fn symbol(self) -> &'static str {
        match self {
            Relation::LessEq => "<=",
            Relation::GreaterEq => ">=",
            Relation::Equal => "=",
        }
    }
}

/// A named constraint. The constant of the left-hand side expression has
/// been moved to `rhs`, so `lhs.constant()` is always 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// unique within the model
    pub name: String,
    /// variable terms
    pub lhs: AffineExpr,
    /// relation between both sides
    pub relation: Relation,
    /// right-hand side scalar
    pub rhs: f64,
}

impl Constraint {
    /// Normalize `lhs relation rhs` so that the constant sits on the right
    pub fn new(name: impl Into<String>, lhs: AffineExpr, relation: Relation, rhs: f64) -> Self {
        let (terms, constant) = lhs.into_parts();
        let mut normalized = AffineExpr::zero();
        for (var, coeff) in terms {
            normalized.add_term(var, coeff);
        }
        Constraint {
            name: name.into(),
            lhs: normalized,
            relation,
            rhs: rhs - constant,
        }
    }

    /// A constraint without variable terms: either always or never satisfied
    pub fn is_trivial(&self) -> bool {
        self.lhs.is_constant()
    }

    /// For a trivial constraint, whether `0 relation rhs` holds
    pub fn trivially_holds(&self) -> bool {
        self.relation.holds(0.0, self.rhs)
    }
}

/// Constraints in insertion order
#[derive(Debug)]
pub(crate) struct ConstraintStore {
    model: ModelId,
    constraints: Vec<Constraint>,
    names: HashSet<String>,
}

impl ConstraintStore {
    pub(crate) fn new(model: ModelId) -> Self {
        ConstraintStore {
            model,
            constraints: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Caller has already checked that the expression belongs to the model
    pub(crate) fn push(&mut self, constraint: Constraint) -> Result<ConstraintId, ModelError> {
        if self.names.contains(&constraint.name) {
            return Err(ModelError::DuplicateName {
                namespace: Namespace::Constraint,
                name: constraint.name,
            });
        }
        self.names.insert(constraint.name.clone());
        let id = ConstraintId::new(self.model, self.constraints.len());
        self.constraints.push(constraint);
        Ok(id)
    }

    pub(crate) fn get(&self, id: ConstraintId) -> Option<&Constraint> {
        if id.model() != self.model {
            return None;
        }
        self.constraints.get(id.index())
    }

    pub(crate) fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::VarId;

    #[test]
    fn constant_moves_to_the_right() {
        let model = ModelId::fresh();
        let v = VarId::new(model, 0);
        let t = VarId::new(model, 1);
        // V >= T + 1  <=>  V - T - 1 >= 0  <=>  V - T >= 1
        let c = Constraint::new("order", v - (t + 1.0), Relation::GreaterEq, 0.0);
        assert_eq!(c.rhs, 1.0);
        assert_eq!(c.lhs.constant(), 0.0);
        assert_eq!(c.lhs.coefficient(t), -1.0);
    }

    #[test]
    fn trivial_constraints() {
        let ok = Constraint::new("ok", AffineExpr::zero(), Relation::LessEq, 4.0);
        let bad = Constraint::new("bad", AffineExpr::zero(), Relation::LessEq, -1.0);
        assert!(ok.is_trivial() && ok.trivially_holds());
        assert!(bad.is_trivial() && !bad.trivially_holds());
    }

    #[test]
    fn names_are_unique_and_order_is_kept() {
        let mut store = ConstraintStore::new(ModelId::fresh());
        let a = store
            .push(Constraint::new("a", AffineExpr::zero(), Relation::Equal, 0.0))
            .unwrap();
        store
            .push(Constraint::new("b", AffineExpr::zero(), Relation::Equal, 0.0))
            .unwrap();
        let err = store
            .push(Constraint::new("a", AffineExpr::zero(), Relation::Equal, 0.0))
            .unwrap_err();
        assert_eq!(err.code(), "MODEL_DUPLICATE_NAME");
        assert_eq!(store.get(a).unwrap().name, "a");
        let names: Vec<_> = store.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
