//! Affine expressions `Σ cᵢ·xᵢ + k` over decision variables.
//!
//! Expressions are plain values: they reference variables by [`VarId`] and
//! own nothing in the model. Every operation keeps the term map canonical:
//! ordered by handle, one entry per variable, no zero coefficient.
//!
//! ```
//! use lp_modeling::model::Model;
//! use lp_modeling::variable::Domain;
//! use lp_modeling::expr::{sum_over, AffineExpr};
//!
//! let mut model = Model::new("demo");
//! let x = model.add_var("x", Domain::Continuous, None, None).unwrap();
//! let y = model.add_var("y", Domain::Continuous, None, None).unwrap();
//!
//! let e = 2.0 * x + y - x + 3.0;
//! assert_eq!(e.coefficient(x), 1.0);
//! assert_eq!(e.constant(), 3.0);
//!
//! let cancelled = AffineExpr::from(x) - x;
//! assert!(cancelled.is_constant());
//!
//! let empty = sum_over(0..0, |i: usize| i as f64 * x);
//! assert_eq!(empty, AffineExpr::zero());
//! ```
use std::collections::btree_map::{self, BTreeMap};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::ids::{ModelId, VarId};

/// An affine expression over decision variables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffineExpr {
    terms: BTreeMap<VarId, f64>,
    constant: f64,
}

impl AffineExpr {
    /// The zero expression
    pub fn zero() -> Self {
        Self::default()
    }

    /// Just a constant, no variable terms
    pub fn from_constant(constant: f64) -> Self {
        Self {
            terms: BTreeMap::new(),
            constant,
        }
    }

    /// Single variable with coefficient 1
    pub fn var(var: VarId) -> Self {
        Self::term(var, 1.0)
    }

    /// Single term `coeff * var`
    pub fn term(var: VarId, coeff: f64) -> Self {
        let mut expr = Self::zero();
        expr.add_term(var, coeff);
        expr
    }

    /// Constant term
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Coefficient of `var`, 0 when absent
    pub fn coefficient(&self, var: VarId) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Terms in handle order
    pub fn terms(&self) -> btree_map::Iter<'_, VarId, f64> {
        self.terms.iter()
    }

    /// Number of variable terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// No variable term at all
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// Models referenced by this expression, deduplicated
    pub(crate) fn models(&self) -> impl Iterator<Item = ModelId> + '_ {
        let mut last = None;
        self.terms.keys().filter_map(move |v| {
            let model = v.model();
            if last == Some(model) {
                None
            } else {
                last = Some(model);
                Some(model)
            }
        })
    }

    /// Add `coeff * var`, merging with an existing term
    pub fn add_term(&mut self, var: VarId, coeff: f64) {
        if coeff == 0.0 {
            return;
        }
        match self.terms.entry(var) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            btree_map::Entry::Occupied(mut slot) => {
                let merged = *slot.get() + coeff;
                if merged == 0.0 {
                    slot.remove();
                } else {
                    *slot.get_mut() = merged;
                }
            }
        }
    }

    /// Add a constant offset
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Multiply all terms and the constant by `factor`
    pub fn scale(mut self, factor: f64) -> Self {
        if factor == 0.0 {
            return Self::zero();
        }
        for coeff in self.terms.values_mut() {
            *coeff *= factor;
        }
        self.terms.retain(|_, c| *c != 0.0);
        self.constant *= factor;
        self
    }

    /// Split into variable terms and constant
    pub fn into_parts(self) -> (BTreeMap<VarId, f64>, f64) {
        (self.terms, self.constant)
    }

    /// Value of the expression under an assignment
    pub fn evaluate(&self, mut value_of: impl FnMut(VarId) -> f64) -> f64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, (var, coeff)| acc + coeff * value_of(*var))
    }
}

/// `Σᵢ f(i)` over a finite index set. The empty set yields the zero expression.
pub fn sum_over<I, F, E>(indices: I, mut f: F) -> AffineExpr
where
    I: IntoIterator,
    F: FnMut(I::Item) -> E,
    E: Into<AffineExpr>,
{
    indices.into_iter().map(|i| f(i).into()).sum()
}

impl From<VarId> for AffineExpr {
    fn from(var: VarId) -> Self {
        AffineExpr::var(var)
    }
}

impl From<f64> for AffineExpr {
    fn from(constant: f64) -> Self {
        AffineExpr::from_constant(constant)
    }
}

impl From<&AffineExpr> for AffineExpr {
    fn from(expr: &AffineExpr) -> Self {
        expr.clone()
    }
}

impl<E: Into<AffineExpr>> AddAssign<E> for AffineExpr {
    fn add_assign(&mut self, rhs: E) {
        let (terms, constant) = rhs.into().into_parts();
        for (var, coeff) in terms {
            self.add_term(var, coeff);
        }
        self.constant += constant;
    }
}

impl<E: Into<AffineExpr>> SubAssign<E> for AffineExpr {
    fn sub_assign(&mut self, rhs: E) {
        let (terms, constant) = rhs.into().into_parts();
        for (var, coeff) in terms {
            self.add_term(var, -coeff);
        }
        self.constant -= constant;
    }
}

impl<E: Into<AffineExpr>> Add<E> for AffineExpr {
    type Output = AffineExpr;

    fn add(mut self, rhs: E) -> AffineExpr {
        self += rhs;
        self
    }
}

impl<E: Into<AffineExpr>> Sub<E> for AffineExpr {
    type Output = AffineExpr;

    fn sub(mut self, rhs: E) -> AffineExpr {
        self -= rhs;
        self
    }
}

impl Mul<f64> for AffineExpr {
    type Output = AffineExpr;

    fn mul(self, rhs: f64) -> AffineExpr {
        self.scale(rhs)
    }
}

impl Mul<AffineExpr> for f64 {
    type Output = AffineExpr;

    fn mul(self, rhs: AffineExpr) -> AffineExpr {
        rhs.scale(self)
    }
}

impl Neg for AffineExpr {
    type Output = AffineExpr;

    fn neg(self) -> AffineExpr {
        self.scale(-1.0)
    }
}

impl<E: Into<AffineExpr>> Add<E> for VarId {
    type Output = AffineExpr;

    fn add(self, rhs: E) -> AffineExpr {
        AffineExpr::var(self) + rhs
    }
}

impl<E: Into<AffineExpr>> Sub<E> for VarId {
    type Output = AffineExpr;

    fn sub(self, rhs: E) -> AffineExpr {
        AffineExpr::var(self) - rhs
    }
}

impl Mul<f64> for VarId {
    type Output = AffineExpr;

    fn mul(self, rhs: f64) -> AffineExpr {
        AffineExpr::term(self, rhs)
    }
}

impl Mul<VarId> for f64 {
    type Output = AffineExpr;

    fn mul(self, rhs: VarId) -> AffineExpr {
        AffineExpr::term(rhs, self)
    }
}

impl Neg for VarId {
    type Output = AffineExpr;

    fn neg(self) -> AffineExpr {
        AffineExpr::term(self, -1.0)
    }
}

impl Add<AffineExpr> for f64 {
    type Output = AffineExpr;

    fn add(self, rhs: AffineExpr) -> AffineExpr {
        rhs + self
    }
}

impl Sub<AffineExpr> for f64 {
    type Output = AffineExpr;

    fn sub(self, rhs: AffineExpr) -> AffineExpr {
        -rhs + self
    }
}

impl<E: Into<AffineExpr>> Sum<E> for AffineExpr {
    fn sum<I: Iterator<Item = E>>(iter: I) -> Self {
        iter.fold(AffineExpr::zero(), |acc, e| acc + e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn handles(n: usize) -> Vec<VarId> {
        let model = ModelId::fresh();
        (0..n).map(|i| VarId::new(model, i)).collect()
    }

    #[test]
    fn arithmetic_merges_terms() {
        let v = handles(3);
        let e = 3.0 * v[0] + 5.0 * v[1] + v[0] - 2.0;
        assert_eq!(e.coefficient(v[0]), 4.0);
        assert_eq!(e.coefficient(v[1]), 5.0);
        assert_eq!(e.coefficient(v[2]), 0.0);
        assert_eq!(e.constant(), -2.0);
        assert_eq!(e.len(), 2);
    }

    #[test]
    fn cancelled_terms_are_removed() {
        let v = handles(2);
        let e = v[0] + v[1] - v[0];
        assert_eq!(e.terms().map(|(k, _)| *k).collect::<Vec<_>>(), vec![v[1]]);
        assert!((e.clone() * 0.0).is_constant());
        assert_eq!(e.clone() - e, AffineExpr::zero());
    }

    #[test]
    fn equality_ignores_construction_order() {
        let v = handles(3);
        let a = v[2] + 2.0 * v[0] + v[1];
        let b = v[1] + (v[0] + v[2]) + v[0];
        assert_eq!(a, b);
    }

    #[test]
    fn sum_over_ranges() {
        let v = handles(4);
        let weights = [1.0, 2.0, 3.0, 4.0];
        let e = sum_over(0..4, |i| weights[i] * v[i]);
        assert_eq!(e.len(), 4);
        assert_eq!(e.coefficient(v[3]), 4.0);
        assert_eq!(sum_over(Vec::<usize>::new(), |i| v[i]), AffineExpr::zero());
    }

    #[test]
    fn evaluate_includes_constant() {
        let v = handles(2);
        let e = 3.0 * v[0] + 5.0 * v[1] + 1.0;
        let values = [2.0, 1.0];
        assert_eq!(e.evaluate(|var| values[var.index()]), 12.0);
    }

    #[test]
    fn scalar_on_the_left() {
        let v = handles(1);
        let e = 10.0 - 2.0 * (v[0] + 1.0);
        assert_eq!(e.coefficient(v[0]), -2.0);
        assert_eq!(e.constant(), 8.0);
    }

    proptest! {
        #[test]
        fn canonical_after_any_sequence(ops in prop::collection::vec((0usize..5, -3i32..=3, any::<bool>()), 0..40)) {
            let v = handles(5);
            let mut e = AffineExpr::zero();
            let mut reference = [0i64; 5];
            for (idx, coeff, subtract) in ops {
                if subtract {
                    e -= f64::from(coeff) * v[idx];
                    reference[idx] -= i64::from(coeff);
                } else {
                    e += f64::from(coeff) * v[idx];
                    reference[idx] += i64::from(coeff);
                }
            }
            prop_assert!(e.terms().all(|(_, c)| *c != 0.0));
            let keys: Vec<_> = e.terms().map(|(k, _)| *k).collect();
            let mut sorted = keys.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(&keys, &sorted);
            for (i, expected) in reference.iter().enumerate() {
                prop_assert_eq!(e.coefficient(v[i]), *expected as f64);
            }
        }
    }
}
