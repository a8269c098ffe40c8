//! Decision variables, variable families and their registry.
use std::collections::HashSet;

use tracing::debug;

use crate::error::{ModelError, Namespace};
use crate::ids::{ModelId, VarId};

/// Domain of a decision variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// any real value within the bounds
    Continuous,
    /// integer values within the bounds
    Integer,
    /// 0 or 1
    Binary,
}

impl Domain {
    /// Whether the solver must return integral values
    pub fn is_integer(self) -> bool {
        matches!(self, Domain::Integer | Domain::Binary)
    }
}

/// A registered variable
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// unique display name, e.g. `Production[2]` for a family member
    pub name: String,
    /// continuous, integer or binary
    pub domain: Domain,
    /// `-INFINITY` if there is no lower bound
    pub lower_bound: f64,
    /// `INFINITY` if there is no upper bound
    pub upper_bound: f64,
    /// position within its family, if any
    pub family_index: Option<Vec<usize>>,
}

/// Index domain of a variable family: the Cartesian product `0..d₀ × 0..d₁ × …`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexShape(Vec<usize>);

impl IndexShape {
    /// Dimension lengths
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.0.iter().product()
    }

    /// Whether the domain has no member
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Row-major position of `index`, `None` outside the domain
    pub fn offset(&self, index: &[usize]) -> Option<usize> {
        if index.len() != self.0.len() {
            return None;
        }
        let mut offset = 0;
        for (i, dim) in index.iter().zip(&self.0) {
            if i >= dim {
                return None;
            }
            offset = offset * dim + i;
        }
        Some(offset)
    }

    /// Every index tuple, in row-major order
    pub fn indices(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.len()).map(move |mut offset| {
            let mut index = vec![0; self.0.len()];
            for (slot, dim) in index.iter_mut().zip(&self.0).rev() {
                *slot = offset % dim;
                offset /= dim;
            }
            index
        })
    }
}

impl From<usize> for IndexShape {
    fn from(len: usize) -> Self {
        IndexShape(vec![len])
    }
}

impl<const N: usize> From<[usize; N]> for IndexShape {
    fn from(dims: [usize; N]) -> Self {
        IndexShape(dims.to_vec())
    }
}

impl From<Vec<usize>> for IndexShape {
    fn from(dims: Vec<usize>) -> Self {
        IndexShape(dims)
    }
}

impl From<&[usize]> for IndexShape {
    fn from(dims: &[usize]) -> Self {
        IndexShape(dims.to_vec())
    }
}

/// Stringified index used in display names and result documents: `3` or `1,2`
pub fn index_key(index: &[usize]) -> String {
    index
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Handles of an indexed collection of variables sharing a name prefix
#[derive(Debug, Clone, PartialEq)]
pub struct VarFamily {
    name: String,
    shape: IndexShape,
    members: Vec<VarId>,
}

impl VarFamily {
    /// Family name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index domain
    pub fn shape(&self) -> &IndexShape {
        &self.shape
    }

    /// Member at `index`, `None` outside the domain
    pub fn get(&self, index: &[usize]) -> Option<VarId> {
        self.shape.offset(index).map(|o| self.members[o])
    }

    /// Member at `index`, or [`ModelError::IndexOutOfRange`]
    pub fn at(&self, index: &[usize]) -> Result<VarId, ModelError> {
        self.get(index).ok_or_else(|| ModelError::IndexOutOfRange {
            family: self.name.clone(),
            index: index.to_vec(),
            shape: self.shape.dims().to_vec(),
        })
    }

    /// All members, in row-major index order
    pub fn members(&self) -> &[VarId] {
        &self.members
    }

    /// `(index, handle)` pairs in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Vec<usize>, VarId)> + '_ {
        self.shape.indices().zip(self.members.iter().copied())
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the family has no member
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Panics outside the domain, like slice indexing; use [`VarFamily::at`] to get an error.
impl std::ops::Index<usize> for VarFamily {
    type Output = VarId;

    fn index(&self, i: usize) -> &VarId {
        &self.members[self.shape.offset(&[i]).unwrap_or(usize::MAX)]
    }
}

/// What was registered, in registration order
#[derive(Debug, Clone, PartialEq)]
pub enum Registration {
    /// a standalone variable
    Single(VarId),
    /// a whole family
    Family(VarFamily),
}

/// Allocates variable handles and records their domain, bounds and names
#[derive(Debug)]
pub(crate) struct VariableRegistry {
    model: ModelId,
    variables: Vec<Variable>,
    registrations: Vec<Registration>,
    names: HashSet<String>,
}

impl VariableRegistry {
    pub(crate) fn new(model: ModelId) -> Self {
        VariableRegistry {
            model,
            variables: Vec::new(),
            registrations: Vec::new(),
            names: HashSet::new(),
        }
    }

    pub(crate) fn add_var(
        &mut self,
        name: &str,
        domain: Domain,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<VarId, ModelError> {
        self.claim_name(name)?;
        let (lower_bound, upper_bound) = match resolve_bounds(name, domain, lower, upper) {
            Ok(bounds) => bounds,
            Err(e) => {
                self.names.remove(name);
                return Err(e);
            }
        };
        let id = self.push(Variable {
            name: name.to_string(),
            domain,
            lower_bound,
            upper_bound,
            family_index: None,
        });
        self.registrations.push(Registration::Single(id));
        Ok(id)
    }

    pub(crate) fn add_var_family(
        &mut self,
        name: &str,
        shape: IndexShape,
        domain: Domain,
        lower: Option<f64>,
        upper: Option<f64>,
    ) -> Result<VarFamily, ModelError> {
        let (lower_bound, upper_bound) = resolve_bounds(name, domain, lower, upper)?;
        let member_names: Vec<String> = shape
            .indices()
            .map(|index| format!("{}[{}]", name, index_key(&index)))
            .collect();
        // the family is created atomically: check every name before claiming any
        if let Some(taken) = std::iter::once(name)
            .chain(member_names.iter().map(String::as_str))
            .find(|n| self.names.contains(*n))
        {
            return Err(ModelError::DuplicateName {
                namespace: Namespace::Variable,
                name: taken.to_string(),
            });
        }
        self.names.insert(name.to_string());
        let mut members = Vec::with_capacity(member_names.len());
        for (member_name, index) in member_names.into_iter().zip(shape.indices()) {
            self.names.insert(member_name.clone());
            members.push(self.push(Variable {
                name: member_name,
                domain,
                lower_bound,
                upper_bound,
                family_index: Some(index),
            }));
        }
        debug!(
            component = "model",
            operation = "add_var_family",
            family = name,
            members = members.len() as u64,
            "Created variable family"
        );
        let family = VarFamily {
            name: name.to_string(),
            shape,
            members,
        };
        self.registrations.push(Registration::Family(family.clone()));
        Ok(family)
    }

    pub(crate) fn get(&self, id: VarId) -> Option<&Variable> {
        if id.model() != self.model {
            return None;
        }
        self.variables.get(id.index())
    }

    pub(crate) fn contains(&self, id: VarId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.variables.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (VarId, &Variable)> + '_ {
        let model = self.model;
        self.variables
            .iter()
            .enumerate()
            .map(move |(i, v)| (VarId::new(model, i), v))
    }

    pub(crate) fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    fn push(&mut self, variable: Variable) -> VarId {
        let id = VarId::new(self.model, self.variables.len());
        self.variables.push(variable);
        id
    }

    fn claim_name(&mut self, name: &str) -> Result<(), ModelError> {
        if !self.names.insert(name.to_string()) {
            return Err(ModelError::DuplicateName {
                namespace: Namespace::Variable,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Apply defaults (`[0, +∞)`), binary clamping, and the bound invariants.
fn resolve_bounds(
    name: &str,
    domain: Domain,
    lower: Option<f64>,
    upper: Option<f64>,
) -> Result<(f64, f64), ModelError> {
    let mut lower_bound = lower.unwrap_or(0.0);
    let mut upper_bound = upper.unwrap_or(f64::INFINITY);
    if lower_bound.is_nan() || upper_bound.is_nan() {
        return Err(invalid_bounds(name, lower_bound, upper_bound, "(bounds must not be NaN)"));
    }
    if lower_bound > upper_bound {
        return Err(invalid_bounds(
            name,
            lower_bound,
            upper_bound,
            "(lower bound exceeds upper bound)",
        ));
    }
    if domain.is_integer() {
        let fractional = |b: f64| b.is_finite() && b.fract() != 0.0;
        if fractional(lower_bound) || fractional(upper_bound) {
            return Err(invalid_bounds(
                name,
                lower_bound,
                upper_bound,
                "(integer bounds must be integer-valued)",
            ));
        }
    }
    if domain == Domain::Binary {
        let (lower, upper) = (lower_bound, upper_bound);
        lower_bound = lower_bound.max(0.0);
        upper_bound = upper_bound.min(1.0);
        if lower_bound > upper_bound {
            return Err(invalid_bounds(
                name,
                lower,
                upper,
                "(binary bounds fall outside [0, 1])",
            ));
        }
    }
    Ok((lower_bound, upper_bound))
}

fn invalid_bounds(name: &str, lower: f64, upper: f64, reason: &'static str) -> ModelError {
    ModelError::InvalidBounds {
        name: name.to_string(),
        lower,
        upper,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> VariableRegistry {
        VariableRegistry::new(ModelId::fresh())
    }

    #[test]
    fn defaults_to_non_negative() {
        let mut reg = registry();
        let x = reg.add_var("x", Domain::Continuous, None, None).unwrap();
        let var = reg.get(x).unwrap();
        assert_eq!(var.lower_bound, 0.0);
        assert_eq!(var.upper_bound, f64::INFINITY);
    }

    #[test]
    fn rejects_inverted_and_fractional_integer_bounds() {
        let mut reg = registry();
        let err = reg
            .add_var("x", Domain::Continuous, Some(3.0), Some(1.0))
            .unwrap_err();
        assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
        let err = reg
            .add_var("n", Domain::Integer, Some(0.5), None)
            .unwrap_err();
        assert_eq!(err.code(), "VARIABLE_INVALID_BOUNDS");
        // a rejected variable leaves its name free
        assert!(reg.add_var("x", Domain::Continuous, None, None).is_ok());
    }

    #[test]
    fn binary_bounds_are_clamped() {
        let mut reg = registry();
        let b = reg
            .add_var("b", Domain::Binary, Some(-4.0), Some(9.0))
            .unwrap();
        let var = reg.get(b).unwrap();
        assert_eq!((var.lower_bound, var.upper_bound), (0.0, 1.0));
        assert!(reg
            .add_var("c", Domain::Binary, Some(2.0), Some(3.0))
            .is_err());
    }

    #[test]
    fn family_members_are_named_by_index() {
        let mut reg = registry();
        let fam = reg
            .add_var_family("Assign", [2, 3].into(), Domain::Binary, None, None)
            .unwrap();
        assert_eq!(fam.len(), 6);
        let member = fam.get(&[1, 2]).unwrap();
        assert_eq!(reg.get(member).unwrap().name, "Assign[1,2]");
        assert_eq!(reg.get(member).unwrap().family_index, Some(vec![1, 2]));
        assert!(fam.get(&[2, 0]).is_none());
        assert!(fam.get(&[0]).is_none());
        assert_eq!(fam.at(&[0, 3]).unwrap_err().code(), "FAMILY_INDEX_OUT_OF_RANGE");
    }

    #[test]
    fn family_is_atomic_on_name_collision() {
        let mut reg = registry();
        reg.add_var("P[1]", Domain::Continuous, None, None).unwrap();
        let err = reg
            .add_var_family("P", 3.into(), Domain::Continuous, None, None)
            .unwrap_err();
        assert!(matches!(err, ModelError::DuplicateName { ref name, .. } if name == "P[1]"));
        assert_eq!(reg.len(), 1);
        assert!(reg.add_var("P", Domain::Continuous, None, None).is_ok());
    }

    #[test]
    fn shape_enumerates_row_major() {
        let shape = IndexShape::from([2, 2]);
        let all: Vec<_> = shape.indices().collect();
        assert_eq!(all, vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]]);
        assert_eq!(shape.offset(&[1, 0]), Some(2));
        assert!(IndexShape::from([3, 0]).is_empty());
    }
}
