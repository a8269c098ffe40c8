//! Field trip buses: carry every student with small and large buses, with
//! at most a given share of the buses being large.
//!
//! Parameters: `SmallBusCapacity`, `LargeBusCapacity`, `MinimumStudents`,
//! `MaxLargeBusPercentage` (a fraction in `[0, 1]`).
use crate::constraint::Relation;
use crate::error::Error;
use crate::expr::AffineExpr;
use crate::ids::VarId;
use crate::model::{Model, ObjectiveSense};
use crate::params::ParameterStore;
use crate::variable::Domain;

/// How the share cap `large / (large + small) <= p` is written as a linear row.
/// Both have the same feasible set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentCap {
    /// `large <= p·(large + small)`
    #[default]
    Share,
    /// `(1 - p)·large <= p·small`
    Complement,
}

impl PercentCap {
    /// Left-hand side of `lhs <= 0`
    pub fn lhs(self, capped: VarId, other: VarId, fraction: f64) -> AffineExpr {
        match self {
            PercentCap::Share => capped - fraction * (capped + other),
            PercentCap::Complement => (1.0 - fraction) * capped - fraction * other,
        }
    }
}

/// Integer `SmallBuses` and `LargeBuses`, minimizing the number of buses
pub fn build(params: &ParameterStore) -> Result<Model, Error> {
    build_with(params, PercentCap::default())
}

/// [`build`] with a chosen linearization of the share cap
pub fn build_with(params: &ParameterStore, cap: PercentCap) -> Result<Model, Error> {
    let small_capacity = params.scalar("SmallBusCapacity")?;
    let large_capacity = params.scalar("LargeBusCapacity")?;
    let students = params.scalar("MinimumStudents")?;
    let fraction = params.scalar("MaxLargeBusPercentage")?;

    let mut model = Model::new("buses");
    let small = model.add_var("SmallBuses", Domain::Integer, None, None)?;
    let large = model.add_var("LargeBuses", Domain::Integer, None, None)?;

    model.add_constraint(
        "Students",
        small_capacity * small + large_capacity * large,
        Relation::GreaterEq,
        students,
    )?;
    model.add_constraint(
        "LargeShare",
        cap.lhs(large, small, fraction),
        Relation::LessEq,
        0.0,
    )?;
    model.set_objective(small + large, ObjectiveSense::Minimize)?;
    Ok(model)
}
