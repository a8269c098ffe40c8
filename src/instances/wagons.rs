//! Ore transport with small and large wagons, a minimum number of large
//! wagons and a floor on the small-to-large ratio.
//!
//! Parameters: `SmallWagonCapacity`, `LargeWagonCapacity`,
//! `MinSmallToLargeRatio`, `MinLargeWagons`, `TotalOre`.
use crate::constraint::Relation;
use crate::error::Error;
use crate::model::{Model, ObjectiveSense};
use crate::params::ParameterStore;
use crate::variable::Domain;

/// Integer `SmallWagons` and `LargeWagons`, minimizing the number of wagons
pub fn build(params: &ParameterStore) -> Result<Model, Error> {
    let small_capacity = params.scalar("SmallWagonCapacity")?;
    let large_capacity = params.scalar("LargeWagonCapacity")?;
    let ratio = params.scalar("MinSmallToLargeRatio")?;
    let min_large = params.scalar("MinLargeWagons")?;
    let total_ore = params.scalar("TotalOre")?;

    let mut model = Model::new("wagons");
    let small = model.add_var("SmallWagons", Domain::Integer, None, None)?;
    let large = model.add_var("LargeWagons", Domain::Integer, None, None)?;

    model.add_constraint(
        "Capacity",
        small_capacity * small + large_capacity * large,
        Relation::GreaterEq,
        total_ore,
    )?;
    model.add_constraint("Ratio", small - ratio * large, Relation::GreaterEq, 0.0)?;
    model.add_constraint("MinLarge", large, Relation::GreaterEq, min_large)?;
    model.set_objective(small + large, ObjectiveSense::Minimize)?;
    Ok(model)
}
