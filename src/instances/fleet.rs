//! Fleet sizing: vans and trucks carry boxes within a budget, and there must
//! be strictly more van trips than truck trips.
//!
//! Parameters: `VanCapacity`, `TruckCapacity`, `VanCost`, `TruckCost`,
//! `MinBoxes`, `Budget`.
use crate::constraint::Relation;
use crate::error::Error;
use crate::model::{Model, ObjectiveSense};
use crate::params::ParameterStore;
use crate::variable::Domain;

/// Integer `VanTrips` and `TruckTrips`, minimizing the number of trips
pub fn build(params: &ParameterStore) -> Result<Model, Error> {
    let van_capacity = params.scalar("VanCapacity")?;
    let truck_capacity = params.scalar("TruckCapacity")?;
    let van_cost = params.scalar("VanCost")?;
    let truck_cost = params.scalar("TruckCost")?;
    let min_boxes = params.scalar("MinBoxes")?;
    let budget = params.scalar("Budget")?;

    let mut model = Model::new("fleet");
    let vans = model.add_var("VanTrips", Domain::Integer, None, None)?;
    let trucks = model.add_var("TruckTrips", Domain::Integer, None, None)?;

    model.add_constraint(
        "Demand",
        van_capacity * vans + truck_capacity * trucks,
        Relation::GreaterEq,
        min_boxes,
    )?;
    model.add_constraint(
        "Budget",
        van_cost * vans + truck_cost * trucks,
        Relation::LessEq,
        budget,
    )?;
    // vans > trucks, on integers
    model.add_constraint("MoreVansThanTrucks", vans - (trucks + 1.0), Relation::GreaterEq, 0.0)?;
    model.set_objective(vans + trucks, ObjectiveSense::Minimize)?;
    Ok(model)
}
