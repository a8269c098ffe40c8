//! Production planning: choose how much of each product to make so that
//! profit is maximal and no resource is over-used.
//!
//! Parameters: `NumProducts`, `NumResources`, `Profit[product]`,
//! `ResourceRequirement[resource][product]`, `ResourceAvailability[resource]`.
use crate::constraint::Relation;
use crate::error::Error;
use crate::expr::sum_over;
use crate::model::{Model, ObjectiveSense};
use crate::params::ParameterStore;
use crate::variable::Domain;

/// Continuous `Production[p] >= 0`, one `ResourceLimit[r]` row per resource
pub fn build(params: &ParameterStore) -> Result<Model, Error> {
    let products = params.count("NumProducts")?;
    let resources = params.count("NumResources")?;
    let profit = params.vector_of_len("Profit", products)?;
    let requirement = params.matrix_of_dims("ResourceRequirement", resources, products)?;
    let availability = params.vector_of_len("ResourceAvailability", resources)?;

    let mut model = Model::new("production");
    let production =
        model.add_var_family("Production", products, Domain::Continuous, None, None)?;

    for (r, row) in requirement.iter().enumerate() {
        model.add_constraint(
            &format!("ResourceLimit[{}]", r),
            sum_over(0..products, |p| row[p] * production[p]),
            Relation::LessEq,
            availability[r],
        )?;
    }
    model.set_objective(
        sum_over(0..products, |p| profit[p] * production[p]),
        ObjectiveSense::Maximize,
    )?;
    Ok(model)
}
