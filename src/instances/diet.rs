//! Diet: the cheapest servings of foods meeting every nutrient requirement.
//!
//! Parameters: `NumFoods`, `NumNutrients`, `Cost[food]`,
//! `NutrientContent[nutrient][food]`, `MinRequirement[nutrient]`.
use crate::constraint::Relation;
use crate::error::Error;
use crate::expr::sum_over;
use crate::model::{Model, ObjectiveSense};
use crate::params::ParameterStore;
use crate::variable::Domain;

/// Continuous `Servings[f] >= 0`, one `Nutrient[n]` row per nutrient
pub fn build(params: &ParameterStore) -> Result<Model, Error> {
    let foods = params.count("NumFoods")?;
    let nutrients = params.count("NumNutrients")?;
    let cost = params.vector_of_len("Cost", foods)?;
    let content = params.matrix_of_dims("NutrientContent", nutrients, foods)?;
    let requirement = params.vector_of_len("MinRequirement", nutrients)?;

    let mut model = Model::new("diet");
    let servings = model.add_var_family("Servings", foods, Domain::Continuous, None, None)?;

    for (n, row) in content.iter().enumerate() {
        model.add_constraint(
            &format!("Nutrient[{}]", n),
            sum_over(0..foods, |f| row[f] * servings[f]),
            Relation::GreaterEq,
            requirement[n],
        )?;
    }
    model.set_objective(
        sum_over(0..foods, |f| cost[f] * servings[f]),
        ObjectiveSense::Minimize,
    )?;
    Ok(model)
}
