use lp_modeling::constraint::Relation;
use lp_modeling::model::{Model, ObjectiveSense};
use lp_modeling::problem::Problem;
use lp_modeling::variable::Domain;

#[test]
fn simple_problem() {
    let mut model = Model::new("my_problem");
    let x = model
        .add_var(
            "x",
            Domain::Continuous,
            Some(f64::NEG_INFINITY),
            Some(f64::INFINITY),
        )
        .unwrap();
    let y = model.add_var("y", Domain::Continuous, None, None).unwrap();
    let z = model
        .add_var("z", Domain::Continuous, Some(1.), Some(10.))
        .unwrap();
    model
        .add_constraint("c0", x + y + z, Relation::GreaterEq, 5.0)
        .unwrap();
    model
        .set_objective(2.0 * x + y, ObjectiveSense::Minimize)
        .unwrap();
    let expected_str = "\\ my_problem

Minimize
  obj: 2 x + y

Subject To
  c0: x + y + z >= 5

Bounds
  x free
  0 <= y
  1 <= z <= 10

End
";
    let pb = Problem::translate(&model).unwrap();
    assert_eq!(pb.display_lp().to_string(), expected_str);
}

#[test]
fn with_integers() {
    let mut model = Model::new("int_problem");
    let x = model
        .add_var("x", Domain::Integer, Some(-10.), Some(10.))
        .unwrap();
    let y = model
        .add_var("y", Domain::Integer, Some(f64::NEG_INFINITY), Some(16.))
        .unwrap();
    let b = model.add_var("b", Domain::Binary, None, None).unwrap();
    model
        .add_constraint("c0", x - y, Relation::LessEq, -5.0)
        .unwrap();
    model
        .add_constraint("c1", -1.0 * x + b, Relation::Equal, 0.0)
        .unwrap();
    model
        .set_objective(x - y, ObjectiveSense::Maximize)
        .unwrap();
    let expected_str = "\\ int_problem

Maximize
  obj: x - y

Subject To
  c0: x - y <= -5
  c1: - x + b = 0

Bounds
  -10 <= x <= 10
  -inf <= y <= 16
  0 <= b <= 1

Generals
  x
  y
  b

End
";
    let pb = Problem::translate(&model).unwrap();
    assert_eq!(pb.display_lp().to_string(), expected_str);
}

#[test]
fn names_are_made_safe_and_constants_moved() {
    let mut model = Model::new("shop floor");
    let p = model
        .add_var_family("Production", 2, Domain::Continuous, None, None)
        .unwrap();
    let fixed = model
        .add_var("fixed", Domain::Continuous, Some(3.), Some(3.))
        .unwrap();
    model
        .add_constraint("cap[0]", 2.0 * p[0] + p[1] + 1.0, Relation::LessEq, 10.0)
        .unwrap();
    model
        .add_constraint("cap[0]!", p[0] - 0.5 * fixed, Relation::GreaterEq, 0.0)
        .unwrap();
    model
        .set_objective(lp_modeling::expr::AffineExpr::from_constant(4.0), ObjectiveSense::Minimize)
        .unwrap();
    let expected_str = "\\ shop floor

Minimize
  obj: 0 Production_0

Subject To
  cap_0: 2 Production_0 + Production_1 <= 9
  cap_0_2: Production_0 - 0.5 fixed >= 0

Bounds
  0 <= Production_0
  0 <= Production_1
  fixed = 3

End
";
    let pb = Problem::translate(&model).unwrap();
    assert_eq!(pb.display_lp().to_string(), expected_str);
}

#[test]
fn without_constraints() {
    let mut model = Model::new("free_standing");
    let x = model.add_var("x", Domain::Continuous, None, None).unwrap();
    model.set_objective(x, ObjectiveSense::Minimize).unwrap();
    let expected_str = "\\ free_standing

Minimize
  obj: x

Bounds
  0 <= x

End
";
    let pb = Problem::translate(&model).unwrap();
    assert_eq!(pb.display_lp().to_string(), expected_str);
}

#[test]
fn temporary_file_holds_the_problem() {
    let mut model = Model::new("on disk");
    let x = model.add_var("x", Domain::Integer, None, Some(4.)).unwrap();
    model.set_objective(x, ObjectiveSense::Maximize).unwrap();
    let pb = Problem::translate(&model).unwrap();
    let file = pb.to_tmp_file().unwrap();
    let path = file.path().to_owned();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("lp"));
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        pb.display_lp().to_string()
    );
    drop(file);
    assert!(!path.exists());
}

#[test]
fn bound_keywords_are_renamed() {
    let mut model = Model::new("keywords");
    let free = model.add_var("free", Domain::Continuous, None, None).unwrap();
    let inf = model
        .add_var("inf", Domain::Continuous, Some(f64::NEG_INFINITY), Some(f64::INFINITY))
        .unwrap();
    model
        .set_objective(free + inf, ObjectiveSense::Minimize)
        .unwrap();
    let expected_str = "\\ keywords

Minimize
  obj: vfree + vinf

Bounds
  0 <= vfree
  vinf free

End
";
    let pb = Problem::translate(&model).unwrap();
    assert_eq!(pb.display_lp().to_string(), expected_str);
}
