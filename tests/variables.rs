use float_eq::assert_float_eq;
use lp_bridge::{constraint, variable, Expr, Model, ModelError};

#[test]
fn complex_expression() {
    let mut model = Model::new();
    let a = model.add(variable()).unwrap();
    let b = model.add(variable()).unwrap();
    let c = model.add(variable()).unwrap();
    let d = model.add(variable()).unwrap();
    let left = (9. * (a - b * 2.) + 4 * c / 2 - d).flatten_continuous().unwrap();
    let right = (9. * a + (-18.) * b + 2. * c + (-1.) * d)
        .flatten_continuous()
        .unwrap();
    assert_eq!(left, right);
}

#[test]
fn large_sum() {
    let mut model = Model::new();
    let var_vec: Vec<_> = (0..100_000)
        .map(|_| model.add(variable()).unwrap())
        .collect();
    let sum_right: Expr = var_vec.iter().sum();
    let sum_reverse: Expr = var_vec.iter().rev().sum();
    assert_eq!(
        sum_right.flatten().unwrap(),
        sum_reverse.flatten().unwrap()
    );
}

#[test]
fn integer_arithmetic_is_exact() {
    let mut model = Model::new();
    let n = model.add(variable().integer()).unwrap();
    let m = model.add(variable().binary()).unwrap();
    let e = model.sum((1..=1000).map(|i| model.prod(i, model.sum([Expr::from(n), Expr::from(m)]))));
    let flat = e.flatten_integer().unwrap();
    assert_eq!(flat.coefficient(n), 500_500);
    assert_eq!(flat.coefficient(m), 500_500);
    assert_eq!(flat.constant(), 0);
}

#[test]
fn mixed_sums_are_continuous() {
    let mut model = Model::new();
    let n = model.add(variable().integer()).unwrap();
    let x = model.add(variable()).unwrap();
    let e = 3 * n + 0.1 * x + 0.2 * x;
    assert!(!e.flatten().unwrap().is_integer());
    let flat = e.flatten_continuous().unwrap();
    assert_float_eq!(flat.coefficient(x), 0.3, abs <= 1e-12);
    assert_eq!(flat.coefficient(n), 3.);
    assert!(matches!(
        e.flatten_integer(),
        Err(ModelError::ExpressionType(_))
    ));
}

#[test]
fn associativity() {
    let mut model = Model::new();
    let v1 = model.add(variable()).unwrap();
    let v2 = model.add(variable()).unwrap();
    let (c1, c2) = (0.1, 0.7);
    let left = model.sum([model.sum([Expr::from(c1), v1.into()]), model.sum([Expr::from(c2), v2.into()])]);
    let right = model.sum([
        Expr::from(c1),
        model.sum([Expr::from(v1), model.sum([Expr::from(c2), v2.into()])]),
    ]);
    let left = left.flatten_continuous().unwrap();
    let right = right.flatten_continuous().unwrap();
    assert_float_eq!(left.constant(), right.constant(), abs <= 1e-12);
    assert_eq!(left.coefficient(v1), right.coefficient(v1));
    assert_eq!(left.coefficient(v2), right.coefficient(v2));
}

#[test]
fn debug_format() {
    let mut model = Model::new();
    let a = model.add(variable()).unwrap();
    let b = model.add(variable()).unwrap();
    let expr_str = format!("{:?}", constraint!(9 * (1. + a + b / 3) <= a + 1));
    assert_eq!(expr_str, "8 v0 + 3 v1 <= - 8");
}

#[test]
fn display_with_model_names() {
    let mut model = Model::new();
    let x = model.add(variable().name("x")).unwrap();
    let y = model.add(variable().name("y")).unwrap();
    let c = model.add_ge(2 * x, y - 4);
    model.set_constraint_name(c, "floor");
    assert_eq!(
        model.display(model.constraint(c)).to_string(),
        "2 x - 1 y >= - 4"
    );
}

#[test]
fn bound_mutations_are_validated() {
    let mut model = Model::new();
    let x = model.add(variable().max(10)).unwrap();
    assert!(model.set_lower_bound(x, 100.).is_err());
    assert_eq!(model.bounds(x), (0., 10.));
    model.set_bounds(x, -5., 5.).unwrap();
    assert_eq!(model.bounds(x), (-5., 5.));
    assert!(model.set_upper_bound(x, -6.).is_err());
    assert_eq!(model.bounds(x), (-5., 5.));

    let b = model.bool_var("b").unwrap();
    assert!(model.set_upper_bound(b, 2.).is_err());
    model.set_lower_bound(b, 1.).unwrap();
    assert_eq!(model.bounds(b), (1., 1.));
}
