/// Instantiates the reference scenarios for an in-process engine
#[allow(unused_macros)]
macro_rules! solver_scenarios {
    ($engine:ty) => {
        mod scenarios {
            use float_eq::assert_float_eq;

            #[allow(unused_imports)]
            use super::*;
            use $crate::solvers::NativeSolver;
            use $crate::{variable, Model, Status};

            fn solve(model: &mut Model) -> Status {
                model
                    .solve_with(&mut NativeSolver::<$engine>::new())
                    .expect("the engine should not fail")
            }

            /// x + 2y <= 14, 3x - y >= 0, x - y <= 2
            fn triangle(model: &mut Model, x: $crate::Variable, y: $crate::Variable) {
                let c1 = model.add_le(x + 2 * y, 14);
                model.set_constraint_name(c1, "c1");
                model.add_ge(3 * x - y, 0);
                model.add_le(x - y, 2);
            }

            #[test]
            fn solve_lp() {
                let mut model = Model::new();
                let x = model.add(variable().name("x")).unwrap();
                let y = model.add(variable().name("y")).unwrap();
                triangle(&mut model, x, y);
                model.maximize(3 * x + 4 * y);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 6., abs <= 0.01);
                assert_float_eq!(model.value(y), 4., abs <= 0.01);
                assert_float_eq!(model.objective_value().unwrap(), 34., abs <= 0.01);
            }

            #[test]
            fn minimize_negative_objective() {
                let mut model = Model::new();
                let x = model.add(variable().name("x")).unwrap();
                let y = model.add(variable().name("y")).unwrap();
                triangle(&mut model, x, y);
                model.minimize(-3 * x - 4 * y);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 6., abs <= 0.01);
                assert_float_eq!(model.value(y), 4., abs <= 0.01);
                assert_float_eq!(model.objective_value().unwrap(), -34., abs <= 0.01);
            }

            #[test]
            fn solve_ip() {
                let mut model = Model::new();
                let x = model.add(variable().integer().name("x")).unwrap();
                let y = model.bool_var("y").unwrap();
                triangle(&mut model, x, y);
                model.maximize(x + y + 5);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_eq!(model.solution().int_value(x), 3);
                assert_eq!(model.solution().int_value(y), 1);
                assert_float_eq!(model.objective_value().unwrap(), 9., abs <= 0.01);
            }

            #[test]
            fn mip_with_constant() {
                let mut model = Model::new();
                let x = model.add(variable().integer().name("x")).unwrap();
                let y = model.add(variable().name("y")).unwrap();
                triangle(&mut model, x, y);
                model.maximize(x + y + 5);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 6., abs <= 0.01);
                assert_float_eq!(model.value(y), 4., abs <= 0.01);
                assert_float_eq!(model.objective_value().unwrap(), 15., abs <= 0.01);
            }

            #[test]
            fn infeasible() {
                let mut model = Model::new();
                let x = model.add(variable().name("x")).unwrap();
                model.add_ge(x, 10);
                model.add_le(x, 5);
                model.minimize(x);
                assert_eq!(solve(&mut model), Status::Infeasible);
                assert_eq!(model.status(), Status::Infeasible);
                assert_eq!(model.objective_value(), None);
            }

            #[test]
            fn unbounded() {
                let mut model = Model::new();
                let x = model.add(variable().name("x")).unwrap();
                model.add_ge(x, 1);
                model.maximize(x);
                let status = solve(&mut model);
                assert!(
                    matches!(status, Status::Unbounded | Status::InfeasibleOrUnbounded),
                    "{:?}",
                    status
                );
            }

            #[test]
            fn unbounded_integer() {
                let mut model = Model::new();
                let x = model.add(variable().integer().name("x")).unwrap();
                model.maximize(x);
                let status = solve(&mut model);
                assert!(
                    matches!(status, Status::Unbounded | Status::InfeasibleOrUnbounded),
                    "{:?}",
                    status
                );
                assert_eq!(model.solution().get(x), None);
            }

            #[test]
            fn integer_bound_beyond_i32() {
                let mut model = Model::new();
                let x = model.add(variable().integer().max(3e9).name("x")).unwrap();
                model.maximize(x);
                // either the exact optimum or a solve error, never a truncated optimum
                match model.solve_with(&mut NativeSolver::<$engine>::new()) {
                    Ok(status) => {
                        assert_eq!(status, Status::Optimal);
                        assert_float_eq!(model.value(x), 3e9, abs <= 0.5);
                    }
                    Err(err) => assert!(matches!(err, $crate::ModelError::Solve(_)), "{}", err),
                }
            }

            #[test]
            fn equality_and_bounds() {
                let mut model = Model::new();
                let x = model.add(variable().clamp(-5, 5).name("x")).unwrap();
                let y = model.add(variable().min(-10).name("y")).unwrap();
                model.add_eq(x + y, -3);
                model.minimize(y);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 5., abs <= 1e-6);
                assert_float_eq!(model.value(y), -8., abs <= 1e-6);
            }

            #[test]
            fn resolve_after_change() {
                let mut model = Model::new();
                let x = model.add(variable().max(3).name("x")).unwrap();
                model.maximize(x);
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 3., abs <= 1e-6);
                model.set_upper_bound(x, 2.).unwrap();
                assert_eq!(solve(&mut model), Status::Optimal);
                assert_float_eq!(model.value(x), 2., abs <= 1e-6);
            }
        }
    };
}
