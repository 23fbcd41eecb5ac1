//! An engine that uses [microlp](https://docs.rs/microlp), a pure rust solver.

use crate::error::{ModelError, Result};
use crate::solution::Status;
use crate::solvers::native::dot;
use crate::solvers::NativeEngine;
use crate::variable::VariableKind;

#[derive(Debug, Clone)]
struct Column {
    lower: f64,
    upper: f64,
    kind: VariableKind,
}

#[derive(Debug, Clone)]
struct Row {
    coefficients: Vec<f64>,
    indices: Vec<usize>,
    lower: f64,
    upper: f64,
}

/// The [microlp](https://docs.rs/microlp) engine, to be used with
/// [NativeSolver](crate::solvers::NativeSolver).
///
/// Integer bounds are rounded inwards. microlp only takes `i32` integer
/// bounds, so wider ones are clamped to that range. A solution where such a
/// variable sits on its clamped bound is reported as [Status::Unbounded] when
/// the real bound is infinite, and as an error otherwise.
#[derive(Debug, Clone, Default)]
pub struct MicroLpEngine {
    columns: Vec<Column>,
    rows: Vec<Row>,
    objective: Vec<f64>,
    objective_constant: f64,
    minimize: bool,
    solution: Option<(Vec<f64>, f64)>,
}

/// An integer bound that was clamped to fit in `i32`
#[derive(Debug, Clone, Copy)]
struct ClampedBound {
    column: usize,
    clamped: f64,
    requested: f64,
}

impl MicroLpEngine {
    fn build(&self) -> (microlp::Problem, Vec<microlp::Variable>, Vec<ClampedBound>) {
        let mut clamped_bounds = Vec::new();
        let mut problem = microlp::Problem::new(if self.minimize {
            microlp::OptimizationDirection::Minimize
        } else {
            microlp::OptimizationDirection::Maximize
        });
        let variables = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let obj = self.objective.get(i).copied().unwrap_or(0.);
                if col.kind.is_integer() {
                    let lower = to_i32(i, col.lower.ceil(), &mut clamped_bounds);
                    let upper = to_i32(i, col.upper.floor(), &mut clamped_bounds);
                    problem.add_integer_var(obj, (lower, upper))
                } else {
                    problem.add_var(obj, (col.lower, col.upper))
                }
            })
            .collect::<Vec<_>>();
        for row in self.rows.iter().filter(|row| !row.indices.is_empty()) {
            let mut expr = microlp::LinearExpr::empty();
            for (&c, &i) in row.coefficients.iter().zip(&row.indices) {
                expr.add(variables[i], c);
            }
            if row.lower == row.upper {
                problem.add_constraint(expr, microlp::ComparisonOp::Eq, row.upper);
                continue;
            }
            if row.lower.is_finite() {
                problem.add_constraint(expr.clone(), microlp::ComparisonOp::Ge, row.lower);
            }
            if row.upper.is_finite() {
                problem.add_constraint(expr, microlp::ComparisonOp::Le, row.upper);
            }
        }
        (problem, variables, clamped_bounds)
    }
}

fn to_i32(column: usize, bound: f64, clamped_bounds: &mut Vec<ClampedBound>) -> i32 {
    let clamped = bound.clamp(i32::MIN as f64, i32::MAX as f64);
    if clamped != bound {
        clamped_bounds.push(ClampedBound {
            column,
            clamped,
            requested: bound,
        });
    }
    clamped as i32
}

/// Check that no variable is stopped by a bound the model didn't ask for
fn check_clamped_bounds(clamped_bounds: &[ClampedBound], values: &[f64]) -> Result<Status> {
    for bound in clamped_bounds {
        if (values[bound.column] - bound.clamped).abs() >= 0.5 {
            continue;
        }
        if bound.requested.is_finite() {
            return Err(ModelError::Solve(format!(
                "integer variable {} reached {}, but its bound {} is out of the range microlp supports",
                bound.column, bound.clamped, bound.requested
            )));
        }
        return Ok(Status::Unbounded);
    }
    Ok(Status::Optimal)
}

impl NativeEngine for MicroLpEngine {
    fn add_variable(&mut self, lower: f64, upper: f64) -> usize {
        self.columns.push(Column {
            lower,
            upper,
            kind: VariableKind::Continuous,
        });
        self.columns.len() - 1
    }

    fn set_integrality(&mut self, index: usize, kind: VariableKind) {
        self.columns[index].kind = kind;
    }

    fn add_constraint(&mut self, coefficients: &[f64], indices: &[usize], lower: f64, upper: f64) {
        self.rows.push(Row {
            coefficients: coefficients.to_vec(),
            indices: indices.to_vec(),
            lower,
            upper,
        });
    }

    fn set_objective(&mut self, coefficients: &[f64], indices: &[usize], minimize: bool, constant: f64) {
        let mut dense = vec![0.; self.columns.len()];
        for (&c, &i) in coefficients.iter().zip(indices) {
            dense[i] += c;
        }
        self.objective = dense;
        self.objective_constant = constant;
        self.minimize = minimize;
    }

    fn solve(&mut self) -> Result<Status> {
        self.solution = None;
        // rows without variables are checked here: microlp rejects empty expressions
        let empty_row_violated = self
            .rows
            .iter()
            .any(|row| row.indices.is_empty() && (row.lower > 0. || row.upper < 0.));
        if empty_row_violated {
            return Ok(Status::Infeasible);
        }

        let (problem, variables, clamped_bounds) = self.build();
        match problem.solve() {
            Ok(solution) => {
                let values: Vec<f64> = variables.iter().map(|&v| solution[v]).collect();
                let status = check_clamped_bounds(&clamped_bounds, &values)?;
                if status != Status::Optimal {
                    return Ok(status);
                }
                let indices: Vec<usize> = (0..values.len()).collect();
                let objective = dot(&self.objective, &indices, &values) + self.objective_constant;
                self.solution = Some((values, objective));
                Ok(Status::Optimal)
            }
            Err(microlp::Error::Infeasible) => Ok(Status::Infeasible),
            Err(microlp::Error::Unbounded) => Ok(Status::Unbounded),
            Err(microlp::Error::InternalError(s)) => Err(ModelError::Solve(s)),
        }
    }

    fn get_solution(&self) -> Option<(Vec<f64>, f64)> {
        self.solution.clone()
    }

    fn name() -> &'static str {
        "microlp"
    }
}

#[cfg(test)]
mod tests {
    use super::MicroLpEngine;
    use crate::solvers::NativeSolver;
    use crate::{variable, Model, ModelError, Status};

    #[test]
    fn can_solve_easy() {
        let mut model = Model::new();
        let x = model.add(variable().clamp(0, 2)).unwrap();
        let y = model.add(variable().clamp(1, 3)).unwrap();
        model.maximize(x + y);
        model.add_le(2 * x + y, 4);
        let status = model
            .solve_with(&mut NativeSolver::<MicroLpEngine>::new())
            .unwrap();
        assert_eq!(status, Status::Optimal);
        assert_eq!((model.value(x), model.value(y)), (0.5, 3.));
    }

    #[test]
    fn empty_rows() {
        let mut model = Model::new();
        let x = model.add(variable().max(1)).unwrap();
        model.add_le(x - x, 5);
        model.maximize(x);
        let status = model
            .solve_with(&mut NativeSolver::<MicroLpEngine>::new())
            .unwrap();
        assert_eq!(status, Status::Optimal);
        model.add_ge(x - x, 5);
        let status = model
            .solve_with(&mut NativeSolver::<MicroLpEngine>::new())
            .unwrap();
        assert_eq!(status, Status::Infeasible);
    }

    #[test]
    fn integer_bounds_beyond_i32() {
        let mut model = Model::new();
        let x = model.add(variable().integer().min(f64::NEG_INFINITY)).unwrap();
        model.minimize(x);
        let status = model
            .solve_with(&mut NativeSolver::<MicroLpEngine>::new())
            .unwrap();
        assert_eq!(status, Status::Unbounded);
        assert_eq!(model.solution().get(x), None);

        model.set_lower_bound(x, -3e9).unwrap();
        let result = model.solve_with(&mut NativeSolver::<MicroLpEngine>::new());
        assert!(matches!(result, Err(ModelError::Solve(_))), "{:?}", result);

        // a clamped bound that is not reached does not matter
        model.maximize(x);
        model.add_le(x, 5);
        let status = model
            .solve_with(&mut NativeSolver::<MicroLpEngine>::new())
            .unwrap();
        assert_eq!(status, Status::Optimal);
        assert_eq!(model.solution().int_value(x), 5);
    }

    solver_scenarios!(MicroLpEngine);
}
