//! Solves a model in process by feeding sparse rows to a [NativeEngine].
use std::marker::PhantomData;

use tracing::debug;

use crate::constraint::ConstraintType;
use crate::error::Result;
use crate::linear_expression::LinearExpression;
use crate::model::Model;
use crate::objective::ObjectiveSense;
use crate::solution::Solution;
use crate::solvers::{NativeEngine, SolveStrategy};

/// Solves models with a fresh `E` engine for every solve
pub struct NativeSolver<E> {
    engine: PhantomData<fn() -> E>,
}

impl<E: NativeEngine + Default> NativeSolver<E> {
    /// A solver using the engine `E`
    pub fn new() -> Self {
        NativeSolver {
            engine: PhantomData,
        }
    }
}

impl<E: NativeEngine + Default> Default for NativeSolver<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// The `(lower, upper)` range of a row whose rebalanced right side is `rhs`
pub fn row_bounds(kind: ConstraintType, rhs: f64) -> (f64, f64) {
    match kind {
        ConstraintType::Eq => (rhs, rhs),
        ConstraintType::Le => (f64::NEG_INFINITY, rhs),
        ConstraintType::Ge => (rhs, f64::INFINITY),
    }
}

/// Split an expression into parallel coefficient and index arrays, in index order
fn sparse(expr: &LinearExpression<f64>) -> (Vec<f64>, Vec<usize>) {
    expr.sorted_terms()
        .into_iter()
        .map(|(var, coefficient)| (coefficient, var.index()))
        .unzip()
}

/// Feed the model to an engine: columns in registry order, then rows, then the objective
pub fn load<E: NativeEngine>(engine: &mut E, model: &Model) -> Result<()> {
    for (var, data) in model.variables().iter_variables_with_def() {
        let index = engine.add_variable(data.lower(), data.upper());
        debug_assert_eq!(index, var.index());
        if data.kind().is_integer() {
            engine.set_integrality(index, data.kind());
        }
    }

    let mut nonzeros = 0;
    for constraint in model.constraints() {
        let (lhs, rhs) = constraint.sparse_row()?;
        let (coefficients, indices) = sparse(&lhs);
        let (lower, upper) = row_bounds(constraint.kind(), rhs);
        nonzeros += indices.len();
        engine.add_constraint(&coefficients, &indices, lower, upper);
    }

    match model.objective() {
        Some(objective) => {
            let expr = objective.expr().flatten_continuous()?;
            let (coefficients, indices) = sparse(&expr);
            let minimize = objective.sense() == ObjectiveSense::Minimize;
            engine.set_objective(&coefficients, &indices, minimize, expr.constant());
        }
        None => engine.set_objective(&[], &[], true, 0.),
    }
    debug!(
        engine = E::name(),
        columns = model.variables().len(),
        rows = model.constraints().len(),
        nonzeros,
        "assembled native model"
    );
    Ok(())
}

impl<E: NativeEngine + Default> SolveStrategy for NativeSolver<E> {
    fn solve(&mut self, model: &Model) -> Result<Solution> {
        let mut engine = E::default();
        load(&mut engine, model)?;
        let status = engine.solve()?;
        let solution = match engine.get_solution() {
            Some((values, objective)) if status.has_solution() => {
                Solution::from_values(values, objective, status)
            }
            _ => {
                let mut solution = Solution::new(model.variables().len());
                solution.set_status(status);
                solution
            }
        };
        Ok(solution)
    }

    fn name(&self) -> &'static str {
        E::name()
    }
}

/// Dense sum of `coefficients[i] * values[indices[i]]`
pub(crate) fn dot(coefficients: &[f64], indices: &[usize], values: &[f64]) -> f64 {
    coefficients
        .iter()
        .zip(indices)
        .map(|(c, &i)| c * values[i])
        .sum()
}
