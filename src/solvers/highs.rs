//! An engine that uses [highs](https://docs.rs/highs), a parallel C++ solver.

use highs::HighsModelStatus;

use crate::error::{ModelError, Result};
use crate::solution::Status;
use crate::solvers::native::dot;
use crate::solvers::NativeEngine;
use crate::variable::VariableKind;

#[derive(Debug, Clone)]
struct Column {
    lower: f64,
    upper: f64,
    integer: bool,
}

/// The [highs](https://docs.rs/highs) engine, to be used with
/// [NativeSolver](crate::solvers::NativeSolver).
///
/// Calls are buffered and the HiGHS problem is only built when solving,
/// since HiGHS wants the objective coefficient of a column when it is created.
#[derive(Debug, Clone, Default)]
pub struct HighsEngine {
    columns: Vec<Column>,
    rows: Vec<(Vec<f64>, Vec<usize>, f64, f64)>,
    objective: Vec<f64>,
    objective_constant: f64,
    minimize: bool,
    verbose: bool,
    solution: Option<(Vec<f64>, f64)>,
}

impl HighsEngine {
    /// Sets whether or not HiGHS should display its own log on the console
    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose
    }

    fn build(&self) -> highs::Model {
        let mut problem = highs::RowProblem::default();
        let columns: Vec<highs::Col> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let factor = self.objective.get(i).copied().unwrap_or(0.);
                problem.add_column_with_integrality(factor, col.lower..=col.upper, col.integer)
            })
            .collect();
        for (coefficients, indices, lower, upper) in &self.rows {
            let factors = indices
                .iter()
                .zip(coefficients)
                .map(|(&i, &c)| (columns[i], c));
            problem.add_row(*lower..=*upper, factors);
        }
        let sense = if self.minimize {
            highs::Sense::Minimise
        } else {
            highs::Sense::Maximise
        };
        let mut model = problem.optimise(sense);
        model.set_option(&b"output_flag"[..], self.verbose);
        model
    }
}

/// Map a terminal HiGHS status. `None` for the statuses that mean HiGHS itself failed.
fn map_status(status: HighsModelStatus) -> Option<Status> {
    match status {
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => Some(Status::Optimal),
        HighsModelStatus::Infeasible => Some(Status::Infeasible),
        HighsModelStatus::Unbounded => Some(Status::Unbounded),
        HighsModelStatus::UnboundedOrInfeasible => Some(Status::InfeasibleOrUnbounded),
        HighsModelStatus::ObjectiveBound => Some(Status::Bounded),
        HighsModelStatus::ObjectiveTarget
        | HighsModelStatus::ReachedTimeLimit
        | HighsModelStatus::ReachedIterationLimit => Some(Status::Feasible),
        _ => None,
    }
}

impl NativeEngine for HighsEngine {
    fn add_variable(&mut self, lower: f64, upper: f64) -> usize {
        self.columns.push(Column {
            lower,
            upper,
            integer: false,
        });
        self.columns.len() - 1
    }

    fn set_integrality(&mut self, index: usize, kind: VariableKind) {
        self.columns[index].integer = kind.is_integer();
    }

    fn add_constraint(&mut self, coefficients: &[f64], indices: &[usize], lower: f64, upper: f64) {
        self.rows
            .push((coefficients.to_vec(), indices.to_vec(), lower, upper));
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
        let solved = self.build().solve();
        let status = map_status(solved.status())
            .ok_or_else(|| ModelError::Solve(format!("HiGHS stopped with {:?}", solved.status())))?;
        let values = solved.get_solution().columns().to_vec();
        if status.has_solution() && values.len() == self.columns.len() {
            let indices: Vec<usize> = (0..values.len()).collect();
            let objective = dot(&self.objective, &indices, &values) + self.objective_constant;
            self.solution = Some((values, objective));
        }
        Ok(status)
    }

    fn get_solution(&self) -> Option<(Vec<f64>, f64)> {
        self.solution.clone()
    }

    fn name() -> &'static str {
        "highs"
    }
}
