//! The outcome of a solve: a [Status], variable values and the objective value.
use std::fmt::{Display, Formatter};

use crate::error::Result;
use crate::expression::Expr;
use crate::variable::Variable;

/// Where a model stands after interpreting the output of a solving engine.
///
/// A model starts in [Status::Unknown]. Every solve attempt starts over from
/// `Unknown` and ends in exactly one of the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    /// No solve has completed
    #[default]
    Unknown,
    /// An optimal solution was found
    Optimal,
    /// There exists no solution that satisfies all of the constraints
    Infeasible,
    /// The objective can be improved without limit
    Unbounded,
    /// The engine failed
    Error,
    /// The objective is bounded, but no optimal solution was proven
    Bounded,
    /// A feasible solution was found, but it was not proven optimal
    Feasible,
    /// The engine proved the problem is either infeasible or unbounded
    InfeasibleOrUnbounded,
}

impl Status {
    /// True when the variable values of the solution are meaningful
    pub fn has_solution(self) -> bool {
        matches!(self, Status::Optimal | Status::Feasible | Status::Bounded)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Status::Unknown => "unknown",
            Status::Optimal => "optimal",
            Status::Infeasible => "infeasible",
            Status::Unbounded => "unbounded",
            Status::Error => "error",
            Status::Bounded => "bounded",
            Status::Feasible => "feasible",
            Status::InfeasibleOrUnbounded => "infeasible or unbounded",
        };
        f.write_str(text)
    }
}

/// A problem solution.
///
/// Values are stored by variable index. A variable that the solver did not
/// report has no value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Solution {
    values: Vec<Option<f64>>,
    objective_value: Option<f64>,
    status: Status,
}

impl Solution {
    /// An empty solution for a model with `n_variables` variables
    pub fn new(n_variables: usize) -> Self {
        Solution {
            values: vec![None; n_variables],
            objective_value: None,
            status: Status::Unknown,
        }
    }

    /// A solution with a value for every variable, in registry order
    pub fn from_values(values: Vec<f64>, objective_value: f64, status: Status) -> Self {
        Solution {
            values: values.into_iter().map(Some).collect(),
            objective_value: Some(objective_value),
            status,
        }
    }

    /// The terminal status of the solve
    pub fn status(&self) -> Status {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub(crate) fn set_value(&mut self, var: Variable, value: f64) {
        let index = var.index();
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }

    pub(crate) fn set_objective_value(&mut self, value: f64) {
        self.objective_value = Some(value);
    }

    /// The value of a variable, if the solver reported one
    pub fn get(&self, var: Variable) -> Option<f64> {
        self.values.get(var.index()).copied().flatten()
    }

    /// The value of a variable, 0 if the solver did not report one
    pub fn value(&self, var: Variable) -> f64 {
        self.get(var).unwrap_or(0.)
    }

    /// The value of a variable, rounded to the nearest integer.
    /// Solvers return integer variables with a small tolerance, such as `2.9999999`.
    pub fn int_value(&self, var: Variable) -> i64 {
        self.value(var).round() as i64
    }

    /// The objective value, if the solver reported one
    pub fn objective_value(&self) -> Option<f64> {
        self.objective_value
    }

    /// Evaluate an expression with the values of this solution
    ///
    /// ```
    /// # use lp_bridge::{variable, Model, Status};
    /// let mut model = Model::new();
    /// let a = model.add(variable().max(1))?;
    /// let b = model.add(variable().max(4))?;
    /// let objective = a + b;
    /// model.maximize(objective.clone());
    /// assert_eq!(model.solve()?, Status::Optimal);
    /// assert_eq!(model.solution().eval(&objective)?, 5.);
    /// # Ok::<_, lp_bridge::ModelError>(())
    /// ```
    pub fn eval(&self, expr: &Expr) -> Result<f64> {
        Ok(expr.flatten()?.into_continuous().eval_with(|var| self.value(var)))
    }
}
