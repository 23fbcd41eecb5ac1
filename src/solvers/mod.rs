//! The strategies that hand a [Model] to a solving engine and map its answer back.
//!
//! - [ExternalSolver] writes the model to an LP file, runs a solver binary
//!   and reads the solution file it produces.
//! - [NativeSolver] builds sparse rows and calls a [NativeEngine] in process.
use crate::error::Result;
use crate::model::Model;
use crate::solution::{Solution, Status};
use crate::variable::VariableKind;

#[cfg(test)]
#[macro_use]
mod macros;

pub mod external;
pub mod native;

#[cfg(feature = "microlp")]
pub mod microlp;

#[cfg(feature = "highs")]
pub mod highs;

pub use external::{ExternalSolver, ExternalSolverConfig};
pub use native::NativeSolver;

/// A way of solving a model.
///
/// Infeasible and unbounded problems are reported through [Solution::status];
/// an `Err` means the strategy itself failed.
pub trait SolveStrategy {
    /// Solve the model and return its solution
    fn solve(&mut self, model: &Model) -> Result<Solution>;

    /// A human-readable name, used in logs
    fn name(&self) -> &'static str;
}

/// The calls an in-process solving engine must accept.
///
/// Variables are referred to by their dense index, in the order they were added.
/// Engines may buffer the calls and only build their own model in [NativeEngine::solve].
pub trait NativeEngine {
    /// Add a variable, returning its index
    fn add_variable(&mut self, lower: f64, upper: f64) -> usize;

    /// Restrict a variable to integer or binary values
    fn set_integrality(&mut self, index: usize, kind: VariableKind);

    /// Add the row `lower <= sum(coefficients[i] * x[indices[i]]) <= upper`
    fn add_constraint(&mut self, coefficients: &[f64], indices: &[usize], lower: f64, upper: f64);

    /// Set the objective `sum(coefficients[i] * x[indices[i]]) + constant`
    fn set_objective(&mut self, coefficients: &[f64], indices: &[usize], minimize: bool, constant: f64);

    /// Run the engine
    fn solve(&mut self) -> Result<Status>;

    /// The value of every variable in index order, and the objective value,
    /// after a solve that found a solution
    fn get_solution(&self) -> Option<(Vec<f64>, f64)>;

    /// A human-readable name, used in logs
    fn name() -> &'static str
    where
        Self: Sized;
}

/// The solver used by [Model::solve]: an in-process engine when one is
/// compiled in, or else the external solver configured from the environment.
pub fn default_solver() -> Box<dyn SolveStrategy> {
    #[cfg(feature = "microlp")]
    {
        Box::new(NativeSolver::<microlp::MicroLpEngine>::new())
    }
    #[cfg(all(feature = "highs", not(feature = "microlp")))]
    {
        Box::new(NativeSolver::<highs::HighsEngine>::new())
    }
    #[cfg(not(any(feature = "microlp", feature = "highs")))]
    {
        Box::new(ExternalSolver::new(ExternalSolverConfig::from_env()))
    }
}
