//! A Linear Programming modeler that turns algebraic expressions into solver-ready models.
//!
//! ```rust
//! use lp_bridge::{variable, Model, Status};
//!
//! let mut model = Model::new();
//! let a = model.add(variable().max(1).name("a"))?;
//! let b = model.add(variable().min(2).max(4).name("b"))?;
//! model.add_le(a + 2, b);
//! model.add_ge(1 - a, b - 3);
//! model.maximize(10 * (a - b / 5) - b);
//!
//! println!("{}", model.export_model()?);
//! assert_eq!(model.solve()?, Status::Optimal);
//! println!("a={}   b={}", model.value(a), model.value(b));
//! # Ok::<_, lp_bridge::ModelError>(())
//! ```

pub use canonical::{flatten, flatten_continuous, flatten_integer};
pub use constraint::{Constraint, ConstraintReference, ConstraintType};
pub use counter::NameCounter;
pub use error::{BoundsError, ExpressionTypeError, ModelError, Result};
pub use expression::{Expr, Scalar};
pub use linear_expression::{Canonical, Coefficient, LinearExpression};
pub use model::Model;
pub use objective::{Objective, ObjectiveSense};
pub use solution::{Solution, Status};
#[cfg(feature = "highs")]
pub use solvers::highs::HighsEngine;
#[cfg(feature = "microlp")]
pub use solvers::microlp::MicroLpEngine;
pub use solvers::{
    default_solver, ExternalSolver, ExternalSolverConfig, NativeEngine, NativeSolver,
    SolveStrategy,
};
pub use variable::{
    variable, FormatWithVars, Variable, VariableDefinition, VariableKind, VariableRegistry,
    WithNames,
};

mod canonical;
#[macro_use]
pub mod constraint;
mod counter;
pub mod error;
mod expression;
mod linear_expression;
pub mod lp_format;
mod model;
mod objective;
pub mod sol_format;
mod solution;
pub mod solvers;
pub mod variable;
