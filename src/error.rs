//! Errors that can occur while building, exporting or solving a model.
//!
//! Infeasible and unbounded problems are not errors: they are reported as a
//! [Status](crate::Status) of the solve.
use std::path::PathBuf;

use thiserror::Error;

use crate::variable::VariableKind;

/// Shorthand for results whose error is a [ModelError]
pub type Result<T> = std::result::Result<T, ModelError>;

/// Represents an error that occurred when building or solving a model
#[derive(Debug, Error)]
pub enum ModelError {
    /// A variable definition or bound mutation is inconsistent
    #[error("invalid variable definition: {0}")]
    Validation(#[from] BoundsError),

    /// An expression cannot be represented in canonical linear form
    #[error("unsupported expression: {0}")]
    ExpressionType(#[from] ExpressionTypeError),

    /// The model could not be written, or a solution could not be read
    #[error("serialization failed: {message}")]
    Serialization {
        /// What went wrong
        message: String,
        /// The underlying I/O failure, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// The solving engine failed
    #[error("solve failed: {0}")]
    Solve(String),

    /// A temporary resource could not be released
    #[error("could not remove temporary file {path}")]
    Resource {
        /// The file that was left behind
        path: PathBuf,
        /// Why it could not be removed
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub(crate) fn serialization<M: Into<String>>(message: M) -> Self {
        ModelError::Serialization {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn io<M: Into<String>>(message: M, source: std::io::Error) -> Self {
        ModelError::Serialization {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// A lower bound greater than the upper bound, or a binary variable
/// with bounds outside of `[0, 1]`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundsError {
    /// The lower bound would exceed the upper bound
    #[error("lower bound {lower} is greater than upper bound {upper}")]
    Inverted {
        /// Requested lower bound
        lower: f64,
        /// Requested upper bound
        upper: f64,
    },
    /// A bound is NaN
    #[error("bound is not a number")]
    NotANumber,
    /// A binary variable can only be restricted inside `[0, 1]`
    #[error("binary variable bounds [{lower}, {upper}] are outside of [0, 1]")]
    NotBinary {
        /// Requested lower bound
        lower: f64,
        /// Requested upper bound
        upper: f64,
    },
}

/// An expression that cannot be flattened in the requested context
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionTypeError {
    /// A continuous expression was used where an integer one is required
    #[error("cannot narrow a continuous expression to an integer expression")]
    Narrowing,
    /// A continuous variable was used where an integer one is required
    #[error("variable {index} is {kind:?}, not integer")]
    NotInteger {
        /// Registry index of the offending variable
        index: usize,
        /// Its domain
        kind: VariableKind,
    },
    /// Two operands of a product both contain variables
    #[error("product of two non-constant expressions is not linear")]
    NonLinearProduct,
    /// A coefficient or constant does not fit in its numeric type
    #[error("coefficient overflow")]
    Overflow,
    /// A constant is infinite or NaN, such as a division by zero
    #[error("constant {0} is not finite")]
    NonFinite(f64),
}
