//! The function the solver optimizes.
use std::fmt::{Debug, Formatter};

use crate::expression::Expr;
use crate::variable::{FormatWithVars, Variable};

/// Whether to search for the lowest or the highest value of the objective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ObjectiveSense {
    /// Find the lowest value
    #[default]
    Minimize,
    /// Find the highest value
    Maximize,
}

impl ObjectiveSense {
    /// The keyword that opens an LP file
    pub fn keyword(self) -> &'static str {
        match self {
            ObjectiveSense::Minimize => "Minimize",
            ObjectiveSense::Maximize => "Maximize",
        }
    }
}

/// A named expression to minimize or maximize.
/// A model holds at most one; setting a new objective replaces the previous one.
#[derive(Clone, PartialEq)]
pub struct Objective {
    pub(crate) name: String,
    pub(crate) expr: Expr,
    pub(crate) sense: ObjectiveSense,
}

impl Objective {
    /// The name of the objective
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The expression being optimized, including its constant term
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Minimize or maximize
    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }
}

impl FormatWithVars for Objective {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        write!(f, "{} ", self.sense.keyword())?;
        match self.expr.flatten() {
            Ok(flat) => flat.format_with(f, variable_format),
            Err(_) => self.expr.format_with(f, variable_format),
        }
    }
}

impl Debug for Objective {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.name)?;
        self.format_debug(f)
    }
}
