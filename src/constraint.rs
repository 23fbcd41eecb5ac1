//! Constraints define the equalities and inequalities that must hold in the solution.
use core::fmt::{Debug, Display, Formatter};
use std::ops::{Shl, Shr};

use crate::error::{ExpressionTypeError, Result};
use crate::expression::Expr;
use crate::linear_expression::{Canonical, Coefficient, LinearExpression};
use crate::variable::{FormatWithVars, Variable};

/// The relation between the two sides of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintType {
    /// `lhs = rhs`
    Eq,
    /// `lhs <= rhs`
    Le,
    /// `lhs >= rhs`
    Ge,
}

impl Display for ConstraintType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ConstraintType::Eq => "=",
            ConstraintType::Le => "<=",
            ConstraintType::Ge => ">=",
        })
    }
}

/// A constraint represents a single (in)equality that must hold in the solution.
///
/// Both sides are stored as written. [Constraint::rebalance] moves every
/// variable to the left side, leaving a single constant on the right.
#[derive(Clone, PartialEq)]
pub struct Constraint {
    pub(crate) lhs: Expr,
    pub(crate) rhs: Expr,
    pub(crate) kind: ConstraintType,
    /// Set by the model when the constraint is added, if not before
    pub(crate) name: Option<String>,
}

impl Constraint {
    /// A new unnamed constraint `lhs <kind> rhs`
    pub fn new<L: Into<Expr>, R: Into<Expr>>(lhs: L, kind: ConstraintType, rhs: R) -> Constraint {
        Constraint {
            lhs: lhs.into(),
            rhs: rhs.into(),
            kind,
            name: None,
        }
    }

    /// set the constraint name
    pub fn set_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The name of the constraint, if it has one
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The left side, as written or as rebalanced
    pub fn lhs(&self) -> &Expr {
        &self.lhs
    }

    /// The right side, as written or as rebalanced
    pub fn rhs(&self) -> &Expr {
        &self.rhs
    }

    /// The relation between the two sides
    pub fn kind(&self) -> ConstraintType {
        self.kind
    }

    /// A copy of this constraint with every variable on the left side and a
    /// single constant on the right: `lhs - rhs_vars <kind> rhs_const - lhs_const`.
    ///
    /// Rebalancing an already rebalanced constraint returns it unchanged.
    /// Fails when either side is not linear.
    pub fn rebalance(&self) -> Result<Constraint> {
        let (lhs, rhs) = self.rebalanced_sides()?;
        Ok(Constraint {
            lhs: Expr::Linear(lhs),
            rhs: Expr::Linear(rhs),
            kind: self.kind,
            name: self.name.clone(),
        })
    }

    /// The flattened left side (without constant) and the right side constant
    pub(crate) fn rebalanced_sides(&self) -> Result<(Canonical, Canonical)> {
        Ok(match (self.lhs.flatten()?, self.rhs.flatten()?) {
            (Canonical::Integer(lhs), Canonical::Integer(rhs)) => {
                let (lhs, rhs) = move_terms_left(lhs, rhs)?;
                (lhs.into(), rhs.into())
            }
            (lhs, rhs) => {
                let (lhs, rhs) = move_terms_left(lhs.into_continuous(), rhs.into_continuous())?;
                (lhs.into(), rhs.into())
            }
        })
    }

    /// The rebalanced left side and right side constant as floats,
    /// the form in-process engines consume
    pub(crate) fn sparse_row(&self) -> Result<(LinearExpression<f64>, f64)> {
        let (lhs, rhs) = self.rebalanced_sides()?;
        Ok((lhs.into_continuous(), rhs.constant()))
    }
}

fn move_terms_left<N: Coefficient>(
    mut lhs: LinearExpression<N>,
    rhs: LinearExpression<N>,
) -> std::result::Result<(LinearExpression<N>, LinearExpression<N>), ExpressionTypeError> {
    for (var, coefficient) in rhs.linear_coefficients() {
        let moved = coefficient.checked_neg().ok_or(ExpressionTypeError::Overflow)?;
        lhs.add_term(var, moved)?;
    }
    let constant = rhs
        .constant
        .checked_sub(lhs.constant)
        .ok_or(ExpressionTypeError::Overflow)?;
    lhs.constant = N::ZERO;
    Ok((lhs, LinearExpression::from_constant(constant)))
}

impl FormatWithVars for Constraint {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, mut variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        match self.rebalanced_sides() {
            Ok((lhs, rhs)) => {
                lhs.format_with(f, &mut variable_format)?;
                write!(f, " {} ", self.kind)?;
                rhs.format_with(f, variable_format)
            }
            // not linear: show both sides as they were written
            Err(_) => {
                self.lhs.format_with(f, &mut variable_format)?;
                write!(f, " {} ", self.kind)?;
                self.rhs.format_with(f, variable_format)
            }
        }
    }
}

impl Debug for Constraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(name) = &self.name {
            write!(f, "{}: ", name)?;
        }
        self.format_debug(f)
    }
}

/// equals
pub fn eq<A: Into<Expr>, B: Into<Expr>>(a: A, b: B) -> Constraint {
    Constraint::new(a, ConstraintType::Eq, b)
}

/// less than or equal
pub fn leq<A: Into<Expr>, B: Into<Expr>>(a: A, b: B) -> Constraint {
    Constraint::new(a, ConstraintType::Le, b)
}

/// greater than or equal
pub fn geq<A: Into<Expr>, B: Into<Expr>>(a: A, b: B) -> Constraint {
    Constraint::new(a, ConstraintType::Ge, b)
}

macro_rules! impl_shifts {
    ($($t:ty)*) => {$(
        impl<RHS: Into<Expr>> Shl<RHS> for $t {
            type Output = Constraint;

            fn shl(self, rhs: RHS) -> Self::Output {
                leq(self, rhs)
            }
        }

        impl<RHS: Into<Expr>> Shr<RHS> for $t {
            type Output = Constraint;

            fn shr(self, rhs: RHS) -> Self::Output {
                geq(self, rhs)
            }
        }
    )*}
}

impl_shifts!(Expr Variable);

/// This macro allows defining constraints using `a + b <= c + d`
/// instead of `leq(a + b, c + d)` or `a + b << c + d`
///
/// # Example
///
/// ```
/// # use lp_bridge::*;
/// let mut model = Model::new();
/// let a = model.add(variable().max(10))?;
/// let b = model.add(variable())?;
/// model.add_constraint(constraint!(a - 5 <= b / 2));
/// model.add_constraint(constraint!(b == a));
/// model.maximize(a + b);
/// assert_eq!(model.solve()?, Status::Optimal);
/// assert!((model.value(b) - 10.).abs() < 1e-6);
/// # Ok::<_, ModelError>(())
/// ```
#[macro_export]
macro_rules! constraint {
    ([$($left:tt)*] <= $($right:tt)*) => {
        $crate::constraint::leq($($left)*, $($right)*)
    };
    ([$($left:tt)*] >= $($right:tt)*) => {
        $crate::constraint::geq($($left)*, $($right)*)
    };
    ([$($left:tt)*] == $($right:tt)*) => {
        $crate::constraint::eq($($left)*, $($right)*)
    };
    // Stop condition: all token have been processed
    ([$($left:tt)*]) => {
        $($left:tt)*
    };
    // The next token is not a special one
    ([$($left:tt)*] $next:tt $($right:tt)*) => {
        $crate::constraint!([$($left)* $next] $($right)*)
    };
    // Initial rule: start the recursive calls
    ($($all:tt)*) => {
        $crate::constraint!([] $($all)*)
    };
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
/// A constraint reference contains the sequence id of the constraint within the model
pub struct ConstraintReference {
    pub(crate) index: usize,
}

impl ConstraintReference {
    /// Position of the constraint in its model
    pub fn index(&self) -> usize {
        self.index
    }
}
