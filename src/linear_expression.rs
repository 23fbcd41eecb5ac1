//! The canonical form of a linear expression: one coefficient per variable plus a constant.
//!
//! Integer expressions use `i64` coefficients, continuous ones use `f64`.
//! Exact zero coefficients are never stored.
use std::fmt::{Debug, Display, Formatter};

use fnv::FnvHashMap as HashMap;

use crate::error::ExpressionTypeError;
use crate::variable::{FormatWithVars, Variable};

/// A numeric type that can be used as the coefficient of a [LinearExpression]
pub trait Coefficient:
    Copy
    + PartialEq
    + PartialOrd
    + Debug
    + Display
    + Default
    + 'static
{
    /// The type of [Coefficient::magnitude]
    type Magnitude: Display;

    /// Additive identity
    const ZERO: Self;
    /// Multiplicative identity
    const ONE: Self;

    /// Widen the value to a float
    fn to_f64(self) -> f64;

    /// Absolute value, in a type where it always fits
    fn magnitude(self) -> Self::Magnitude;

    /// `self + rhs`, or `None` when the result is not representable
    fn checked_add(self, rhs: Self) -> Option<Self>;

    /// `self - rhs`, or `None` when the result is not representable
    fn checked_sub(self, rhs: Self) -> Option<Self>;

    /// `self * rhs`, or `None` when the result is not representable
    fn checked_mul(self, rhs: Self) -> Option<Self>;

    /// `-self`, or `None` when the result is not representable
    fn checked_neg(self) -> Option<Self>;

    /// True for the additive identity
    #[inline]
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl Coefficient for i64 {
    type Magnitude = u64;

    const ZERO: Self = 0;
    const ONE: Self = 1;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn magnitude(self) -> u64 {
        self.unsigned_abs()
    }

    #[inline]
    fn checked_add(self, rhs: Self) -> Option<Self> {
        i64::checked_add(self, rhs)
    }

    #[inline]
    fn checked_sub(self, rhs: Self) -> Option<Self> {
        i64::checked_sub(self, rhs)
    }

    #[inline]
    fn checked_mul(self, rhs: Self) -> Option<Self> {
        i64::checked_mul(self, rhs)
    }

    #[inline]
    fn checked_neg(self) -> Option<Self> {
        i64::checked_neg(self)
    }
}

/// Float results that are no longer finite count as overflows
#[inline]
fn finite(x: f64) -> Option<f64> {
    if x.is_finite() {
        Some(x)
    } else {
        None
    }
}

impl Coefficient for f64 {
    type Magnitude = f64;

    const ZERO: Self = 0.;
    const ONE: Self = 1.;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn magnitude(self) -> f64 {
        self.abs()
    }

    #[inline]
    fn checked_add(self, rhs: Self) -> Option<Self> {
        finite(self + rhs)
    }

    #[inline]
    fn checked_sub(self, rhs: Self) -> Option<Self> {
        finite(self - rhs)
    }

    #[inline]
    fn checked_mul(self, rhs: Self) -> Option<Self> {
        finite(self * rhs)
    }

    #[inline]
    fn checked_neg(self) -> Option<Self> {
        finite(-self)
    }
}

/// A linear expression in canonical form, such as `2 x - 3 y + 7`.
///
/// Each variable appears at most once. Expressions are values: combining
/// two of them produces a new expression and never modifies the operands
/// once they are stored in a constraint.
#[derive(Clone, PartialEq, Default)]
pub struct LinearExpression<N = f64> {
    pub(crate) coefficients: HashMap<Variable, N>,
    pub(crate) constant: N,
}

impl<N: Coefficient> LinearExpression<N> {
    /// The expression `0`
    pub fn new() -> Self {
        LinearExpression {
            coefficients: HashMap::default(),
            constant: N::ZERO,
        }
    }

    /// Create an expression that has the value 0, but has memory allocated
    /// for `capacity` coefficients.
    pub fn with_capacity(capacity: usize) -> Self {
        LinearExpression {
            coefficients: HashMap::with_capacity_and_hasher(capacity, Default::default()),
            constant: N::ZERO,
        }
    }

    /// A constant expression
    pub fn from_constant(constant: N) -> Self {
        LinearExpression {
            constant,
            ..Self::new()
        }
    }

    /// The expression `1 * var`
    pub fn from_variable(var: Variable) -> Self {
        let mut expr = Self::with_capacity(1);
        expr.coefficients.insert(var, N::ONE);
        expr
    }

    /// The coefficient of `var`, zero when it doesn't appear
    pub fn coefficient(&self, var: Variable) -> N {
        self.coefficients.get(&var).copied().unwrap_or(N::ZERO)
    }

    /// The constant term
    pub fn constant(&self) -> N {
        self.constant
    }

    /// An iterator over variables and their coefficients, in no particular order
    pub fn linear_coefficients(&self) -> impl Iterator<Item = (Variable, N)> + '_ {
        self.coefficients.iter().map(|(&var, &c)| (var, c))
    }

    /// The terms ordered by variable creation order
    pub fn sorted_terms(&self) -> Vec<(Variable, N)> {
        let mut terms: Vec<_> = self.linear_coefficients().collect();
        terms.sort_unstable_by_key(|&(var, _)| var.index());
        terms
    }

    /// The number of variables with a non-zero coefficient
    pub fn len(&self) -> usize {
        self.coefficients.len()
    }

    /// True when the expression has no variables
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Performs self = self + coefficient * var.
    /// On overflow the expression is left unchanged.
    #[inline]
    pub fn add_term(&mut self, var: Variable, coefficient: N) -> Result<(), ExpressionTypeError> {
        let sum = self
            .coefficient(var)
            .checked_add(coefficient)
            .ok_or(ExpressionTypeError::Overflow)?;
        if sum.is_zero() {
            self.coefficients.remove(&var);
        } else {
            self.coefficients.insert(var, sum);
        }
        Ok(())
    }

    /// Add a constant term to this expression
    pub fn add_constant(&mut self, value: N) -> Result<(), ExpressionTypeError> {
        self.constant = self
            .constant
            .checked_add(value)
            .ok_or(ExpressionTypeError::Overflow)?;
        Ok(())
    }

    /// Performs self = self + (factor * other)
    pub fn add_mul(&mut self, factor: N, other: &LinearExpression<N>) -> Result<(), ExpressionTypeError> {
        for (var, c) in other.linear_coefficients() {
            let term = factor.checked_mul(c).ok_or(ExpressionTypeError::Overflow)?;
            self.add_term(var, term)?;
        }
        let constant = factor
            .checked_mul(other.constant)
            .ok_or(ExpressionTypeError::Overflow)?;
        self.add_constant(constant)
    }

    /// Multiply every coefficient and the constant by `factor`
    pub fn scale(&mut self, factor: N) -> Result<(), ExpressionTypeError> {
        if factor.is_zero() {
            self.coefficients.clear();
        } else {
            for value in self.coefficients.values_mut() {
                *value = value.checked_mul(factor).ok_or(ExpressionTypeError::Overflow)?;
            }
        }
        self.constant = self
            .constant
            .checked_mul(factor)
            .ok_or(ExpressionTypeError::Overflow)?;
        Ok(())
    }

    /// Widen the coefficients to floats
    pub fn to_continuous(&self) -> LinearExpression<f64> {
        LinearExpression {
            coefficients: self
                .coefficients
                .iter()
                .map(|(&var, &c)| (var, c.to_f64()))
                .collect(),
            constant: self.constant.to_f64(),
        }
    }

    /// Evaluate the expression given a value for each variable
    pub fn eval_with<F: Fn(Variable) -> f64>(&self, value: F) -> f64 {
        self.constant.to_f64()
            + self
                .linear_coefficients()
                .map(|(var, c)| c.to_f64() * value(var))
                .sum::<f64>()
    }
}

impl<N: Coefficient> FormatWithVars for LinearExpression<N> {
    /// Writes the terms in variable order as `3 x - 2 y + 4`:
    /// a sign token precedes every term but a positive first one,
    /// and coefficients are always written as magnitudes.
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, mut variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        let mut first = true;
        let mut write_sign = |f: &mut Formatter<'_>, value: N| -> std::fmt::Result {
            let negative = value < N::ZERO;
            let sign = match (first, negative) {
                (true, false) => "",
                (true, true) => "- ",
                (false, false) => " + ",
                (false, true) => " - ",
            };
            first = false;
            write!(f, "{}{}", sign, value.magnitude())
        };
        for (var, coeff) in self.sorted_terms() {
            if coeff.is_zero() {
                continue;
            }
            write_sign(f, coeff)?;
            write!(f, " ")?;
            variable_format(f, var)?;
        }
        if !self.constant.is_zero() {
            write_sign(f, self.constant)?;
        }
        if first {
            write!(f, "0")?;
        }
        Ok(())
    }
}

impl<N: Coefficient> Debug for LinearExpression<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_debug(f)
    }
}

/// A flattened expression, integer when every operand was integer
#[derive(Clone, PartialEq)]
pub enum Canonical {
    /// Only integer variables, integer coefficients and an integer constant
    Integer(LinearExpression<i64>),
    /// Anything else
    Continuous(LinearExpression<f64>),
}

impl Canonical {
    /// True for [Canonical::Integer]
    pub fn is_integer(&self) -> bool {
        matches!(self, Canonical::Integer(_))
    }

    /// True when no variable has a non-zero coefficient
    pub fn is_constant(&self) -> bool {
        match self {
            Canonical::Integer(e) => e.is_constant(),
            Canonical::Continuous(e) => e.is_constant(),
        }
    }

    /// The constant term, as a float
    pub fn constant(&self) -> f64 {
        match self {
            Canonical::Integer(e) => e.constant.to_f64(),
            Canonical::Continuous(e) => e.constant,
        }
    }

    /// Promote to a continuous expression. Never fails.
    pub fn into_continuous(self) -> LinearExpression<f64> {
        match self {
            Canonical::Integer(e) => e.to_continuous(),
            Canonical::Continuous(e) => e,
        }
    }

    /// Get the integer expression, failing for a continuous one
    pub fn into_integer(self) -> Result<LinearExpression<i64>, ExpressionTypeError> {
        match self {
            Canonical::Integer(e) => Ok(e),
            Canonical::Continuous(_) => Err(ExpressionTypeError::Narrowing),
        }
    }
}

impl FormatWithVars for Canonical {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        match self {
            Canonical::Integer(e) => e.format_with(f, variable_format),
            Canonical::Continuous(e) => e.format_with(f, variable_format),
        }
    }
}

impl From<LinearExpression<f64>> for Canonical {
    fn from(e: LinearExpression<f64>) -> Self {
        Canonical::Continuous(e)
    }
}

impl Debug for Canonical {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_debug(f)
    }
}

impl From<LinearExpression<i64>> for Canonical {
    fn from(e: LinearExpression<i64>) -> Self {
        Canonical::Integer(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{variable, Model};

    #[test]
    fn add_term_merges_and_prunes() {
        let mut model = Model::new();
        let x = model.add(variable()).unwrap();
        let mut e = LinearExpression::<i64>::new();
        e.add_term(x, 2).unwrap();
        e.add_term(x, 3).unwrap();
        assert_eq!(e.coefficient(x), 5);
        e.add_term(x, -5).unwrap();
        assert!(e.is_constant());
        assert_eq!(e.len(), 0);
    }

    #[test]
    fn integer_overflow_is_an_error() {
        let mut model = Model::new();
        let x = model.add(variable().integer()).unwrap();
        let mut e = LinearExpression::<i64>::new();
        e.add_term(x, i64::MAX).unwrap();
        assert_eq!(e.add_term(x, 2), Err(ExpressionTypeError::Overflow));
        // left unchanged
        assert_eq!(e.coefficient(x), i64::MAX);
        assert_eq!(e.scale(2), Err(ExpressionTypeError::Overflow));
        let mut c = LinearExpression::<i64>::from_constant(i64::MIN);
        assert_eq!(c.scale(-1), Err(ExpressionTypeError::Overflow));
        assert_eq!(
            LinearExpression::<f64>::from_constant(f64::MAX).add_constant(f64::MAX),
            Err(ExpressionTypeError::Overflow)
        );
    }

    #[test]
    fn scale_by_zero_clears_terms() {
        let mut model = Model::new();
        let x = model.add(variable()).unwrap();
        let mut e = LinearExpression::<f64>::from_variable(x);
        e.add_constant(4.).unwrap();
        e.scale(0.).unwrap();
        assert!(e.is_constant());
        assert_eq!(e.constant(), 0.);
    }

    #[test]
    fn format_signs_and_magnitudes() {
        let mut model = Model::new();
        let x = model.add(variable()).unwrap();
        let y = model.add(variable()).unwrap();
        let mut e = LinearExpression::<f64>::new();
        e.add_term(y, -2.5).unwrap();
        e.add_term(x, -1.).unwrap();
        e.add_constant(3.).unwrap();
        assert_eq!(format!("{:?}", e), "- 1 v0 - 2.5 v1 + 3");
        let mut e = LinearExpression::<i64>::from_variable(x);
        e.add_term(y, 4).unwrap();
        e.add_constant(-7).unwrap();
        assert_eq!(format!("{:?}", e), "1 v0 + 4 v1 - 7");
        let e = LinearExpression::<i64>::from_constant(i64::MIN);
        assert_eq!(format!("{:?}", e), "- 9223372036854775808");
        assert_eq!(format!("{:?}", LinearExpression::<f64>::new()), "0");
    }

    #[test]
    fn narrowing_fails() {
        let c = Canonical::Continuous(LinearExpression::from_constant(1.));
        assert_eq!(c.into_integer(), Err(ExpressionTypeError::Narrowing));
        let i = Canonical::Integer(LinearExpression::from_constant(1));
        assert_eq!(i.clone().into_integer().unwrap().constant(), 1);
        assert_eq!(i.into_continuous().constant(), 1.);
    }
}
