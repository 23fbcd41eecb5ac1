//! Flattening of expression trees into [Canonical] form.
//!
//! Sums are unrolled with an explicit stack, so long chains of additions
//! don't grow the call stack. Products fold their operands left to right:
//! the running product must stay constant until at most one operand with
//! variables has been seen.
use crate::error::{ExpressionTypeError, Result};
use crate::expression::{Expr, Scalar};
use crate::linear_expression::{Canonical, LinearExpression};
use crate::variable::Variable;

/// Flatten an expression tree. The result is integer when every
/// constant and every variable in the tree is integer.
pub fn flatten(expr: &Expr) -> Result<Canonical> {
    match expr {
        Expr::Constant(value) => from_scalar(*value),
        Expr::Var(var) => add_variable(Canonical::Integer(LinearExpression::new()), *var),
        Expr::Linear(c) => Ok(c.clone()),
        Expr::Sum(children) => flatten_sum(children),
        Expr::Product(children) => flatten_product(children),
    }
}

/// Flatten an expression tree and promote it to floating point coefficients
pub fn flatten_continuous(expr: &Expr) -> Result<LinearExpression<f64>> {
    flatten(expr).map(Canonical::into_continuous)
}

/// Flatten an expression tree that must only contain integer operands
pub fn flatten_integer(expr: &Expr) -> Result<LinearExpression<i64>> {
    match flatten(expr)? {
        Canonical::Integer(e) => Ok(e),
        Canonical::Continuous(e) => {
            let offending = e
                .sorted_terms()
                .into_iter()
                .map(|(var, _)| var)
                .find(|var| !var.kind().is_integer());
            let err = match offending {
                Some(var) => ExpressionTypeError::NotInteger {
                    index: var.index(),
                    kind: var.kind(),
                },
                None => ExpressionTypeError::Narrowing,
            };
            Err(err.into())
        }
    }
}

fn flatten_sum(children: &[Expr]) -> Result<Canonical> {
    let mut acc = Canonical::Integer(LinearExpression::with_capacity(children.len()));
    let mut stack: Vec<&Expr> = children.iter().rev().collect();
    while let Some(node) = stack.pop() {
        acc = match node {
            Expr::Sum(nested) => {
                stack.extend(nested.iter().rev());
                continue;
            }
            Expr::Var(var) => add_variable(acc, *var)?,
            Expr::Constant(value) => add(acc, from_scalar(*value)?)?,
            other => add(acc, flatten(other)?)?,
        };
    }
    Ok(acc)
}

fn flatten_product(children: &[Expr]) -> Result<Canonical> {
    let mut acc = Canonical::Integer(LinearExpression::from_constant(1));
    for child in children {
        let operand = flatten(child)?;
        acc = if acc.is_constant() {
            scale(operand, to_scalar(&acc))?
        } else if operand.is_constant() {
            scale(acc, to_scalar(&operand))?
        } else {
            return Err(ExpressionTypeError::NonLinearProduct.into());
        };
    }
    Ok(acc)
}

fn from_scalar(value: Scalar) -> Result<Canonical> {
    match value {
        Scalar::Int(i) => Ok(Canonical::Integer(LinearExpression::from_constant(i))),
        Scalar::Float(x) if x.is_finite() => {
            Ok(Canonical::Continuous(LinearExpression::from_constant(x)))
        }
        Scalar::Float(x) => Err(ExpressionTypeError::NonFinite(x).into()),
    }
}

fn to_scalar(constant: &Canonical) -> Scalar {
    match constant {
        Canonical::Integer(e) => Scalar::Int(e.constant()),
        Canonical::Continuous(e) => Scalar::Float(e.constant()),
    }
}

fn add_variable(acc: Canonical, var: Variable) -> Result<Canonical> {
    Ok(match acc {
        Canonical::Integer(mut e) if var.kind().is_integer() => {
            e.add_term(var, 1)?;
            Canonical::Integer(e)
        }
        acc => {
            let mut e = acc.into_continuous();
            e.add_term(var, 1.)?;
            Canonical::Continuous(e)
        }
    })
}

fn add(acc: Canonical, term: Canonical) -> Result<Canonical> {
    Ok(match (acc, term) {
        (Canonical::Integer(mut a), Canonical::Integer(b)) => {
            a.add_mul(1, &b)?;
            Canonical::Integer(a)
        }
        (Canonical::Continuous(mut a), Canonical::Continuous(b)) => {
            a.add_mul(1., &b)?;
            Canonical::Continuous(a)
        }
        (a, b) => {
            let mut a = a.into_continuous();
            a.add_mul(1., &b.into_continuous())?;
            Canonical::Continuous(a)
        }
    })
}

fn scale(c: Canonical, factor: Scalar) -> Result<Canonical> {
    Ok(match (c, factor) {
        (Canonical::Integer(mut e), Scalar::Int(i)) => {
            e.scale(i)?;
            Canonical::Integer(e)
        }
        (c, factor) => {
            let mut e = c.into_continuous();
            e.scale(factor.to_f64())?;
            Canonical::Continuous(e)
        }
    })
}
