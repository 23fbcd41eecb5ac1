use std::fmt::{Debug, Formatter};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use crate::canonical;
use crate::error::Result;
use crate::linear_expression::{Canonical, LinearExpression};
use crate::variable::{FormatWithVars, Variable};

/// A numeric constant, integer or floating point.
/// Integer constants keep an expression integer when all its variables are integer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// An exact integer
    Int(i64),
    /// A floating point number
    Float(f64),
}

impl Scalar {
    /// The value as a float
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Int(i) => i as f64,
            Scalar::Float(x) => x,
        }
    }

    /// True for [Scalar::Int]
    pub fn is_integer(self) -> bool {
        matches!(self, Scalar::Int(_))
    }
}

macro_rules! impl_scalar_from {
    ($variant:ident: $($num:ty),*) => {$(
        impl From<$num> for Scalar {
            fn from(x: $num) -> Scalar { Scalar::$variant(x.into()) }
        }
    )*};
}

impl_scalar_from!(Int: i64, i32, i16, i8, u32, u16, u8);
impl_scalar_from!(Float: f64, f32);

/// A node of an expression tree.
///
/// Building expressions with `+`, `-` and `*` only records the operations;
/// the tree is flattened into a [LinearExpression] once, when it is needed
/// by a constraint, the objective or an export.
///
/// ```
/// # use lp_bridge::{variable, Model, Expr};
/// let mut model = Model::new();
/// let x = model.add(variable().integer())?;
/// let y = model.add(variable())?;
/// let e: Expr = 9 * (x - y * 2.) + 4 * x / 2 - 1;
/// let flat = e.flatten_continuous()?;
/// assert_eq!(flat.coefficient(x), 11.);
/// assert_eq!(flat.coefficient(y), -18.);
/// assert_eq!(flat.constant(), -1.);
/// # Ok::<_, lp_bridge::ModelError>(())
/// ```
#[derive(Clone, PartialEq)]
pub enum Expr {
    /// A constant
    Constant(Scalar),
    /// A single variable with coefficient 1
    Var(Variable),
    /// The sum of the children
    Sum(Vec<Expr>),
    /// The product of the children. At most one child may contain variables.
    Product(Vec<Expr>),
    /// An expression that is already flattened
    Linear(Canonical),
}

impl Expr {
    /// A constant expression
    pub fn constant<N: Into<Scalar>>(value: N) -> Expr {
        Expr::Constant(value.into())
    }

    /// A deferred sum of expressions
    pub fn sum<I>(exprs: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Expr::Sum(exprs.into_iter().map(Into::into).collect())
    }

    /// A deferred product of a scalar and an expression
    pub fn product<N: Into<Scalar>, E: Into<Expr>>(factor: N, expr: E) -> Expr {
        Expr::Product(vec![Expr::Constant(factor.into()), expr.into()])
    }

    /// Flatten the tree into canonical form, integer when every operand is integer
    pub fn flatten(&self) -> Result<Canonical> {
        canonical::flatten(self)
    }

    /// Flatten the tree into a continuous canonical form
    pub fn flatten_continuous(&self) -> Result<LinearExpression<f64>> {
        canonical::flatten_continuous(self)
    }

    /// Flatten the tree into an integer canonical form.
    /// Fails if any operand is continuous.
    pub fn flatten_integer(&self) -> Result<LinearExpression<i64>> {
        canonical::flatten_integer(self)
    }

    fn push_term(self, rhs: Expr) -> Expr {
        match self {
            Expr::Sum(mut children) => {
                children.push(rhs);
                Expr::Sum(children)
            }
            lhs => Expr::Sum(vec![lhs, rhs]),
        }
    }
}

impl Default for Expr {
    fn default() -> Self {
        Expr::Constant(Scalar::Int(0))
    }
}

impl FormatWithVars for Expr {
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, mut variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result,
    {
        self.format_tree(f, &mut variable_format)
    }
}

type VariableFormat<'a> = dyn FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result + 'a;

impl Expr {
    fn format_tree(&self, f: &mut Formatter<'_>, vf: &mut VariableFormat<'_>) -> std::fmt::Result {
        match self {
            Expr::Constant(Scalar::Int(i)) => write!(f, "{}", i),
            Expr::Constant(Scalar::Float(x)) => write!(f, "{}", x),
            Expr::Var(var) => vf(f, *var),
            Expr::Sum(children) | Expr::Product(children) => {
                let op = if matches!(self, Expr::Sum(_)) { " + " } else { " * " };
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{}", op)?;
                    }
                    child.format_tree(f, vf)?;
                }
                write!(f, ")")
            }
            Expr::Linear(c) => c.format_with(f, |f, v| vf(f, v)),
        }
    }
}

impl Debug for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_debug(f)
    }
}

impl<RHS: Into<Expr>> Add<RHS> for Expr {
    type Output = Expr;

    fn add(self, rhs: RHS) -> Self::Output {
        self.push_term(rhs.into())
    }
}

impl<RHS: Into<Expr>> Sub<RHS> for Expr {
    type Output = Expr;

    fn sub(self, rhs: RHS) -> Self::Output {
        let rhs: Expr = rhs.into();
        self.push_term(-rhs)
    }
}

impl<RHS: Into<Expr>> AddAssign<RHS> for Expr {
    fn add_assign(&mut self, rhs: RHS) {
        *self = std::mem::take(self) + rhs;
    }
}

impl<RHS: Into<Expr>> SubAssign<RHS> for Expr {
    fn sub_assign(&mut self, rhs: RHS) {
        *self = std::mem::take(self) - rhs;
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        Expr::product(-1, self)
    }
}

/// Only linear when at least one side is constant, which is checked on flattening
impl Mul<Expr> for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Self::Output {
        Expr::Product(vec![self, rhs])
    }
}

impl<RHS: Into<Expr>> Add<RHS> for Variable {
    type Output = Expr;

    fn add(self, rhs: RHS) -> Self::Output {
        Expr::from(self) + rhs
    }
}

impl<RHS: Into<Expr>> Sub<RHS> for Variable {
    type Output = Expr;

    fn sub(self, rhs: RHS) -> Self::Output {
        Expr::from(self) - rhs
    }
}

impl Neg for Variable {
    type Output = Expr;

    fn neg(self) -> Self::Output {
        -Expr::from(self)
    }
}

// Macro for implementing arithmetic operations between expressions and numeric types
macro_rules! impl_expr_ops_for_num {
    ($($num:ty),*) => {$(
        impl Mul<$num> for Expr {
            type Output = Expr;
            fn mul(self, rhs: $num) -> Self::Output {
                Expr::product(rhs, self)
            }
        }

        impl Mul<$num> for Variable {
            type Output = Expr;
            fn mul(self, rhs: $num) -> Self::Output {
                Expr::product(rhs, self)
            }
        }

        impl Div<$num> for Expr {
            type Output = Expr;
            fn div(self, rhs: $num) -> Self::Output {
                Expr::product(1.0 / rhs as f64, self)
            }
        }

        impl Div<$num> for Variable {
            type Output = Expr;
            fn div(self, rhs: $num) -> Self::Output {
                Expr::product(1.0 / rhs as f64, self)
            }
        }

        impl Mul<Expr> for $num {
            type Output = Expr;
            fn mul(self, rhs: Expr) -> Self::Output {
                Expr::product(self, rhs)
            }
        }

        impl Mul<Variable> for $num {
            type Output = Expr;
            fn mul(self, rhs: Variable) -> Self::Output {
                Expr::product(self, rhs)
            }
        }

        impl Add<Expr> for $num {
            type Output = Expr;
            fn add(self, rhs: Expr) -> Self::Output {
                Expr::from(self) + rhs
            }
        }

        impl Add<Variable> for $num {
            type Output = Expr;
            fn add(self, rhs: Variable) -> Self::Output {
                Expr::from(self) + rhs
            }
        }

        impl Sub<Expr> for $num {
            type Output = Expr;
            fn sub(self, rhs: Expr) -> Self::Output {
                Expr::from(self) - rhs
            }
        }

        impl Sub<Variable> for $num {
            type Output = Expr;
            fn sub(self, rhs: Variable) -> Self::Output {
                Expr::from(self) - rhs
            }
        }

        impl From<$num> for Expr {
            fn from(x: $num) -> Expr { Expr::Constant(x.into()) }
        }
    )*};
}

impl_expr_ops_for_num!(f64, f32, i64, i32, i16, i8, u32, u16, u8);

impl From<Scalar> for Expr {
    fn from(x: Scalar) -> Expr {
        Expr::Constant(x)
    }
}

impl From<&Variable> for Expr {
    fn from(var: &Variable) -> Expr {
        Expr::Var(*var)
    }
}

impl From<&Expr> for Expr {
    fn from(expr: &Expr) -> Expr {
        expr.clone()
    }
}

impl From<Canonical> for Expr {
    fn from(c: Canonical) -> Expr {
        Expr::Linear(c)
    }
}

impl From<LinearExpression<f64>> for Expr {
    fn from(e: LinearExpression<f64>) -> Expr {
        Expr::Linear(Canonical::Continuous(e))
    }
}

impl From<LinearExpression<i64>> for Expr {
    fn from(e: LinearExpression<i64>) -> Expr {
        Expr::Linear(Canonical::Integer(e))
    }
}

impl<E: Into<Expr>> std::iter::Sum<E> for Expr {
    fn sum<I: Iterator<Item = E>>(iter: I) -> Self {
        Expr::sum(iter)
    }
}
