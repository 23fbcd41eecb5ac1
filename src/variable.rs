//! A [Variable] is the base element used to create an [Expr].
//! The goal of the solver is to find optimal values for all variables in a model.
//!
//! Each variable is created from a [VariableDefinition] that sets its domain, bounds and name.
//! The [VariableRegistry] stores them in creation order; that order fixes the column
//! order of exported models and the dense index used by in-process engines.
use std::collections::Bound;
use std::fmt::Formatter;
use std::ops::RangeBounds;

use crate::counter::NameCounter;
use crate::error::BoundsError;
use crate::expression::Expr;

/// A variable in a model. Use variables to create [expressions](Expr),
/// to express the [objective](crate::Model::maximize) and the
/// [constraints](crate::Model::add_le) of your model.
///
/// ## Warning
/// `Eq` is implemented on this type, but
/// `v1 == v2` is true only if the two variables represent the same object,
/// not if they have the same definition or the same name.
///
/// ```
/// # use lp_bridge::{variable, Model};
/// let mut model = Model::new();
/// let v1 = model.add(variable().min(1).max(8).name("v"))?;
/// let v2 = model.add(variable().min(1).max(8).name("v"))?;
/// assert_ne!(v1, v2);
///
/// let v1_copy = v1;
/// assert_eq!(v1, v1_copy);
/// # Ok::<_, lp_bridge::ModelError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    /// A variable is nothing more than an index into the `variables` field of a VariableRegistry
    /// That's why it can be `Copy`.
    index: usize,
    /// The domain never changes after creation, so it travels with the handle
    kind: VariableKind,
}

impl Variable {
    /// No one should use this method outside of [VariableRegistry]
    fn at(index: usize, kind: VariableKind) -> Self {
        Self { index, kind }
    }

    /// Position of the variable in its registry
    pub fn index(&self) -> usize {
        self.index
    }

    /// The domain of the variable
    pub fn kind(&self) -> VariableKind {
        self.kind
    }
}

/// The domain of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum VariableKind {
    /// Takes any real value between its bounds
    #[default]
    Continuous,
    /// Takes integer values between its bounds
    Integer,
    /// Takes the value 0 or 1
    Binary,
}

impl VariableKind {
    /// Integer and binary variables only take integral values
    pub fn is_integer(self) -> bool {
        matches!(self, VariableKind::Integer | VariableKind::Binary)
    }

    /// The bounds a fresh variable of this kind gets
    pub fn default_bounds(self) -> (f64, f64) {
        match self {
            VariableKind::Binary => (0., 1.),
            VariableKind::Continuous | VariableKind::Integer => (0., f64::INFINITY),
        }
    }

    fn name_prefix(self) -> &'static str {
        match self {
            VariableKind::Continuous => "NumVar_",
            VariableKind::Integer => "IntVar_",
            VariableKind::Binary => "BoolVar_",
        }
    }
}

/// An element that can be displayed if you give a variable display function
pub trait FormatWithVars {
    /// Write the element to the formatter. See [std::fmt::Display]
    fn format_with<FUN>(&self, f: &mut Formatter<'_>, variable_format: FUN) -> std::fmt::Result
    where
        FUN: FnMut(&mut Formatter<'_>, Variable) -> std::fmt::Result;

    /// Write the elements, naming the variables v0, v1, ... vn
    fn format_debug(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.format_with(f, |f, var| write!(f, "v{}", var.index()))
    }
}

/// Defines the properties of a variable, such as its domain and its bounds.
#[derive(Clone, PartialEq, Debug)]
pub struct VariableDefinition {
    pub(crate) kind: VariableKind,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) name: Option<String>,
}

impl VariableDefinition {
    /// Creates a continuous variable with the default bounds `[0, +∞)`
    pub fn new() -> Self {
        VariableDefinition {
            kind: VariableKind::Continuous,
            min: None,
            max: None,
            name: None,
        }
    }

    /// Make the variable integer
    pub fn integer(mut self) -> Self {
        self.kind = VariableKind::Integer;
        self
    }

    /// Make the variable binary: an integer variable restricted to `[0, 1]`
    pub fn binary(mut self) -> Self {
        self.kind = VariableKind::Binary;
        self
    }

    /// Make the variable continuous (the default)
    pub fn continuous(mut self) -> Self {
        self.kind = VariableKind::Continuous;
        self
    }

    /// Set the lower and/or higher bounds of the variable
    ///
    /// ## Examples
    /// ```
    /// # use lp_bridge::variable;
    /// assert_eq!(
    ///     variable().bounds(1..2),
    ///     variable().min(1).max(2)
    /// );
    ///
    /// assert_eq!(
    ///     variable().bounds(1..),
    ///     variable().min(1).max(f64::INFINITY)
    /// );
    /// ```
    pub fn bounds<N: Into<f64> + Copy, B: RangeBounds<N>>(self, bounds: B) -> Self {
        self.min(match bounds.start_bound() {
            Bound::Included(&x) => x.into(),
            Bound::Excluded(&x) => x.into(),
            Bound::Unbounded => f64::NEG_INFINITY,
        })
        .max(match bounds.end_bound() {
            Bound::Included(&x) => x.into(),
            Bound::Excluded(&x) => x.into(),
            Bound::Unbounded => f64::INFINITY,
        })
    }

    /// Set the lower bound of the variable
    pub fn min<N: Into<f64>>(mut self, min: N) -> Self {
        self.min = Some(min.into());
        self
    }
    /// Set the higher bound of the variable
    pub fn max<N: Into<f64>>(mut self, max: N) -> Self {
        self.max = Some(max.into());
        self
    }

    /// Set both the lower and higher bounds of the variable
    pub fn clamp<N1: Into<f64>, N2: Into<f64>>(self, min: N1, max: N2) -> Self {
        self.min(min).max(max)
    }

    /// Set the display name of the variable.
    /// Names don't need to be unique, but solutions read back from a file
    /// are matched to variables by name.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Creates a continuous variable with bounds `[0, +∞)`
impl Default for VariableDefinition {
    fn default() -> Self {
        VariableDefinition::new()
    }
}

/// Returns an anonymous continuous variable definition with bounds `[0, +∞)`
pub fn variable() -> VariableDefinition {
    VariableDefinition::default()
}

/// What the registry knows about a variable
#[derive(Clone, PartialEq, Debug)]
pub struct VariableData {
    pub(crate) name: String,
    pub(crate) kind: VariableKind,
    pub(crate) lower: f64,
    pub(crate) upper: f64,
}

impl VariableData {
    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Domain of the variable
    pub fn kind(&self) -> VariableKind {
        self.kind
    }

    /// Lower bound
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Upper bound
    pub fn upper(&self) -> f64 {
        self.upper
    }
}

fn check_bounds(kind: VariableKind, lower: f64, upper: f64) -> Result<(), BoundsError> {
    if lower.is_nan() || upper.is_nan() {
        return Err(BoundsError::NotANumber);
    }
    if lower > upper {
        return Err(BoundsError::Inverted { lower, upper });
    }
    if kind == VariableKind::Binary && (lower < 0. || upper > 1.) {
        return Err(BoundsError::NotBinary { lower, upper });
    }
    Ok(())
}

/// Represents the variables of a model, in creation order.
#[derive(Default, Clone, Debug)]
pub struct VariableRegistry {
    variables: Vec<VariableData>,
}

impl VariableRegistry {
    /// Create an empty list of variables
    pub fn new() -> Self {
        VariableRegistry { variables: vec![] }
    }

    /// Add a variable with the given definition.
    /// Unnamed variables get a name of the form `IntVar_12` from `counter`.
    pub fn add(
        &mut self,
        var_def: VariableDefinition,
        counter: &NameCounter,
    ) -> Result<Variable, BoundsError> {
        let VariableDefinition {
            kind,
            min,
            max,
            name,
        } = var_def;
        let (default_min, default_max) = kind.default_bounds();
        let lower = min.unwrap_or(default_min);
        let upper = max.unwrap_or(default_max);
        check_bounds(kind, lower, upper)?;
        let name = match name {
            Some(name) => name,
            None => format!("{}{}", kind.name_prefix(), counter.next_variable()),
        };
        let index = self.variables.len();
        self.variables.push(VariableData {
            name,
            kind,
            lower,
            upper,
        });
        Ok(Variable::at(index, kind))
    }

    /// The stored properties of a variable
    ///
    /// ## Panics
    /// When the variable belongs to another registry with more variables
    pub fn get(&self, var: Variable) -> &VariableData {
        &self.variables[var.index()]
    }

    /// The display name of a variable
    pub fn name(&self, var: Variable) -> &str {
        &self.get(var).name
    }

    /// Change the display name of a variable
    pub fn set_name<S: Into<String>>(&mut self, var: Variable, name: S) {
        self.variables[var.index()].name = name.into();
    }

    /// `(lower, upper)` bounds of a variable
    pub fn bounds(&self, var: Variable) -> (f64, f64) {
        let data = self.get(var);
        (data.lower, data.upper)
    }

    /// Set the lower bound. Fails, leaving the variable unchanged,
    /// when the new bound would be greater than the upper bound.
    pub fn set_lower_bound(&mut self, var: Variable, lower: f64) -> Result<(), BoundsError> {
        let upper = self.get(var).upper;
        self.set_bounds(var, lower, upper)
    }

    /// Set the upper bound. Fails, leaving the variable unchanged,
    /// when the new bound would be smaller than the lower bound.
    pub fn set_upper_bound(&mut self, var: Variable, upper: f64) -> Result<(), BoundsError> {
        let lower = self.get(var).lower;
        self.set_bounds(var, lower, upper)
    }

    /// Set both bounds at once
    pub fn set_bounds(&mut self, var: Variable, lower: f64, upper: f64) -> Result<(), BoundsError> {
        let data = &mut self.variables[var.index()];
        check_bounds(data.kind, lower, upper)?;
        data.lower = lower;
        data.upper = upper;
        Ok(())
    }

    /// The first variable registered with the given name
    pub fn find_by_name(&self, name: &str) -> Option<Variable> {
        self.iter_variables_with_def()
            .find(|(_, data)| data.name == name)
            .map(|(var, _)| var)
    }

    /// Iterates over the couples of variables with their properties, in creation order
    pub fn iter_variables_with_def(&self) -> impl Iterator<Item = (Variable, &VariableData)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(i, data)| (Variable::at(i, data.kind), data))
    }

    /// The number of variables
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true when no variables have been added
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Display an expression or a constraint with the names of these variables
    pub fn display<'a, T: FormatWithVars>(&'a self, item: &'a T) -> WithNames<'a, T> {
        WithNames {
            item,
            variables: self,
        }
    }
}

/// Displays an element with the display names of its variables.
/// Returned by [VariableRegistry::display].
pub struct WithNames<'a, T> {
    item: &'a T,
    variables: &'a VariableRegistry,
}

impl<T: FormatWithVars> std::fmt::Display for WithNames<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.item
            .format_with(f, |f, var| f.write_str(self.variables.name(var)))
    }
}

impl From<Variable> for Expr {
    fn from(var: Variable) -> Self {
        Expr::Var(var)
    }
}
