//! The [Model] owns the variables, constraints and objective of a problem,
//! and the solution of its last solve.
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::constraint::{Constraint, ConstraintReference, ConstraintType};
use crate::counter::NameCounter;
use crate::error::Result;
use crate::expression::{Expr, Scalar};
use crate::objective::{Objective, ObjectiveSense};
use crate::solution::{Solution, Status};
use crate::solvers::{default_solver, SolveStrategy};
use crate::variable::{
    FormatWithVars, Variable, VariableDefinition, VariableKind, VariableRegistry, WithNames,
};
use crate::{lp_format, sol_format};

/// A linear or mixed integer problem.
///
/// ```
/// use lp_bridge::{variable, Model, Status};
///
/// let mut model = Model::new();
/// let x = model.add(variable().name("x"))?;
/// let y = model.add(variable().name("y"))?;
/// model.add_le(x + 2 * y, 14);
/// model.add_ge(3 * x - y, 0);
/// model.add_le(x - y, 2);
/// model.maximize(3 * x + 4 * y);
///
/// assert_eq!(model.solve()?, Status::Optimal);
/// assert!((model.value(x) - 6.).abs() < 1e-6);
/// assert!((model.value(y) - 4.).abs() < 1e-6);
/// # Ok::<_, lp_bridge::ModelError>(())
/// ```
pub struct Model {
    variables: VariableRegistry,
    constraints: Vec<Constraint>,
    objective: Option<Objective>,
    solution: Solution,
    counter: Arc<NameCounter>,
}

impl Default for Model {
    fn default() -> Self {
        Model::new()
    }
}

impl Model {
    /// An empty model that numbers its default names from 0
    pub fn new() -> Self {
        Model::with_counter(Arc::new(NameCounter::new()))
    }

    /// An empty model that takes its default names from a shared counter.
    /// Use [NameCounter::global] to get names that are unique in the whole process.
    pub fn with_counter(counter: Arc<NameCounter>) -> Self {
        Model {
            variables: VariableRegistry::new(),
            constraints: vec![],
            objective: None,
            solution: Solution::default(),
            counter,
        }
    }

    /// Add a new variable with the given definition
    ///
    /// ```
    /// # use lp_bridge::{variable, Model};
    /// let mut model = Model::new();
    /// let x = model.add(variable().integer().min(2).max(3).name("x"))?;
    /// assert_eq!(model.bounds(x), (2., 3.));
    /// assert!(model.add(variable().min(3).max(2)).is_err());
    /// # Ok::<_, lp_bridge::ModelError>(())
    /// ```
    pub fn add(&mut self, definition: VariableDefinition) -> Result<Variable> {
        Ok(self.variables.add(definition, &self.counter)?)
    }

    /// Add a new variable. Without a name, it is called `NumVar_n`, `IntVar_n` or `BoolVar_n`.
    pub fn new_variable(
        &mut self,
        kind: VariableKind,
        lower: f64,
        upper: f64,
        name: Option<&str>,
    ) -> Result<Variable> {
        let mut definition = VariableDefinition::new().clamp(lower, upper);
        definition.kind = kind;
        if let Some(name) = name {
            definition = definition.name(name);
        }
        self.add(definition)
    }

    /// Add a continuous variable
    pub fn num_var<L: Into<f64>, U: Into<f64>>(
        &mut self,
        lower: L,
        upper: U,
        name: &str,
    ) -> Result<Variable> {
        self.add(VariableDefinition::new().clamp(lower, upper).name(name))
    }

    /// Add an integer variable
    pub fn int_var<L: Into<f64>, U: Into<f64>>(
        &mut self,
        lower: L,
        upper: U,
        name: &str,
    ) -> Result<Variable> {
        self.add(
            VariableDefinition::new()
                .integer()
                .clamp(lower, upper)
                .name(name),
        )
    }

    /// Add a binary variable
    pub fn bool_var(&mut self, name: &str) -> Result<Variable> {
        self.add(VariableDefinition::new().binary().name(name))
    }

    /// All the variables of the model
    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    /// The display name of a variable
    pub fn name(&self, var: Variable) -> &str {
        self.variables.name(var)
    }

    /// Rename a variable
    pub fn set_name<S: Into<String>>(&mut self, var: Variable, name: S) {
        self.variables.set_name(var, name)
    }

    /// The first variable with the given name
    pub fn find_variable(&self, name: &str) -> Option<Variable> {
        self.variables.find_by_name(name)
    }

    /// `(lower, upper)` bounds of a variable
    pub fn bounds(&self, var: Variable) -> (f64, f64) {
        self.variables.bounds(var)
    }

    /// Change the lower bound of a variable.
    /// Fails, leaving the bounds unchanged, if it would exceed the upper bound.
    ///
    /// ```
    /// # use lp_bridge::{variable, Model, ModelError};
    /// let mut model = Model::new();
    /// let x = model.add(variable().max(10))?;
    /// assert!(matches!(model.set_lower_bound(x, 100.), Err(ModelError::Validation(_))));
    /// assert_eq!(model.bounds(x), (0., 10.));
    /// # Ok::<_, ModelError>(())
    /// ```
    pub fn set_lower_bound(&mut self, var: Variable, lower: f64) -> Result<()> {
        Ok(self.variables.set_lower_bound(var, lower)?)
    }

    /// Change the upper bound of a variable.
    /// Fails, leaving the bounds unchanged, if it would be under the lower bound.
    pub fn set_upper_bound(&mut self, var: Variable, upper: f64) -> Result<()> {
        Ok(self.variables.set_upper_bound(var, upper)?)
    }

    /// Change both bounds of a variable at once
    pub fn set_bounds(&mut self, var: Variable, lower: f64, upper: f64) -> Result<()> {
        Ok(self.variables.set_bounds(var, lower, upper)?)
    }

    /// A constant expression
    pub fn constant<N: Into<Scalar>>(&self, value: N) -> Expr {
        Expr::constant(value)
    }

    /// The sum of several expressions. Flattening is deferred until the sum is used.
    pub fn sum<I>(&self, exprs: I) -> Expr
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        Expr::sum(exprs)
    }

    /// The product of a scalar and an expression
    pub fn prod<N: Into<Scalar>, E: Into<Expr>>(&self, factor: N, expr: E) -> Expr {
        Expr::product(factor, expr)
    }

    /// Add a constraint. Without a name, it is called `Constraint_n`.
    pub fn add_constraint(&mut self, mut constraint: Constraint) -> ConstraintReference {
        let number = self.counter.next_constraint();
        if constraint.name.is_none() {
            constraint.name = Some(format!("Constraint_{}", number));
        }
        let index = self.constraints.len();
        self.constraints.push(constraint);
        ConstraintReference { index }
    }

    /// Add the constraint `lhs = rhs`
    pub fn add_eq<L: Into<Expr>, R: Into<Expr>>(&mut self, lhs: L, rhs: R) -> ConstraintReference {
        self.add_constraint(Constraint::new(lhs, ConstraintType::Eq, rhs))
    }

    /// Add the constraint `lhs <= rhs`
    pub fn add_le<L: Into<Expr>, R: Into<Expr>>(&mut self, lhs: L, rhs: R) -> ConstraintReference {
        self.add_constraint(Constraint::new(lhs, ConstraintType::Le, rhs))
    }

    /// Add the constraint `lhs >= rhs`
    pub fn add_ge<L: Into<Expr>, R: Into<Expr>>(&mut self, lhs: L, rhs: R) -> ConstraintReference {
        self.add_constraint(Constraint::new(lhs, ConstraintType::Ge, rhs))
    }

    /// A constraint of this model
    pub fn constraint(&self, reference: ConstraintReference) -> &Constraint {
        &self.constraints[reference.index]
    }

    /// All constraints, in insertion order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Rename a constraint
    pub fn set_constraint_name<S: Into<String>>(&mut self, reference: ConstraintReference, name: S) {
        self.constraints[reference.index].name = Some(name.into());
    }

    /// Replace a constraint with its rebalanced form,
    /// with all the variables on the left side
    pub fn rebalance_constraint(&mut self, reference: ConstraintReference) -> Result<()> {
        let rebalanced = self.constraints[reference.index].rebalance()?;
        self.constraints[reference.index] = rebalanced;
        Ok(())
    }

    /// Set the objective, replacing the previous one. It is called `Objective_n`.
    pub fn set_objective<E: Into<Expr>>(&mut self, expr: E, sense: ObjectiveSense) {
        let name = format!("Objective_{}", self.counter.next_objective());
        self.objective = Some(Objective {
            name,
            expr: expr.into(),
            sense,
        });
    }

    /// Search for the lowest value of `expr`
    pub fn minimize<E: Into<Expr>>(&mut self, expr: E) {
        self.set_objective(expr, ObjectiveSense::Minimize)
    }

    /// Search for the highest value of `expr`
    pub fn maximize<E: Into<Expr>>(&mut self, expr: E) {
        self.set_objective(expr, ObjectiveSense::Maximize)
    }

    /// The objective, if one was set
    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Render the model in the LP text format.
    ///
    /// Fails when two variables share a name, or when a name is not a single token.
    pub fn export_model(&self) -> Result<String> {
        lp_format::export(self)
    }

    /// Write the model to a file in the LP text format
    pub fn write_model<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        lp_format::write_model(self, path)
    }

    /// Replace the current solution with one parsed from the text of a solution file
    pub fn import_solution(&mut self, text: &str) -> Result<Status> {
        self.solution = sol_format::parse_solution(text, &self.variables)?;
        Ok(self.solution.status())
    }

    /// Replace the current solution with one read from a solution file
    pub fn read_solution<P: AsRef<Path>>(&mut self, path: P) -> Result<Status> {
        self.solution = sol_format::read_solution(path, &self.variables)?;
        Ok(self.solution.status())
    }

    /// Solve the model with the default solver
    pub fn solve(&mut self) -> Result<Status> {
        let mut solver = default_solver();
        self.solve_with(solver.as_mut())
    }

    /// Solve the model with the given strategy.
    ///
    /// Infeasible and unbounded models are not errors: check the returned [Status].
    /// When the strategy fails, the status becomes [Status::Error].
    pub fn solve_with<S: SolveStrategy + ?Sized>(&mut self, solver: &mut S) -> Result<Status> {
        self.solution = Solution::new(self.variables.len());
        match solver.solve(self) {
            Ok(solution) => {
                self.solution = solution;
                debug!(
                    solver = solver.name(),
                    status = %self.solution.status(),
                    objective = ?self.solution.objective_value(),
                    "solve finished"
                );
                Ok(self.solution.status())
            }
            Err(err) => {
                self.solution.set_status(Status::Error);
                debug!(solver = solver.name(), error = %err, "solve failed");
                Err(err)
            }
        }
    }

    /// The status of the last solve
    pub fn status(&self) -> Status {
        self.solution.status()
    }

    /// The solution of the last solve
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// The value of a variable in the last solution
    pub fn value(&self, var: Variable) -> f64 {
        self.solution.value(var)
    }

    /// The objective value of the last solution
    pub fn objective_value(&self) -> Option<f64> {
        self.solution.objective_value()
    }

    /// Evaluate an expression with the values of the last solution
    pub fn eval(&self, expr: &Expr) -> Result<f64> {
        self.solution.eval(expr)
    }

    /// A [Display](std::fmt::Display)able expression that uses the names of this model's variables
    pub fn display<'a, T: FormatWithVars>(&'a self, item: &'a T) -> WithNames<'a, T> {
        self.variables.display(item)
    }
}

impl Debug for Model {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("objective", &self.objective)
            .field("status", &self.solution.status())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable;

    #[test]
    fn default_names_are_per_model() {
        let mut a = Model::new();
        let mut b = Model::new();
        let x = a.add(variable()).unwrap();
        let y = b.add(variable()).unwrap();
        assert_eq!(a.name(x), "NumVar_0");
        assert_eq!(b.name(y), "NumVar_0");
        let c = a.add_le(x, 1);
        assert_eq!(a.constraint(c).name(), Some("Constraint_0"));
    }

    #[test]
    fn shared_counter_keeps_names_unique() {
        let counter = Arc::new(NameCounter::new());
        let mut a = Model::with_counter(Arc::clone(&counter));
        let mut b = Model::with_counter(counter);
        let x = a.int_var(0, 10, "x").unwrap();
        let y = b.add(variable().integer()).unwrap();
        let z = a.add(variable().binary()).unwrap();
        assert_eq!(a.name(x), "x");
        assert_eq!(b.name(y), "IntVar_0");
        assert_eq!(a.name(z), "BoolVar_1");
    }

    #[test]
    fn new_variable_with_kind() {
        let mut model = Model::new();
        let b = model
            .new_variable(VariableKind::Binary, 0., 1., None)
            .unwrap();
        let n = model
            .new_variable(VariableKind::Integer, -3., 3., Some("n"))
            .unwrap();
        assert_eq!(b.kind(), VariableKind::Binary);
        assert_eq!(model.name(b), "BoolVar_0");
        assert_eq!(model.find_variable("n"), Some(n));
        assert_eq!(model.bounds(n), (-3., 3.));
        assert!(model
            .new_variable(VariableKind::Binary, 0., 2., None)
            .is_err());
    }

    #[test]
    fn objective_is_replaced() {
        let mut model = Model::new();
        let x = model.add(variable()).unwrap();
        model.maximize(x);
        model.minimize(2 * x);
        let objective = model.objective().unwrap();
        assert_eq!(objective.name(), "Objective_1");
        assert_eq!(objective.sense(), ObjectiveSense::Minimize);
    }

    #[test]
    fn rebalance_in_place() {
        let mut model = Model::new();
        let x = model.add(variable().name("x")).unwrap();
        let y = model.add(variable().name("y")).unwrap();
        let c = model.add_le(x + 1, y);
        model.rebalance_constraint(c).unwrap();
        let constraint = model.constraint(c);
        assert!(constraint.rhs().flatten().unwrap().is_constant());
        assert_eq!(
            model.display(constraint).to_string(),
            "1 x - 1 y <= - 1"
        );
    }

    #[test]
    fn builder_calls() {
        let model = Model::new();
        let e = model.sum([model.constant(1), model.prod(2, model.constant(3))]);
        assert_eq!(e.flatten_integer().unwrap().constant(), 7);
    }

    #[test]
    fn fresh_model_status_is_unknown() {
        let model = Model::new();
        assert_eq!(model.status(), Status::Unknown);
        assert_eq!(model.objective_value(), None);
    }
}
