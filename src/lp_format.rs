//! Writes a [Model] in the LP text format read by external solvers.
//!
//! ```text
//! Maximize
//! 3 x + 4 y
//! Subject To
//! c1: 1 x + 2 y <= 14
//! Bounds
//! x <= 40
//! Generals
//! Binaries
//! End
//! ```
//!
//! Terms are written in variable creation order. Every term but a positive
//! first one is preceded by a `+` or `-` token, and coefficients are written
//! as magnitudes. Constraints are rebalanced so that the right side is a
//! single constant.
//!
//! Names are written as they are, so the export fails when a variable name is
//! used twice or when a variable or constraint name is empty or contains
//! whitespace.
use std::fmt::{self, Write};
use std::path::Path;

use fnv::FnvHashMap;
use tracing::debug;

use crate::constraint::ConstraintType;
use crate::error::{ModelError, Result};
use crate::linear_expression::{Canonical, LinearExpression};
use crate::model::Model;
use crate::objective::ObjectiveSense;
use crate::variable::{VariableKind, VariableRegistry};

struct Row<'a> {
    name: &'a str,
    lhs: Canonical,
    kind: ConstraintType,
    rhs: Canonical,
}

/// Render the model. Fails if an expression of the model is not linear.
pub fn export(model: &Model) -> Result<String> {
    let variables = model.variables();
    let (sense, objective) = match model.objective() {
        Some(objective) => (objective.sense(), objective.expr().flatten()?),
        None => (ObjectiveSense::Minimize, LinearExpression::<i64>::new().into()),
    };
    let rows = model
        .constraints()
        .iter()
        .map(|constraint| {
            let (lhs, rhs) = constraint.rebalanced_sides()?;
            Ok(Row {
                name: constraint.name().unwrap_or_default(),
                lhs,
                kind: constraint.kind(),
                rhs,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    check_names(variables, &rows)?;

    let mut out = String::new();
    write_lp(&mut out, variables, sense, &objective, &rows)
        .map_err(|_| ModelError::serialization("could not format the model"))?;
    debug!(
        variables = variables.len(),
        constraints = rows.len(),
        bytes = out.len(),
        "exported model"
    );
    Ok(out)
}

/// Render the model to a file
pub fn write_model<P: AsRef<Path>>(model: &Model, path: P) -> Result<()> {
    let path = path.as_ref();
    let text = export(model)?;
    std::fs::write(path, text)
        .map_err(|e| ModelError::io(format!("cannot write {}", path.display()), e))
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}

/// Every name must be a single token, and variable names must be unique
fn check_names(variables: &VariableRegistry, rows: &[Row<'_>]) -> Result<()> {
    let mut seen: FnvHashMap<&str, usize> = FnvHashMap::default();
    for (var, data) in variables.iter_variables_with_def() {
        if !is_identifier(data.name()) {
            return Err(ModelError::serialization(format!(
                "variable {} has a name that is not a single token: {:?}",
                var.index(),
                data.name()
            )));
        }
        if let Some(first) = seen.insert(data.name(), var.index()) {
            return Err(ModelError::serialization(format!(
                "variables {} and {} are both named {:?}",
                first,
                var.index(),
                data.name()
            )));
        }
    }
    match rows.iter().find(|row| !is_identifier(row.name)) {
        Some(row) => Err(ModelError::serialization(format!(
            "constraint name {:?} is not a single token",
            row.name
        ))),
        None => Ok(()),
    }
}

fn write_lp<W: Write>(
    out: &mut W,
    variables: &VariableRegistry,
    sense: ObjectiveSense,
    objective: &Canonical,
    rows: &[Row<'_>],
) -> fmt::Result {
    writeln!(out, "{}", sense.keyword())?;
    writeln!(out, "{}", variables.display(objective))?;

    writeln!(out, "Subject To")?;
    for row in rows {
        writeln!(
            out,
            "{}: {} {} {}",
            row.name,
            variables.display(&row.lhs),
            row.kind,
            variables.display(&row.rhs)
        )?;
    }

    writeln!(out, "Bounds")?;
    for (_, data) in variables.iter_variables_with_def() {
        let (default_lower, default_upper) = data.kind().default_bounds();
        let has_lower = data.lower() != default_lower;
        let has_upper = data.upper() != default_upper;
        match (has_lower, has_upper) {
            (true, true) => writeln!(
                out,
                "{} <= {} <= {}",
                data.lower(),
                data.name(),
                data.upper()
            )?,
            (true, false) => writeln!(out, "{} <= {}", data.lower(), data.name())?,
            (false, true) => writeln!(out, "{} <= {}", data.name(), data.upper())?,
            (false, false) => {}
        }
    }

    writeln!(out, "Generals")?;
    for (_, data) in variables.iter_variables_with_def() {
        if data.kind() == VariableKind::Integer {
            writeln!(out, "{}", data.name())?;
        }
    }

    writeln!(out, "Binaries")?;
    for (_, data) in variables.iter_variables_with_def() {
        if data.kind() == VariableKind::Binary {
            writeln!(out, "{}", data.name())?;
        }
    }
    writeln!(out, "End")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{variable, Model};

    fn sample_model() -> Model {
        let mut model = Model::new();
        let x1 = model.num_var(0., 40., "x1").unwrap();
        let x2 = model.add(variable().name("x2")).unwrap();
        let x3 = model.add(variable().name("x3")).unwrap();
        let x4 = model.int_var(2, 3, "x4").unwrap();

        let c1 = model.add_le(-x1 + x2 + x3 + 10 * x4, 20);
        model.set_constraint_name(c1, "c1");
        model.add_le(x1 - 3 * x2 + x3, 30);
        model.add_le(x2 - 3.5 * x4, 30);
        model.maximize(x1 + 2 * x2 + 3 * x3 + x4);
        model
    }

    #[test]
    fn exports_sections_in_order() {
        let expected = "\
Maximize
1 x1 + 2 x2 + 3 x3 + 1 x4
Subject To
c1: - 1 x1 + 1 x2 + 1 x3 + 10 x4 <= 20
Constraint_1: 1 x1 - 3 x2 + 1 x3 <= 30
Constraint_2: 1 x2 - 3.5 x4 <= 30
Bounds
x1 <= 40
2 <= x4 <= 3
Generals
x4
Binaries
End
";
        assert_eq!(export(&sample_model()).unwrap(), expected);
    }

    #[test]
    fn export_is_deterministic() {
        let model = sample_model();
        let first = export(&model).unwrap();
        for _ in 0..10 {
            assert_eq!(export(&model).unwrap(), first);
        }
    }

    #[test]
    fn constants_and_empty_sides() {
        let mut model = Model::new();
        let x = model.bool_var("b").unwrap();
        let y = model.add(variable().integer().name("n").min(-5)).unwrap();
        model.set_lower_bound(x, 1.).unwrap();
        // variables cancel out: the left side is empty
        let c = model.add_ge(x + 2, x - 3);
        model.set_constraint_name(c, "trivial");
        let c = model.add_eq(y + 4, 1);
        model.set_constraint_name(c, "shift");
        model.minimize(-y - 7);
        let text = export(&model).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Minimize");
        assert_eq!(lines[1], "- 1 n - 7");
        assert_eq!(lines[3], "trivial: 0 >= - 5");
        assert_eq!(lines[4], "shift: 1 n = - 3");
        assert_eq!(lines[6], "1 <= b");
        assert_eq!(lines[7], "-5 <= n");
        assert_eq!(lines[9], "n");
        assert_eq!(lines[11], "b");
    }

    #[test]
    fn missing_objective_minimizes_zero() {
        let mut model = Model::new();
        model.add(variable().name("free").min(f64::NEG_INFINITY)).unwrap();
        let text = export(&model).unwrap();
        assert!(text.starts_with("Minimize\n0\nSubject To\nBounds\n-inf <= free\n"));
    }

    #[test]
    fn non_linear_constraints_fail() {
        let mut model = Model::new();
        let x = model.add(variable()).unwrap();
        model.add_le(crate::Expr::from(x) * crate::Expr::from(x), 1);
        assert!(matches!(
            export(&model),
            Err(ModelError::ExpressionType(_))
        ));
    }

    #[test]
    fn duplicate_variable_names_fail() {
        let mut model = Model::new();
        let a = model.add(variable().name("x").max(1)).unwrap();
        let b = model.add(variable().name("x").max(5)).unwrap();
        model.add_le(a + b, 4);
        model.maximize(a + 2 * b);
        let err = export(&model).unwrap_err();
        assert!(matches!(err, ModelError::Serialization { .. }));
        assert!(err.to_string().contains("\"x\""), "{}", err);
        // renaming one of them makes the model exportable
        model.set_name(b, "x_2");
        assert!(export(&model).unwrap().contains("1 x + 1 x_2 <= 4"));
    }

    #[test]
    fn names_with_whitespace_fail() {
        let mut model = Model::new();
        let v = model.add(variable().name("my var").max(3)).unwrap();
        model.maximize(v);
        assert!(matches!(
            export(&model),
            Err(ModelError::Serialization { .. })
        ));
        model.set_name(v, "my_var");
        let c = model.add_le(v, 2);
        model.set_constraint_name(c, "upper limit");
        assert!(matches!(
            export(&model),
            Err(ModelError::Serialization { .. })
        ));
        model.set_constraint_name(c, "");
        assert!(matches!(
            export(&model),
            Err(ModelError::Serialization { .. })
        ));
    }
}
