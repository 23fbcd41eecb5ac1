//! Reads the solution files written by external solvers.
//!
//! ```text
//! Model status
//! Optimal
//!
//! # Primal solution values
//! Feasible
//! Objective 34
//! # Columns 2
//! x 6
//! y 4
//! # Rows 3
//! c1 14
//!
//! # Dual solution values
//! ...
//! ```
//!
//! A line reading `Infeasible` or `Unbounded` (in any case) ends the parsing:
//! the solution only carries the status. Values are matched to variables by
//! name; names the model doesn't know are ignored.
use std::path::Path;

use fnv::FnvHashMap;
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::solution::{Solution, Status};
use crate::variable::{Variable, VariableRegistry};

const PRIMAL_SECTION: &str = "# Primal solution values";
const DUAL_SECTION: &str = "# Dual solution values";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Header,
    PrimalColumns,
    PrimalRows,
    Done,
}

/// Parse the text of a solution file
pub fn parse_solution(text: &str, variables: &VariableRegistry) -> Result<Solution> {
    let mut by_name: FnvHashMap<&str, Variable> = FnvHashMap::default();
    for (var, data) in variables.iter_variables_with_def() {
        by_name.entry(data.name()).or_insert(var);
    }

    let mut solution = Solution::new(variables.len());
    let mut section = Section::Header;
    let mut assigned = 0usize;
    for (line_number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(status) = terminal_status(line) {
            solution.set_status(status);
            debug!(%status, line = line_number + 1, "solution file reports no solution");
            return Ok(solution);
        }
        if line.eq_ignore_ascii_case("optimal") {
            solution.set_status(Status::Optimal);
            continue;
        }
        if line.starts_with('#') {
            section = match section {
                _ if line.starts_with(PRIMAL_SECTION) => Section::PrimalColumns,
                _ if line.starts_with(DUAL_SECTION) => Section::Done,
                Section::PrimalColumns | Section::PrimalRows if line.starts_with("# Rows") => {
                    Section::PrimalRows
                }
                Section::PrimalColumns | Section::PrimalRows if line.starts_with("# Columns") => {
                    Section::PrimalColumns
                }
                other => other,
            };
            continue;
        }
        if section != Section::PrimalColumns {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(value), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            if line.eq_ignore_ascii_case("feasible") && solution.status() == Status::Unknown {
                solution.set_status(Status::Feasible);
            }
            continue;
        };
        let value = parse_number(value, line_number)?;
        if name.eq_ignore_ascii_case("objective") {
            solution.set_objective_value(value);
        } else if let Some(&var) = by_name.get(name) {
            solution.set_value(var, value);
            assigned += 1;
        }
    }
    debug!(status = %solution.status(), assigned, "parsed solution file");
    Ok(solution)
}

/// Read and parse a solution file
pub fn read_solution<P: AsRef<Path>>(path: P, variables: &VariableRegistry) -> Result<Solution> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        ModelError::io(format!("cannot read solution file {}", path.display()), e)
    })?;
    parse_solution(&text, variables)
}

fn terminal_status(line: &str) -> Option<Status> {
    if line.eq_ignore_ascii_case("infeasible") {
        Some(Status::Infeasible)
    } else if line.eq_ignore_ascii_case("unbounded") {
        Some(Status::Unbounded)
    } else if line.eq_ignore_ascii_case("primal infeasible or unbounded")
        || line.eq_ignore_ascii_case("infeasible or unbounded")
    {
        Some(Status::InfeasibleOrUnbounded)
    } else {
        None
    }
}

fn parse_number(token: &str, line_number: usize) -> Result<f64> {
    token.parse().map_err(|_| {
        ModelError::serialization(format!(
            "invalid number {:?} on line {} of the solution file",
            token,
            line_number + 1
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counter::NameCounter;
    use crate::variable::variable;

    fn registry(names: &[&str]) -> (VariableRegistry, Vec<Variable>) {
        let counter = NameCounter::new();
        let mut registry = VariableRegistry::new();
        let vars = names
            .iter()
            .map(|&name| registry.add(variable().name(name), &counter).unwrap())
            .collect();
        (registry, vars)
    }

    const OPTIMAL: &str = "\
Model status
Optimal

# Primal solution values
Feasible
Objective 34
# Columns 2
x 6
y 4
# Rows 3
c1 14
x 999
Constraint_1 14

# Dual solution values
Feasible
# Columns 2
x 0
y 0
";

    #[test]
    fn reads_optimal_solution() {
        let (registry, vars) = registry(&["x", "y"]);
        let solution = parse_solution(OPTIMAL, &registry).unwrap();
        assert_eq!(solution.status(), Status::Optimal);
        assert_eq!(solution.objective_value(), Some(34.));
        assert_eq!(solution.value(vars[0]), 6.);
        assert_eq!(solution.value(vars[1]), 4.);
    }

    #[test]
    fn infeasible_stops_parsing() {
        let (registry, vars) = registry(&["x"]);
        let text = "Model status\nINFEASIBLE\n# Primal solution values\nx 3\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.status(), Status::Infeasible);
        assert_eq!(solution.get(vars[0]), None);
        assert_eq!(solution.objective_value(), None);
    }

    #[test]
    fn unbounded_is_a_status() {
        let (registry, _) = registry(&["x"]);
        let solution = parse_solution("Model status\nUnbounded\n", &registry).unwrap();
        assert_eq!(solution.status(), Status::Unbounded);
        let solution =
            parse_solution("Model status\nPrimal infeasible or unbounded\n", &registry).unwrap();
        assert_eq!(solution.status(), Status::InfeasibleOrUnbounded);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let (registry, vars) = registry(&["x"]);
        let text = "Optimal\n# Primal solution values\nghost 1\nx 2.5\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.value(vars[0]), 2.5);
    }

    #[test]
    fn duplicate_names_assign_first_variable() {
        let (registry, vars) = registry(&["x", "x"]);
        let text = "Optimal\n# Primal solution values\nx 7\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.get(vars[0]), Some(7.));
        assert_eq!(solution.get(vars[1]), None);
    }

    #[test]
    fn bad_number_is_an_error() {
        let (registry, _) = registry(&["x"]);
        let text = "Optimal\n# Primal solution values\nx six\n";
        let err = parse_solution(text, &registry).unwrap_err();
        assert!(matches!(err, ModelError::Serialization { .. }));
        assert!(err.to_string().contains("line 3"), "{}", err);
    }

    #[test]
    fn values_outside_primal_section_are_ignored() {
        let (registry, vars) = registry(&["x"]);
        let text = "Optimal\nx 1\n# Primal solution values\n# Dual solution values\nx 2\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.get(vars[0]), None);
    }

    #[test]
    fn feasible_without_optimal_status() {
        let (registry, vars) = registry(&["x"]);
        let text = "Model status\nTime limit reached\n# Primal solution values\nFeasible\nx 1\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.status(), Status::Feasible);
        assert_eq!(solution.value(vars[0]), 1.);
    }

    #[test]
    fn keywords_ignore_case() {
        let (registry, vars) = registry(&["x"]);
        let text = "OPTIMAL\n# Primal solution values\nFEASIBLE\nobjective 12.5\nx 3\n";
        let solution = parse_solution(text, &registry).unwrap();
        assert_eq!(solution.status(), Status::Optimal);
        assert_eq!(solution.objective_value(), Some(12.5));
        assert_eq!(solution.value(vars[0]), 3.);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (registry, _) = registry(&["x"]);
        let err = read_solution(dir.path().join("nope.sol"), &registry).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Serialization {
                source: Some(_),
                ..
            }
        ));
    }
}
