//! CP model definition.

use super::variables::IntVar;
use std::collections::HashMap;
use thiserror::Error;

/// A constraint in the CP model.
///
/// Only the constraint families needed for feasibility puzzles are
/// modeled: pairwise distinctness, pinning a variable to a value, and
/// weighted sums.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constraint {
    /// All variables in the set take pairwise distinct values.
    AllDifferent {
        /// Names of integer variables.
        vars: Vec<String>,
    },

    /// A variable equals a constant.
    Equal {
        /// Name of the integer variable.
        var: String,
        /// Required value.
        value: i64,
    },

    /// `sum(coef * var) == rhs`.
    LinearEq {
        /// `(variable name, coefficient)` pairs.
        terms: Vec<(String, i64)>,
        /// Right-hand side.
        rhs: i64,
    },
}

/// Reasons a CP model is rejected before solving.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("variable {name} has an empty domain [{min}, {max}]")]
    EmptyDomain { name: String, min: i64, max: i64 },

    #[error("variable {name} repeats inside one all-different constraint")]
    RepeatedInAllDifferent { name: String },

    #[error("linear constraint has no terms")]
    EmptyLinear,
}

/// A constraint programming model.
///
/// Holds integer variables in declaration order plus a list of
/// constraints. There is no objective: solving is a feasibility query.
///
/// # Examples
///
/// ```
/// use u_formulate::cp::{CpModel, IntVar};
///
/// let mut model = CpModel::new("pair");
/// model.add_int_var(IntVar::new("a", 1, 2));
/// model.add_int_var(IntVar::new("b", 1, 2));
/// model.add_all_different(vec!["a".into(), "b".into()]);
/// model.add_equal("a", 2);
/// assert!(model.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CpModel {
    /// Model name.
    pub name: String,
    int_vars: Vec<IntVar>,
    index: HashMap<String, usize>,
    /// Constraints.
    pub constraints: Vec<Constraint>,
}

impl CpModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds an integer variable. A variable with the same name is replaced.
    pub fn add_int_var(&mut self, var: IntVar) {
        match self.index.get(&var.name) {
            Some(&i) => self.int_vars[i] = var,
            None => {
                self.index.insert(var.name.clone(), self.int_vars.len());
                self.int_vars.push(var);
            }
        }
    }

    /// Adds a constraint.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Convenience: add an all-different constraint.
    pub fn add_all_different(&mut self, vars: Vec<String>) {
        self.constraints.push(Constraint::AllDifferent { vars });
    }

    /// Convenience: pin a variable to a value.
    pub fn add_equal(&mut self, var: impl Into<String>, value: i64) {
        self.constraints.push(Constraint::Equal {
            var: var.into(),
            value,
        });
    }

    /// Convenience: weighted sum equal to `rhs`.
    pub fn add_linear_eq(&mut self, terms: Vec<(String, i64)>, rhs: i64) {
        self.constraints.push(Constraint::LinearEq { terms, rhs });
    }

    /// Convenience: plain sum of `vars` equal to `rhs`.
    pub fn add_sum_eq(&mut self, vars: Vec<String>, rhs: i64) {
        let terms = vars.into_iter().map(|v| (v, 1)).collect();
        self.add_linear_eq(terms, rhs);
    }

    /// Variables in declaration order.
    pub fn int_vars(&self) -> &[IntVar] {
        &self.int_vars
    }

    /// Position of a variable in declaration order.
    pub fn var_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Looks up a variable by name.
    pub fn int_var(&self, name: &str) -> Option<&IntVar> {
        self.var_index(name).map(|i| &self.int_vars[i])
    }

    /// Validates the model for consistency.
    ///
    /// Checks that all referenced variable names exist, that every
    /// domain is non-empty, that no all-different set names the same
    /// variable twice, and that linear constraints have terms.
    pub fn validate(&self) -> Result<(), ModelError> {
        for var in &self.int_vars {
            if var.domain_size() == 0 {
                return Err(ModelError::EmptyDomain {
                    name: var.name.clone(),
                    min: var.min,
                    max: var.max,
                });
            }
        }

        for constraint in &self.constraints {
            match constraint {
                Constraint::AllDifferent { vars } => {
                    let mut seen = std::collections::HashSet::new();
                    for name in vars {
                        if !self.index.contains_key(name) {
                            return Err(ModelError::UndefinedVariable(name.clone()));
                        }
                        if !seen.insert(name.as_str()) {
                            return Err(ModelError::RepeatedInAllDifferent { name: name.clone() });
                        }
                    }
                }
                Constraint::Equal { var, .. } => {
                    if !self.index.contains_key(var) {
                        return Err(ModelError::UndefinedVariable(var.clone()));
                    }
                }
                Constraint::LinearEq { terms, .. } => {
                    if terms.is_empty() {
                        return Err(ModelError::EmptyLinear);
                    }
                    if let Some((name, _)) =
                        terms.iter().find(|(name, _)| !self.index.contains_key(name))
                    {
                        return Err(ModelError::UndefinedVariable(name.clone()));
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns the number of integer variables.
    pub fn var_count(&self) -> usize {
        self.int_vars.len()
    }

    /// Returns the number of constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("a", 1, 3));
        model.add_int_var(IntVar::new("b", 1, 3));
        model.add_all_different(vec!["a".into(), "b".into()]);
        model.add_equal("b", 3);

        assert_eq!(model.var_count(), 2);
        assert_eq!(model.constraint_count(), 2);
        assert_eq!(model.var_index("b"), Some(1));
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("a", 1, 3));
        model.add_int_var(IntVar::new("b", 1, 3));
        model.add_int_var(IntVar::new("a", 5, 6));

        assert_eq!(model.var_count(), 2);
        assert_eq!(model.var_index("a"), Some(0));
        assert_eq!(model.int_var("a").map(|v| v.min), Some(5));
    }

    #[test]
    fn test_undefined_variable() {
        let mut model = CpModel::new("test");
        model.add_all_different(vec!["ghost".into()]);
        assert_eq!(
            model.validate(),
            Err(ModelError::UndefinedVariable("ghost".into()))
        );

        let mut model = CpModel::new("test");
        model.add_equal("ghost", 1);
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_linear_constraints() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("a", 1, 9));
        model.add_int_var(IntVar::new("b", 1, 9));
        model.add_sum_eq(vec!["a".into(), "b".into()], 10);
        model.add_linear_eq(vec![("a".into(), 2), ("b".into(), -1)], 5);

        assert_eq!(
            model.constraints[0],
            Constraint::LinearEq {
                terms: vec![("a".into(), 1), ("b".into(), 1)],
                rhs: 10
            }
        );
        assert!(model.validate().is_ok());

        model.add_sum_eq(vec!["a".into(), "ghost".into()], 3);
        assert_eq!(
            model.validate(),
            Err(ModelError::UndefinedVariable("ghost".into()))
        );
    }

    #[test]
    fn test_empty_linear() {
        let mut model = CpModel::new("test");
        model.add_linear_eq(Vec::new(), 0);
        assert_eq!(model.validate(), Err(ModelError::EmptyLinear));
    }

    #[test]
    fn test_empty_domain() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("a", 4, 2));
        assert!(matches!(
            model.validate(),
            Err(ModelError::EmptyDomain { .. })
        ));
    }

    #[test]
    fn test_repeated_in_all_different() {
        let mut model = CpModel::new("test");
        model.add_int_var(IntVar::new("a", 1, 2));
        model.add_all_different(vec!["a".into(), "a".into()]);
        assert!(matches!(
            model.validate(),
            Err(ModelError::RepeatedInAllDifferent { .. })
        ));
    }
}
