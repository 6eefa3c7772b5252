//! Integer linear program definition.

use super::error::MipError;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_MODEL_ID: AtomicUsize = AtomicUsize::new(0);

/// Handle to a variable of one specific [`MipModel`].
///
/// Handles remember which model issued them, so using a handle with a
/// different model is caught by [`MipModel::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId {
    model: usize,
    index: usize,
}

impl VarId {
    /// Position of the variable in declaration order.
    pub fn index(&self) -> usize {
        self.index
    }
}

/// An integer variable with a lower bound and an optional upper bound.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntVarDef {
    pub name: String,
    pub lower: i64,
    /// `None` means unbounded above.
    pub upper: Option<i64>,
}

/// A sum of `coefficient * variable` terms.
///
/// # Examples
///
/// ```
/// use u_formulate::lp::{LinearExpr, MipModel};
///
/// let mut model = MipModel::new("demo");
/// let x = model.add_int_var("x", 0, None);
/// let y = model.add_int_var("y", 0, None);
/// let expr = LinearExpr::new().term(x, 2.0).term(y, -1.0);
/// assert_eq!(expr.eval(&[3.0, 4.0]), 2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`LinearExpr::add`].
    pub fn term(mut self, var: VarId, coeff: f64) -> Self {
        self.add(var, coeff);
        self
    }

    pub fn add(&mut self, var: VarId, coeff: f64) {
        self.terms.push((var, coeff));
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    /// Terms with repeated variables merged, in first-seen order.
    pub fn merged(&self) -> Vec<(VarId, f64)> {
        let mut out: Vec<(VarId, f64)> = Vec::with_capacity(self.terms.len());
        for &(var, coeff) in &self.terms {
            match out.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => out.push((var, coeff)),
            }
        }
        out
    }

    /// Evaluates the expression; `values` is indexed by declaration order.
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(v, c)| c * values[v.index])
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Relation between the left- and right-hand side of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Cmp {
    Le,
    Ge,
    Eq,
}

/// `expr (<=|>=|=) rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub expr: LinearExpr,
    pub cmp: Cmp,
    pub rhs: f64,
}

impl LinearConstraint {
    /// Whether `values` satisfy the constraint within `tol`.
    pub fn is_satisfied(&self, values: &[f64], tol: f64) -> bool {
        let lhs = self.expr.eval(values);
        match self.cmp {
            Cmp::Le => lhs <= self.rhs + tol,
            Cmp::Ge => lhs >= self.rhs - tol,
            Cmp::Eq => (lhs - self.rhs).abs() <= tol,
        }
    }
}

/// Optimization direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Sense {
    Minimize,
    Maximize,
}

/// A pure integer linear program.
#[derive(Debug, Clone)]
pub struct MipModel {
    /// Model name.
    pub name: String,
    id: usize,
    vars: Vec<IntVarDef>,
    constraints: Vec<LinearConstraint>,
    objective: Option<(Sense, LinearExpr)>,
}

impl MipModel {
    /// Creates a new empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed),
            vars: Vec::new(),
            constraints: Vec::new(),
            objective: None,
        }
    }

    /// Declares an integer variable in `[lower, upper]`.
    pub fn add_int_var(&mut self, name: impl Into<String>, lower: i64, upper: Option<i64>) -> VarId {
        let id = VarId {
            model: self.id,
            index: self.vars.len(),
        };
        self.vars.push(IntVarDef {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    pub fn add_constraint(&mut self, expr: LinearExpr, cmp: Cmp, rhs: f64) {
        self.constraints.push(LinearConstraint { expr, cmp, rhs });
    }

    pub fn set_objective(&mut self, sense: Sense, expr: LinearExpr) {
        self.objective = Some((sense, expr));
    }

    pub fn maximize(&mut self, expr: LinearExpr) {
        self.set_objective(Sense::Maximize, expr);
    }

    pub fn minimize(&mut self, expr: LinearExpr) {
        self.set_objective(Sense::Minimize, expr);
    }

    pub fn vars(&self) -> &[IntVarDef] {
        &self.vars
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    pub fn objective(&self) -> Option<&(Sense, LinearExpr)> {
        self.objective.as_ref()
    }

    pub fn var_count(&self) -> usize {
        self.vars.len()
    }

    fn check_expr(&self, expr: &LinearExpr) -> Result<(), MipError> {
        for (var, coeff) in expr.terms() {
            if var.model != self.id {
                return Err(MipError::ForeignVariable {
                    model: self.name.clone(),
                });
            }
            if var.index >= self.vars.len() {
                return Err(MipError::UndefinedVariable(var.index));
            }
            if !coeff.is_finite() {
                return Err(MipError::NonFiniteCoefficient(
                    self.vars[var.index].name.clone(),
                ));
            }
        }
        Ok(())
    }

    /// Validates the model for consistency.
    ///
    /// Every variable referenced by a constraint or by the objective must
    /// have been declared in this model, bounds must be ordered, and an
    /// objective must be set.
    pub fn validate(&self) -> Result<(), MipError> {
        for var in &self.vars {
            if let Some(upper) = var.upper {
                if upper < var.lower {
                    return Err(MipError::InvalidBounds {
                        name: var.name.clone(),
                        lower: var.lower,
                        upper,
                    });
                }
            }
        }
        for c in &self.constraints {
            self.check_expr(&c.expr)?;
            if !c.rhs.is_finite() {
                return Err(MipError::NonFiniteCoefficient("right-hand side".into()));
            }
        }
        match &self.objective {
            Some((_, expr)) => self.check_expr(expr),
            None => Err(MipError::MissingObjective(self.name.clone())),
        }
    }

    /// Whether `values` (declaration order) satisfy bounds, integrality,
    /// and every constraint within `tol`.
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        values.len() == self.vars.len()
            && self.vars.iter().zip(values).all(|(def, &v)| {
                (v - v.round()).abs() <= tol
                    && v >= def.lower as f64 - tol
                    && def.upper.is_none_or(|u| v <= u as f64 + tol)
            })
            && self.constraints.iter().all(|c| c.is_satisfied(values, tol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_creation() {
        let mut model = MipModel::new("test");
        let x = model.add_int_var("x", 0, None);
        let y = model.add_int_var("y", 0, Some(10));
        model.add_constraint(LinearExpr::new().term(x, 1.0).term(y, 1.0), Cmp::Le, 4.0);
        model.maximize(LinearExpr::new().term(x, 1.0));

        assert_eq!(model.var_count(), 2);
        assert_eq!(y.index(), 1);
        assert!(model.validate().is_ok());
        assert!(model.is_feasible(&[1.0, 3.0], 1e-9));
        assert!(!model.is_feasible(&[2.0, 3.0], 1e-9));
        assert!(!model.is_feasible(&[0.5, 0.0], 1e-9));
    }

    #[test]
    fn test_missing_objective() {
        let mut model = MipModel::new("test");
        model.add_int_var("x", 0, None);
        assert!(matches!(
            model.validate(),
            Err(MipError::MissingObjective(_))
        ));
    }

    #[test]
    fn test_foreign_variable() {
        let mut other = MipModel::new("other");
        let foreign = other.add_int_var("z", 0, None);

        let mut model = MipModel::new("test");
        model.add_int_var("x", 0, None);
        model.maximize(LinearExpr::new().term(foreign, 1.0));

        assert!(matches!(
            model.validate(),
            Err(MipError::ForeignVariable { .. })
        ));
    }

    #[test]
    fn test_invalid_bounds() {
        let mut model = MipModel::new("test");
        let x = model.add_int_var("x", 5, Some(2));
        model.maximize(LinearExpr::new().term(x, 1.0));
        assert!(matches!(
            model.validate(),
            Err(MipError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn test_merged_terms() {
        let mut model = MipModel::new("test");
        let x = model.add_int_var("x", 0, None);
        let y = model.add_int_var("y", 0, None);
        let expr = LinearExpr::new().term(x, 1.0).term(y, 2.0).term(x, 3.0);

        assert_eq!(expr.merged(), vec![(x, 4.0), (y, 2.0)]);
        assert_eq!(expr.eval(&[1.0, 1.0]), 6.0);
    }

    #[test]
    fn test_constraint_relations() {
        let mut model = MipModel::new("test");
        let x = model.add_int_var("x", 0, None);
        let expr = LinearExpr::new().term(x, 1.0);

        let le = LinearConstraint {
            expr: expr.clone(),
            cmp: Cmp::Le,
            rhs: 2.0,
        };
        let ge = LinearConstraint {
            expr: expr.clone(),
            cmp: Cmp::Ge,
            rhs: 2.0,
        };
        let eq = LinearConstraint {
            expr,
            cmp: Cmp::Eq,
            rhs: 2.0,
        };

        assert!(le.is_satisfied(&[2.0], 0.0) && !le.is_satisfied(&[3.0], 0.0));
        assert!(ge.is_satisfied(&[2.0], 0.0) && !ge.is_satisfied(&[1.0], 0.0));
        assert!(eq.is_satisfied(&[2.0], 0.0) && !eq.is_satisfied(&[1.0], 0.0));
    }
}
