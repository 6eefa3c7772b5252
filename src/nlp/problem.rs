//! Nonlinear problem definition.

use super::error::NlpError;
use super::method::Method;
use std::fmt;

/// Scalar function of the design vector.
pub type ScalarFn = Box<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Kind of a nonlinear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// `g(x) >= 0`.
    Inequality,
    /// `h(x) = 0`.
    Equality,
}

/// A named constraint function.
pub struct NlpConstraint {
    pub name: String,
    pub kind: ConstraintKind,
    pub fun: ScalarFn,
}

impl NlpConstraint {
    /// Amount by which `x` violates this constraint (0 when satisfied).
    pub fn violation(&self, x: &[f64]) -> f64 {
        let v = (self.fun)(x);
        match self.kind {
            ConstraintKind::Inequality => (-v).max(0.0),
            ConstraintKind::Equality => v.abs(),
        }
    }
}

impl fmt::Debug for NlpConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NlpConstraint")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A continuous minimization problem: objective, initial point,
/// bounds, and constraints.
///
/// Built once and never mutated by the minimizer.
///
/// # Examples
///
/// ```
/// use u_formulate::nlp::{Method, NlpProblem};
///
/// let problem = NlpProblem::new(vec![1.0, 1.0], |x: &[f64]| x[0] * x[0] + x[1] * x[1])
///     .with_inequality("x0 >= 0.5", |x: &[f64]| x[0] - 0.5);
///
/// assert!(problem.validate().is_ok());
/// assert!(problem.check_method(Method::Bfgs).is_err());
/// assert!(problem.check_method(Method::Cobyla).is_ok());
/// ```
pub struct NlpProblem {
    /// Variable names, parallel to `x0`.
    pub names: Vec<String>,
    /// Initial point.
    pub x0: Vec<f64>,
    /// `(lower, upper)` per variable; infinite means unbounded.
    pub bounds: Vec<(f64, f64)>,
    pub objective: ScalarFn,
    pub constraints: Vec<NlpConstraint>,
}

impl NlpProblem {
    /// Creates an unbounded, unconstrained problem.
    pub fn new<F>(x0: Vec<f64>, objective: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let n = x0.len();
        Self {
            names: (0..n).map(|i| format!("x{i}")).collect(),
            x0,
            bounds: vec![(f64::NEG_INFINITY, f64::INFINITY); n],
            objective: Box::new(objective),
            constraints: Vec::new(),
        }
    }

    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bounds(mut self, bounds: Vec<(f64, f64)>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_inequality<F>(mut self, name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.constraints.push(NlpConstraint {
            name: name.into(),
            kind: ConstraintKind::Inequality,
            fun: Box::new(fun),
        });
        self
    }

    pub fn with_equality<F>(mut self, name: impl Into<String>, fun: F) -> Self
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        self.constraints.push(NlpConstraint {
            name: name.into(),
            kind: ConstraintKind::Equality,
            fun: Box::new(fun),
        });
        self
    }

    /// Number of design variables.
    pub fn dim(&self) -> usize {
        self.x0.len()
    }

    pub fn has_inequalities(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.kind == ConstraintKind::Inequality)
    }

    pub fn has_equalities(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| c.kind == ConstraintKind::Equality)
    }

    /// Whether any bound is finite.
    pub fn has_bounds(&self) -> bool {
        self.bounds
            .iter()
            .any(|(lo, hi)| lo.is_finite() || hi.is_finite())
    }

    /// Largest constraint violation at `x`.
    pub fn max_violation(&self, x: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(x))
            .fold(0.0, f64::max)
    }

    /// Clamps `x` into the bounds in place.
    pub fn project(&self, x: &mut [f64]) {
        for (xi, &(lo, hi)) in x.iter_mut().zip(&self.bounds) {
            *xi = xi.clamp(lo, hi);
        }
    }

    /// Validates dimensions, bounds, and the initial point.
    pub fn validate(&self) -> Result<(), NlpError> {
        let n = self.dim();
        if n == 0 {
            return Err(NlpError::InvalidModel("no design variables".into()));
        }
        if self.names.len() != n {
            return Err(NlpError::InvalidModel(format!(
                "{} names for {n} variables",
                self.names.len()
            )));
        }
        if self.bounds.len() != n {
            return Err(NlpError::InvalidModel(format!(
                "{} bounds for {n} variables",
                self.bounds.len()
            )));
        }
        for (name, &(lo, hi)) in self.names.iter().zip(&self.bounds) {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(NlpError::InvalidModel(format!(
                    "invalid bounds for {name}: [{lo}, {hi}]"
                )));
            }
        }
        if let Some(i) = self.x0.iter().position(|v| !v.is_finite()) {
            return Err(NlpError::InvalidModel(format!(
                "initial value of {} is not finite",
                self.names[i]
            )));
        }
        if !(self.objective)(&self.x0).is_finite() {
            return Err(NlpError::InvalidModel(
                "objective is not finite at the initial point".into(),
            ));
        }
        Ok(())
    }

    /// Checks that `method` honours every constraint kind and the bounds
    /// of this problem, and that a backend exists for it.
    pub fn check_method(&self, method: Method) -> Result<(), NlpError> {
        let caps = method.capabilities();
        if self.has_equalities() && !caps.equality {
            return Err(NlpError::UnsupportedConstraints {
                method,
                kind: "equality",
            });
        }
        if self.has_inequalities() && !caps.inequality {
            return Err(NlpError::UnsupportedConstraints {
                method,
                kind: "inequality",
            });
        }
        if self.has_bounds() && !caps.bounds {
            return Err(NlpError::UnsupportedBounds(method));
        }
        if !caps.available {
            return Err(NlpError::Unavailable(method));
        }
        Ok(())
    }
}

impl fmt::Debug for NlpProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NlpProblem")
            .field("names", &self.names)
            .field("x0", &self.x0)
            .field("bounds", &self.bounds)
            .field("constraints", &self.constraints)
            .finish_non_exhaustive()
    }
}
