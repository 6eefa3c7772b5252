//! Largest box under a surface-area budget.
//!
//! Maximize `l * w * h` subject to `2lw + 2wh + 2hl <= S` with all three
//! dimensions nonnegative. The minimizer sees the negated volume and the
//! budget as `S - area(x) >= 0`. The exact optimum is a cube with edge
//! `sqrt(S / 6)`.

use crate::nlp::{minimize, Method, NlpConfig, NlpError, NlpProblem, NlpResult};
use std::fmt::Write as _;

/// Surface-area budget of the reference instance.
pub const DEFAULT_SURFACE_AREA: f64 = 10.0;

/// Inputs of the box formulation.
///
/// # Examples
///
/// ```
/// use u_formulate::nlp::Method;
/// use u_formulate::problems::box_volume::BoxConfig;
///
/// let config = BoxConfig::default()
///     .with_surface_area(24.0)
///     .with_method(Method::Cobyla);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxConfig {
    /// Upper bound on `2lw + 2wh + 2hl`.
    pub surface_area: f64,
    /// Starting `[length, width, height]`.
    pub initial_guess: [f64; 3],
    /// SLSQP when built with `nlopt`, COBYLA otherwise.
    pub method: Method,
    pub solver: NlpConfig,
}

impl Default for BoxConfig {
    fn default() -> Self {
        Self {
            surface_area: DEFAULT_SURFACE_AREA,
            initial_guess: [1.0, 1.0, 1.0],
            method: Method::default_constrained(),
            solver: NlpConfig::default().with_constraint_tol(1e-6),
        }
    }
}

impl BoxConfig {
    pub fn with_surface_area(mut self, s: f64) -> Self {
        self.surface_area = s;
        self
    }

    pub fn with_initial_guess(mut self, guess: [f64; 3]) -> Self {
        self.initial_guess = guess;
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_solver(mut self, solver: NlpConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), NlpError> {
        if !self.surface_area.is_finite() || self.surface_area <= 0.0 {
            return Err(NlpError::InvalidConfig(format!(
                "surface_area must be finite and positive, got {}",
                self.surface_area
            )));
        }
        if self
            .initial_guess
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(NlpError::InvalidConfig(format!(
                "initial_guess must be finite and nonnegative, got {:?}",
                self.initial_guess
            )));
        }
        self.solver.validate().map_err(NlpError::InvalidConfig)
    }
}

pub fn calc_volume(x: &[f64]) -> f64 {
    x[0] * x[1] * x[2]
}

pub fn surface_area(x: &[f64]) -> f64 {
    let (l, w, h) = (x[0], x[1], x[2]);
    2.0 * l * w + 2.0 * w * h + 2.0 * h * l
}

/// Closed-form optimum `(edge, volume)` for budget `s`.
pub fn cube_optimum(s: f64) -> (f64, f64) {
    let edge = (s / 6.0).sqrt();
    (edge, edge.powi(3))
}

/// Builds the minimization problem for `config`.
pub fn build_model(config: &BoxConfig) -> NlpProblem {
    let budget = config.surface_area;
    NlpProblem::new(config.initial_guess.to_vec(), |x: &[f64]| -calc_volume(x))
        .with_names(["length", "width", "height"])
        .with_bounds(vec![(0.0, f64::INFINITY); 3])
        .with_inequality("surface area budget", move |x: &[f64]| {
            budget - surface_area(x)
        })
}

/// Optimized dimensions plus the raw minimizer result.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoxReport {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub volume: f64,
    pub surface_area: f64,
    pub result: NlpResult,
}

impl BoxReport {
    /// Solver summary printed ahead of the report in verbose mode.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.result.message);
        let _ = writeln!(out, "         Current function value: {}", self.result.fun);
        let _ = writeln!(
            out,
            "         Constraint violation: {:e}",
            self.result.constraint_violation
        );
        let _ = writeln!(out, "         Function evaluations: {}", self.result.evaluations);
        out
    }

    /// One `Name: value` line per quantity. A point the solver did not
    /// certify is flagged on a leading line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        if !self.result.converged {
            let _ = writeln!(out, "Solver did not converge: {}", self.result.message);
        }
        let _ = writeln!(out, "Length: {}", self.length);
        let _ = writeln!(out, "Width: {}", self.width);
        let _ = writeln!(out, "Height: {}", self.height);
        let _ = writeln!(out, "Volume: {}", self.volume);
        let _ = writeln!(out, "SurfaceArea: {}", self.surface_area);
        out
    }
}

/// Builds, checks, and solves the box formulation.
pub fn solve(config: &BoxConfig) -> Result<BoxReport, NlpError> {
    config.validate()?;
    let problem = build_model(config);
    let result = minimize(&problem, config.method, &config.solver)?;

    Ok(BoxReport {
        length: result.x[0],
        width: result.x[1],
        height: result.x[2],
        volume: -result.fun,
        surface_area: surface_area(&result.x),
        result,
    })
}
